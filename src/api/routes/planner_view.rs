//! `GET /api/planner/{id}` — the task tree consumed by the planner UI.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::models::Task;

#[derive(Debug, Serialize)]
pub struct PlannerViewResponse {
    pub tasks: Vec<Task>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlannerViewResponse>, ApiError> {
    let tasks = state.swarm_manager.get_planner_view(id).await?;
    Ok(Json(PlannerViewResponse { tasks }))
}
