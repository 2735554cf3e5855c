//! `PUT /tasks/{id}` — agent-driven task status updates.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::errors::DomainError;
use crate::domain::models::TaskStatus;

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub status: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateTaskResponse {
    pub ok: bool,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<UpdateTaskResponse>, ApiError> {
    let new_status = TaskStatus::from_str(&body.status)
        .ok_or_else(|| DomainError::BadRequest(format!("unknown task status: {}", body.status)))?;

    state
        .swarm_manager
        .update_task(id, new_status, body.data)
        .await?;

    Ok(Json(UpdateTaskResponse { ok: true }))
}
