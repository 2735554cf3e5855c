//! `POST /orchestrator/process` — the top-level natural-language entry point.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::services::ProcessOutcome;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub message: String,
    pub user_id: String,
}

pub async fn process(
    State(state): State<AppState>,
    Json(body): Json<ProcessRequest>,
) -> Result<Json<ProcessOutcome>, ApiError> {
    let outcome = state
        .swarm_manager
        .process(&body.message, &body.user_id)
        .await?;
    Ok(Json(outcome))
}
