//! `GET /swarm/health` — cross-swarm retry/status health summary.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub counts_by_status: std::collections::BTreeMap<String, i64>,
    pub retry_success_rate: f64,
    pub poll_interval: u64,
    pub uptime_s: u64,
}

pub async fn get(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let snapshot = state.store.aggregate_health(None).await?;
    Ok(Json(HealthResponse {
        counts_by_status: snapshot.counts_by_status,
        retry_success_rate: snapshot.retry_success_rate,
        poll_interval: state.poll_interval_s,
        uptime_s: state.started_at.elapsed().as_secs(),
    }))
}
