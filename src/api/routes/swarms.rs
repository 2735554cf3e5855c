//! `POST /swarms`, `GET /swarms`, `GET /swarms/{id}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::models::{Agent, Scope, ScopeOfWorks, SwarmStatus, SwarmSummary, Task};

#[derive(Debug, Deserialize)]
pub struct CreateSwarmRequest {
    pub project: String,
    pub goal: String,
    #[serde(default)]
    pub tech_stack: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub num_agents: u32,
}

#[derive(Debug, Serialize)]
pub struct CreateSwarmResponse {
    pub swarm_id: Uuid,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSwarmRequest>,
) -> Result<(StatusCode, Json<CreateSwarmResponse>), ApiError> {
    let scope = Scope {
        project: body.project,
        goal: body.goal,
        tech_stack: body.tech_stack,
        features: body.features,
        timeline: "unspecified".to_string(),
        outcome: "MVP".to_string(),
        scope_of_works: ScopeOfWorks::default(),
        extra: serde_json::Map::new(),
    };

    let swarm_id = state
        .swarm_manager
        .create_from_scope(&scope, body.num_agents)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateSwarmResponse { swarm_id })))
}

#[derive(Debug, Serialize)]
pub struct ListSwarmsResponse {
    pub swarms: Vec<SwarmSummary>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<ListSwarmsResponse>, ApiError> {
    let swarms = state.store.list_swarms().await?;
    let swarms = swarms.iter().map(SwarmSummary::from).collect();
    Ok(Json(ListSwarmsResponse { swarms }))
}

#[derive(Debug, Serialize)]
pub struct SwarmDetailResponse {
    pub swarm_id: Uuid,
    pub name: String,
    pub status: SwarmStatus,
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SwarmDetailResponse>, ApiError> {
    let (swarm, agents, tasks) = state.store.get_swarm(id).await?;
    Ok(Json(SwarmDetailResponse {
        swarm_id: swarm.id,
        name: swarm.name,
        status: swarm.status,
        agents,
        tasks,
        metadata: swarm.metadata,
    }))
}
