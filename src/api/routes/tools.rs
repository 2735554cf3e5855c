//! `POST /tools/{tool_name}` — proxies a tool invocation to the configured
//! MCPGateway. The required capability (`MCP_<TOOL_NAME>`) depends on the
//! path parameter, so it's checked here rather than via a fixed route layer.

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::models::{Capability, Identity};
use crate::domain::ports::ToolOutcome;

#[derive(Debug, Deserialize)]
pub struct ToolInvokeRequest {
    #[serde(default)]
    pub args: serde_json::Value,
    pub swarm_id: Uuid,
    #[serde(default)]
    pub agent_id: Option<Uuid>,
}

pub async fn invoke(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(tool_name): Path<String>,
    Json(body): Json<ToolInvokeRequest>,
) -> Result<Json<ToolOutcome>, ApiError> {
    let required = Capability::Mcp(tool_name.to_ascii_lowercase());
    if !identity.satisfies(&required) {
        tracing::warn!(identity = %identity.name, tool = %tool_name, "credential lacks required MCP capability");
        return Err(ApiError::forbidden());
    }

    let outcome = state
        .mcp_gateway
        .invoke(&tool_name, body.args, body.swarm_id, body.agent_id)
        .await;

    if !outcome.success {
        return Err(ApiError::bad_gateway(
            outcome.error.clone().unwrap_or_else(|| "tool invocation failed".to_string()),
        ));
    }

    Ok(Json(outcome))
}
