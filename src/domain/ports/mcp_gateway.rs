//! The MCPGateway port: invoke a named external tool.
//!
//! Grounded on the teacher's `infrastructure::mcp::client::MCPClient`, but
//! simplified to the caller side only — this kernel does not host tool
//! execution. Transport failures never propagate as an `Err`; they're folded
//! into `ToolOutcome::success = false` per SPEC_FULL.md §4.3.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub output: Value,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(output: Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: Value::Null,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait MCPGateway: Send + Sync {
    async fn invoke(
        &self,
        tool_name: &str,
        args: Value,
        swarm_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> ToolOutcome;
}
