//! Production MCPGateway adapter: a thin JSON-over-HTTP client.
//!
//! The teacher's `infrastructure::mcp::client::McpClientImpl` manages a
//! stdio-transport subprocess and its own health monitoring — this kernel
//! only calls *out* to an already-running tool worker, per SPEC_FULL.md
//! §4.3, so the subprocess lifecycle machinery has no counterpart here.
//! The request/response shape instead follows the teacher's
//! `ClaudeClientImpl` reqwest idiom (pooled client, explicit timeout,
//! status-code classification) applied to a single `POST /tools/{name}` call.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::domain::ports::mcp_gateway::{MCPGateway, ToolOutcome};
use crate::logging::scrub_message;

#[derive(Serialize)]
struct ToolRequest {
    args: Value,
    swarm_id: Uuid,
    agent_id: Option<Uuid>,
}

pub struct HttpMcpGateway {
    http_client: ReqwestClient,
    base_url: String,
    credential: String,
    timeout: Duration,
}

impl HttpMcpGateway {
    pub fn new(base_url: String, credential: String, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = ReqwestClient::builder().pool_max_idle_per_host(10).build()?;
        Ok(Self {
            http_client,
            base_url,
            credential,
            timeout,
        })
    }
}

#[async_trait]
impl MCPGateway for HttpMcpGateway {
    #[instrument(skip(self, args), fields(%swarm_id, ?agent_id))]
    async fn invoke(&self, tool_name: &str, args: Value, swarm_id: Uuid, agent_id: Option<Uuid>) -> ToolOutcome {
        let body = ToolRequest { args, swarm_id, agent_id };

        let response = self
            .http_client
            .post(format!("{}/tools/{}", self.base_url, tool_name))
            .bearer_auth(&self.credential)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(tool = tool_name, "mcp request timed out");
                return ToolOutcome::failed("mcp request timed out");
            }
            Err(e) => {
                warn!(tool = tool_name, error = %e, "mcp transport error");
                return ToolOutcome::failed(format!("mcp transport error: {e}"));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = scrub_message(&response.text().await.unwrap_or_default());
            warn!(tool = tool_name, %status, body, "mcp tool call failed");
            return ToolOutcome::failed(format!("mcp tool returned {status}: {body}"));
        }

        match response.json::<Value>().await {
            Ok(output) => ToolOutcome::ok(output),
            Err(e) => {
                warn!(tool = tool_name, error = %e, "mcp response was not valid JSON");
                ToolOutcome::failed(format!("mcp response was not valid JSON: {e}"))
            }
        }
    }
}
