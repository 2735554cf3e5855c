//! Shared application state handed to every axum handler.
//!
//! Per SPEC_FULL.md §9 ("Global state"), the only process-wide mutable/shared
//! state is the Store's connection pool and the startup-loaded credential
//! registry; both are held here behind cheap `Arc` clones.

use std::sync::Arc;

use crate::domain::models::CredentialRegistry;
use crate::domain::ports::{MCPGateway, Store};
use crate::services::SwarmManager;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub swarm_manager: Arc<SwarmManager>,
    pub mcp_gateway: Arc<dyn MCPGateway>,
    pub credentials: Arc<CredentialRegistry>,
    pub started_at: std::time::Instant,
    pub poll_interval_s: u64,
}
