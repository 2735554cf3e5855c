//! Orchestration services: the stateful or long-running collaborators that
//! sit between the HTTP API and the Store/Completer/MCPGateway ports.

pub mod event_bus;
pub mod planner;
pub mod retry_monitor;
pub mod role_registry;
pub mod scope_extractor;
pub mod swarm_manager;

pub use event_bus::EventBus;
pub use planner::Planner;
pub use retry_monitor::{RetryMonitor, RetryMonitorConfig};
pub use role_registry::{RoleRegistry, RoleVocabulary};
pub use scope_extractor::ScopeExtractor;
pub use swarm_manager::{ProcessOutcome, SwarmManager};
