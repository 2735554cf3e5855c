pub mod agent;
pub mod capability;
pub mod event;
pub mod scope;
pub mod session;
pub mod swarm;
pub mod task;

pub use agent::Agent;
pub use capability::{Capability, CredentialRegistry, Identity};
pub use event::{EventType, OrchestrationEvent};
pub use scope::{ExtractionOutcome, Scope, ScopeOfWorks};
pub use session::Session;
pub use swarm::{Swarm, SwarmStatus, SwarmSummary};
pub use task::{PriorityLabel, Subtask, Task, TaskData, TaskStatus};
