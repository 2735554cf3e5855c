//! Agent domain model.
//!
//! Roles are data, not types: the set of recognized roles, their order, and
//! their per-role prompt templates live in [`crate::services::role_registry`].
//! An `Agent` row just names which role it fills within a swarm.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub swarm_id: Uuid,
    pub role: String,
    /// Opaque blob holding the agent's current assignment. When present,
    /// `state.task_id` must reference a task owned by the same swarm.
    pub state: serde_json::Value,
    pub assigned_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(swarm_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            swarm_id,
            role: role.into(),
            state: serde_json::json!({}),
            assigned_at: Utc::now(),
        }
    }

    pub fn current_task_id(&self) -> Option<Uuid> {
        self.state
            .get("task_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}
