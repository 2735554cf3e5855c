//! Swarm domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Error,
}

impl Default for SwarmStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl SwarmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn valid_transitions(&self) -> &'static [SwarmStatus] {
        match self {
            Self::Idle => &[Self::Running],
            Self::Running => &[Self::Paused, Self::Completed, Self::Error],
            Self::Paused => &[Self::Running],
            Self::Completed => &[],
            Self::Error => &[],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swarm {
    pub id: Uuid,
    pub name: String,
    pub status: SwarmStatus,
    pub num_agents: u32,
    pub created_at: DateTime<Utc>,
    /// Arbitrary key/value metadata: the originating `Scope` (`project`,
    /// `goal`, `tech_stack`, `features`, `scope_of_works`) plus whatever the
    /// Planner adds, and any unknown fields preserved verbatim.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Summary projection returned by `GET /swarms`.
#[derive(Debug, Clone, Serialize)]
pub struct SwarmSummary {
    pub swarm_id: Uuid,
    pub name: String,
    pub status: SwarmStatus,
    pub num_agents: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Swarm> for SwarmSummary {
    fn from(s: &Swarm) -> Self {
        Self {
            swarm_id: s.id,
            name: s.name.clone(),
            status: s.status,
            num_agents: s.num_agents,
            created_at: s.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_only_moves_to_running() {
        assert!(SwarmStatus::Idle.can_transition_to(SwarmStatus::Running));
        assert!(!SwarmStatus::Idle.can_transition_to(SwarmStatus::Completed));
    }

    #[test]
    fn paused_resumes_to_running_only() {
        assert!(SwarmStatus::Paused.can_transition_to(SwarmStatus::Running));
        assert!(!SwarmStatus::Paused.can_transition_to(SwarmStatus::Completed));
    }

    #[test]
    fn completed_and_error_are_terminal() {
        assert!(SwarmStatus::Completed.valid_transitions().is_empty());
        assert!(SwarmStatus::Error.valid_transitions().is_empty());
    }
}
