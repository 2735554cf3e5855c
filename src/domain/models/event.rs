//! Append-only orchestration events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Create,
    Assign,
    Retry,
    Complete,
    Fail,
    Pause,
    Resume,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Assign => "assign",
            Self::Retry => "retry",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "assign" => Some(Self::Assign),
            "retry" => Some(Self::Retry),
            "complete" => Some(Self::Complete),
            "fail" => Some(Self::Fail),
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationEvent {
    pub id: Uuid,
    pub swarm_id: Uuid,
    pub task_id: Option<Uuid>,
    pub event_type: EventType,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl OrchestrationEvent {
    pub fn new(
        swarm_id: Uuid,
        task_id: Option<Uuid>,
        event_type: EventType,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            swarm_id,
            task_id,
            event_type,
            details,
            timestamp: Utc::now(),
        }
    }
}
