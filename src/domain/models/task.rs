//! Task domain model.
//!
//! Tasks are the nodes of the two-level work tree the Planner builds for a
//! swarm: one task per agent role at level 0, each carrying a fixed-length
//! list of subtasks at level 1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a task (or subtask) in the execution pipeline.
///
/// Wire values use hyphens (`in-progress`, `need-help`) to match the HTTP
/// surface, not the Rust-idiomatic `snake_case` a blanket `rename_all` would
/// produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "need-help")]
    NeedHelp,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::NeedHelp => "need-help",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in-progress" | "in_progress" => Some(Self::InProgress),
            "completed" | "complete" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "need-help" | "need_help" => Some(Self::NeedHelp),
            _ => None,
        }
    }

    /// Completed is the only terminal status that isn't also retry-eligible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// `failed` and `need-help` are both recoverable by the retry monitor.
    pub fn is_retry_eligible(&self) -> bool {
        matches!(self, Self::Failed | Self::NeedHelp)
    }

    /// Valid next statuses from this one (see SPEC_FULL.md §3).
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            Self::Pending => &[Self::InProgress],
            Self::InProgress => &[Self::Completed, Self::Failed, Self::NeedHelp],
            Self::Completed => &[],
            Self::Failed => &[Self::Pending],
            Self::NeedHelp => &[Self::Pending],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Advisory priority label used by the Planner's per-role task templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLabel {
    High,
    Medium,
    Low,
}

impl PriorityLabel {
    /// Integer priority stored on `Task::priority` — higher sorts earlier.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A subtask: one level below a top-level role task, carrying tool hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    /// `"<taskNumber>.<subtaskNumber>"`, e.g. `"2.3"`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: PriorityLabel,
    pub tools: Vec<String>,
}

/// Structured task payload: inputs/outputs, tool hints, and nested subtasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub inputs: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub outputs: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Parent task ids this task depends on (role-task level only).
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub swarm_id: Uuid,
    pub agent_id: Option<Uuid>,
    /// Stable short id within the swarm, e.g. `"1"`, `"2"`, `"3"` — what
    /// `TaskData::dependencies` and `Subtask::id` prefixes reference.
    pub local_id: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: i32,
    pub data: TaskData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_error: Option<String>,
}

impl Task {
    pub fn new(
        swarm_id: Uuid,
        local_id: impl Into<String>,
        description: impl Into<String>,
        priority: PriorityLabel,
        data: TaskData,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            swarm_id,
            agent_id: None,
            local_id: local_id.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            priority: priority.as_i32(),
            data,
            created_at: now,
            updated_at: now,
            retry_count: 0,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_format_uses_hyphens() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::NeedHelp).unwrap(),
            "\"need-help\""
        );
    }

    #[test]
    fn failed_and_need_help_are_retry_eligible_but_not_terminal() {
        assert!(TaskStatus::Failed.is_retry_eligible());
        assert!(TaskStatus::NeedHelp.is_retry_eligible());
        assert!(!TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::NeedHelp.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
    }

    #[test]
    fn completed_has_no_outgoing_transitions() {
        assert!(TaskStatus::Completed.valid_transitions().is_empty());
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn failed_can_only_return_to_pending() {
        assert!(TaskStatus::Failed.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Completed));
    }
}
