//! The Store port: transactional persistence of swarms, agents, tasks,
//! sessions, and events.
//!
//! Grounded on the teacher's `domain::ports::task_repository::TaskRepository`
//! trait shape (one trait per aggregate, `async_trait`, `DomainResult`
//! returns) generalized into a single aggregate-spanning port, since
//! `create_swarm` and `get_swarm` necessarily span agents+tasks in one
//! transaction per SPEC_FULL.md §4.1.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Agent, OrchestrationEvent, Scope, Swarm, SwarmStatus, Task, TaskStatus};

/// Result of `Store::aggregate_health`.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct HealthSnapshot {
    pub counts_by_status: std::collections::BTreeMap<String, i64>,
    pub recent_interventions: i64,
    pub retry_success_rate: f64,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Transactional insert of a swarm, its agents, and its task tree.
    /// `swarm_id` is chosen by the caller (the Planner) since agents and
    /// tasks must embed it before this call.
    async fn create_swarm(
        &self,
        swarm_id: Uuid,
        scope: &Scope,
        agents: Vec<Agent>,
        tasks: Vec<Task>,
    ) -> DomainResult<()>;

    /// A point-in-time consistent snapshot of a swarm and its children.
    async fn get_swarm(&self, id: Uuid) -> DomainResult<(Swarm, Vec<Agent>, Vec<Task>)>;

    async fn list_swarms(&self) -> DomainResult<Vec<Swarm>>;

    async fn get_swarm_status(&self, id: Uuid) -> DomainResult<SwarmStatus>;

    /// Validates the transition against [`SwarmStatus::can_transition_to`];
    /// fails with `DomainError::InvalidTransition` otherwise.
    async fn update_swarm_status(&self, id: Uuid, new_status: SwarmStatus) -> DomainResult<()>;

    /// Validates the transition, sets `updated_at`, and on `failed` records
    /// `last_error`. Idempotent when the task is already in `new_status`.
    async fn update_task_status(
        &self,
        task_id: Uuid,
        new_status: TaskStatus,
        output: Option<serde_json::Value>,
        error: Option<String>,
    ) -> DomainResult<()>;

    /// Fails with `DomainError::RetryBudgetExceeded` when the task is already
    /// at `max_retries`.
    async fn increment_retry(&self, task_id: Uuid, max_retries: u32) -> DomainResult<u32>;

    /// Atomically transitions a failed/need-help task back to `pending` and
    /// increments its retry count in one transaction, so a mid-write error
    /// can never leave the task `pending` with a stale `retry_count`. Returns
    /// the new retry count. Fails with `DomainError::RetryBudgetExceeded`
    /// when the task is already at `max_retries`.
    async fn retry_task(&self, task_id: Uuid, max_retries: u32) -> DomainResult<u32>;

    /// Tasks currently `failed` or `need-help`, ordered by `updated_at` ascending.
    async fn list_failed_tasks(&self, since: DateTime<Utc>) -> DomainResult<Vec<Task>>;

    async fn append_event(&self, event: OrchestrationEvent) -> DomainResult<()>;

    async fn aggregate_health(&self, swarm_id: Option<Uuid>) -> DomainResult<HealthSnapshot>;

    async fn write_session(&self, swarm_id: Uuid, data: serde_json::Value) -> DomainResult<()>;

    /// Used by the Planner to look up a swarm's agents when assembling the
    /// planner view; also used internally to resolve `agent_id` from `role`.
    async fn get_agent_by_role(&self, swarm_id: Uuid, role: &str) -> DomainResult<Option<Agent>>;

    async fn get_task(&self, task_id: Uuid) -> DomainResult<Task>;
}
