//! Swarm lifecycle: the only write path over the Store, per SPEC_FULL.md
//! §3 ("Ownership") and §4.6.
//!
//! Grounded on the teacher's thin-coordinator `SwarmOrchestrator` shape (a
//! struct of `Arc<dyn Trait>` collaborators with one method per public
//! operation) scaled down to the operations SPEC_FULL.md names, since the
//! teacher's own orchestrator spans many subsystems (convergence, evolution,
//! federation) with no counterpart here.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EventType, OrchestrationEvent, Scope, SwarmStatus, Task, TaskStatus};
use crate::domain::ports::Store;
use crate::services::event_bus::EventBus;
use crate::services::planner::Planner;
use crate::services::role_registry::RoleRegistry;
use crate::services::scope_extractor::ScopeExtractor;

/// Result of [`SwarmManager::process`]: the top-level entry point combining
/// scope extraction and swarm creation.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessOutcome {
    NeedsClarification { message: String },
    Success { swarm_id: Uuid, planner_url: String },
}

pub struct SwarmManager {
    store: Arc<dyn Store>,
    planner: Planner,
    scope_extractor: ScopeExtractor,
    role_registry: RoleRegistry,
    event_bus: EventBus,
    default_num_agents: u32,
    max_retries: u32,
}

impl SwarmManager {
    pub fn new(
        store: Arc<dyn Store>,
        planner: Planner,
        scope_extractor: ScopeExtractor,
        role_registry: RoleRegistry,
        event_bus: EventBus,
        default_num_agents: u32,
        max_retries: u32,
    ) -> Self {
        Self { store, planner, scope_extractor, role_registry, event_bus, default_num_agents, max_retries }
    }

    #[instrument(skip(self, user_message))]
    pub async fn process(&self, user_message: &str, _user_id: &str) -> DomainResult<ProcessOutcome> {
        match self.scope_extractor.extract(user_message).await {
            crate::domain::models::ExtractionOutcome::ClarificationNeeded(message) => {
                Ok(ProcessOutcome::NeedsClarification { message })
            }
            crate::domain::models::ExtractionOutcome::Scoped(scope) => {
                let swarm_id = self.create_from_scope(&scope, self.default_num_agents).await?;
                Ok(ProcessOutcome::Success { swarm_id, planner_url: format!("/planner/{swarm_id}") })
            }
        }
    }

    #[instrument(skip(self, scope))]
    pub async fn create_from_scope(&self, scope: &Scope, num_agents: u32) -> DomainResult<Uuid> {
        let swarm_id = Uuid::new_v4();
        let roles = self.role_registry.roles_for(num_agents);

        let (agents, tasks, notices) = self.planner.generate(swarm_id, scope, roles).await?;
        self.store.create_swarm(swarm_id, scope, agents, tasks).await?;
        self.store.update_swarm_status(swarm_id, SwarmStatus::Running).await?;

        let details = serde_json::json!({
            "role_vocabulary": self.role_registry.vocabulary().as_str(),
            "fallback_notices": notices.iter().map(|n| serde_json::json!({"role": n.role, "reason": n.reason})).collect::<Vec<_>>(),
        });
        let event = OrchestrationEvent::new(swarm_id, None, EventType::Create, details);
        self.store.append_event(event.clone()).await?;
        self.event_bus.publish(event).await;

        self.store
            .write_session(swarm_id, serde_json::json!({"scope": scope, "stage": "created"}))
            .await?;

        Ok(swarm_id)
    }

    pub async fn get_planner_view(&self, swarm_id: Uuid) -> DomainResult<Vec<Task>> {
        let (_, _, tasks) = self.store.get_swarm(swarm_id).await?;
        Ok(tasks)
    }

    #[instrument(skip(self, output))]
    pub async fn update_task(
        &self,
        task_id: Uuid,
        new_status: TaskStatus,
        output: Option<serde_json::Value>,
    ) -> DomainResult<()> {
        let task = self.store.get_task(task_id).await?;
        let error = if new_status == TaskStatus::Failed {
            output.as_ref().and_then(|v| v.get("error")).and_then(|v| v.as_str()).map(str::to_string)
        } else {
            None
        };

        self.store.update_task_status(task_id, new_status, output, error).await?;

        let event_type = match new_status {
            TaskStatus::InProgress => EventType::Assign,
            TaskStatus::Completed => EventType::Complete,
            TaskStatus::Failed | TaskStatus::NeedHelp => EventType::Fail,
            TaskStatus::Pending => EventType::Retry,
        };
        let event = OrchestrationEvent::new(task.swarm_id, Some(task_id), event_type, serde_json::json!({}));
        self.store.append_event(event.clone()).await?;
        self.event_bus.publish(event).await;

        if new_status == TaskStatus::Completed {
            self.maybe_complete_swarm(task.swarm_id).await?;
        }

        Ok(())
    }

    async fn maybe_complete_swarm(&self, swarm_id: Uuid) -> DomainResult<()> {
        let (swarm, _, tasks) = self.store.get_swarm(swarm_id).await?;
        if swarm.status != SwarmStatus::Running {
            return Ok(());
        }

        let all_settled = tasks.iter().all(|t| Self::is_settled(t, self.max_retries));
        let any_completed = tasks.iter().any(|t| t.status == TaskStatus::Completed);

        if all_settled && any_completed {
            self.store.update_swarm_status(swarm_id, SwarmStatus::Completed).await?;
            self.store
                .write_session(swarm_id, serde_json::json!({"stage": "completed"}))
                .await?;
        }
        Ok(())
    }

    /// A task counts toward swarm completion once it can no longer change:
    /// `completed`, or `failed`/`need-help` with its retry budget exhausted.
    fn is_settled(task: &Task, max_retries: u32) -> bool {
        match task.status {
            TaskStatus::Completed => true,
            TaskStatus::Failed | TaskStatus::NeedHelp => task.retry_count >= max_retries,
            TaskStatus::Pending | TaskStatus::InProgress => false,
        }
    }

    /// Pausing blocks new RetryMonitor retries only; in-flight task-status
    /// updates still apply.
    pub async fn pause(&self, swarm_id: Uuid) -> DomainResult<()> {
        self.store.update_swarm_status(swarm_id, SwarmStatus::Paused).await?;
        let event = OrchestrationEvent::new(swarm_id, None, EventType::Pause, serde_json::json!({}));
        self.store.append_event(event.clone()).await?;
        self.event_bus.publish(event).await;
        Ok(())
    }

    /// Never mutates task statuses itself.
    pub async fn resume(&self, swarm_id: Uuid) -> DomainResult<()> {
        self.store.update_swarm_status(swarm_id, SwarmStatus::Running).await?;
        let event = OrchestrationEvent::new(swarm_id, None, EventType::Resume, serde_json::json!({}));
        self.store.append_event(event.clone()).await?;
        self.event_bus.publish(event).await;
        Ok(())
    }
}
