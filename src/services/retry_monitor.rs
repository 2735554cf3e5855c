//! Background loop that discovers failed tasks and re-queues them with
//! bounded exponential backoff, per SPEC_FULL.md §4.7.
//!
//! Grounded on the teacher's `RetryPolicy::calculate_backoff` doubling
//! sequence (reused here at task-retry granularity instead of per-HTTP-call
//! granularity) and its single-task-loop-with-shutdown-watch idiom, the
//! target-language translation of a coroutine loop selecting on a ticker and
//! a cancellation signal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::{EventType, OrchestrationEvent, SwarmStatus, Task, TaskStatus};
use crate::domain::ports::Store;
use crate::services::event_bus::EventBus;

const HEALTH_SUMMARY_EVERY_N_ITERATIONS: u64 = 6;

#[derive(Debug, Clone)]
pub struct RetryMonitorConfig {
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

pub struct RetryMonitor {
    store: Arc<dyn Store>,
    event_bus: EventBus,
    config: RetryMonitorConfig,
}

impl RetryMonitor {
    pub fn new(store: Arc<dyn Store>, event_bus: EventBus, config: RetryMonitorConfig) -> Self {
        Self { store, event_bus, config }
    }

    /// Computed backoff for a given retry count: `base * 2^retry_count`
    /// capped at `max_backoff` — the exact doubling sequence
    /// `10s, 20s, 40s, 80s, 160s, 300s` (capped) at the configured defaults.
    fn backoff_for(&self, retry_count: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(retry_count);
        let wait = self.config.base_backoff.saturating_mul(multiplier as u32);
        wait.min(self.config.max_backoff)
    }

    /// Runs until `shutdown` reports `true`. Responds within one poll
    /// interval; in-flight iterations finish atomically before observing
    /// shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        let mut iteration: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    iteration += 1;
                    self.poll_once().await;
                    if iteration % HEALTH_SUMMARY_EVERY_N_ITERATIONS == 0 {
                        self.publish_health_summary().await;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("retry monitor observed shutdown signal, exiting");
                        return;
                    }
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn poll_once(&self) {
        let epoch = Utc.timestamp_opt(0, 0).single().expect("epoch is a valid timestamp");
        let failed = match self.store.list_failed_tasks(epoch).await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "failed to list failed tasks this poll");
                return;
            }
        };

        for task in failed {
            if let Err(err) = self.maybe_retry(&task).await {
                warn!(task_id = %task.id, error = %err, "retry attempt deferred to next poll");
            }
        }
    }

    async fn maybe_retry(&self, task: &Task) -> anyhow::Result<()> {
        if task.retry_count >= self.config.max_retries {
            return Ok(());
        }

        match self.store.get_swarm_status(task.swarm_id).await {
            Ok(SwarmStatus::Paused) => return Ok(()),
            Ok(_) => {}
            Err(err) => {
                warn!(swarm_id = %task.swarm_id, error = %err, "could not read swarm status, skipping retry this poll");
                return Ok(());
            }
        }

        let wait = self.backoff_for(task.retry_count);
        let elapsed = (Utc::now() - task.updated_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if elapsed < wait {
            return Ok(());
        }

        self.retry_task(task.id, task.swarm_id).await?;
        Ok(())
    }

    async fn retry_task(&self, task_id: Uuid, swarm_id: Uuid) -> anyhow::Result<()> {
        let new_count = self.store.retry_task(task_id, self.config.max_retries).await?;

        let event = OrchestrationEvent::new(
            swarm_id,
            Some(task_id),
            EventType::Retry,
            serde_json::json!({ "retry_count": new_count }),
        );
        self.store.append_event(event.clone()).await?;
        self.event_bus.publish(event).await;
        Ok(())
    }

    async fn publish_health_summary(&self) {
        match self.store.aggregate_health(None).await {
            Ok(snapshot) => info!(
                counts_by_status = ?snapshot.counts_by_status,
                recent_interventions = snapshot.recent_interventions,
                retry_success_rate = snapshot.retry_success_rate,
                "retry monitor health summary"
            ),
            Err(err) => warn!(error = %err, "failed to compute health summary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;

    use crate::domain::errors::DomainResult;
    use crate::domain::models::{Agent, Scope};
    use crate::domain::ports::store::HealthSnapshot;

    /// `backoff_for` never touches the store; this fake exists only so a
    /// `RetryMonitor` can be constructed in the test below.
    struct UnusedStore;

    #[async_trait]
    impl Store for UnusedStore {
        async fn create_swarm(&self, _: Uuid, _: &Scope, _: Vec<Agent>, _: Vec<Task>) -> DomainResult<()> {
            unimplemented!()
        }
        async fn get_swarm(&self, _: Uuid) -> DomainResult<(crate::domain::models::Swarm, Vec<Agent>, Vec<Task>)> {
            unimplemented!()
        }
        async fn list_swarms(&self) -> DomainResult<Vec<crate::domain::models::Swarm>> {
            unimplemented!()
        }
        async fn get_swarm_status(&self, _: Uuid) -> DomainResult<SwarmStatus> {
            unimplemented!()
        }
        async fn update_swarm_status(&self, _: Uuid, _: SwarmStatus) -> DomainResult<()> {
            unimplemented!()
        }
        async fn update_task_status(
            &self,
            _: Uuid,
            _: TaskStatus,
            _: Option<serde_json::Value>,
            _: Option<String>,
        ) -> DomainResult<()> {
            unimplemented!()
        }
        async fn increment_retry(&self, _: Uuid, _: u32) -> DomainResult<u32> {
            unimplemented!()
        }
        async fn retry_task(&self, _: Uuid, _: u32) -> DomainResult<u32> {
            unimplemented!()
        }
        async fn list_failed_tasks(&self, _: DateTime<Utc>) -> DomainResult<Vec<Task>> {
            unimplemented!()
        }
        async fn append_event(&self, _: OrchestrationEvent) -> DomainResult<()> {
            unimplemented!()
        }
        async fn aggregate_health(&self, _: Option<Uuid>) -> DomainResult<HealthSnapshot> {
            unimplemented!()
        }
        async fn write_session(&self, _: Uuid, _: serde_json::Value) -> DomainResult<()> {
            unimplemented!()
        }
        async fn get_agent_by_role(&self, _: Uuid, _: &str) -> DomainResult<Option<Agent>> {
            unimplemented!()
        }
        async fn get_task(&self, _: Uuid) -> DomainResult<Task> {
            unimplemented!()
        }
    }

    fn config() -> RetryMonitorConfig {
        RetryMonitorConfig {
            poll_interval: Duration::from_secs(10),
            max_retries: 3,
            base_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(300),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let monitor = RetryMonitor::new(Arc::new(UnusedStore), EventBus::new(), config());
        assert_eq!(monitor.backoff_for(0), Duration::from_secs(10));
        assert_eq!(monitor.backoff_for(1), Duration::from_secs(20));
        assert_eq!(monitor.backoff_for(2), Duration::from_secs(40));
        assert_eq!(monitor.backoff_for(3), Duration::from_secs(80));
        assert_eq!(monitor.backoff_for(4), Duration::from_secs(160));
        assert_eq!(monitor.backoff_for(5), Duration::from_secs(300));
        assert_eq!(monitor.backoff_for(6), Duration::from_secs(300));
    }
}
