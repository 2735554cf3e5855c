//! Integration tests for `RetryMonitor` driving a real `SqliteStore`.
//!
//! Exercises `run` over a real ticker for a couple of cycles rather than
//! calling a private `poll_once` directly, since that's the only public
//! surface the monitor exposes — the same boundary production code crosses.

mod common;

use std::time::Duration;

use uuid::Uuid;

use swarmd::domain::models::{Agent, PriorityLabel, Scope, SwarmStatus, Task, TaskData, TaskStatus};
use swarmd::services::{EventBus, RetryMonitor, RetryMonitorConfig};

fn scope() -> Scope {
    Scope::fallback("build a task tracker", &[("frontend", "react")])
}

async fn seed_failed_task(store: &dyn swarmd::domain::ports::Store) -> (Uuid, Uuid) {
    let swarm_id = Uuid::new_v4();
    let agent = Agent::new(swarm_id, "frontend_architect");
    let mut task = Task::new(swarm_id, "1", "Design the frontend", PriorityLabel::High, TaskData::default());
    task.agent_id = Some(agent.id);
    let task_id = task.id;

    store.create_swarm(swarm_id, &scope(), vec![agent], vec![task]).await.unwrap();
    store.update_swarm_status(swarm_id, SwarmStatus::Running).await.unwrap();
    store.update_task_status(task_id, TaskStatus::InProgress, None, None).await.unwrap();
    store.update_task_status(task_id, TaskStatus::Failed, None, Some("boom".to_string())).await.unwrap();

    (swarm_id, task_id)
}

#[tokio::test]
async fn retries_a_failed_task_once_backoff_has_elapsed() {
    let ts = common::test_store().await;
    let (_, task_id) = seed_failed_task(ts.store.as_ref()).await;

    let monitor = RetryMonitor::new(
        ts.store.clone(),
        EventBus::new(),
        RetryMonitorConfig {
            poll_interval: Duration::from_millis(20),
            max_retries: 3,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(300),
        },
    );

    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(monitor.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(60)).await;
    handle.abort();

    let task = ts.store.get_task(task_id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending, "a zero-backoff failure should be retried on the first poll");
    assert_eq!(task.retry_count, 1);
}

#[tokio::test]
async fn does_not_retry_tasks_in_a_paused_swarm() {
    let ts = common::test_store().await;
    let (swarm_id, task_id) = seed_failed_task(ts.store.as_ref()).await;
    ts.store.update_swarm_status(swarm_id, SwarmStatus::Paused).await.unwrap();

    let monitor = RetryMonitor::new(
        ts.store.clone(),
        EventBus::new(),
        RetryMonitorConfig {
            poll_interval: Duration::from_millis(20),
            max_retries: 3,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(300),
        },
    );

    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(monitor.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(60)).await;
    handle.abort();

    let task = ts.store.get_task(task_id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed, "a paused swarm's tasks must not be retried");
    assert_eq!(task.retry_count, 0);
}

#[tokio::test]
async fn stops_retrying_once_the_budget_is_exhausted() {
    let ts = common::test_store().await;
    let (_, task_id) = seed_failed_task(ts.store.as_ref()).await;
    // Exhaust the single-retry budget directly, bypassing the monitor.
    ts.store.increment_retry(task_id, 1).await.unwrap();

    let monitor = RetryMonitor::new(
        ts.store.clone(),
        EventBus::new(),
        RetryMonitorConfig {
            poll_interval: Duration::from_millis(20),
            max_retries: 1,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(300),
        },
    );

    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(monitor.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(60)).await;
    handle.abort();

    let task = ts.store.get_task(task_id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed, "a task past its retry budget stays failed forever");
    assert_eq!(task.retry_count, 1);
}
