//! Integration tests for `SqliteStore` against a real migrated database.

mod common;

use uuid::Uuid;

use swarmd::domain::errors::DomainError;
use swarmd::domain::models::{
    Agent, PriorityLabel, Scope, SwarmStatus, Task, TaskData, TaskStatus,
};

fn scope() -> Scope {
    Scope::fallback("build a task tracker", &[("frontend", "react")])
}

fn one_agent_one_task(swarm_id: Uuid) -> (Vec<Agent>, Vec<Task>) {
    let agent = Agent::new(swarm_id, "frontend_architect");
    let mut task = Task::new(swarm_id, "1", "Design and implement the frontend", PriorityLabel::High, TaskData::default());
    task.agent_id = Some(agent.id);
    (vec![agent], vec![task])
}

#[tokio::test]
async fn create_and_fetch_round_trips_all_fields() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);

    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    let (swarm, agents, tasks) = ts.store.get_swarm(swarm_id).await.unwrap();
    assert_eq!(swarm.id, swarm_id);
    assert_eq!(swarm.status, SwarmStatus::Idle);
    assert_eq!(swarm.num_agents, 1);
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].role, "frontend_architect");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].local_id, "1");
    assert_eq!(tasks[0].status, TaskStatus::Pending);
}

#[tokio::test]
async fn get_swarm_on_unknown_id_is_not_found() {
    let ts = common::test_store().await;
    let err = ts.store.get_swarm(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn list_swarms_orders_newest_first() {
    let ts = common::test_store().await;
    let first = Uuid::new_v4();
    let (a, t) = one_agent_one_task(first);
    ts.store.create_swarm(first, &scope(), a, t).await.unwrap();

    let second = Uuid::new_v4();
    let (a, t) = one_agent_one_task(second);
    ts.store.create_swarm(second, &scope(), a, t).await.unwrap();

    let swarms = ts.store.list_swarms().await.unwrap();
    assert_eq!(swarms.len(), 2);
    assert_eq!(swarms[0].id, second, "most recently created swarm sorts first");
}

#[tokio::test]
async fn swarm_status_rejects_illegal_transition() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);
    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    // Idle can only move to Running, never straight to Completed.
    let err = ts.store.update_swarm_status(swarm_id, SwarmStatus::Completed).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));

    ts.store.update_swarm_status(swarm_id, SwarmStatus::Running).await.unwrap();
    assert_eq!(ts.store.get_swarm_status(swarm_id).await.unwrap(), SwarmStatus::Running);
}

#[tokio::test]
async fn task_status_transition_is_validated_and_idempotent() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);
    let task_id = tasks[0].id;
    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    // Pending -> Completed is not a valid direct transition.
    let err = ts
        .store
        .update_task_status(task_id, TaskStatus::Completed, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));

    ts.store.update_task_status(task_id, TaskStatus::InProgress, None, None).await.unwrap();
    // Re-applying the same status is a no-op, not an error.
    ts.store.update_task_status(task_id, TaskStatus::InProgress, None, None).await.unwrap();

    let task = ts.store.get_task(task_id).await.unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn increment_retry_stops_at_max() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);
    let task_id = tasks[0].id;
    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    assert_eq!(ts.store.increment_retry(task_id, 2).await.unwrap(), 1);
    assert_eq!(ts.store.increment_retry(task_id, 2).await.unwrap(), 2);
    let err = ts.store.increment_retry(task_id, 2).await.unwrap_err();
    assert!(matches!(err, DomainError::RetryBudgetExceeded));
}

#[tokio::test]
async fn list_failed_tasks_filters_by_status_and_window() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);
    let task_id = tasks[0].id;
    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    ts.store.update_task_status(task_id, TaskStatus::InProgress, None, None).await.unwrap();
    ts.store.update_task_status(task_id, TaskStatus::Failed, None, Some("boom".to_string())).await.unwrap();

    let since = chrono::Utc::now() - chrono::Duration::hours(1);
    let failed = ts.store.list_failed_tasks(since).await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, task_id);
    assert_eq!(failed[0].last_error.as_deref(), Some("boom"));
}

#[tokio::test]
async fn aggregate_health_counts_by_status() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);
    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    let snapshot = ts.store.aggregate_health(Some(swarm_id)).await.unwrap();
    assert_eq!(snapshot.counts_by_status.get("pending"), Some(&1));
    assert_eq!(snapshot.retry_success_rate, 0.0, "no retries have happened yet");
}

#[tokio::test]
async fn get_agent_by_role_returns_none_when_absent() {
    let ts = common::test_store().await;
    let swarm_id = Uuid::new_v4();
    let (agents, tasks) = one_agent_one_task(swarm_id);
    ts.store.create_swarm(swarm_id, &scope(), agents, tasks).await.unwrap();

    assert!(ts.store.get_agent_by_role(swarm_id, "frontend_architect").await.unwrap().is_some());
    assert!(ts.store.get_agent_by_role(swarm_id, "nonexistent_role").await.unwrap().is_none());
}
