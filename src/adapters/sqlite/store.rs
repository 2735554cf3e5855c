//! SQLite implementation of the [`Store`] port.
//!
//! Grounded on the teacher's `adapters::sqlite::task_repository`/
//! `agent_repository` idiom (a thin struct wrapping a `SqlitePool`, one
//! method per port operation, domain structs serialized to/from TEXT
//! columns), but written against runtime-checked `sqlx::query`/`query_as`
//! rather than the teacher's `sqlx::query!` macro, since this workspace is
//! never built against a live database to generate the macro's query cache.
//! Multi-row mutations use an explicit `sqlx::Transaction`, rolled back on
//! drop unless committed, matching SPEC_FULL.md §5's crash-consistency
//! requirement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Agent, OrchestrationEvent, Scope, Swarm, SwarmStatus, Task, TaskData, TaskStatus,
};
use crate::domain::ports::store::HealthSnapshot;
use crate::domain::ports::Store;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_uuid(s: &str) -> DomainResult<Uuid> {
        Uuid::parse_str(s).map_err(|e| DomainError::StoreIntegrity(format!("invalid uuid {s}: {e}")))
    }

    fn parse_timestamp(s: &str) -> DomainResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DomainError::StoreIntegrity(format!("invalid timestamp {s}: {e}")))
    }

    fn swarm_from_row(row: &sqlx::sqlite::SqliteRow) -> DomainResult<Swarm> {
        let status_str: String = row.try_get("status")?;
        let metadata_str: String = row.try_get("metadata")?;
        Ok(Swarm {
            id: Self::parse_uuid(&row.try_get::<String, _>("id")?)?,
            name: row.try_get("name")?,
            status: SwarmStatus::from_str(&status_str)
                .ok_or_else(|| DomainError::StoreIntegrity(format!("unknown swarm status {status_str}")))?,
            num_agents: u32::try_from(row.try_get::<i64, _>("num_agents")?)
                .map_err(|e| DomainError::StoreIntegrity(e.to_string()))?,
            created_at: Self::parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            metadata: serde_json::from_str(&metadata_str)?,
        })
    }

    fn agent_from_row(row: &sqlx::sqlite::SqliteRow) -> DomainResult<Agent> {
        let state_str: String = row.try_get("state")?;
        Ok(Agent {
            id: Self::parse_uuid(&row.try_get::<String, _>("id")?)?,
            swarm_id: Self::parse_uuid(&row.try_get::<String, _>("swarm_id")?)?,
            role: row.try_get("role")?,
            state: serde_json::from_str(&state_str)?,
            assigned_at: Self::parse_timestamp(&row.try_get::<String, _>("assigned_at")?)?,
        })
    }

    fn task_from_row(row: &sqlx::sqlite::SqliteRow) -> DomainResult<Task> {
        let status_str: String = row.try_get("status")?;
        let data_str: String = row.try_get("data")?;
        let agent_id: Option<String> = row.try_get("agent_id")?;
        let retry_count: i64 = row.try_get("retry_count")?;
        Ok(Task {
            id: Self::parse_uuid(&row.try_get::<String, _>("id")?)?,
            swarm_id: Self::parse_uuid(&row.try_get::<String, _>("swarm_id")?)?,
            agent_id: agent_id.map(|s| Self::parse_uuid(&s)).transpose()?,
            local_id: row.try_get("local_id")?,
            description: row.try_get("description")?,
            status: TaskStatus::from_str(&status_str)
                .ok_or_else(|| DomainError::StoreIntegrity(format!("unknown task status {status_str}")))?,
            priority: row.try_get::<i64, _>("priority")? as i32,
            data: serde_json::from_str::<TaskData>(&data_str)?,
            created_at: Self::parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            updated_at: Self::parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
            retry_count: u32::try_from(retry_count).map_err(|e| DomainError::StoreIntegrity(e.to_string()))?,
            last_error: row.try_get("last_error")?,
        })
    }

    async fn insert_agent(tx: &mut Transaction<'_, Sqlite>, agent: &Agent) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO agents (id, swarm_id, role, state, assigned_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(agent.id.to_string())
        .bind(agent.swarm_id.to_string())
        .bind(&agent.role)
        .bind(serde_json::to_string(&agent.state)?)
        .bind(agent.assigned_at.to_rfc3339())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_task(tx: &mut Transaction<'_, Sqlite>, task: &Task) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, swarm_id, agent_id, local_id, description, status, priority, \
             data, created_at, updated_at, retry_count, last_error) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(task.swarm_id.to_string())
        .bind(task.agent_id.map(|id| id.to_string()))
        .bind(&task.local_id)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(i64::from(task.priority))
        .bind(serde_json::to_string(&task.data)?)
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .bind(i64::from(task.retry_count))
        .bind(&task.last_error)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_swarm(
        &self,
        swarm_id: Uuid,
        scope: &Scope,
        agents: Vec<Agent>,
        tasks: Vec<Task>,
    ) -> DomainResult<()> {
        let now = Utc::now();
        let mut metadata = serde_json::Map::new();
        metadata.insert("project".to_string(), serde_json::json!(scope.project));
        metadata.insert("goal".to_string(), serde_json::json!(scope.goal));
        metadata.insert("tech_stack".to_string(), serde_json::json!(scope.tech_stack));
        metadata.insert("features".to_string(), serde_json::json!(scope.features));
        metadata.insert("scope_of_works".to_string(), serde_json::json!(scope.scope_of_works));

        let mut tx = self.pool.begin().await.map_err(DomainError::from)?;

        sqlx::query(
            "INSERT INTO swarms (id, name, status, num_agents, created_at, metadata) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(swarm_id.to_string())
        .bind(&scope.project)
        .bind(SwarmStatus::Idle.as_str())
        .bind(i64::try_from(agents.len()).unwrap_or(i64::MAX))
        .bind(now.to_rfc3339())
        .bind(serde_json::to_string(&metadata)?)
        .execute(&mut *tx)
        .await?;

        for agent in &agents {
            Self::insert_agent(&mut tx, agent).await?;
        }
        for task in &tasks {
            Self::insert_task(&mut tx, task).await?;
        }

        tx.commit().await.map_err(DomainError::from)?;
        Ok(())
    }

    async fn get_swarm(&self, id: Uuid) -> DomainResult<(Swarm, Vec<Agent>, Vec<Task>)> {
        let mut tx = self.pool.begin().await.map_err(DomainError::from)?;

        let swarm_row = sqlx::query("SELECT * FROM swarms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found_swarm(id))?;
        let swarm = Self::swarm_from_row(&swarm_row)?;

        let agent_rows = sqlx::query("SELECT * FROM agents WHERE swarm_id = ? ORDER BY assigned_at ASC")
            .bind(id.to_string())
            .fetch_all(&mut *tx)
            .await?;
        let agents = agent_rows.iter().map(Self::agent_from_row).collect::<DomainResult<Vec<_>>>()?;

        let task_rows = sqlx::query("SELECT * FROM tasks WHERE swarm_id = ? ORDER BY local_id ASC")
            .bind(id.to_string())
            .fetch_all(&mut *tx)
            .await?;
        let tasks = task_rows.iter().map(Self::task_from_row).collect::<DomainResult<Vec<_>>>()?;

        tx.commit().await.map_err(DomainError::from)?;
        Ok((swarm, agents, tasks))
    }

    async fn list_swarms(&self) -> DomainResult<Vec<Swarm>> {
        let rows = sqlx::query("SELECT * FROM swarms ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::swarm_from_row).collect()
    }

    async fn get_swarm_status(&self, id: Uuid) -> DomainResult<SwarmStatus> {
        let row = sqlx::query("SELECT status FROM swarms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DomainError::not_found_swarm(id))?;
        let status_str: String = row.try_get("status")?;
        SwarmStatus::from_str(&status_str)
            .ok_or_else(|| DomainError::StoreIntegrity(format!("unknown swarm status {status_str}")))
    }

    async fn update_swarm_status(&self, id: Uuid, new_status: SwarmStatus) -> DomainResult<()> {
        let row = sqlx::query("SELECT status FROM swarms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DomainError::not_found_swarm(id))?;
        let current_str: String = row.try_get("status")?;
        let current = SwarmStatus::from_str(&current_str)
            .ok_or_else(|| DomainError::StoreIntegrity(format!("unknown swarm status {current_str}")))?;

        if current == new_status {
            return Ok(());
        }
        if !current.can_transition_to(new_status) {
            return Err(DomainError::InvalidTransition {
                from: current.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        sqlx::query("UPDATE swarms SET status = ? WHERE id = ?")
            .bind(new_status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_task_status(
        &self,
        task_id: Uuid,
        new_status: TaskStatus,
        output: Option<serde_json::Value>,
        error: Option<String>,
    ) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DomainError::from)?;

        let row = sqlx::query("SELECT status, data FROM tasks WHERE id = ?")
            .bind(task_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found_task(task_id))?;
        let current_str: String = row.try_get("status")?;
        let current = TaskStatus::from_str(&current_str)
            .ok_or_else(|| DomainError::StoreIntegrity(format!("unknown task status {current_str}")))?;

        if current == new_status {
            return Ok(());
        }
        if !current.can_transition_to(new_status) {
            return Err(DomainError::InvalidTransition {
                from: current.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        let data_str: String = row.try_get("data")?;
        let mut data: TaskData = serde_json::from_str(&data_str)?;
        if let Some(output) = output {
            if let serde_json::Value::Object(map) = output {
                data.outputs.extend(map);
            }
        }

        sqlx::query("UPDATE tasks SET status = ?, data = ?, updated_at = ?, last_error = ? WHERE id = ?")
            .bind(new_status.as_str())
            .bind(serde_json::to_string(&data)?)
            .bind(Utc::now().to_rfc3339())
            .bind(error)
            .bind(task_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DomainError::from)?;
        Ok(())
    }

    async fn increment_retry(&self, task_id: Uuid, max_retries: u32) -> DomainResult<u32> {
        let row = sqlx::query("SELECT retry_count FROM tasks WHERE id = ?")
            .bind(task_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DomainError::not_found_task(task_id))?;
        let current: i64 = row.try_get("retry_count")?;
        let current = u32::try_from(current).map_err(|e| DomainError::StoreIntegrity(e.to_string()))?;

        if current >= max_retries {
            return Err(DomainError::RetryBudgetExceeded);
        }
        let next = current + 1;

        sqlx::query("UPDATE tasks SET retry_count = ? WHERE id = ?")
            .bind(i64::from(next))
            .bind(task_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(next)
    }

    async fn retry_task(&self, task_id: Uuid, max_retries: u32) -> DomainResult<u32> {
        let mut tx = self.pool.begin().await.map_err(DomainError::from)?;

        let row = sqlx::query("SELECT status, retry_count FROM tasks WHERE id = ?")
            .bind(task_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found_task(task_id))?;
        let current_str: String = row.try_get("status")?;
        let current = TaskStatus::from_str(&current_str)
            .ok_or_else(|| DomainError::StoreIntegrity(format!("unknown task status {current_str}")))?;
        if !current.can_transition_to(TaskStatus::Pending) {
            return Err(DomainError::InvalidTransition {
                from: current.as_str().to_string(),
                to: TaskStatus::Pending.as_str().to_string(),
            });
        }

        let retry_count: i64 = row.try_get("retry_count")?;
        let retry_count = u32::try_from(retry_count).map_err(|e| DomainError::StoreIntegrity(e.to_string()))?;
        if retry_count >= max_retries {
            return Err(DomainError::RetryBudgetExceeded);
        }
        let next = retry_count + 1;

        sqlx::query("UPDATE tasks SET status = ?, retry_count = ?, updated_at = ? WHERE id = ?")
            .bind(TaskStatus::Pending.as_str())
            .bind(i64::from(next))
            .bind(Utc::now().to_rfc3339())
            .bind(task_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DomainError::from)?;
        Ok(next)
    }

    async fn list_failed_tasks(&self, since: DateTime<Utc>) -> DomainResult<Vec<Task>> {
        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE status IN ('failed', 'need-help') AND updated_at >= ? \
             ORDER BY updated_at ASC",
        )
        .bind(since.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::task_from_row).collect()
    }

    async fn append_event(&self, event: OrchestrationEvent) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO orchestration_events (id, swarm_id, task_id, event_type, details, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(event.swarm_id.to_string())
        .bind(event.task_id.map(|id| id.to_string()))
        .bind(event.event_type.as_str())
        .bind(serde_json::to_string(&event.details)?)
        .bind(event.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn aggregate_health(&self, swarm_id: Option<Uuid>) -> DomainResult<HealthSnapshot> {
        let mut counts_by_status = std::collections::BTreeMap::new();
        let rows = if let Some(id) = swarm_id {
            sqlx::query("SELECT status, COUNT(*) as n FROM tasks WHERE swarm_id = ? GROUP BY status")
                .bind(id.to_string())
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query("SELECT status, COUNT(*) as n FROM tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await?
        };
        for row in &rows {
            let status: String = row.try_get("status")?;
            let n: i64 = row.try_get("n")?;
            counts_by_status.insert(status, n);
        }

        let window_query = if let Some(id) = swarm_id {
            sqlx::query(
                "SELECT COUNT(*) as n FROM ( \
                     SELECT rowid FROM orchestration_events WHERE event_type = 'retry' AND swarm_id = ? \
                     ORDER BY timestamp DESC LIMIT 100 \
                 )",
            )
            .bind(id.to_string())
        } else {
            sqlx::query(
                "SELECT COUNT(*) as n FROM ( \
                     SELECT rowid FROM orchestration_events WHERE event_type = 'retry' \
                     ORDER BY timestamp DESC LIMIT 100 \
                 )",
            )
        };
        let total_retries: i64 = window_query.fetch_one(&self.pool).await?.try_get("n")?;

        let completed_after_retry: i64 = if let Some(id) = swarm_id {
            sqlx::query(
                "SELECT COUNT(*) as n FROM tasks WHERE status = 'completed' AND retry_count > 0 AND swarm_id = ?",
            )
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?
        } else {
            sqlx::query("SELECT COUNT(*) as n FROM tasks WHERE status = 'completed' AND retry_count > 0")
                .fetch_one(&self.pool)
                .await?
                .try_get("n")?
        };

        let retry_success_rate = if total_retries > 0 {
            completed_after_retry as f64 / total_retries as f64
        } else {
            0.0
        };

        let recent_interventions = total_retries;

        Ok(HealthSnapshot {
            counts_by_status,
            recent_interventions,
            retry_success_rate,
        })
    }

    async fn write_session(&self, swarm_id: Uuid, data: serde_json::Value) -> DomainResult<()> {
        sqlx::query("INSERT INTO sessions (id, swarm_id, data, timestamp) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(swarm_id.to_string())
            .bind(serde_json::to_string(&data)?)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_agent_by_role(&self, swarm_id: Uuid, role: &str) -> DomainResult<Option<Agent>> {
        let row = sqlx::query("SELECT * FROM agents WHERE swarm_id = ? AND role = ?")
            .bind(swarm_id.to_string())
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::agent_from_row).transpose()
    }

    async fn get_task(&self, task_id: Uuid) -> DomainResult<Task> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(task_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DomainError::not_found_task(task_id))?;
        Self::task_from_row(&row)
    }
}
