//! Given a validated Scope, produce an agent roster and a two-level task
//! tree, per SPEC_FULL.md §4.5.
//!
//! Grounded on the same structured-output-with-deterministic-fallback
//! discipline as [`crate::services::scope_extractor`]; subtask generation
//! failures are swallowed into a fallback subtask and reported to the
//! caller as a [`PlannerNotice`] rather than an error, matching the
//! "never propagates to the caller" contract of SPEC_FULL.md §4.5.

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use serde::Deserialize;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Agent, PriorityLabel, Scope, Subtask, Task, TaskData, TaskStatus};
use crate::domain::ports::{Completer, CompletionOptions};
use crate::services::role_registry::{RoleDefinition, RoleRegistry};

const SUBTASKS_PER_ROLE: usize = 4;

/// A non-fatal deviation from the happy path, surfaced so the caller can log
/// it as an `event` rather than an error.
#[derive(Debug, Clone)]
pub struct PlannerNotice {
    pub role: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct RawSubtask {
    id: Option<String>,
    title: String,
    description: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tools: Vec<String>,
}

pub struct Planner {
    completer: Arc<dyn Completer>,
}

impl Planner {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    #[instrument(skip(self, scope, roles))]
    pub async fn generate(
        &self,
        swarm_id: Uuid,
        scope: &Scope,
        roles: &'static [RoleDefinition],
    ) -> DomainResult<(Vec<Agent>, Vec<Task>, Vec<PlannerNotice>)> {
        let role_names: Vec<&str> = roles.iter().map(|r| r.name).collect();

        let mut agents = Vec::with_capacity(roles.len());
        let mut tasks = Vec::with_capacity(roles.len());
        let mut notices = Vec::new();

        for (idx, role) in roles.iter().enumerate() {
            let local_id = (idx + 1).to_string();
            let agent = Agent::new(swarm_id, role.name);

            let dependencies: Vec<String> = role
                .depends_on
                .iter()
                .filter_map(|dep_name| {
                    role_names
                        .iter()
                        .position(|n| n == dep_name)
                        .map(|pos| (pos + 1).to_string())
                })
                .collect();

            let (subtasks, notice) = self.generate_subtasks(role, &local_id, scope).await;
            if let Some(notice) = notice {
                notices.push(notice);
            }

            let data = TaskData {
                inputs: serde_json::Map::new(),
                outputs: serde_json::Map::new(),
                tools: Vec::new(),
                subtasks,
                dependencies,
            };

            let mut task = Task::new(swarm_id, local_id, role.title, role.priority.into(), data);
            task.agent_id = Some(agent.id);
            tasks.push(task);
            agents.push(agent);
        }

        Self::validate_acyclic(&tasks)?;
        Ok((agents, tasks, notices))
    }

    async fn generate_subtasks(
        &self,
        role: &RoleDefinition,
        task_local_id: &str,
        scope: &Scope,
    ) -> (Vec<Subtask>, Option<PlannerNotice>) {
        let prompt = format!(
            "Generate exactly {SUBTASKS_PER_ROLE} subtasks for the role '{}' working on project '{}' \
             ({}). Emit a strict JSON array of objects with fields: title, description, priority \
             (high|medium|low), tools (array of strings). JSON only.",
            role.name, scope.project, scope.goal
        );
        let options = CompletionOptions {
            temperature: 0.3,
            max_tokens: 1024,
            deterministic: false,
            timeout: Duration::from_secs(30),
        };

        let raw = match self.completer.complete(&prompt, &options).await {
            Ok(text) => text,
            Err(err) => {
                return (
                    Self::fallback_subtasks(role, task_local_id),
                    Some(PlannerNotice {
                        role: role.name.to_string(),
                        reason: format!("completer call failed: {err}"),
                    }),
                );
            }
        };

        match Self::parse_subtasks(&raw, task_local_id) {
            Some(subtasks) if subtasks.len() == SUBTASKS_PER_ROLE => (subtasks, None),
            _ => (
                Self::fallback_subtasks(role, task_local_id),
                Some(PlannerNotice {
                    role: role.name.to_string(),
                    reason: "subtask output failed to parse".to_string(),
                }),
            ),
        }
    }

    fn parse_subtasks(raw: &str, task_local_id: &str) -> Option<Vec<Subtask>> {
        let trimmed = raw.trim();
        let start = trimmed.find('[')?;
        let end = trimmed.rfind(']')?;
        if end < start {
            return None;
        }
        let block = &trimmed[start..=end];
        let raw_subtasks: Vec<RawSubtask> = serde_json::from_str(block).ok()?;

        Some(
            raw_subtasks
                .into_iter()
                .enumerate()
                .map(|(idx, raw)| Subtask {
                    id: raw.id.unwrap_or_else(|| format!("{task_local_id}.{}", idx + 1)),
                    title: raw.title,
                    description: raw.description,
                    status: TaskStatus::Pending,
                    priority: match raw.priority.as_deref() {
                        Some("high") => PriorityLabel::High,
                        Some("low") => PriorityLabel::Low,
                        _ => PriorityLabel::Medium,
                    },
                    tools: raw.tools,
                })
                .collect(),
        )
    }

    fn fallback_subtasks(role: &RoleDefinition, task_local_id: &str) -> Vec<Subtask> {
        vec![Subtask {
            id: format!("{task_local_id}.1"),
            title: format!("{} task 1", role.name),
            description: format!("Default task for {}", role.name),
            status: TaskStatus::Pending,
            priority: PriorityLabel::Medium,
            tools: vec![format!("{}-tools", role.name)],
        }]
    }

    /// Task dependencies are a DAG by construction (level 1 depends only on
    /// level 0). Verify it anyway before any row is written.
    fn validate_acyclic(tasks: &[Task]) -> DomainResult<()> {
        let mut visiting = std::collections::HashSet::new();
        let mut visited = std::collections::HashSet::new();

        fn visit<'a>(
            id: &'a str,
            tasks: &'a [Task],
            visiting: &mut std::collections::HashSet<&'a str>,
            visited: &mut std::collections::HashSet<&'a str>,
        ) -> DomainResult<()> {
            if visited.contains(id) {
                return Ok(());
            }
            if !visiting.insert(id) {
                return Err(DomainError::BadRequest(format!("dependency cycle detected at task {id}")));
            }
            if let Some(task) = tasks.iter().find(|t| t.local_id == id) {
                for dep in &task.data.dependencies {
                    visit(dep, tasks, visiting, visited)?;
                }
            }
            visiting.remove(id);
            visited.insert(id);
            Ok(())
        }

        for task in tasks {
            visit(&task.local_id, tasks, &mut visiting, &mut visited)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::completer::MockCompleter;
    use crate::services::role_registry::{RoleRegistry, RoleVocabulary};

    fn scope() -> Scope {
        Scope::fallback("build a task tracker", &[("frontend", "react")])
    }

    #[tokio::test]
    async fn generates_three_tasks_with_four_subtasks_each() {
        let completer = Arc::new(MockCompleter::new("not valid json"));
        let planner = Planner::new(completer);
        let registry = RoleRegistry::load(RoleVocabulary::Default);
        let swarm_id = Uuid::new_v4();

        let (agents, tasks, notices) =
            planner.generate(swarm_id, &scope(), registry.roles_for(3)).await.unwrap();

        assert_eq!(agents.len(), 3);
        assert_eq!(tasks.len(), 3);
        for task in &tasks {
            assert_eq!(task.data.subtasks.len(), 1, "fallback subtask list should have exactly one entry");
        }
        assert_eq!(notices.len(), 3, "every role fell back since the mock returns unparseable text");
    }

    #[tokio::test]
    async fn third_task_depends_on_first_two() {
        let completer = Arc::new(MockCompleter::new("not valid json"));
        let planner = Planner::new(completer);
        let registry = RoleRegistry::load(RoleVocabulary::Default);
        let swarm_id = Uuid::new_v4();

        let (_, tasks, _) = planner.generate(swarm_id, &scope(), registry.roles_for(3)).await.unwrap();
        let deployment_task = tasks.iter().find(|t| t.local_id == "3").unwrap();
        assert_eq!(deployment_task.data.dependencies, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn single_agent_drops_dangling_dependencies() {
        let completer = Arc::new(MockCompleter::new("not valid json"));
        let planner = Planner::new(completer);
        let registry = RoleRegistry::load(RoleVocabulary::Default);
        let swarm_id = Uuid::new_v4();

        let (agents, tasks, _) = planner.generate(swarm_id, &scope(), registry.roles_for(1)).await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].data.dependencies.is_empty());
    }
}
