//! Role vocabulary as data, not types.
//!
//! Grounded on the teacher's data-driven `WorkflowTemplate`/`services::config`
//! pattern (named records loaded once and indexed by key, rather than
//! hard-coded match arms) per SPEC_FULL.md §9: "roles are data, not types".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolePriority {
    High,
    Medium,
    Low,
}

impl From<RolePriority> for crate::domain::models::PriorityLabel {
    fn from(p: RolePriority) -> Self {
        match p {
            RolePriority::High => Self::High,
            RolePriority::Medium => Self::Medium,
            RolePriority::Low => Self::Low,
        }
    }
}

/// One role's task template: title/description/priority plus which prior
/// roles (by name) this role's top-level task depends on.
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: RolePriority,
    pub depends_on: &'static [&'static str],
}

/// Which vocabulary a process instance uses — chosen once at startup via
/// `ROLE_VOCABULARY` and held fixed for the process lifetime (SPEC_FULL.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleVocabulary {
    Default,
    Legacy,
}

impl RoleVocabulary {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "legacy" => Self::Legacy,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Legacy => "legacy",
        }
    }
}

const DEFAULT_ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: "frontend_architect",
        title: "Design and implement the frontend",
        description: "Own the frontend architecture and user-facing implementation for the project.",
        priority: RolePriority::High,
        depends_on: &[],
    },
    RoleDefinition {
        name: "backend_integrator",
        title: "Build and integrate the backend",
        description: "Own backend services, data model, and integration points for the project.",
        priority: RolePriority::High,
        depends_on: &[],
    },
    RoleDefinition {
        name: "deployment_guardian",
        title: "Package and deploy the system",
        description: "Own packaging, deployment, and operational readiness for the project.",
        priority: RolePriority::Medium,
        depends_on: &["frontend_architect", "backend_integrator"],
    },
];

const LEGACY_ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: "research",
        title: "Research the problem space",
        description: "Investigate requirements, prior art, and constraints for the project.",
        priority: RolePriority::High,
        depends_on: &[],
    },
    RoleDefinition {
        name: "design",
        title: "Design the solution",
        description: "Produce the architecture and design artifacts for the project.",
        priority: RolePriority::High,
        depends_on: &[],
    },
    RoleDefinition {
        name: "implementation",
        title: "Implement the solution",
        description: "Build the project per the design.",
        priority: RolePriority::Medium,
        depends_on: &["research", "design"],
    },
];

/// The set of recognized roles, their order, and their per-role templates,
/// loaded once at startup and held fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    vocabulary: RoleVocabulary,
    roles: &'static [RoleDefinition],
}

impl RoleRegistry {
    pub fn load(vocabulary: RoleVocabulary) -> Self {
        let roles = match vocabulary {
            RoleVocabulary::Default => DEFAULT_ROLES,
            RoleVocabulary::Legacy => LEGACY_ROLES,
        };
        Self { vocabulary, roles }
    }

    pub fn vocabulary(&self) -> RoleVocabulary {
        self.vocabulary
    }

    /// Roles in creation order, for `num_agents` agents. With `num_agents = 1`
    /// only the first role is used; dependency edges referencing absent
    /// roles must be dropped by the caller (see [`crate::services::planner`]).
    pub fn roles_for(&self, num_agents: u32) -> &'static [RoleDefinition] {
        let n = (num_agents as usize).min(self.roles.len()).max(1);
        &self.roles[..n]
    }

    pub fn find(&self, name: &str) -> Option<&'static RoleDefinition> {
        self.roles.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_has_three_roles_in_order() {
        let registry = RoleRegistry::load(RoleVocabulary::Default);
        let roles: Vec<_> = registry.roles_for(3).iter().map(|r| r.name).collect();
        assert_eq!(roles, vec!["frontend_architect", "backend_integrator", "deployment_guardian"]);
    }

    #[test]
    fn single_agent_uses_only_first_role() {
        let registry = RoleRegistry::load(RoleVocabulary::Default);
        let roles = registry.roles_for(1);
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "frontend_architect");
    }

    #[test]
    fn legacy_vocabulary_selected_by_string() {
        assert_eq!(RoleVocabulary::parse("legacy"), RoleVocabulary::Legacy);
        assert_eq!(RoleVocabulary::parse("default"), RoleVocabulary::Default);
        assert_eq!(RoleVocabulary::parse("bogus"), RoleVocabulary::Default);
    }
}
