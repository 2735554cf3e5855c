//! Capabilities and credential registry for [`crate::api::auth`].
//!
//! A `Capability` is a named permission a bearer credential carries. The
//! registry mapping credential -> capability set is the one piece of
//! startup-only global state the API layer owns (the Store's connection pool
//! is the kernel's other global, see SPEC_FULL.md §9).

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    SwarmCreate,
    SwarmControl,
    SwarmMonitor,
    AgentControl,
    AgentMonitor,
    /// Namespaced per tool family, e.g. `Mcp("github")` satisfies routes
    /// requiring `MCP_GITHUB`.
    Mcp(String),
    WorkspaceWrite,
    WorkspaceRead,
    UiSearch,
    AdminReadonly,
    /// Supersedes every other capability.
    AdminMaster,
}

impl Capability {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(tool) = raw.strip_prefix("MCP_") {
            return Some(Self::Mcp(tool.to_ascii_lowercase()));
        }
        match raw {
            "SWARM_CREATE" => Some(Self::SwarmCreate),
            "SWARM_CONTROL" => Some(Self::SwarmControl),
            "SWARM_MONITOR" => Some(Self::SwarmMonitor),
            "AGENT_CONTROL" => Some(Self::AgentControl),
            "AGENT_MONITOR" => Some(Self::AgentMonitor),
            "WORKSPACE_WRITE" => Some(Self::WorkspaceWrite),
            "WORKSPACE_READ" => Some(Self::WorkspaceRead),
            "UI_SEARCH" => Some(Self::UiSearch),
            "ADMIN_READONLY" => Some(Self::AdminReadonly),
            "ADMIN_MASTER" => Some(Self::AdminMaster),
            _ => None,
        }
    }
}

/// A resolved bearer credential: its capability set and a display name for
/// audit logging.
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub capabilities: HashSet<Capability>,
}

impl Identity {
    /// `ADMIN_MASTER` satisfies any requirement.
    pub fn satisfies(&self, required: &Capability) -> bool {
        self.capabilities.contains(&Capability::AdminMaster) || self.capabilities.contains(required)
    }
}

/// Startup-loaded map from opaque bearer token to resolved identity. Never
/// mutated after construction — credentials are loaded once from
/// [`crate::config::Config`] and are not generated or rotated by the kernel.
#[derive(Debug, Clone, Default)]
pub struct CredentialRegistry {
    tokens: HashMap<String, Identity>,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
        self.tokens.insert(token.into(), identity);
    }

    pub fn resolve(&self, token: &str) -> Option<&Identity> {
        self.tokens.get(token)
    }

    /// Parses `API_CREDENTIALS`-style entries of the form
    /// `token:CAP_ONE|CAP_TWO` (pipe-separated capability names, matching
    /// [`Capability::parse`]); entries with no recognizable capability are
    /// skipped with a warning rather than rejected, since a single
    /// malformed entry should not prevent the rest of the registry loading.
    pub fn from_entries(entries: &[String], name_prefix: &str) -> Self {
        let mut registry = Self::new();
        for (i, entry) in entries.iter().enumerate() {
            let Some((token, caps)) = entry.split_once(':') else {
                tracing::warn!(entry = %entry, "skipping malformed API_CREDENTIALS entry, expected token:CAP_ONE|CAP_TWO");
                continue;
            };
            let capabilities: HashSet<Capability> = caps.split('|').filter_map(Capability::parse).collect();
            if capabilities.is_empty() {
                tracing::warn!(entry = %entry, "skipping API_CREDENTIALS entry with no recognized capability");
                continue;
            }
            registry.insert(
                token.to_string(),
                Identity { name: format!("{name_prefix}-{i}"), capabilities },
            );
        }
        registry
    }

    /// `ADMIN_MASTER_TOKEN`, if configured, is inserted last so it always
    /// wins over a same-valued entry from `API_CREDENTIALS`.
    pub fn with_admin_master(mut self, token: Option<&str>) -> Self {
        if let Some(token) = token {
            let mut capabilities = HashSet::new();
            capabilities.insert(Capability::AdminMaster);
            self.insert(token.to_string(), Identity { name: "admin-master".to_string(), capabilities });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_master_satisfies_any_capability() {
        let mut caps = HashSet::new();
        caps.insert(Capability::AdminMaster);
        let identity = Identity {
            name: "root".to_string(),
            capabilities: caps,
        };
        assert!(identity.satisfies(&Capability::SwarmCreate));
        assert!(identity.satisfies(&Capability::Mcp("github".to_string())));
    }

    #[test]
    fn monitor_only_credential_does_not_satisfy_create() {
        let mut caps = HashSet::new();
        caps.insert(Capability::SwarmMonitor);
        let identity = Identity {
            name: "viewer".to_string(),
            capabilities: caps,
        };
        assert!(!identity.satisfies(&Capability::SwarmCreate));
    }

    #[test]
    fn parses_namespaced_mcp_capability() {
        assert_eq!(
            Capability::parse("MCP_GITHUB"),
            Some(Capability::Mcp("github".to_string()))
        );
    }
}
