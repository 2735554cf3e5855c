//! Scope: the validated, structured description of a project derived from a
//! free-form user message by the `ScopeExtractor`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeOfWorks {
    #[serde(default)]
    pub in_scope: Vec<String>,
    #[serde(default)]
    pub out_scope: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub kpis: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub project: String,
    pub goal: String,
    #[serde(default)]
    pub tech_stack: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub timeline: String,
    pub outcome: String,
    #[serde(default)]
    pub scope_of_works: ScopeOfWorks,
    /// Unknown fields from the LLM's structured output, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Scope {
    /// Deterministic fallback used when the Completer's structured output
    /// can't be parsed, or the request was never sent. The caller must never
    /// be exposed to a parse error — this is always a valid `Scope`.
    pub fn fallback(raw_message: &str, default_tech_stack: &[(&str, &str)]) -> Self {
        Self {
            project: "UserProject".to_string(),
            goal: raw_message.to_string(),
            tech_stack: default_tech_stack
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            features: vec!["core functionality".to_string()],
            timeline: "1-2h".to_string(),
            outcome: "MVP".to_string(),
            scope_of_works: ScopeOfWorks::default(),
            extra: serde_json::Map::new(),
        }
    }

    /// `project` must be non-empty; everything else may be empty but must exist.
    pub fn validate(&self) -> Result<(), String> {
        if self.project.trim().is_empty() {
            return Err("scope.project must not be empty".to_string());
        }
        Ok(())
    }
}

/// Result of `ScopeExtractor::extract`.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    ClarificationNeeded(String),
    Scoped(Scope),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_scope_is_always_valid() {
        let scope = Scope::fallback("build a task tracker", &[("frontend", "react")]);
        assert!(scope.validate().is_ok());
        assert_eq!(scope.project, "UserProject");
        assert_eq!(scope.goal, "build a task tracker");
        assert_eq!(scope.features, vec!["core functionality".to_string()]);
    }
}
