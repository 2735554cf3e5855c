//! Turn a raw user message into a `ClarificationNeeded` prompt or a
//! validated `Scope`, per SPEC_FULL.md §4.4.
//!
//! Grounded on the teacher's fallback-on-parse-failure discipline (see
//! `domain::models::scope::Scope::fallback`) and its Completer retry
//! boundary: a provider failure here must never surface to the caller —
//! the user-facing contract is "always produce something usable".

use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};

use crate::domain::models::{ExtractionOutcome, Scope};
use crate::domain::ports::{Completer, CompletionOptions, ComponentCatalog};

const VAGUENESS_TOKEN_THRESHOLD: usize = 5;
const SHORT_PHRASES: &[&str] = &["hey", "hi", "help", "help me", "hello", "what can you do"];

const CLARIFYING_PROMPT_PREFIX: &str = "The user sent a vague message. Ask one open-ended clarifying \
question to understand what they want to build. Message: ";

const EXTRACTION_PROMPT_PREFIX: &str = "Extract a structured project scope as a single strict JSON object \
with fields: project, goal, tech_stack (object), features (array), timeline, outcome, scope_of_works \
(object with in_scope, out_scope, milestones, risks, kpis arrays). Emit JSON only. Message: ";

pub struct ScopeExtractor {
    completer: Arc<dyn Completer>,
    catalog: Arc<dyn ComponentCatalog>,
    default_tech_stack: Vec<(String, String)>,
}

impl ScopeExtractor {
    pub fn new(
        completer: Arc<dyn Completer>,
        catalog: Arc<dyn ComponentCatalog>,
        default_tech_stack: Vec<(String, String)>,
    ) -> Self {
        Self { completer, catalog, default_tech_stack }
    }

    fn is_vague(message: &str) -> bool {
        let trimmed = message.trim();
        let token_count = trimmed.split_whitespace().count();
        if token_count < VAGUENESS_TOKEN_THRESHOLD {
            return true;
        }
        let lower = trimmed.to_ascii_lowercase();
        SHORT_PHRASES.iter().any(|phrase| lower == *phrase)
    }

    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn extract(&self, message: &str) -> ExtractionOutcome {
        if Self::is_vague(message) {
            return ExtractionOutcome::ClarificationNeeded(self.clarify(message).await);
        }

        let catalog_summary = self.catalog.summary().await;
        let mut prompt = format!("{EXTRACTION_PROMPT_PREFIX}{message}");
        if !catalog_summary.is_empty() {
            prompt.push_str("\n\nKnown available UI components:\n");
            prompt.push_str(&catalog_summary);
        }

        let options = CompletionOptions {
            temperature: 0.2,
            max_tokens: 1024,
            deterministic: false,
            timeout: Duration::from_secs(30),
        };

        let raw = match self.completer.complete(&prompt, &options).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "scope extraction completer call failed, using fallback scope");
                return ExtractionOutcome::Scoped(self.fallback(message));
            }
        };

        match Self::parse_scope(&raw) {
            Some(scope) if scope.validate().is_ok() => ExtractionOutcome::Scoped(scope),
            _ => {
                warn!("scope extraction output failed to parse, using fallback scope");
                ExtractionOutcome::Scoped(self.fallback(message))
            }
        }
    }

    async fn clarify(&self, message: &str) -> String {
        let prompt = format!("{CLARIFYING_PROMPT_PREFIX}{message}");
        let options = CompletionOptions {
            temperature: 0.5,
            max_tokens: 128,
            deterministic: false,
            timeout: Duration::from_secs(15),
        };
        match self.completer.complete(&prompt, &options).await {
            Ok(text) if !text.trim().is_empty() => text,
            _ => "Could you say more about what you'd like to build?".to_string(),
        }
    }

    fn fallback(&self, message: &str) -> Scope {
        let stack: Vec<(&str, &str)> =
            self.default_tech_stack.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        Scope::fallback(message, &stack)
    }

    /// Tolerates optional leading/trailing prose and Markdown code fences
    /// around the structured JSON block.
    fn parse_scope(raw: &str) -> Option<Scope> {
        let candidate = Self::extract_json_block(raw)?;
        serde_json::from_str(&candidate).ok()
    }

    fn extract_json_block(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let fenced = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .map(|s| s.trim())
            .and_then(|s| s.strip_suffix("```"))
            .map(str::trim);

        if let Some(block) = fenced {
            return Some(block.to_string());
        }

        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end < start {
            return None;
        }
        Some(trimmed[start..=end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_vague() {
        assert!(ScopeExtractor::is_vague("hey"));
        assert!(ScopeExtractor::is_vague("help me out"));
    }

    #[test]
    fn descriptive_message_is_not_vague() {
        assert!(!ScopeExtractor::is_vague(
            "Build an e-commerce store with Stripe payments and a Next.js frontend"
        ));
    }

    #[test]
    fn extracts_json_from_fenced_block() {
        let raw = "Sure, here you go:\n```json\n{\"project\":\"X\"}\n```\nLet me know!";
        let block = ScopeExtractor::extract_json_block(raw).unwrap();
        assert_eq!(block, "{\"project\":\"X\"}");
    }

    #[test]
    fn extracts_json_without_fence() {
        let raw = "prefix { \"project\": \"X\" } suffix";
        let block = ScopeExtractor::extract_json_block(raw).unwrap();
        assert_eq!(block, "{ \"project\": \"X\" }");
    }
}
