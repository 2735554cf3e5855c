//! The Completer port: a pluggable, retryable LLM text-completion capability.
//!
//! Grounded on the teacher's `infrastructure::claude::client::ClaudeClient`
//! trait (`complete(prompt, options) -> Result<String, ClaudeError>`) and its
//! `retry::RetryPolicy` error classification.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options accompanying a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// When true, adapters should request the provider's most deterministic
    /// sampling mode, if one exists.
    pub deterministic: bool,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            deterministic: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Failure classification used by callers to decide whether to retry or fall
/// back. Matches the teacher's `ClaudeError` variant set.
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("rate limited")]
    RateLimited,
    #[error("request timed out")]
    Timeout,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Timeout | Self::Unavailable(_))
    }
}

#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, ProviderError>;
}
