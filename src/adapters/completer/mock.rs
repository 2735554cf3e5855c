//! Deterministic Completer for tests, mirroring the teacher's
//! `substrates::mock` fake adapters: canned responses keyed by prompt
//! prefix, with no network I/O.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::ports::completer::{Completer, CompletionOptions, ProviderError};

#[derive(Default)]
pub struct MockCompleter {
    /// Prompt prefix -> canned response.
    responses: HashMap<String, String>,
    default_response: String,
    calls: Mutex<Vec<String>>,
}

impl MockCompleter {
    pub fn new(default_response: impl Into<String>) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: default_response.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, prefix: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(prefix.into(), response.into());
        self
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String, ProviderError> {
        self.calls.lock().await.push(prompt.to_string());

        for (prefix, response) in &self.responses {
            if prompt.starts_with(prefix.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_response.clone())
    }
}
