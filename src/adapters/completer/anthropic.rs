//! Production Completer adapter over the Anthropic Messages API.
//!
//! Grounded on the teacher's `infrastructure::claude::client::ClaudeClientImpl`
//! (reqwest client with connection pooling, `x-api-key`/`anthropic-version`
//! headers, `v1/messages` endpoint) and `retry::RetryPolicy`'s backoff
//! sequence (`10s, 20s, 40s, 80s, 160s, 300s` capped), reimplemented against
//! the `backoff` crate's `ExponentialBackoff` (multiplier 2.0, no jitter)
//! instead of the teacher's hand-rolled loop.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::adapters::completer::rate_limiter::CredentialRotation;
use crate::domain::ports::completer::{Completer, CompletionOptions, ProviderError};
use crate::logging::scrub_message;

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

pub struct AnthropicCompleter {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    rotation: CredentialRotation,
    base_backoff: Duration,
    max_backoff: Duration,
    max_retries: u32,
}

impl AnthropicCompleter {
    pub fn new(
        credentials: Vec<String>,
        model: String,
        base_backoff: Duration,
        max_backoff: Duration,
        max_retries: u32,
    ) -> anyhow::Result<Self> {
        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()?;
        Ok(Self {
            http_client,
            base_url: "https://api.anthropic.com".to_string(),
            model,
            rotation: CredentialRotation::new(credentials, 10, Duration::from_secs(60)),
            base_backoff,
            max_backoff,
            max_retries,
        })
    }

    fn backoff_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.base_backoff,
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_interval: self.max_backoff,
            max_elapsed_time: Some(self.max_backoff * (self.max_retries + 1)),
            ..ExponentialBackoff::default()
        }
    }

    async fn send_once(&self, prompt: &str, options: &CompletionOptions) -> Result<String, backoff::Error<ProviderError>> {
        let credential = self.rotation.acquire().await;

        let request = MessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: options.max_tokens,
            temperature: if options.deterministic { Some(0.0) } else { Some(options.temperature) },
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &credential)
            .header("anthropic-version", "2023-06-01")
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    backoff::Error::transient(ProviderError::Timeout)
                } else {
                    backoff::Error::transient(ProviderError::Unavailable(e.to_string()))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("anthropic completer rate limited, rotating credential");
            self.rotation.mark_rate_limited(&credential).await;
            return Err(backoff::Error::transient(ProviderError::RateLimited));
        }
        if status.is_client_error() {
            let body = scrub_message(&response.text().await.unwrap_or_default());
            warn!(%status, body, "anthropic completer rejected the request");
            return Err(backoff::Error::permanent(ProviderError::InvalidRequest(body)));
        }
        if status.is_server_error() {
            warn!(%status, "anthropic completer returned a server error, will retry");
            return Err(backoff::Error::transient(ProviderError::Unavailable(status.to_string())));
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| backoff::Error::permanent(ProviderError::InvalidRequest(e.to_string())))?;

        Ok(parsed
            .content
            .into_iter()
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl Completer for AnthropicCompleter {
    #[instrument(skip(self, prompt, options), fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, ProviderError> {
        let mut backoff = self.backoff_policy();
        loop {
            match self.send_once(prompt, options).await {
                Ok(text) => return Ok(text),
                Err(backoff::Error::Permanent(err)) => return Err(err),
                Err(backoff::Error::Transient { err, retry_after }) => match retry_after.or_else(|| backoff.next_backoff()) {
                    Some(wait) => {
                        warn!(?wait, "retrying anthropic completer call after transient error");
                        tokio::time::sleep(wait).await;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
