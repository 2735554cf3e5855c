//! Domain error taxonomy.
//!
//! Mirrors the error kinds of the error handling design: each variant maps to
//! exactly one HTTP status in [`crate::api::error`], and the mapping never
//! changes based on call site.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while operating on the swarm/agent/task state machine.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input, a missing required field, or a dependency cycle.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No credential was presented.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The presented credential lacks the capability the route requires.
    #[error("forbidden")]
    Forbidden,

    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An illegal state transition was attempted.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// A task has already exhausted `MAX_RETRIES` and an explicit retry was requested.
    #[error("retry budget exceeded")]
    RetryBudgetExceeded,

    /// A Completer/MCPGateway call failed transiently (timeout, rate limit, 5xx).
    #[error("provider transient error: {0}")]
    ProviderTransient(String),

    /// A Completer/MCPGateway call failed permanently (bad request, unknown tool).
    #[error("provider fatal error: {0}")]
    ProviderFatal(String),

    /// A store-level constraint was violated; this indicates a kernel bug.
    #[error("store integrity violation: {0}")]
    StoreIntegrity(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found_task(id: Uuid) -> Self {
        Self::NotFound(format!("task {id}"))
    }

    pub fn not_found_swarm(id: Uuid) -> Self {
        Self::NotFound(format!("swarm {id}"))
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::StoreIntegrity(format!("unique constraint violated: {db_err}"))
            }
            other => Self::StoreIntegrity(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("invalid JSON: {err}"))
    }
}
