//! Translation from [`DomainError`] (and a handful of API-only failure
//! modes) to HTTP status codes, per SPEC_FULL.md §7.
//!
//! Grounded on `examples/tftio-gator`'s `AppError` (a status + message pair
//! implementing `IntoResponse`), generalized to a `From<DomainError>`
//! conversion so handlers can just `?` domain calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::errors::DomainError;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing or unknown credential".to_string(),
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "credential lacks the required capability".to_string(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match err {
            DomainError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
            DomainError::RetryBudgetExceeded => StatusCode::CONFLICT,
            DomainError::ProviderTransient(_) => StatusCode::BAD_GATEWAY,
            DomainError::ProviderFatal(_) => StatusCode::BAD_GATEWAY,
            DomainError::StoreIntegrity(_) => {
                tracing::error!(error = %err, "store integrity violation");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal store details are never echoed to the client.
        let message = match &err {
            DomainError::StoreIntegrity(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
