//! Bearer-credential authentication/authorization middleware, per
//! SPEC_FULL.md §4.9.
//!
//! Each route attaches the capability it requires as a request [`Extension`]
//! (via `.route_layer(Extension(capability))`); this middleware reads that
//! extension, resolves the bearer credential against the startup-loaded
//! registry, and either rejects or attaches the resolved [`Identity`] to the
//! request for downstream handlers/logging.

use axum::extract::{Extension, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::models::{Capability, Identity};

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Extension(required): Extension<Capability>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or_else(ApiError::unauthenticated)?;
    let identity: Identity = state
        .credentials
        .resolve(token)
        .cloned()
        .ok_or_else(ApiError::unauthenticated)?;

    if !identity.satisfies(&required) {
        tracing::warn!(identity = %identity.name, "credential lacks required capability");
        return Err(ApiError::forbidden());
    }

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Resolves and attaches the identity without checking any fixed capability.
/// Used by routes whose required capability depends on a path parameter
/// (`POST /tools/{tool_name}` needs `MCP_<TOOL_NAME>`, known only once the
/// handler has the path) — the handler performs that check itself.
pub async fn authenticate_only(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or_else(ApiError::unauthenticated)?;
    let identity: Identity = state
        .credentials
        .resolve(token)
        .cloned()
        .ok_or_else(ApiError::unauthenticated)?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
