//! Route wiring: one `Router` per capability-gated group, merged into the
//! top-level router built in [`crate::api::build_router`].

pub mod health;
pub mod orchestrator;
pub mod planner_view;
pub mod swarms;
pub mod tasks;
pub mod tools;

use axum::extract::Extension;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;

use crate::api::auth::{authenticate, authenticate_only};
use crate::api::state::AppState;
use crate::domain::models::Capability;

fn guarded(state: AppState, required: Capability, router: Router<AppState>) -> Router<AppState> {
    // `route_layer` wraps outward: the last-added layer runs first on an
    // incoming request. The `Extension(required)` layer must run before
    // `authenticate`, which reads it, so it's added last.
    router
        .route_layer(from_fn_with_state(state, authenticate))
        .route_layer(Extension(required))
}

pub fn build(state: AppState) -> Router<AppState> {
    let orchestrator = guarded(
        state.clone(),
        Capability::SwarmCreate,
        Router::new().route("/orchestrator/process", post(orchestrator::process)),
    );

    let swarm_create = guarded(
        state.clone(),
        Capability::SwarmCreate,
        Router::new().route("/swarms", post(swarms::create)),
    );

    let swarm_monitor = guarded(
        state.clone(),
        Capability::SwarmMonitor,
        Router::new()
            .route("/swarms", get(swarms::list))
            .route("/swarms/{id}", get(swarms::detail))
            .route("/api/planner/{id}", get(planner_view::get)),
    );

    let agent_control = guarded(
        state.clone(),
        Capability::AgentControl,
        Router::new().route("/tasks/{id}", put(tasks::update)),
    );

    let admin_readonly = guarded(
        state.clone(),
        Capability::AdminReadonly,
        Router::new().route("/swarm/health", get(health::get)),
    );

    let tools = Router::new()
        .route("/tools/{tool_name}", post(tools::invoke))
        .route_layer(from_fn_with_state(state, authenticate_only));

    orchestrator
        .merge(swarm_create)
        .merge(swarm_monitor)
        .merge(agent_control)
        .merge(admin_readonly)
        .merge(tools)
}
