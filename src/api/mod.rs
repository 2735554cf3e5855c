//! The HTTP surface: axum router, shared state, auth middleware, and the
//! error type every handler converges on.
//!
//! Grounded on `examples/tftio-gator`'s `build_router`/`run_serve` idiom
//! (stateless handlers over a cloned `AppState`, `CorsLayer`, graceful
//! shutdown via `axum::serve(...).with_graceful_shutdown(...)`).

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    routes::build(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    tracing::info!(%addr, "swarmd listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("swarmd shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
