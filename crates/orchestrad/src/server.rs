//! HTTP server for orchestrad

use crate::config::Config;
use crate::routes;
use crate::state::{AppState, SharedState};
use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn app(state: SharedState) -> Router {
    routes::orchestration_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until Ctrl-C
pub async fn run(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)
        .context("Failed to build organ HTTP client")?
        .shared();
    let addr = &config.service.listen_addr;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Orchestrator listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
