//! HTTP server for organd

use crate::config::Config;
use crate::routes;
use crate::simulator::OrganModel;
use crate::state::{OrganState, SharedState};
use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the complete application for model `M`
pub fn app<M: OrganModel>(state: SharedState<M>) -> Router {
    routes::organ_routes::<M>()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until Ctrl-C
pub async fn run<M: OrganModel>(config: &Config) -> Result<()> {
    let state = OrganState::<M>::new(config.service.max_samples).shared();
    let addr = config.listen_addr(M::ORGAN);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  {} listening on http://{}", M::ORGAN.display_name(), addr);

    axum::serve(listener, app::<M>(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
