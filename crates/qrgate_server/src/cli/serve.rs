//! The `serve` command.

use qrgate_rate_limit::QrGateConfig;
use qrgate_server::{AppState, Backends, build_gateway, create_router, spawn_housekeeping};
use std::sync::Arc;
use tracing::{info, warn};

/// Run the HTTP server until interrupted.
pub async fn serve(
    config: QrGateConfig,
    bind: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backends = Backends::from_env()?;
    let counters = Arc::clone(&backends.counters);
    let gateway = build_gateway(&config, backends)?;
    let state = AppState::new(gateway, &config.server.base_url);

    let housekeeping = spawn_housekeeping(
        Arc::clone(state.gateway().admission()),
        counters,
        config.rate_limit.prune_interval(),
    );

    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(bind.as_str()).await?;
    info!(bind = %bind, base_url = %config.server.base_url, "Serving qrgate");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    housekeeping.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
