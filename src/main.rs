//! Cluster Cache - diagnostics node
//!
//! Runs one cache instance with its TTL sweep, cluster invalidation wiring
//! and the diagnostics HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cluster_cache::api::create_router;
use cluster_cache::{
    spawn_cleanup_task, spawn_invalidation_listener, AppState, BroadcastBus, Cache, ServerConfig,
};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, on an in-process invalidation bus if a channel is set
/// 4. Start background TTL sweep (and invalidation listener)
/// 5. Serve the diagnostics API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cluster_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cluster cache node");

    let config = ServerConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, default_expiry={}s, channel='{}', port={}, sweep_interval={}s",
        config.cache.capacity,
        config.cache.default_expiry.as_secs(),
        config.cache.invalidation_channel,
        config.server_port,
        config.sweep_interval
    );

    let mut background: Vec<JoinHandle<()>> = Vec::new();

    let cache = if config.cache.invalidation_enabled() {
        let bus = BroadcastBus::default();
        let cache = Cache::with_transport(config.cache.clone(), Arc::new(bus.clone()))
            .context("invalid cache configuration")?;
        background.push(spawn_invalidation_listener(cache.clone(), bus.subscribe()));
        cache
    } else {
        Cache::new(config.cache.clone()).context("invalid cache configuration")?
    };

    background.push(spawn_cleanup_task(
        cache.clone(),
        Duration::from_secs(config.sweep_interval.max(1)),
    ));
    info!("Background tasks started");

    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts background tasks.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in background {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
