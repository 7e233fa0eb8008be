//! Offline Cache - an offline-first caching proxy
//!
//! Serves a static origin through versioned core caches and a bounded
//! runtime cache.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline_cache::api::{create_router, AppState};
use offline_cache::cache::{load_snapshot, save_snapshot, CacheStorage};
use offline_cache::Config;

/// Main entry point for the offline cache proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Restore cache stores from the snapshot, if configured
/// 4. Resume or install, then activate, the configured version
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM, finish pending trims and save the snapshot
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting offline cache proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: origin={}, version={}, max_runtime_entries={}, port={}",
        config.worker.origin,
        config.worker.version,
        config.worker.max_runtime_entries,
        config.server_port
    );

    let storage = match &config.snapshot_path {
        Some(path) => load_snapshot(path)
            .await
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        None => CacheStorage::new(),
    };

    let state = AppState::from_config(&config, storage.clone())?;

    // A core store restored from the snapshot is reused as is. Without one,
    // a failed install leaves the proxy serving pass-through; a later
    // POST /__worker/update can retry.
    match state.resume_version(&config.worker.version).await {
        Ok(deleted) => info!(
            "Version {} in control, removed {} stale stores",
            config.worker.version,
            deleted.len()
        ),
        Err(err) => warn!("Running without an active worker: {}", err),
    }

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(worker) = state.registration.controller().await {
        let evicted = worker.settle().await;
        info!("Pending trims finished, {} entries evicted", evicted);
    }

    if let Some(path) = &config.snapshot_path {
        save_snapshot(&storage, path)
            .await
            .with_context(|| format!("saving snapshot {}", path.display()))?;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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
}
