//! Catalog Worker - Upstream Refresh Entry Point
//!
//! Runs the refresh loop against the configured upstream source until SIGTERM
//! or SIGINT. The HTTP API lives in the `catalog-server` binary.

use anyhow::Context;
use coverage_catalog::{
    config::Config,
    db::{CatalogStore, PostgresCatalogStore},
    logging,
    services::{source_from_config, Refresher},
    startup,
    workers::{run_refresh_loop, RefreshLoopConfig},
};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _telemetry_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging/telemetry")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.logging.deployment_environment,
        "Starting Catalog Worker"
    );

    let source = source_from_config(&config.ingest)
        .context("Failed to build upstream source")?
        .context(
            "No upstream source configured; set CATALOG__INGEST__UPSTREAM_URL or CATALOG__INGEST__UPSTREAM_FILE",
        )?;

    let pool = startup::connect_and_migrate(&config.database)
        .await
        .context("Failed to connect to database")?;
    let store: Arc<dyn CatalogStore> = Arc::new(PostgresCatalogStore::new(pool.clone()));

    let refresher = Arc::new(Refresher::new(store, source, config.ingest.batch_size));
    let loop_config = RefreshLoopConfig::from_config(&config.ingest);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(run_refresh_loop(refresher, loop_config, shutdown_rx));

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Refresh loop task failed");
    }

    pool.close().await;
    tracing::info!("Worker shutdown complete");
    logging::shutdown_telemetry();

    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler, using Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("SIGINT received, stopping worker...");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, stopping worker...");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, stopping worker...");
}
