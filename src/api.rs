use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use device_registry::config::{Config, StorageBackend};
use device_registry::cors::parse_origin;
use device_registry::repo::{DeviceRepository, MemoryDeviceRepository, PgDeviceRepository};
use device_registry::{build_router, AppState, RandomIdGenerator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(port = config.port, storage = ?config.storage, "Starting device API");

    let ids = Arc::new(RandomIdGenerator::new());
    let devices: Arc<dyn DeviceRepository> = match (&config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            let repo = PgDeviceRepository::connect(database, ids)
                .await
                .context("Failed to connect to database")?;
            repo.ensure_schema()
                .await
                .context("Failed to prepare devices table")?;
            Arc::new(repo)
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("PostgreSQL storage selected without database settings")
        }
        (StorageBackend::Memory, _) => {
            warn!("Using in-memory device storage; data is lost on restart");
            Arc::new(MemoryDeviceRepository::new(ids))
        }
    };

    let state = AppState::new(devices, parse_origin(&config.cors_allowed_origin));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Device API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Device API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
