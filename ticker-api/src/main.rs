//! Trading Pair Stats API Server
//!
//! Serves the first and last daily candle of every trading pair in the
//! time-series store, refreshed by a background aggregation loop.

mod config;
mod routes;

use anyhow::Context;
use axum::{
    http::{header, Method},
    Router,
};
use std::sync::Arc;
use ticker_core::TimeSeriesStorage;
use ticker_influx::InfluxTimeSeries;
use ticker_services::{SnapshotStore, StatsService};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<SnapshotStore>,
    /// Version reported by the health check
    pub version: Arc<str>,
}

/// Build the HTTP application
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ticker_api=debug,ticker_services=debug")),
        )
        .init();

    info!("Starting trading pair stats API");

    let config = AppConfig::from_env()?;

    let storage = InfluxTimeSeries::new(&config.influx)?;
    if config.allow_migrations {
        prepare_storage(&storage, &config.influx.database).await;
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let service = Arc::new(StatsService::new(Arc::new(storage), config.stats.clone()));
    let state = AppState {
        snapshots: service.snapshots(),
        version: config.version.as_str().into(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = tokio::spawn(service.run(shutdown_rx));

    info!("Server listening on http://{}", addr);
    let served = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    shutdown_tx.send_replace(true);
    if let Err(e) = engine.await {
        error!("Stats service task failed: {}", e);
    }

    served?;
    info!("Server stopped");
    Ok(())
}

/// Run store migrations, logging instead of failing when the store is down.
/// Returns whether the store is ready for writes.
async fn prepare_storage(storage: &dyn TimeSeriesStorage, database: &str) -> bool {
    match storage.migrate().await {
        Ok(()) => {
            info!("Time-series database {} ready", database);
            true
        }
        Err(e) => {
            warn!("Failed to migrate time-series database {}: {}", database, e);
            false
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ticker_core::MemoryTimeSeries;
    use ticker_influx::InfluxConfig;

    #[tokio::test]
    async fn test_migrate_against_unreachable_store_is_not_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let storage = InfluxTimeSeries::new(&InfluxConfig {
            port,
            timeout: Duration::from_secs(2),
            ..InfluxConfig::default()
        })
        .unwrap();

        assert!(!prepare_storage(&storage, "jticker").await);
    }

    #[tokio::test]
    async fn test_migrate_ready_store() {
        assert!(prepare_storage(&MemoryTimeSeries::new(), "jticker").await);
    }
}
