//! OSRM relay HTTP service binary.
//!
//! # Configuration
//!
//! - `OSRM_URL` - Routing engine base URL (default: http://localhost:5000)
//! - `OSRM_PROFILE`, `OSRM_TIMEOUT_SECS`, `OSRM_SNAP_CANDIDATES`, `OSRM_ALGORITHM`
//! - `SUMMARY_LOCALE` - Default summary language: ru (default) or en
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus endpoint settings
//! - `SERVICE_PORT` - HTTP port, falling back to `PORT` (default: 8080)

use std::env;
use std::net::SocketAddr;

use tokio::signal;
use tracing::{error, info};

use osrm_relay_service::build_router_with_metrics_path;
use osrm_relay_service_shared::{
    AppState, LoggingConfig, MetricsConfig, init_logging, init_metrics,
};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("osrm-relay-service");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        // Metrics are optional
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let port = service_port(|key| env::var(key).ok());

    let state = AppState::from_env().map_err(|e| {
        error!(error = %e, "failed to build application state");
        e
    })?;

    info!(
        engine_url = %state.config().base_url,
        port,
        "starting osrm relay"
    );

    let app = build_router_with_metrics_path(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// `SERVICE_PORT`, then `PORT`, then 8080. Unparseable values are skipped.
fn service_port<F>(lookup: F) -> u16
where
    F: Fn(&str) -> Option<String>,
{
    ["SERVICE_PORT", "PORT"]
        .iter()
        .filter_map(|key| lookup(key))
        .find_map(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
