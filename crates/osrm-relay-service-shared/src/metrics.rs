//! Prometheus metrics for the relay.
//!
//! - [`MetricsConfig`] / [`init_metrics`]: install the recorder once at startup
//! - [`metrics_handler`]: axum handler for `/metrics`
//! - `record_*` helpers for engine and fallback metrics
//!
//! # Example
//!
//! ```no_run
//! use osrm_relay_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::from_env();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use osrm_relay_lib::{Error as LibError, FallbackOutcome, Operation};
use serde::{Deserialize, Serialize};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path for the metrics endpoint (e.g., "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create configuration from environment variables.
    ///
    /// - `METRICS_ENABLED`: "true" or "false" (default: true)
    /// - `METRICS_PATH`: Path for metrics endpoint (default: "/metrics")
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup("METRICS_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let path = lookup("METRICS_PATH")
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Initialize the Prometheus metrics recorder.
///
/// Must be called once at startup before any metrics are recorded.
///
/// # Errors
///
/// - Metrics are disabled in configuration
/// - The recorder has already been installed
/// - The Prometheus builder fails to install
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Returns `None` if [`init_metrics`] has not been called.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Axum handler for the `/metrics` endpoint (Prometheus exposition format).
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Relay Metrics Helpers
// =============================================================================

/// Outcome label for an engine call result.
pub fn engine_outcome(result: Result<bool, &LibError>) -> &'static str {
    match result {
        Ok(true) => "ok",
        Ok(false) => "unsuccessful",
        Err(LibError::EngineRejected { .. }) => "rejected",
        Err(LibError::ServiceUnavailable { .. }) => "unavailable",
        Err(LibError::MalformedResponse { .. }) => "malformed",
        Err(_) => "invalid_input",
    }
}

/// Count one relayed engine request.
///
/// Increments `osrm_relay_engine_requests_total{operation,outcome}`.
pub fn record_engine_request(operation: Operation, outcome: &'static str) {
    metrics::counter!(
        "osrm_relay_engine_requests_total",
        "operation" => operation.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record how a route request was resolved.
///
/// Increments `osrm_relay_fallback_total{outcome}` and records the engine
/// calls the search needed to `osrm_relay_fallback_engine_calls`.
pub fn record_fallback(outcome: FallbackOutcome, engine_calls: usize) {
    metrics::counter!(
        "osrm_relay_fallback_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!("osrm_relay_fallback_engine_calls").record(engine_calls as f64);
}

/// Count a summary built for `/route/summary`.
pub fn record_summary(locale: &'static str, found: bool) {
    metrics::counter!(
        "osrm_relay_summaries_total",
        "locale" => locale,
        "found" => if found { "true" } else { "false" }
    )
    .increment(1);
}
