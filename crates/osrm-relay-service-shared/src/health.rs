//! Health check handlers for Kubernetes probes.
//!
//! `/health/live` answers as long as the process runs. `/health/ready` sends
//! the sample route to the routing engine and only reports ready when the
//! engine answers 2xx.

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use osrm_relay_lib::health::{check_engine_status, EngineCheck};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Upper bound for the readiness probe's engine query.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Engine base URL probed by the readiness check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_url: Option<String>,

    /// HTTP status the engine answered with, if it answered at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_status: Option<u16>,
}

impl HealthStatus {
    /// Create a healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            engine_url: None,
            engine_status: None,
        }
    }

    /// Create a ready status for an engine that answered `engine_status`.
    pub fn ready(service: &str, version: &str, engine_url: &str, engine_status: u16) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            engine_url: Some(engine_url.to_string()),
            engine_status: Some(engine_status),
        }
    }

    /// Create a not-ready status.
    pub fn not_ready(
        service: &str,
        version: &str,
        engine_url: &str,
        engine_status: Option<u16>,
        reason: &str,
    ) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            engine_url: Some(engine_url.to_string()),
            engine_status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"osrm-relay-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"osrm-relay-service-shared","version":"0.1.0","engine_url":"http://osrm:5000","engine_status":200}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let engine_url = state.config().base_url.as_str();
    let check = check_engine_status(state.config(), READINESS_TIMEOUT).await;
    let status = readiness_status(engine_url, &check);

    let code = if status.is_ok() {
        StatusCode::OK
    } else {
        tracing::warn!(engine_url, status = %status.status, "readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

/// Map an engine probe onto the readiness document.
pub fn readiness_status(engine_url: &str, check: &EngineCheck) -> HealthStatus {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match check {
        EngineCheck::Ok { status_code, .. } => {
            HealthStatus::ready(service, version, engine_url, *status_code)
        }
        EngineCheck::Error { status_code, .. } => HealthStatus::not_ready(
            service,
            version,
            engine_url,
            Some(*status_code),
            "routing engine returned an error",
        ),
        EngineCheck::Unreachable { .. } => HealthStatus::not_ready(
            service,
            version,
            engine_url,
            None,
            "routing engine unreachable",
        ),
    }
}
