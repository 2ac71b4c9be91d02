//! Shared infrastructure for the OSRM relay HTTP service.
//!
//! - [`AppState`]: the pooled routing client and default summary language
//! - [`health`]: liveness and readiness probes
//! - [`ProblemDetails`] / [`ServiceError`]: RFC 9457 errors and forwarded engine rejections
//! - [`ServiceResponse`]: wrapper for documents the relay builds itself
//! - [`metrics`]: Prometheus recorder and relay counters
//! - [`logging`]: structured logging setup
//! - [`middleware`]: request IDs, request spans and HTTP metrics
//! - Query parsing with validation for each endpoint
//!
//! # Architecture
//!
//! Handlers stay thin; engine access, snap fallback and summaries live in
//! `osrm-relay-lib`. This crate is the HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse the query string                                   │
//! │  - Validate coordinates                                     │
//! │  - Call osrm-relay-lib                                      │
//! │  - Relay the engine document or a problem                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! Enable the `test-utils` feature to use [`test_utils`] from dependent crates.

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    engine_outcome, init_metrics, metrics_handler, record_engine_request, record_fallback,
    record_summary, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, ServiceError, UpstreamRejection, PROBLEM_ENGINE_RESPONSE,
    PROBLEM_ENGINE_UNAVAILABLE, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_ROUTE_NOT_FOUND,
};
pub use request::{parse_query, PointsQuery, RouteQuery, RouteTarget, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError, SUMMARY_LOCALE_ENV};
