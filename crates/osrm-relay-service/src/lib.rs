//! OSRM relay HTTP service.
//!
//! Forwards `route`, `table`, `nearest`, `match` and `trip` queries to the
//! routing engine. Route queries go through the snap fallback, and
//! `/route/summary` adds a readable digest of the route.
//!
//! # Endpoints
//!
//! - `GET /` - Usage page with example queries
//! - `GET /route` - Route between `start` and `end` (or `points`)
//! - `GET /route/summary` - Route plus summary in `lang` (`ru` or `en`)
//! - `GET /table`, `/match`, `/trip` - Engine passthrough for `points`
//! - `GET /nearest` - Engine passthrough for a single `point`
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe (queries the engine)

mod handlers;

use axum::{Router, http::Method, routing::get};
use osrm_relay_service_shared::{
    AppState, MetricsLayer, health_live, health_ready, metrics_handler,
};
use tower_http::cors::{Any, CorsLayer};

pub use handlers::{
    RouteWithSummary, index, match_trace, nearest, route, route_summary, table, trip,
};

/// Build the relay router with CORS open to any origin.
pub fn build_router(state: AppState) -> Router {
    build_router_with_metrics_path(state, "/metrics")
}

/// Same as [`build_router`] with the Prometheus endpoint mounted at `metrics_path`.
pub fn build_router_with_metrics_path(state: AppState, metrics_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/route", get(route))
        .route("/route/summary", get(route_summary))
        .route("/table", get(table))
        .route("/nearest", get(nearest))
        .route("/match", get(match_trace))
        .route("/trip", get(trip))
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(cors)
        .with_state(state)
}
