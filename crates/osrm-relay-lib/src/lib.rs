//! OSRM relay library entry points.
//!
//! This crate talks to an OSRM routing engine over HTTP, retries failed
//! routes with road-snapped endpoints, turns route responses into readable
//! summaries, and wraps the offline OSRM data tooling. The HTTP service and
//! the CLI should only depend on what is exported here instead of
//! reimplementing engine access.

pub mod client;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod fallback;
pub mod health;
pub mod locale;
pub mod maintenance;
pub mod response;
pub mod summary;

pub use client::{Operation, QueryParams, RoutingClient};
pub use config::{Algorithm, EngineConfig};
pub use coordinate::{Coordinate, CoordinateSequence};
pub use error::{Error, ErrorPayload, Result};
pub use fallback::{FallbackOutcome, Resolution, SnapFallback};
pub use health::{run_checks, HealthReport};
pub use locale::Locale;
pub use response::{EngineResponse, Leg, Route, Step, Waypoint};
pub use summary::{summarize, RouteSummary};
