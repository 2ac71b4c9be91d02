//! HTTP client for the routing engine's query interface.
//!
//! Requests are shaped `{base}/{operation}/v1/{profile}/{coordinates}` with
//! caller parameters appended as the query string. The client performs no
//! retries; see [`crate::fallback`] for the snap fallback used by `route`.

use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::coordinate::{Coordinate, CoordinateSequence};
use crate::error::{Error, ErrorPayload, Result};
use crate::fallback::SnapFallback;
use crate::response::EngineResponse;

/// The engine services the relay forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Route,
    Table,
    Nearest,
    Match,
    Trip,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Route,
        Operation::Table,
        Operation::Nearest,
        Operation::Match,
        Operation::Trip,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Route => "route",
            Operation::Table => "table",
            Operation::Nearest => "nearest",
            Operation::Match => "match",
            Operation::Trip => "trip",
        }
    }

    /// Check the number of coordinates the engine accepts for this service.
    pub fn check_coordinates(self, count: usize) -> Result<()> {
        let (ok, expected) = match self {
            Operation::Nearest => (count == 1, "exactly 1 coordinate"),
            Operation::Table => (count >= 1, "at least 1 coordinate"),
            Operation::Route | Operation::Match | Operation::Trip => {
                (count >= 2, "at least 2 coordinates")
            }
        };

        if ok {
            Ok(())
        } else {
            Err(Error::InvalidCoordinates {
                operation: self.as_str().to_string(),
                expected: expected.to_string(),
                actual: count,
            })
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown operation '{}'", s))
    }
}

/// Ordered query parameters forwarded to the engine.
///
/// Insertion order is preserved. [`QueryParams::set`] replaces an existing
/// key, [`QueryParams::push`] allows repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryParams::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key`, replacing any previous values.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter().position(|(k, _)| *k == key) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = false;
                self.0.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.0.push((key, value)),
        }
    }

    /// Set `key` only when the caller has not supplied it.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.0.push((key, value.into()));
        }
    }

    /// Append a value without touching existing ones.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Client for the routing engine.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: Client,
    config: EngineConfig,
}

impl RoutingClient {
    /// Build a client with the configured per-call timeout.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("osrm-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full URL (without query string) for an operation.
    pub fn operation_url(&self, operation: Operation, coordinates: &CoordinateSequence) -> String {
        format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url, operation, self.config.profile, coordinates
        )
    }

    /// Issue one engine query and decode the response document.
    ///
    /// The document is returned as sent, whatever its `code`; callers decide
    /// what counts as success.
    pub async fn query(
        &self,
        operation: Operation,
        coordinates: &CoordinateSequence,
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        operation.check_coordinates(coordinates.len())?;

        let mut params = params.clone();
        if operation == Operation::Route {
            params.set_default("overview", "false");
        }

        let url = self.operation_url(operation, coordinates);
        debug!(operation = %operation, url = %url, "querying routing engine");

        let response = self
            .http
            .get(&url)
            .query(params.as_slice())
            .send()
            .await
            .map_err(|source| Error::ServiceUnavailable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| Error::ServiceUnavailable {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            let payload = ErrorPayload::from_body(&body);
            warn!(
                operation = %operation,
                status = status.as_u16(),
                code = payload.engine_code().unwrap_or("-"),
                "routing engine rejected request"
            );
            return Err(Error::EngineRejected {
                status: status.as_u16(),
                payload,
            });
        }

        let document = EngineResponse::from_body(&body)?;
        debug!(operation = %operation, code = %document.code, "routing engine responded");
        Ok(document)
    }

    /// Route through the given points. Defaults `overview=false`.
    pub async fn route(
        &self,
        coordinates: &CoordinateSequence,
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        self.query(Operation::Route, coordinates, params).await
    }

    pub async fn table(
        &self,
        coordinates: &CoordinateSequence,
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        self.query(Operation::Table, coordinates, params).await
    }

    /// Nearest road-snapped points for a single coordinate.
    pub async fn nearest(&self, point: &Coordinate, params: &QueryParams) -> Result<EngineResponse> {
        let coordinates = CoordinateSequence::single(point.clone());
        self.query(Operation::Nearest, &coordinates, params).await
    }

    /// Map-match a GPS trace (`match` is a keyword, hence the name).
    pub async fn match_trace(
        &self,
        coordinates: &CoordinateSequence,
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        self.query(Operation::Match, coordinates, params).await
    }

    pub async fn trip(
        &self,
        coordinates: &CoordinateSequence,
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        self.query(Operation::Trip, coordinates, params).await
    }

    /// Route from `start` to `end` through `via`, snapping the endpoints to
    /// nearby roads when the direct attempt fails.
    pub async fn route_with_fallback(
        &self,
        start: &Coordinate,
        end: &Coordinate,
        via: &[Coordinate],
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        SnapFallback::new(self)
            .route_with_fallback(start, end, via, params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert_eq!("TRIP".parse::<Operation>().unwrap(), Operation::Trip);
        assert!("isochrone".parse::<Operation>().is_err());
    }

    #[test]
    fn coordinate_counts_per_operation() {
        assert!(Operation::Route.check_coordinates(1).is_err());
        assert!(Operation::Route.check_coordinates(2).is_ok());
        assert!(Operation::Match.check_coordinates(1).is_err());
        assert!(Operation::Trip.check_coordinates(3).is_ok());
        assert!(Operation::Table.check_coordinates(1).is_ok());
        assert!(Operation::Nearest.check_coordinates(1).is_ok());
        assert!(Operation::Nearest.check_coordinates(2).is_err());
    }

    #[test]
    fn set_replaces_and_set_default_preserves() {
        let mut params = QueryParams::new();
        params.push("overview", "full");
        params.push("overview", "simplified");
        params.set_default("overview", "false");
        assert_eq!(params.get("overview"), Some("full"));

        params.set("overview", "false");
        assert_eq!(params.as_slice(), &[("overview".to_string(), "false".to_string())]);
    }

    #[test]
    fn params_keep_insertion_order() {
        let params: QueryParams = [("steps", "true"), ("annotations", "false")]
            .into_iter()
            .collect();
        let keys: Vec<&str> = params.as_slice().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["steps", "annotations"]);
    }

    #[test]
    fn operation_url_uses_profile_and_sequence() {
        let client = RoutingClient::new(EngineConfig::new("http://example.com/")).unwrap();
        let coords: CoordinateSequence = "1,1;2,2".parse().unwrap();
        assert_eq!(
            client.operation_url(Operation::Route, &coords),
            "http://example.com/route/v1/driving/1,1;2,2"
        );
    }
}
