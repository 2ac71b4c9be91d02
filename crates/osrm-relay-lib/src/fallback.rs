//! Snap fallback for route requests whose endpoints do not land on the road
//! network.
//!
//! When the direct route attempt fails, both endpoints are replaced by their
//! nearest road candidates and every start/end pair is tried in order until
//! one routes. Via points are never moved. If nothing routes, the caller gets
//! the direct attempt's result back unchanged.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::{QueryParams, RoutingClient};
use crate::coordinate::{Coordinate, CoordinateSequence};
use crate::error::{Error, Result};
use crate::response::{EngineResponse, Waypoint};

/// How a route request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackOutcome {
    /// The direct request succeeded.
    Direct,
    /// A snapped start/end pair succeeded.
    Snapped,
    /// Every snapped pair failed; the direct result was returned.
    Exhausted,
    /// A nearest lookup failed or found nothing; the direct result was returned.
    NotPossible,
}

impl FallbackOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackOutcome::Direct => "direct",
            FallbackOutcome::Snapped => "snapped",
            FallbackOutcome::Exhausted => "exhausted",
            FallbackOutcome::NotPossible => "not_possible",
        }
    }
}

/// Result of a fallback search.
#[derive(Debug)]
pub struct Resolution {
    /// What the caller should see: a success, or the direct attempt's result.
    pub response: Result<EngineResponse>,
    pub outcome: FallbackOutcome,
    /// Engine calls made, nearest lookups included.
    pub engine_calls: usize,
    /// The `(start, end)` pair that routed, when the outcome is `Snapped`.
    pub snapped: Option<(Coordinate, Coordinate)>,
}

impl Resolution {
    fn finish(
        response: Result<EngineResponse>,
        outcome: FallbackOutcome,
        engine_calls: usize,
    ) -> Self {
        Self {
            response,
            outcome,
            engine_calls,
            snapped: None,
        }
    }
}

/// Resolver bound to a client and a per-endpoint candidate limit.
#[derive(Debug, Clone, Copy)]
pub struct SnapFallback<'a> {
    client: &'a RoutingClient,
    candidate_limit: usize,
}

impl<'a> SnapFallback<'a> {
    /// Use the client's configured candidate limit.
    pub fn new(client: &'a RoutingClient) -> Self {
        Self {
            client,
            candidate_limit: client.config().snap_candidates,
        }
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    /// Route with fallback and return only the response.
    pub async fn route_with_fallback(
        &self,
        start: &Coordinate,
        end: &Coordinate,
        via: &[Coordinate],
        params: &QueryParams,
    ) -> Result<EngineResponse> {
        self.resolve(start, end, via, params).await?.response
    }

    /// Route with fallback and report how the result was obtained.
    ///
    /// The outer error is reserved for failures that abort the search
    /// (engine unreachable or an undecodable document). Unsuccessful
    /// attempts end up in [`Resolution::response`].
    pub async fn resolve(
        &self,
        start: &Coordinate,
        end: &Coordinate,
        via: &[Coordinate],
        params: &QueryParams,
    ) -> Result<Resolution> {
        let direct = attempt(
            self.client
                .route(&CoordinateSequence::route(start, via, end), params)
                .await,
        )?;
        let mut engine_calls = 1;

        if matches!(&direct, Ok(response) if response.is_successful()) {
            return Ok(Resolution::finish(direct, FallbackOutcome::Direct, engine_calls));
        }

        debug!(start = %start, end = %end, "direct route failed, trying snapped endpoints");

        let starts = self.candidates(start).await?;
        engine_calls += 1;
        let Some(starts) = starts else {
            return Ok(Resolution::finish(direct, FallbackOutcome::NotPossible, engine_calls));
        };

        let ends = self.candidates(end).await?;
        engine_calls += 1;
        let Some(ends) = ends else {
            return Ok(Resolution::finish(direct, FallbackOutcome::NotPossible, engine_calls));
        };

        for snapped_start in &starts {
            for snapped_end in &ends {
                let sequence = CoordinateSequence::route(snapped_start, via, snapped_end);
                let retry = attempt(self.client.route(&sequence, params).await)?;
                engine_calls += 1;

                if let Ok(response) = retry {
                    if response.is_successful() {
                        info!(
                            start = %snapped_start,
                            end = %snapped_end,
                            engine_calls,
                            "route found with snapped endpoints"
                        );
                        return Ok(Resolution {
                            response: Ok(response),
                            outcome: FallbackOutcome::Snapped,
                            engine_calls,
                            snapped: Some((snapped_start.clone(), snapped_end.clone())),
                        });
                    }
                }
            }
        }

        debug!(engine_calls, "snapped endpoints exhausted");
        Ok(Resolution::finish(direct, FallbackOutcome::Exhausted, engine_calls))
    }

    /// Nearest road candidates for `point`, or `None` when the lookup failed
    /// or found nothing usable.
    async fn candidates(&self, point: &Coordinate) -> Result<Option<Vec<Coordinate>>> {
        let params = QueryParams::new().with("number", self.candidate_limit.to_string());
        let lookup = attempt(self.client.nearest(point, &params).await)?;

        let response = match lookup {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                debug!(point = %point, code = %response.code, "nearest lookup unsuccessful");
                return Ok(None);
            }
            Err(err) => {
                debug!(point = %point, error = %err, "nearest lookup rejected");
                return Ok(None);
            }
        };

        let mut candidates = snap_candidates(response.waypoints());
        candidates.truncate(self.candidate_limit);
        Ok((!candidates.is_empty()).then_some(candidates))
    }
}

/// Split an engine call result into search-aborting errors (outer) and
/// attempt-level results (inner). Only rejections count as attempts.
fn attempt(result: Result<EngineResponse>) -> Result<Result<EngineResponse>> {
    match result {
        Ok(response) => Ok(Ok(response)),
        Err(err @ Error::EngineRejected { .. }) => Ok(Err(err)),
        Err(err) => Err(err),
    }
}

/// Distinct candidate coordinates from nearest waypoints, in engine order.
///
/// Waypoints whose location has fewer than two components are skipped.
pub fn snap_candidates(waypoints: &[Waypoint]) -> Vec<Coordinate> {
    let mut candidates: Vec<Coordinate> = Vec::with_capacity(waypoints.len());
    for waypoint in waypoints {
        let Some(candidate) = Coordinate::from_location(&waypoint.location) else {
            continue;
        };
        if !candidates.iter().any(|c| c.as_str() == candidate.as_str()) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::error::ErrorPayload;

    fn waypoint(location: &[f64]) -> Waypoint {
        Waypoint {
            name: None,
            location: location.to_vec(),
            extra: Map::new(),
        }
    }

    #[test]
    fn candidates_are_deduplicated_in_order() {
        let waypoints = [
            waypoint(&[1.1, 2.2]),
            waypoint(&[1.1000001, 2.2]),
            waypoint(&[3.3, 4.4]),
            waypoint(&[1.1, 2.2]),
        ];
        let texts: Vec<String> = snap_candidates(&waypoints)
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(texts, ["1.100000,2.200000", "3.300000,4.400000"]);
    }

    #[test]
    fn short_locations_are_skipped() {
        let waypoints = [waypoint(&[]), waypoint(&[5.0]), waypoint(&[5.0, 6.0])];
        let candidates = snap_candidates(&waypoints);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].as_str(), "5.000000,6.000000");
    }

    #[test]
    fn rejections_are_attempts_other_errors_abort() {
        let rejected = Error::EngineRejected {
            status: 400,
            payload: ErrorPayload::from_body(r#"{"code":"NoSegment"}"#),
        };
        assert!(matches!(attempt(Err(rejected)), Ok(Err(_))));

        let malformed = Error::MalformedResponse {
            message: "eof".to_string(),
        };
        assert!(attempt(Err(malformed)).is_err());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(FallbackOutcome::NotPossible.as_str(), "not_possible");
        assert_eq!(
            serde_json::to_value(FallbackOutcome::Snapped).unwrap(),
            serde_json::json!("snapped")
        );
    }
}
