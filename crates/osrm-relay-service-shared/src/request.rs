//! Query-string parsing and validation for the relay endpoints.
//!
//! Requests are plain `GET` query strings. Parameters the relay understands
//! (`start`, `end`, `via`, `points`, `point`, `lang`) are taken out; every
//! other parameter is forwarded to the engine unchanged and in order.

use osrm_relay_lib::{Coordinate, CoordinateSequence, Locale, Operation, QueryParams};
use serde::Serialize;

use crate::problem::from_lib_error;
use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Decode a raw query string into ordered pairs, keeping repeated keys.
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// Endpoints of a route request after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTarget {
    pub start: Coordinate,
    pub end: Coordinate,
    pub via: Vec<Coordinate>,
}

/// Query for `/route` and `/route/summary`.
///
/// Either `start` and `end` (with optional repeated `via`) or a `points`
/// sequence of at least two coordinates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub via: Vec<String>,
    pub points: Option<String>,
    pub lang: Option<String>,
    /// Parameters forwarded to the engine.
    pub params: QueryParams,
}

impl RouteQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in parse_query(raw) {
            match key.as_str() {
                "start" => query.start = Some(value),
                "end" => query.end = Some(value),
                "via" => query.via.extend(split_list(&value)),
                "points" => query.points = Some(value),
                "lang" => query.lang = Some(value),
                _ => query.params.push(key, value),
            }
        }
        query
    }

    /// Parse the coordinates, reporting malformed ones as 400 problems.
    pub fn target(&self, request_id: &str) -> Result<RouteTarget, Box<ProblemDetails>> {
        self.validate(request_id)?;
        let bad = |err: osrm_relay_lib::Error| Box::new(from_lib_error(&err, request_id));

        match (non_blank(&self.start), non_blank(&self.end)) {
            (Some(start), Some(end)) => {
                let via = self
                    .via
                    .iter()
                    .map(|v| v.parse::<Coordinate>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(bad)?;
                Ok(RouteTarget {
                    start: start.parse().map_err(bad)?,
                    end: end.parse().map_err(bad)?,
                    via,
                })
            }
            _ => {
                let points = non_blank(&self.points).unwrap_or_default();
                let sequence: CoordinateSequence = points.parse().map_err(bad)?;
                Operation::Route
                    .check_coordinates(sequence.len())
                    .map_err(bad)?;
                Ok(RouteTarget {
                    start: sequence.first().clone(),
                    end: sequence.last().clone(),
                    via: sequence.interior().to_vec(),
                })
            }
        }
    }

    /// Summary language: `lang` when given, otherwise `default`.
    pub fn locale(&self, default: Locale, request_id: &str) -> Result<Locale, Box<ProblemDetails>> {
        match non_blank(&self.lang) {
            Some(lang) => lang
                .parse()
                .map_err(|msg: String| Box::new(ProblemDetails::bad_request(msg, request_id))),
            None => Ok(default),
        }
    }
}

impl Validate for RouteQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        let has_pair = non_blank(&self.start).is_some() && non_blank(&self.end).is_some();
        let has_points = non_blank(&self.points).is_some();

        if !has_pair && !has_points {
            return Err(Box::new(ProblemDetails::bad_request(
                "Either 'start' and 'end' or 'points' are required",
                request_id,
            )));
        }

        if has_points && (self.start.is_some() || self.end.is_some() || !self.via.is_empty()) {
            return Err(Box::new(ProblemDetails::bad_request(
                "'points' cannot be combined with 'start', 'end' or 'via'",
                request_id,
            )));
        }

        Ok(())
    }
}

/// Query for `/table`, `/nearest`, `/match` and `/trip`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointsQuery {
    pub points: Option<String>,
    /// Single coordinate, accepted by `/nearest`.
    pub point: Option<String>,
    pub params: QueryParams,
}

impl PointsQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in parse_query(raw) {
            match key.as_str() {
                "points" => query.points = Some(value),
                "point" => query.point = Some(value),
                _ => query.params.push(key, value),
            }
        }
        query
    }

    /// Parse the coordinates and check the count `operation` accepts.
    pub fn sequence(
        &self,
        operation: Operation,
        request_id: &str,
    ) -> Result<CoordinateSequence, Box<ProblemDetails>> {
        self.validate(request_id)?;
        let bad = |err: osrm_relay_lib::Error| Box::new(from_lib_error(&err, request_id));

        let text = non_blank(&self.point)
            .or_else(|| non_blank(&self.points))
            .unwrap_or_default();
        let sequence: CoordinateSequence = text.parse().map_err(bad)?;
        operation.check_coordinates(sequence.len()).map_err(bad)?;
        Ok(sequence)
    }
}

impl Validate for PointsQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        match (non_blank(&self.point), non_blank(&self.points)) {
            (None, None) => Err(Box::new(ProblemDetails::bad_request(
                "The 'points' parameter is required",
                request_id,
            ))),
            (Some(_), Some(_)) => Err(Box::new(ProblemDetails::bad_request(
                "Use either 'point' or 'points', not both",
                request_id,
            ))),
            _ => Ok(()),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `via` may be repeated or `;`-joined.
fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}
