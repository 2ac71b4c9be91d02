//! Typed model of the routing engine's JSON documents.
//!
//! Only the fields the relay inspects are typed. Everything else is kept in
//! `extra` maps so a document decoded here serializes back with the same
//! content it arrived with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Value of `code` the engine uses for success.
pub const CODE_OK: &str = "Ok";

/// Top-level engine response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    /// Status code reported by the engine (`Ok`, `NoRoute`, `NoSegment`, ...).
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<Vec<Waypoint>>,

    /// Operation-specific payload (`durations`, `matchings`, `trips`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineResponse {
    /// Decode a response body, failing when it is not JSON or lacks `code`.
    pub fn from_body(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
            message: e.to_string(),
        })
    }

    /// Build a response carrying only a status code.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            routes: None,
            waypoints: None,
            extra: Map::new(),
        }
    }

    /// `true` when the engine reported `Ok`.
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// `true` when the engine reported `Ok` and at least one route.
    pub fn is_successful(&self) -> bool {
        self.is_ok() && !self.routes().is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        self.routes.as_deref().unwrap_or(&[])
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.waypoints.as_deref().unwrap_or(&[])
    }

    /// The best (first) route, if any.
    pub fn best_route(&self) -> Option<&Route> {
        self.routes().first()
    }

    /// Require a usable route, turning an unsuccessful response into
    /// [`Error::NoRouteFound`].
    pub fn into_successful(self) -> Result<Self> {
        if self.is_successful() {
            Ok(self)
        } else {
            Err(Error::NoRouteFound {
                code: self.code,
                message: self.message,
            })
        }
    }
}

/// One candidate route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Total distance in meters.
    #[serde(default)]
    pub distance: f64,
    /// Total duration in seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<Leg>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Portion of a route between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One maneuver and the road travelled after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub maneuver: Maneuver,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Maneuver description as sent by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Engine-reported (usually snapped) point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `[lon, lat]`; may be short or absent in degenerate responses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_requires_ok_code_and_routes() {
        let ok: EngineResponse =
            serde_json::from_value(json!({"code": "Ok", "routes": [{"distance": 1.0}]})).unwrap();
        assert!(ok.is_successful());

        let empty: EngineResponse =
            serde_json::from_value(json!({"code": "Ok", "routes": []})).unwrap();
        assert!(empty.is_ok());
        assert!(!empty.is_successful());

        let no_route: EngineResponse =
            serde_json::from_value(json!({"code": "NoRoute", "routes": [{}]})).unwrap();
        assert!(!no_route.is_successful());
    }

    #[test]
    fn missing_code_is_malformed() {
        let err = EngineResponse::from_body(r#"{"routes": []}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));

        let err = EngineResponse::from_body("<html>").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn unknown_fields_round_trip() {
        let document = json!({
            "code": "Ok",
            "durations": [[0.0, 12.5], [13.1, 0.0]],
            "sources": [{"location": [30.7, 46.4], "name": "", "hint": "abc"}],
            "waypoints": [{"location": [30.7, 46.4], "name": "Derybasivska", "distance": 3.2}]
        });
        let parsed: EngineResponse = serde_json::from_value(document.clone()).unwrap();
        assert_eq!(parsed.waypoints()[0].name.as_deref(), Some("Derybasivska"));
        assert!(parsed.extra.contains_key("durations"));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), document);
    }

    #[test]
    fn step_fields_are_optional() {
        let step: Step = serde_json::from_value(json!({
            "maneuver": {"type": "arrive", "modifier": null, "location": [1.0, 2.0]}
        }))
        .unwrap();
        assert_eq!(step.maneuver.kind.as_deref(), Some("arrive"));
        assert!(step.maneuver.modifier.is_none());
        assert!(step.name.is_none());
        assert_eq!(step.distance, 0.0);
    }

    #[test]
    fn into_successful_reports_engine_code() {
        let err = EngineResponse::with_code("NoRoute")
            .into_successful()
            .unwrap_err();
        match err {
            Error::NoRouteFound { code, .. } => assert_eq!(code, "NoRoute"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
