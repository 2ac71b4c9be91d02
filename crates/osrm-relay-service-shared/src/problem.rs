//! RFC 9457 Problem Details for HTTP APIs, plus forwarding of routing engine
//! rejections.
//!
//! Errors raised by the relay itself are answered as problem documents. When
//! the engine rejects a query, its status code and JSON body are passed
//! through so clients see the engine's own `code` and `message`.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use osrm_relay_lib::Error as LibError;

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for the routing engine being unreachable.
pub const PROBLEM_ENGINE_UNAVAILABLE: &str = "/problems/engine-unavailable";

/// Problem type URI for engine answers that could not be decoded.
pub const PROBLEM_ENGINE_RESPONSE: &str = "/problems/invalid-engine-response";

/// Problem type URI for routes that cannot be found.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use osrm_relay_service_shared::{ProblemDetails, PROBLEM_INVALID_REQUEST};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_REQUEST,
///     "Invalid Request",
///     StatusCode::BAD_REQUEST,
/// )
/// .with_detail("start and end required")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for malformed or missing query parameters.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 502 when the routing engine cannot be reached.
    pub fn engine_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ENGINE_UNAVAILABLE,
            "Routing Engine Unavailable",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 502 when the engine answered with something other than a routing document.
    pub fn invalid_engine_response(
        detail: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(
            PROBLEM_ENGINE_RESPONSE,
            "Invalid Routing Engine Response",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn route_not_found(code: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("The routing engine reported '{}'", code))
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Engine rejection forwarded to the client as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRejection {
    pub status: u16,
    /// Engine JSON body; raw text bodies arrive wrapped as `{"error": text}`.
    pub body: Value,
}

impl IntoResponse for UpstreamRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.body)).into_response()
    }
}

/// Error returned by relay handlers.
#[derive(Debug, Clone)]
pub enum ServiceError {
    Problem(Box<ProblemDetails>),
    Upstream(UpstreamRejection),
}

impl ServiceError {
    /// Classify a library error: engine rejections are forwarded, everything
    /// else becomes a problem document.
    pub fn from_lib(error: &LibError, request_id: &str) -> Self {
        match error {
            LibError::EngineRejected { status, payload } => {
                ServiceError::Upstream(UpstreamRejection {
                    status: *status,
                    body: payload.to_json(),
                })
            }
            other => ServiceError::Problem(Box::new(from_lib_error(other, request_id))),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Problem(problem) => problem.status,
            ServiceError::Upstream(rejection) => rejection.status,
        }
    }
}

impl From<ProblemDetails> for ServiceError {
    fn from(problem: ProblemDetails) -> Self {
        ServiceError::Problem(Box::new(problem))
    }
}

impl From<Box<ProblemDetails>> for ServiceError {
    fn from(problem: Box<ProblemDetails>) -> Self {
        ServiceError::Problem(problem)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Problem(problem) => problem.into_response(),
            ServiceError::Upstream(rejection) => rejection.into_response(),
        }
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::InvalidCoordinate { .. } | LibError::InvalidCoordinates { .. } => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
        LibError::ServiceUnavailable { .. } => {
            ProblemDetails::engine_unavailable(error.to_string(), request_id)
        }
        LibError::MalformedResponse { .. } => {
            ProblemDetails::invalid_engine_response(error.to_string(), request_id)
        }
        LibError::EngineRejected { status, .. } => ProblemDetails::new(
            PROBLEM_ENGINE_RESPONSE,
            "Routing Engine Rejected Request",
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
        )
        .with_detail(error.to_string())
        .with_request_id(request_id),
        LibError::NoRouteFound { code, .. } => ProblemDetails::route_not_found(code, request_id),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use osrm_relay_lib::ErrorPayload;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(problem.type_uri, PROBLEM_INVALID_REQUEST);
        assert_eq!(problem.status, 400);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("start and end required", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"start and end required\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_invalid_coordinate_is_bad_request() {
        let error = "x,y".parse::<osrm_relay_lib::Coordinate>().unwrap_err();
        let problem = from_lib_error(&error, "req-coord");
        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("x,y"));
    }

    #[test]
    fn test_malformed_response_is_bad_gateway() {
        let error = LibError::MalformedResponse {
            message: "expected value".to_string(),
        };
        let problem = from_lib_error(&error, "req-bad");
        assert_eq!(problem.status, 502);
        assert_eq!(problem.type_uri, PROBLEM_ENGINE_RESPONSE);
    }

    #[test]
    fn test_rejection_is_forwarded() {
        let error = LibError::EngineRejected {
            status: 400,
            payload: ErrorPayload::from_body(r#"{"code":"InvalidQuery","message":"bad"}"#),
        };
        match ServiceError::from_lib(&error, "req-up") {
            ServiceError::Upstream(rejection) => {
                assert_eq!(rejection.status, 400);
                assert_eq!(rejection.body, json!({"code": "InvalidQuery", "message": "bad"}));
            }
            other => panic!("expected upstream rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_text_rejection_is_wrapped() {
        let error = LibError::EngineRejected {
            status: 500,
            payload: ErrorPayload::from_body("segfault"),
        };
        let service_error = ServiceError::from_lib(&error, "req-text");
        assert_eq!(service_error.status(), 500);
        match service_error {
            ServiceError::Upstream(rejection) => {
                assert_eq!(rejection.body, json!({"error": "segfault"}))
            }
            other => panic!("expected upstream rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_no_route_found() {
        let error = LibError::NoRouteFound {
            code: "NoRoute".to_string(),
            message: None,
        };
        let problem = from_lib_error(&error, "req-none");
        assert_eq!(problem.status, 404);
        assert!(problem.detail.as_deref().unwrap().contains("NoRoute"));
    }
}
