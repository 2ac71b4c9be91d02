//! Envelope for documents the relay builds itself.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Relay-built document with its fields flattened next to `content_type`.
///
/// Engine documents are relayed untouched; only composite answers such as
/// `/route/summary` go through this envelope.
///
/// # Example
///
/// ```
/// use osrm_relay_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Digest {
///     distance_km: f64,
///     duration_min: f64,
/// }
///
/// let response = ServiceResponse::new(Digest { distance_km: 3.2, duration_min: 10.0 });
/// assert_eq!(response.content_type, "application/json");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,
    pub content_type: &'static str,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: JSON_CONTENT_TYPE,
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::{json, Value};

    use super::*;

    #[derive(Serialize)]
    struct RouteDigest {
        route: Value,
        summary: String,
    }

    fn digest() -> RouteDigest {
        RouteDigest {
            route: json!({"code": "Ok"}),
            summary: "Маршрут: 3.2 км · 10 мин".to_string(),
        }
    }

    #[test]
    fn fields_sit_next_to_content_type() {
        let body = serde_json::to_value(ServiceResponse::new(digest())).unwrap();

        assert_eq!(
            body,
            json!({
                "route": {"code": "Ok"},
                "summary": "Маршрут: 3.2 км · 10 мин",
                "content_type": "application/json"
            })
        );
    }

    #[test]
    fn renders_as_json_ok() {
        let response = ServiceResponse::new(digest()).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
