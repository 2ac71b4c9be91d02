use std::path::PathBuf;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Convenient result alias for the OSRM relay library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The routing engine could not be reached or did not answer in time.
    #[error("routing engine unavailable at {url}: {source}")]
    ServiceUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The routing engine answered with a non-success HTTP status.
    #[error("routing engine rejected the request with status {status}{}", format_engine_detail(.payload))]
    EngineRejected { status: u16, payload: ErrorPayload },

    /// The routing engine answered 2xx but the body was not a usable document.
    #[error("malformed routing engine response: {message}")]
    MalformedResponse { message: String },

    /// The engine answered but reported no usable route.
    #[error("no route found (engine code {code})")]
    NoRouteFound { code: String, message: Option<String> },

    /// Raised when a coordinate string cannot be parsed.
    #[error("invalid coordinate '{input}': {reason}")]
    InvalidCoordinate { input: String, reason: String },

    /// Raised when an operation receives the wrong number of coordinates.
    #[error("{operation} requires {expected}, got {actual}")]
    InvalidCoordinates {
        operation: String,
        expected: String,
        actual: usize,
    },

    /// Raised when configuration values are missing or malformed.
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// Raised when an external OSRM tool exits unsuccessfully.
    #[error("command {program} failed{}", format_exit_code(.code))]
    CommandFailed { program: String, code: Option<i32> },

    /// Raised when a downloaded artifact could not be persisted.
    #[error("failed to persist download to {path}: {message}")]
    PersistDownload { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors outside the engine query path.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Error body returned by the engine alongside a non-success status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    /// Body decoded as JSON (OSRM sends `{"code": ..., "message": ...}`).
    Json(Value),
    /// Body that was not valid JSON, kept as text.
    Text(String),
}

impl ErrorPayload {
    /// Decode a response body, falling back to the raw text.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body)
            .map(ErrorPayload::Json)
            .unwrap_or_else(|_| ErrorPayload::Text(body.to_string()))
    }

    /// The engine's `code` field, if the payload is a JSON object carrying one.
    pub fn engine_code(&self) -> Option<&str> {
        match self {
            ErrorPayload::Json(value) => value.get("code").and_then(Value::as_str),
            ErrorPayload::Text(_) => None,
        }
    }

    /// The engine's `message` field, if present.
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            ErrorPayload::Json(value) => value.get("message").and_then(Value::as_str),
            ErrorPayload::Text(_) => None,
        }
    }

    /// JSON form suitable for forwarding to API consumers.
    pub fn to_json(&self) -> Value {
        match self {
            ErrorPayload::Json(value) => value.clone(),
            ErrorPayload::Text(text) => json!({ "error": text }),
        }
    }
}

fn format_engine_detail(payload: &ErrorPayload) -> String {
    match (payload.engine_code(), payload.engine_message()) {
        (Some(code), Some(message)) => format!(" ({}: {})", code, message),
        (Some(code), None) => format!(" ({})", code),
        _ => String::new(),
    }
}

fn format_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_decodes_json_body() {
        let payload = ErrorPayload::from_body(r#"{"code":"NoSegment","message":"Could not find a matching segment"}"#);
        assert_eq!(payload.engine_code(), Some("NoSegment"));
        assert_eq!(
            payload.engine_message(),
            Some("Could not find a matching segment")
        );
    }

    #[test]
    fn payload_keeps_raw_text() {
        let payload = ErrorPayload::from_body("upstream exploded");
        assert_eq!(payload, ErrorPayload::Text("upstream exploded".to_string()));
        assert_eq!(payload.to_json(), json!({ "error": "upstream exploded" }));
        assert!(payload.engine_code().is_none());
    }

    #[test]
    fn rejected_display_includes_engine_code() {
        let err = Error::EngineRejected {
            status: 400,
            payload: ErrorPayload::from_body(r#"{"code":"InvalidQuery"}"#),
        };
        assert_eq!(
            err.to_string(),
            "routing engine rejected the request with status 400 (InvalidQuery)"
        );
    }

    #[test]
    fn command_failed_display() {
        let err = Error::CommandFailed {
            program: "osrm-customize".to_string(),
            code: Some(2),
        };
        assert!(err.to_string().contains("exit code 2"));
    }
}
