//! Test utilities for relay handler testing.
//!
//! Handlers are exercised against a `wiremock` server standing in for the
//! routing engine; these helpers build state pointing at it and load the
//! shared JSON fixtures.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use osrm_relay_lib::{EngineConfig, Locale};
use serde_json::Value;

use crate::state::AppState;

/// Directory holding the engine response fixtures.
pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures");

/// State whose routing client talks to `base_url` with a short timeout.
///
/// # Panics
///
/// Panics if the client cannot be built. This indicates a test
/// configuration issue.
pub fn test_state(base_url: &str) -> AppState {
    test_state_with_locale(base_url, Locale::Ru)
}

pub fn test_state_with_locale(base_url: &str, locale: Locale) -> AppState {
    let config = EngineConfig::new(base_url).with_timeout(Duration::from_secs(5));
    AppState::new(config, locale)
        .unwrap_or_else(|e| panic!("failed to build test state for {}: {}", base_url, e))
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(FIXTURES_DIR).join(name)
}

/// Load a fixture as JSON.
///
/// # Panics
///
/// Panics if the fixture is missing or not valid JSON.
pub fn fixture(name: &str) -> Value {
    let path = fixture_path(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {:?}: {}", path, e));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid fixture {:?}: {}", path, e))
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("test-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
