//! Shared helpers for integration tests: fixture loading and a mock engine.

use std::path::PathBuf;
use std::time::Duration;

use osrm_relay_lib::{EngineConfig, RoutingClient};
use serde_json::Value;
use wiremock::MockServer;

/// Path to fixtures directory shared by the workspace crates.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Load a JSON fixture by file name.
#[allow(dead_code)]
pub fn fixture(name: &str) -> Value {
    let path = fixtures_dir().join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("read fixture {}: {}", path.display(), err));
    serde_json::from_str(&text).expect("fixture is valid JSON")
}

/// Client pointed at `server` with a short timeout.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> RoutingClient {
    let config = EngineConfig::new(server.uri()).with_timeout(Duration::from_secs(5));
    RoutingClient::new(config).expect("build routing client")
}

/// Paths of every request the mock engine received, in order.
#[allow(dead_code)]
pub async fn received_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}
