// Handlers for the CLI subcommands. main.rs parses arguments and dispatches
// here; each handler prints its own output.

pub mod download;
pub mod health;
pub mod maintenance;
pub mod query;
pub mod route;

/// Parse a `key=value` engine parameter.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
