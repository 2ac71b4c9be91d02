//! Deployment checks: data files on disk and a sample engine query.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::ErrorPayload;
use crate::maintenance::DEFAULT_EXTRACT_PATH;

/// Zero-length route through the centre of Odessa.
pub const SAMPLE_ROUTE: &str = "30.7233,46.4825;30.7233,46.4825";

/// Timeout for the sample query.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCheck {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Engine probe outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EngineCheck {
    /// The engine answered 2xx.
    Ok { status_code: u16, payload: Value },
    /// The engine answered with another status.
    Error { status_code: u16, payload: Value },
    /// No answer: connection refused, DNS failure, timeout.
    Unreachable { error: String },
}

impl EngineCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, EngineCheck::Ok { .. })
    }
}

/// Combined report printed by `health-check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub osrm_url: String,
    pub osrm: EngineCheck,
    pub data: Vec<FileCheck>,
}

impl HealthReport {
    /// Engine reachable and every file present.
    pub fn is_healthy(&self) -> bool {
        self.osrm.is_ok() && self.data.iter().all(|f| f.status == FileStatus::Ok)
    }
}

/// Check that each of `paths` (relative to `base`) exists.
pub fn check_data_files<P: AsRef<Path>>(paths: &[P], base: &Path) -> Vec<FileCheck> {
    paths
        .iter()
        .map(|rel| {
            let path = base.join(rel);
            let status = if path.exists() {
                FileStatus::Ok
            } else {
                FileStatus::Missing
            };
            FileCheck { path, status }
        })
        .collect()
}

/// Send the sample route to the engine under the configured profile and
/// report what came back.
pub async fn check_engine_status(config: &EngineConfig, timeout: Duration) -> EngineCheck {
    let url = format!(
        "{}/route/v1/{}/{}",
        config.base_url.trim_end_matches('/'),
        config.profile,
        SAMPLE_ROUTE
    );

    let client = match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => {
            return EngineCheck::Unreachable {
                error: err.to_string(),
            }
        }
    };

    let response = match client
        .get(&url)
        .query(&[("overview", "false")])
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            return EngineCheck::Unreachable {
                error: err.to_string(),
            }
        }
    };

    let status_code = response.status().as_u16();
    let success = response.status().is_success();
    let payload = match response.text().await {
        Ok(body) => match ErrorPayload::from_body(&body) {
            ErrorPayload::Json(value) => value,
            ErrorPayload::Text(text) => Value::String(text),
        },
        Err(err) => {
            return EngineCheck::Unreachable {
                error: err.to_string(),
            }
        }
    };

    if success {
        EngineCheck::Ok {
            status_code,
            payload,
        }
    } else {
        EngineCheck::Error {
            status_code,
            payload,
        }
    }
}

/// Run both checks against the configured engine, looking for the extract
/// under `data_root`.
pub async fn run_checks(config: &EngineConfig, data_root: &Path) -> HealthReport {
    let osrm = check_engine_status(config, CHECK_TIMEOUT).await;
    let data = check_data_files(&[DEFAULT_EXTRACT_PATH], data_root);
    HealthReport {
        osrm_url: config.base_url.clone(),
        osrm,
        data,
    }
}
