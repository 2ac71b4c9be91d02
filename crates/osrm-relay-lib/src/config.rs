//! Engine configuration.
//!
//! Every component receives an [`EngineConfig`] explicitly; nothing reads the
//! environment after startup.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Error, Result};

/// Default engine base URL.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:5000";

/// Default OSRM routing profile segment of the query path.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default bound on every engine call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of nearest-road candidates requested per endpoint.
pub const DEFAULT_SNAP_CANDIDATES: usize = 5;

/// OSRM preprocessing pipeline the engine's data was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Multi-level Dijkstra (extract, partition, customize).
    #[default]
    Mld,
    /// Contraction hierarchies (extract, contract).
    Ch,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Mld => f.write_str("mld"),
            Algorithm::Ch => f.write_str("ch"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mld" => Ok(Algorithm::Mld),
            "ch" => Ok(Algorithm::Ch),
            other => Err(Error::InvalidConfig {
                key: "OSRM_ALGORITHM".to_string(),
                message: format!("unknown algorithm '{}', expected 'mld' or 'ch'", other),
            }),
        }
    }
}

/// Settings for reaching the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Routing profile, e.g. `driving`.
    pub profile: String,
    /// Timeout applied to each engine call.
    #[serde(serialize_with = "serialize_secs")]
    pub timeout: Duration,
    /// Nearest-road candidates requested per endpoint during snap fallback.
    pub snap_candidates: usize,
    /// Preprocessing pipeline of the engine data.
    pub algorithm: Algorithm,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            snap_candidates: DEFAULT_SNAP_CANDIDATES,
            algorithm: Algorithm::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration for `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Read configuration from the process environment.
    ///
    /// - `OSRM_URL`: engine base URL (default `http://localhost:5000`)
    /// - `OSRM_PROFILE`: routing profile (default `driving`)
    /// - `OSRM_TIMEOUT_SECS`: per-call timeout (default 60)
    /// - `OSRM_SNAP_CANDIDATES`: snap candidates per endpoint (default 5)
    /// - `OSRM_ALGORITHM`: `mld` (default) or `ch`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("OSRM_URL") {
            config = config.with_base_url(url);
        }
        if let Some(profile) = get("OSRM_PROFILE") {
            config = config.with_profile(profile.trim());
        }
        if let Some(secs) = get("OSRM_TIMEOUT_SECS") {
            let secs = parse_positive("OSRM_TIMEOUT_SECS", &secs)?;
            config.timeout = Duration::from_secs(secs as u64);
        }
        if let Some(limit) = get("OSRM_SNAP_CANDIDATES") {
            config.snap_candidates = parse_positive("OSRM_SNAP_CANDIDATES", &limit)?;
        }
        if let Some(algorithm) = get("OSRM_ALGORITHM") {
            config.algorithm = algorithm.parse()?;
        }

        Ok(config)
    }

    /// Replace the base URL, trimming any trailing slashes.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url: String = base_url.into();
        self.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_snap_candidates(mut self, limit: usize) -> Self {
        self.snap_candidates = limit;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(Error::InvalidConfig {
            key: key.to_string(),
            message: format!("expected a positive integer, got '{}'", value),
        }),
    }
}

fn serialize_secs<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.algorithm, Algorithm::Mld);
        assert_eq!(config.snap_candidates, 5);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn reads_all_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("OSRM_URL", "http://osrm:5000/"),
            ("OSRM_PROFILE", "car"),
            ("OSRM_TIMEOUT_SECS", "5"),
            ("OSRM_SNAP_CANDIDATES", "3"),
            ("OSRM_ALGORITHM", "CH"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://osrm:5000");
        assert_eq!(config.profile, "car");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.snap_candidates, 3);
        assert_eq!(config.algorithm, Algorithm::Ch);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let err = EngineConfig::from_lookup(lookup(&[("OSRM_ALGORITHM", "astar")])).unwrap_err();
        assert!(err.to_string().contains("OSRM_ALGORITHM"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = EngineConfig::from_lookup(lookup(&[("OSRM_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = EngineConfig::from_lookup(lookup(&[("OSRM_URL", "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_ENGINE_URL);
    }
}
