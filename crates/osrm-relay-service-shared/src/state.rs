//! Application state for the HTTP relay.
//!
//! Holds the routing client (one pooled HTTP client shared by all requests)
//! and the default summary language. Nothing in here is mutated after startup.

use std::sync::Arc;

use osrm_relay_lib::{EngineConfig, Error as LibError, Locale, RoutingClient};

/// Environment variable selecting the default summary language.
pub const SUMMARY_LOCALE_ENV: &str = "SUMMARY_LOCALE";

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Engine settings in the environment are invalid.
    Config(LibError),

    /// The HTTP client could not be constructed.
    Client(LibError),

    /// `SUMMARY_LOCALE` names an unsupported language.
    InvalidLocale(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid engine configuration: {}", e),
            Self::Client(e) => write!(f, "failed to build routing client: {}", e),
            Self::InvalidLocale(msg) => write!(f, "invalid {}: {}", SUMMARY_LOCALE_ENV, msg),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) | Self::Client(e) => Some(e),
            Self::InvalidLocale(_) => None,
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable (using `Arc` internally); shared via axum's `State`
/// extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use osrm_relay_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let client = state.client();
///     // ... query the engine
/// }
///
/// let state = AppState::from_env().unwrap();
/// let app = Router::new()
///     .route("/route", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    client: RoutingClient,
    default_locale: Locale,
}

impl AppState {
    /// Build state from `OSRM_*` and `SUMMARY_LOCALE` environment variables.
    pub fn from_env() -> Result<Self, AppStateError> {
        let config = EngineConfig::from_env().map_err(AppStateError::Config)?;
        let locale = match std::env::var(SUMMARY_LOCALE_ENV) {
            Ok(value) if !value.trim().is_empty() => {
                value.parse().map_err(AppStateError::InvalidLocale)?
            }
            _ => Locale::default(),
        };
        Self::new(config, locale)
    }

    /// Build state from explicit settings.
    pub fn new(config: EngineConfig, default_locale: Locale) -> Result<Self, AppStateError> {
        tracing::info!(
            engine_url = %config.base_url,
            profile = %config.profile,
            timeout_secs = config.timeout.as_secs(),
            snap_candidates = config.snap_candidates,
            algorithm = %config.algorithm,
            locale = %default_locale,
            "configuring routing client"
        );
        let client = RoutingClient::new(config).map_err(AppStateError::Client)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                client,
                default_locale,
            }),
        })
    }

    pub fn client(&self) -> &RoutingClient {
        &self.inner.client
    }

    pub fn config(&self) -> &EngineConfig {
        self.inner.client.config()
    }

    /// Language used for summaries when the request does not pick one.
    pub fn default_locale(&self) -> Locale {
        self.inner.default_locale
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine_url", &self.config().base_url)
            .field("profile", &self.config().profile)
            .field("default_locale", &self.inner.default_locale)
            .finish()
    }
}
