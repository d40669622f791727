use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const ENV_API_URL: &str = "PLUGIN_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PLUGIN_API_TIMEOUT_SECS";
pub const ENV_ATTEMPTS: &str = "PLUGIN_API_ATTEMPTS";
pub const ENV_BACKOFF_MS: &str = "PLUGIN_API_BACKOFF_MS";
pub const ENV_RECONCILE: &str = "PLUGIN_API_RECONCILE";

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing PLUGIN_API_URL (or --api-url)")]
    MissingApiUrl,
    #[error("invalid api url {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("unknown reconcile mode {0:?} (expected refetch or local)")]
    UnknownReconcileMode(String),
}

/// How local state catches up after the server confirmed a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Fetch the payload again and rebuild the view from what the server holds.
    #[default]
    Refetch,
    /// Rebuild the view from the payload that was just persisted.
    Local,
}

impl FromStr for ReconcileMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refetch" | "fetch" | "pessimistic" => Ok(ReconcileMode::Refetch),
            "local" | "patch" => Ok(ReconcileMode::Local),
            other => Err(ConfigError::UnknownReconcileMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_url: Url,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub reconcile: ReconcileMode,
}

impl DashboardConfig {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: validate_api_url(api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            reconcile: ReconcileMode::default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(ENV_API_URL)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingApiUrl)?;
        let mut cfg = Self::new(&api_url)?;

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS) {
            cfg = cfg.with_timeout(Duration::from_secs(secs));
        }
        if let Some(n) = parse_var::<u32>(&lookup, ENV_ATTEMPTS) {
            cfg = cfg.with_max_attempts(n);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_BACKOFF_MS) {
            cfg = cfg.with_initial_backoff(Duration::from_millis(ms));
        }
        if let Some(mode) = lookup(ENV_RECONCILE) {
            cfg.reconcile = mode.parse()?;
        }
        Ok(cfg)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Duration::from_secs(timeout.as_secs().clamp(1, 300));
        self
    }

    /// Total requests per call, the first one included. `1` disables retries.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.clamp(1, 10);
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        let ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX);
        self.initial_backoff = Duration::from_millis(ms.clamp(50, 5_000));
        self
    }

    pub fn with_reconcile(mut self, reconcile: ReconcileMode) -> Self {
        self.reconcile = reconcile;
        self
    }
}

pub fn validate_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidApiUrl {
            url: raw.to_string(),
            reason: format!("scheme {scheme:?} is not http or https"),
        }),
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring unparsable {key}={raw:?}");
            None
        }
    }
}
