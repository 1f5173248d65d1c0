//! Configuration types shared across crates.

use crate::error::{Error, Result};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Row store backend.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Retry behavior for transient backend failures.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Client-facing query defaults.
    #[serde(default)]
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration by merging an optional TOML file with
    /// `STOCKROOM_`-prefixed environment variables (e.g.
    /// `STOCKROOM_BACKEND__SPREADSHEET_ID`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("STOCKROOM_").split("__"));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.backend.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Create a configuration backed by the in-memory store.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self::default()
    }
}

/// Row store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// In-memory store. Volatile; intended for tests and offline use.
    Memory,
    /// Remote spreadsheet values API.
    Sheets {
        /// API base URL (e.g. "https://sheets.googleapis.com").
        base_url: String,
        /// Spreadsheet document id.
        spreadsheet_id: String,
        /// Bearer token for the values API. Falls back to unauthenticated
        /// requests when unset (public read-only documents).
        /// WARNING: Prefer env vars over storing tokens in config files.
        api_token: Option<String>,
        /// Per-request deadline in seconds.
        #[serde(default = "default_request_timeout_secs")]
        request_timeout_secs: u64,
    },
}

impl BackendConfig {
    /// Validate the backend configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            BackendConfig::Memory => Ok(()),
            BackendConfig::Sheets {
                base_url,
                spreadsheet_id,
                request_timeout_secs,
                ..
            } => {
                if base_url.trim().is_empty() {
                    return Err("sheets backend requires a base_url".to_string());
                }
                if spreadsheet_id.trim().is_empty() {
                    return Err("sheets backend requires a spreadsheet_id".to_string());
                }
                if *request_timeout_secs == 0 {
                    return Err("request_timeout_secs must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }

    /// Get the per-request deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        match self {
            BackendConfig::Memory => Duration::from_secs(default_request_timeout_secs()),
            BackendConfig::Sheets {
                request_timeout_secs,
                ..
            } => Duration::from_secs(*request_timeout_secs),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory
    }
}

/// Retry behavior for transient backend failures.
///
/// Appends are never covered by this policy; a failed append has an unknown
/// outcome and must not be replayed blindly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first (1 disables retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl RetryConfig {
    /// Get the inter-attempt delay as a Duration.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Client-facing query defaults.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when the caller does not supply one.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_page_size() -> usize {
    crate::DEFAULT_PAGE_SIZE
}
