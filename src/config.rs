//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Application configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote REST backend.
    pub api_url: String,
    /// Path of the local key-value store database.
    pub db_path: PathBuf,
    /// Port for the local HTTP surface.
    pub port: u16,
    /// Per-request timeout for photo uploads.
    pub upload_timeout: Duration,
    /// Whether to run the interactive terminal driver.
    pub interactive: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            db_path: PathBuf::from("./data/pawprint.db"),
            port: 8080,
            upload_timeout: Duration::from_secs(30),
            interactive: true,
        }
    }
}

impl AppConfig {
    /// Build the configuration from `PAWPRINT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("PAWPRINT_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_url);

        let db_path = lookup("PAWPRINT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let port = parse_or(&lookup, "PAWPRINT_PORT", defaults.port);

        let upload_timeout = Duration::from_secs(parse_or(
            &lookup,
            "PAWPRINT_UPLOAD_TIMEOUT_SECS",
            defaults.upload_timeout.as_secs(),
        ));

        let interactive = lookup("PAWPRINT_NO_CLI").is_none();

        Self {
            api_url,
            db_path,
            port,
            upload_timeout,
            interactive,
        }
    }

    /// Reject values that cannot work at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "PAWPRINT_API_URL".into(),
                message: format!("expected an http(s) URL, got {:?}", self.api_url),
            });
        }
        if self.upload_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "PAWPRINT_UPLOAD_TIMEOUT_SECS".into(),
                message: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}
