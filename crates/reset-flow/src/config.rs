//! Configuration loaded from environment variables.

use crate::otp_store::{DEFAULT_OTP_TTL, DEFAULT_STORAGE_KEY};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Reset flow configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Reset flow timing and persistence key
    #[serde(default)]
    pub reset: ResetConfig,

    /// Client-local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the timetable backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    /// How long an issued OTP stays valid
    #[serde(default = "default_otp_ttl", with = "humantime_serde")]
    pub otp_ttl: Duration,

    /// Pause between a successful reset and dismissal
    #[serde(default = "default_dismiss_delay", with = "humantime_serde")]
    pub success_delay: Duration,

    /// Pause before the flow closes itself after a 401
    #[serde(default = "default_dismiss_delay", with = "humantime_serde")]
    pub unauthorized_close_delay: Duration,

    /// Storage key for the pending reset
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Directory for file-backed storage; in-memory when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default implementations
impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            otp_ttl: default_otp_ttl(),
            success_delay: default_dismiss_delay(),
            unauthorized_close_delay: default_dismiss_delay(),
            storage_key: default_storage_key(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000/api".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_otp_ttl() -> Duration {
    DEFAULT_OTP_TTL
}

fn default_dismiss_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                environment
                    .separator("__")
                    // Phone numbers and OTPs must stay strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_environment(config::Environment::default().source(Some(source)))
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.reset.otp_ttl, Duration::from_secs(300));
        assert_eq!(config.reset.success_delay, Duration::from_secs(2));
        assert_eq!(config.reset.storage_key, "pending_password_reset");
        assert!(config.storage.dir.is_none());
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json);
    }

    #[test]
    fn test_environment_overrides() {
        let config = from_vars(&[
            ("API__BASE_URL", "https://timetable.example.edu/api"),
            ("API__TIMEOUT", "10s"),
            ("RESET__OTP_TTL", "2m"),
            ("RESET__SUCCESS_DELAY", "500ms"),
            ("STORAGE__DIR", "/tmp/reset-state"),
            ("LOG__LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.api.base_url, "https://timetable.example.edu/api");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.reset.otp_ttl, Duration::from_secs(120));
        assert_eq!(config.reset.success_delay, Duration::from_millis(500));
        assert_eq!(
            config.reset.unauthorized_close_delay,
            Duration::from_secs(2)
        );
        assert_eq!(config.storage.dir, Some(PathBuf::from("/tmp/reset-state")));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_invalid_duration_rejected() {
        assert!(from_vars(&[("RESET__OTP_TTL", "soon")]).is_err());
    }
}
