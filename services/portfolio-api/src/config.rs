// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the portfolio backend.
//!
//! Values are layered: built-in defaults, then an optional config file,
//! then `PORTFOLIO__*` environment variables (double underscore separates
//! nesting, e.g. `PORTFOLIO__RATE_LIMIT__MAX_SUBMISSIONS=10`).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PORTFOLIO";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the portfolio backend service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite connection string (default: sqlite://portfolio.db?mode=rwc)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Shared secret for admin routes, sent as `X-API-Key`
    #[serde(default = "default_admin_api_key")]
    pub admin_api_key: String,

    /// Use the first `X-Forwarded-For` hop as the source address
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Admission gate configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Spam classifier configuration
    #[serde(default)]
    pub spam: SpamConfig,

    /// Contact form validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding-window admission limits for contact submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted submissions per source within the window (default: 5)
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,

    /// Trailing window length in seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Upper bound on distinct sources tracked at once (default: 10000)
    #[serde(default = "default_max_tracked_sources")]
    pub max_tracked_sources: usize,

    /// Interval between background sweeps of aged-out sources (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Admit callers with no usable source address (default: true)
    #[serde(default = "default_true")]
    pub fail_open_on_missing_source: bool,
}

/// Keyword denylist for spam tagging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    /// Phrases that flag a submission when found anywhere in it
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
}

/// Field constraints for the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,

    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    #[serde(default = "default_max_subject_len")]
    pub max_subject_len: usize,

    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite://portfolio.db?mode=rwc".to_string()
}

fn default_admin_api_key() -> String {
    "default123".to_string()
}

fn default_max_submissions() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    3600 // one hour
}

fn default_max_tracked_sources() -> usize {
    10_000
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_denylist() -> Vec<String> {
    ["viagra", "casino", "lottery", "winner", "free money", "click here"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_min_name_len() -> usize {
    6
}

fn default_max_name_len() -> usize {
    100
}

fn default_max_subject_len() -> usize {
    200
}

fn default_max_message_len() -> usize {
    5000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: default_database_url(),
            admin_api_key: default_admin_api_key(),
            trust_forwarded_for: false,
            rate_limit: RateLimitConfig::default(),
            spam: SpamConfig::default(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
            max_tracked_sources: default_max_tracked_sources(),
            sweep_interval_secs: default_sweep_interval_secs(),
            fail_open_on_missing_source: default_true(),
        }
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_name_len: default_min_name_len(),
            max_name_len: default_max_name_len(),
            max_subject_len: default_max_subject_len(),
            max_message_len: default_max_message_len(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, an optional file and the environment.
    ///
    /// `path` names a config file without extension; a missing file is not
    /// an error.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let config: Config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("spam.denylist")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_submissions == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_submissions must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_secs must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.max_tracked_sources == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_tracked_sources must be at least 1".to_string(),
            ));
        }
        if self.admin_api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "admin_api_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_limits() {
        let config = Config::default();
        assert_eq!(config.rate_limit.max_submissions, 5);
        assert_eq!(config.rate_limit.window_duration(), Duration::from_secs(3600));
        assert!(config.rate_limit.fail_open_on_missing_source);
        assert_eq!(config.spam.denylist.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = Config::default();
        config.rate_limit.max_submissions = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"rate_limit": {"max_submissions": 9}}"#)
            .unwrap();
        assert_eq!(config.rate_limit.max_submissions, 9);
        assert_eq!(config.rate_limit.window_secs, 3600);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
    }
}
