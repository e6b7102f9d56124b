// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the items API.
//!
//! `API_KEY` and `BIND_ADDR` are read directly; `ITEMS__*` variables and an
//! optional config file cover the rest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the items service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8001)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Shared secret for write routes (default: default123)
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8001".to_string()
}

fn default_api_key() -> String {
    "default123".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_key: default_api_key(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, an optional file and the environment.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let mut config: Config = builder
            .add_source(
                config::Environment::with_prefix("ITEMS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if let Ok(key) = std::env::var("API_KEY") {
            config.api_key = key;
        }
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        if config.api_key.is_empty() {
            return Err(ConfigError::Invalid("API key must not be empty".to_string()));
        }
        Ok(config)
    }
}
