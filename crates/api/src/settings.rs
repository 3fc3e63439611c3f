//! Server Configuration

use config::{Config, Environment, File};
use intake::IntakeConfig;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ApiError;
use crate::rate_limit::RateLimitConfig;

/// Base name of the optional configuration file (any format `config` understands)
pub const DEFAULT_CONFIG_FILE: &str = "config/medical-expert";

/// Environment variable prefix, e.g. `MEDIAG__BIND_ADDR`
pub const ENV_PREFIX: &str = "MEDIAG";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,
    /// Rule file to load instead of the built-in catalog
    pub rules_path: Option<PathBuf>,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Diagnose route rate limiting
    pub rate_limit: RateLimitConfig,
    /// Intake validation limits
    pub intake: IntakeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            rules_path: None,
            log_level: "info".to_string(),
            rate_limit: RateLimitConfig::default(),
            intake: IntakeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ApiError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from an optional file, with environment variables taking precedence
    pub fn load_from(file: &str) -> Result<Self, ApiError> {
        let settings = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
