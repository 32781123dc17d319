//! Configuration module for the advisory service.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Models, Store, and Observability.

mod model_config;
mod observability_config;
mod server_config;
mod store_config;

pub use model_config::{DEFAULT_FORECASTER_PATH, DEFAULT_REGRESSOR_PATH, ModelEnvConfig};
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::{ErrorStatusPolicy, ServerEnvConfig};
pub use store_config::{DEFAULT_STORE_TABLE, StoreEnvConfig, StoreSettings};

use anyhow::{Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Source of configuration values, `std::env::var` in production
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parse `key` if present, otherwise fall back to `default`.
pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}='{}': {}", key, raw, e)),
        _ => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub models: ModelEnvConfig,
    pub store: StoreEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            server: ServerEnvConfig::from_lookup(lookup).context("Failed to load server config")?,
            models: ModelEnvConfig::from_lookup(lookup),
            store: StoreEnvConfig::from_lookup(lookup).context("Failed to load store config")?,
            observability: ObservabilityEnvConfig::from_lookup(lookup)
                .context("Failed to load observability config")?,
        })
    }
}
