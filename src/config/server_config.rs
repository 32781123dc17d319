//! HTTP server configuration parsing from environment variables.

use super::{Lookup, parse_or};
use anyhow::Result;
use std::str::FromStr;

/// How `/predict` reports failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStatusPolicy {
    /// HTTP 200 with an `{"error": ...}` body for every failure
    #[default]
    Uniform,
    /// 422 for bad feature rows, 500 for model failures
    Strict,
}

impl FromStr for ErrorStatusPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Ok(ErrorStatusPolicy::Uniform),
            "strict" => Ok(ErrorStatusPolicy::Strict),
            _ => anyhow::bail!(
                "Invalid PREDICT_ERROR_STATUS: {}. Must be 'uniform' or 'strict'",
                s
            ),
        }
    }
}

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub host: String,
    pub port: u16,
    pub error_status: ErrorStatusPolicy,
    pub history_limit: usize,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            error_status: ErrorStatusPolicy::Uniform,
            history_limit: 10,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(lookup, "PORT", defaults.port)?,
            error_status: parse_or(lookup, "PREDICT_ERROR_STATUS", defaults.error_status)?,
            history_limit: parse_or(lookup, "HISTORY_LIMIT", defaults.history_limit)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
