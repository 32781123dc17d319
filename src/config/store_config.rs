//! History store configuration.
//!
//! The store is optional. `STORE_URL` picks the backend:
//! - `sqlite://path/to/file.db` (or `sqlite::memory:`) uses a local SQLite file
//! - `http(s)://…` uses a PostgREST-compatible REST store and needs `STORE_KEY`
//!
//! Anything missing or malformed resolves to a `ConfigurationError`, which the
//! bootstrap logs and turns into a disabled (no-op) store.

use super::{Lookup, parse_or};
use crate::domain::errors::ConfigurationError;
use anyhow::Result;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STORE_TABLE: &str = "predictions";

#[derive(Debug, Clone)]
pub struct StoreEnvConfig {
    pub url: Option<String>,
    pub key: Option<String>,
    pub table: String,
    pub queue_capacity: usize,
    pub timeout_secs: u64,
}

impl Default for StoreEnvConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: DEFAULT_STORE_TABLE.to_string(),
            queue_capacity: 256,
            timeout_secs: 10,
        }
    }
}

/// A store that can actually be connected to
#[derive(Debug, Clone, PartialEq)]
pub enum StoreSettings {
    Rest {
        base_url: Url,
        key: String,
        table: String,
        timeout: Duration,
    },
    Sqlite {
        url: String,
    },
}

impl StoreSettings {
    pub fn backend(&self) -> &'static str {
        match self {
            StoreSettings::Rest { .. } => "rest",
            StoreSettings::Sqlite { .. } => "sqlite",
        }
    }
}

impl StoreEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            url: non_empty(lookup("STORE_URL")),
            key: non_empty(lookup("STORE_KEY")),
            table: non_empty(lookup("STORE_TABLE")).unwrap_or(defaults.table),
            queue_capacity: parse_or(lookup, "STORE_QUEUE_CAPACITY", defaults.queue_capacity)?,
            timeout_secs: parse_or(lookup, "STORE_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }

    /// Decide which store to use. Called once at startup.
    pub fn resolve(&self) -> Result<StoreSettings, ConfigurationError> {
        let raw = self.url.as_deref().ok_or(ConfigurationError::MissingStoreUrl)?;

        if raw.starts_with("sqlite:") {
            return Ok(StoreSettings::Sqlite {
                url: raw.to_string(),
            });
        }

        let base_url = Url::parse(raw).map_err(|e| ConfigurationError::InvalidStoreUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidStoreUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }

        let key = self
            .key
            .clone()
            .ok_or_else(|| ConfigurationError::MissingStoreKey {
                url: raw.to_string(),
            })?;

        Ok(StoreSettings::Rest {
            base_url,
            key,
            table: self.table.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
