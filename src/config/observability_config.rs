//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the push-based metrics reporter settings.

use super::{Lookup, parse_or};
use anyhow::Result;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            enabled: parse_or(lookup, "OBSERVABILITY_ENABLED", defaults.enabled)?,
            interval_secs: parse_or(lookup, "OBSERVABILITY_INTERVAL", defaults.interval_secs)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_lookup(&|_: &str| None).unwrap();
        assert!(config.enabled);
        assert_eq!(config.interval_secs, 60);
    }

    #[test]
    fn test_observability_can_be_disabled() {
        let config = ObservabilityEnvConfig::from_lookup(&|key: &str| match key {
            "OBSERVABILITY_ENABLED" => Some("false".to_string()),
            "OBSERVABILITY_INTERVAL" => Some("15".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.interval_secs, 15);
    }
}
