use serde::{Deserialize, Serialize};
use std::fmt;

/// Groundwater level bracket derived from the regressor's point estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelStatus {
    Critical,
    BelowAverage,
    Stable,
}

impl LevelStatus {
    /// Human-readable advisory shown to API callers
    pub fn message(&self) -> &'static str {
        match self {
            LevelStatus::Critical => "🚨 Groundwater level is critically low.",
            LevelStatus::BelowAverage => "⚠️ Groundwater level is below average, monitor closely.",
            LevelStatus::Stable => "✅ Groundwater level is stable.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LevelStatus::Critical => "CRITICAL",
            LevelStatus::BelowAverage => "BELOW_AVERAGE",
            LevelStatus::Stable => "STABLE",
        }
    }
}

impl fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Recharge trend derived from comparing the forecast against the point estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RechargeStatus {
    Improving,
    AtRisk,
}

impl RechargeStatus {
    pub fn message(&self) -> &'static str {
        match self {
            RechargeStatus::Improving => {
                "🌧️ Groundwater recharge is improving after recent rainfall."
            }
            RechargeStatus::AtRisk => "⚠️ Recharge rate is low, risk of depletion ahead.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RechargeStatus::Improving => "IMPROVING",
            RechargeStatus::AtRisk => "AT_RISK",
        }
    }
}

impl fmt::Display for RechargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Pair of categorical labels derived from one inference result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Advisory {
    pub level_status: LevelStatus,
    pub recharge_status: RechargeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_serde_names() {
        let json = serde_json::to_string(&LevelStatus::BelowAverage).unwrap();
        assert_eq!(json, "\"BELOW_AVERAGE\"");
        assert_eq!(LevelStatus::BelowAverage.to_string(), "BELOW_AVERAGE");

        let json = serde_json::to_string(&RechargeStatus::AtRisk).unwrap();
        assert_eq!(json, "\"AT_RISK\"");
        assert_eq!(RechargeStatus::AtRisk.to_string(), "AT_RISK");
    }

    #[test]
    fn test_messages_are_distinct() {
        assert_ne!(LevelStatus::Critical.message(), LevelStatus::Stable.message());
        assert!(LevelStatus::Critical.message().contains("critically low"));
        assert!(RechargeStatus::Improving.message().contains("improving"));
        assert!(RechargeStatus::AtRisk.message().contains("depletion"));
    }
}
