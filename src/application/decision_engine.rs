//! Decision rules turning raw model outputs into advisories.
//!
//! Pure and total: no I/O, same input gives the same output.
//!
//! - level: `< 1` CRITICAL, `[1, 3)` BELOW_AVERAGE, `>= 3` STABLE
//! - recharge: forecast strictly above the point estimate is IMPROVING,
//!   anything else (ties included) is AT_RISK
//!
//! Non-finite inputs: a NaN/infinite point estimate is CRITICAL, and any
//! non-finite value on either side is AT_RISK.

use crate::domain::advisory::{Advisory, LevelStatus, RechargeStatus};
use crate::domain::prediction::InferenceResult;

/// Lower bound of the BELOW_AVERAGE bracket (inclusive)
pub const CRITICAL_LEVEL_THRESHOLD: f64 = 1.0;
/// Lower bound of the STABLE bracket (inclusive)
pub const STABLE_LEVEL_THRESHOLD: f64 = 3.0;

pub fn decide(result: &InferenceResult) -> Advisory {
    Advisory {
        level_status: level_status(result.point_estimate),
        recharge_status: recharge_status(result.point_estimate, result.forecast_estimate),
    }
}

pub fn level_status(point_estimate: f64) -> LevelStatus {
    if !point_estimate.is_finite() || point_estimate < CRITICAL_LEVEL_THRESHOLD {
        LevelStatus::Critical
    } else if point_estimate < STABLE_LEVEL_THRESHOLD {
        LevelStatus::BelowAverage
    } else {
        LevelStatus::Stable
    }
}

pub fn recharge_status(point_estimate: f64, forecast_estimate: f64) -> RechargeStatus {
    if point_estimate.is_finite()
        && forecast_estimate.is_finite()
        && forecast_estimate > point_estimate
    {
        RechargeStatus::Improving
    } else {
        RechargeStatus::AtRisk
    }
}
