//! Prediction value types shared by inference, decision and persistence.

use crate::domain::advisory::Advisory;
use crate::domain::features::FeatureRow;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

/// Source tag written with every record produced by this service
pub const PREDICTION_SOURCE: &str = "backend";

/// Raw model outputs for one feature row. Never rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceResult {
    /// Regressor estimate for the current period
    pub point_estimate: f64,
    /// Forecaster projection one step ahead
    pub forecast_estimate: f64,
}

impl InferenceResult {
    pub fn new(point_estimate: f64, forecast_estimate: f64) -> Self {
        Self {
            point_estimate,
            forecast_estimate,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.point_estimate.is_finite() && self.forecast_estimate.is_finite()
    }
}

/// Round to 2 decimal digits for display. Ties go to the even digit.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub level_status: String,
    pub recharge_status: String,
}

impl From<Advisory> for Insights {
    fn from(advisory: Advisory) -> Self {
        Self {
            level_status: advisory.level_status.message().to_string(),
            recharge_status: advisory.recharge_status.message().to_string(),
        }
    }
}

/// Body of a successful `/predict` call, also stored as the record's `prediction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(deserialize_with = "nullable_f64")]
    pub rf_prediction: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub arima_forecast: f64,
    pub insights: Insights,
}

impl PredictionResponse {
    pub fn assemble(result: &InferenceResult, advisory: Advisory) -> Self {
        Self {
            rf_prediction: round2(result.point_estimate),
            arima_forecast: round2(result.forecast_estimate),
            insights: advisory.into(),
        }
    }
}

/// Non-finite values serialize as JSON `null`; read them back as NaN.
fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// A record about to be appended. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPredictionRecord {
    pub input_data: FeatureRow,
    pub prediction: PredictionResponse,
    pub source: String,
}

impl NewPredictionRecord {
    pub fn new(input: FeatureRow, result: &InferenceResult, advisory: Advisory) -> Self {
        Self {
            input_data: input,
            prediction: PredictionResponse::assemble(result, advisory),
            source: PREDICTION_SOURCE.to_string(),
        }
    }
}

/// A stored prediction as read back from the history store.
///
/// Columns this service does not know about are kept in `extra` and written
/// back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub input_data: FeatureRow,
    pub prediction: PredictionResponse,
    pub source: String,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a store timestamp. RFC 3339 first, then the offset-less forms
/// Postgres `timestamp` and SQLite `datetime()` produce, taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::advisory::{LevelStatus, RechargeStatus};
    use serde_json::json;

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.345678), 2.35);
        assert_eq!(round2(0.4), 0.4);
        assert_eq!(round2(-1.004), -1.0);
        assert_eq!(round2(3.0), 3.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn test_response_rounds_only_at_assembly() {
        let result = InferenceResult::new(2.51234, 1.98765);
        let advisory = Advisory {
            level_status: LevelStatus::BelowAverage,
            recharge_status: RechargeStatus::AtRisk,
        };
        let response = PredictionResponse::assemble(&result, advisory);

        assert_eq!(response.rf_prediction, 2.51);
        assert_eq!(response.arima_forecast, 1.99);
        // The raw result keeps full precision
        assert_eq!(result.point_estimate, 2.51234);
    }

    #[test]
    fn test_response_wire_shape() {
        let response = PredictionResponse::assemble(
            &InferenceResult::new(5.0, 6.0),
            Advisory {
                level_status: LevelStatus::Stable,
                recharge_status: RechargeStatus::Improving,
            },
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["rf_prediction"], json!(5.0));
        assert_eq!(value["arima_forecast"], json!(6.0));
        assert_eq!(
            value["insights"]["level_status"],
            json!(LevelStatus::Stable.message())
        );
        assert_eq!(
            value["insights"]["recharge_status"],
            json!(RechargeStatus::Improving.message())
        );
    }

    #[test]
    fn test_record_reads_store_row() {
        let row = json!({
            "id": 7,
            "input_data": {"feature": 0.4},
            "prediction": {
                "rf_prediction": 0.4,
                "arima_forecast": 1.2,
                "insights": {"level_status": "a", "recharge_status": "b"}
            },
            "source": "backend",
            "created_at": "2026-03-01T12:00:00.123456+00:00"
        });

        let record: PredictionRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.source, PREDICTION_SOURCE);
        assert_eq!(record.input_data.get_f64("feature").unwrap(), 0.4);
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_record_accepts_offsetless_timestamps() {
        for raw in ["2026-03-01T12:00:00.123456", "2026-03-01 12:00:00"] {
            let row = json!({
                "input_data": {},
                "prediction": {
                    "rf_prediction": 1.0,
                    "arima_forecast": 1.0,
                    "insights": {"level_status": "a", "recharge_status": "b"}
                },
                "source": "backend",
                "created_at": raw
            });
            let record: PredictionRecord = serde_json::from_value(row).unwrap();
            assert_eq!(record.created_at.to_rfc3339().get(..19), Some("2026-03-01T12:00:00"));
        }

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_record_keeps_unknown_columns() {
        let row = json!({
            "id": 3,
            "input_data": {"feature": 1.0},
            "prediction": {
                "rf_prediction": 1.0,
                "arima_forecast": 2.0,
                "insights": {"level_status": "a", "recharge_status": "b"}
            },
            "source": "backend",
            "created_at": "2026-03-01T12:00:00+00:00",
            "station_id": "north-7"
        });

        let record: PredictionRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.extra.get("station_id"), Some(&json!("north-7")));

        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written["station_id"], json!("north-7"));
        assert_eq!(written["id"], json!(3));
    }

    #[test]
    fn test_non_finite_prediction_reads_back() {
        let advisory = Advisory {
            level_status: LevelStatus::Critical,
            recharge_status: RechargeStatus::AtRisk,
        };
        let response = PredictionResponse::assemble(&InferenceResult::new(f64::NAN, 2.0), advisory);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"rf_prediction\":null"));

        let back: PredictionResponse = serde_json::from_str(&json).unwrap();
        assert!(back.rf_prediction.is_nan());
        assert_eq!(back.arima_forecast, 2.0);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(InferenceResult::new(1.0, 2.0).is_finite());
        assert!(!InferenceResult::new(f64::NAN, 2.0).is_finite());
        assert!(!InferenceResult::new(1.0, f64::INFINITY).is_finite());
    }
}
