//! Request-time feature rows.
//!
//! A `FeatureRow` is one JSON object of `feature name -> scalar`. The schema is
//! whatever the regressor was trained on; this type only knows how to read a
//! named value as `f64` and keeps the original object untouched so it can be
//! persisted verbatim.

use crate::domain::errors::InferenceError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRow(Map<String, Value>);

impl FeatureRow {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Read a feature as a float.
    ///
    /// Numbers are taken as-is, booleans map to 1.0/0.0 and strings must parse
    /// as a float. `null` counts as missing.
    pub fn get_f64(&self, name: &str) -> Result<f64, InferenceError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(InferenceError::MissingFeature {
                name: name.to_string(),
            }),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| InferenceError::InvalidFeature {
                name: name.to_string(),
                reason: format!("number {} is not representable as f64", n),
            }),
            Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
            Some(Value::String(s)) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| InferenceError::InvalidFeature {
                        name: name.to_string(),
                        reason: format!("could not convert string '{}' to float", s),
                    })
            }
            Some(other) => Err(InferenceError::InvalidFeature {
                name: name.to_string(),
                reason: format!("expected a scalar, got {}", kind(other)),
            }),
        }
    }

    /// Project the row onto an ordered feature list, failing on the first bad field.
    pub fn to_vector(&self, feature_names: &[String]) -> Result<Vec<f64>, InferenceError> {
        feature_names.iter().map(|name| self.get_f64(name)).collect()
    }
}

impl TryFrom<Value> for FeatureRow {
    type Error = InferenceError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(InferenceError::InvalidInput {
                reason: format!("expected a JSON object of features, got {}", kind(&other)),
            }),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_coerced_values() {
        let row = FeatureRow::new()
            .with("rainfall_mm", 12.5)
            .with("month", 7)
            .with("irrigated", true)
            .with("temperature", " 24.1 ");

        assert_eq!(row.get_f64("rainfall_mm").unwrap(), 12.5);
        assert_eq!(row.get_f64("month").unwrap(), 7.0);
        assert_eq!(row.get_f64("irrigated").unwrap(), 1.0);
        assert_eq!(row.get_f64("temperature").unwrap(), 24.1);
    }

    #[test]
    fn test_missing_and_null_are_missing() {
        let row = FeatureRow::new().with("rainfall_mm", Value::Null);

        assert_eq!(
            row.get_f64("rainfall_mm"),
            Err(InferenceError::MissingFeature {
                name: "rainfall_mm".to_string()
            })
        );
        assert!(matches!(
            row.get_f64("evaporation"),
            Err(InferenceError::MissingFeature { .. })
        ));
    }

    #[test]
    fn test_wrong_types_are_invalid() {
        let row = FeatureRow::new()
            .with("a", "wet")
            .with("b", json!([1, 2]))
            .with("c", json!({"v": 1}));

        for name in ["a", "b", "c"] {
            assert!(matches!(
                row.get_f64(name),
                Err(InferenceError::InvalidFeature { .. })
            ));
        }
    }

    #[test]
    fn test_to_vector_follows_requested_order() {
        let row = FeatureRow::new().with("b", 2.0).with("a", 1.0).with("unused", 9.0);
        let names = vec!["a".to_string(), "b".to_string()];

        assert_eq!(row.to_vector(&names).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_try_from_rejects_non_objects() {
        let err = FeatureRow::try_from(json!([1.0, 2.0])).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("array"));

        let row = FeatureRow::try_from(json!({"feature": 0.4})).unwrap();
        assert_eq!(row.get_f64("feature").unwrap(), 0.4);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let row = FeatureRow::new().with("feature", 0.4);
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({"feature": 0.4}));
    }
}
