use crate::domain::errors::InferenceError;
use crate::domain::features::FeatureRow;

/// Point-estimate model evaluated on one feature row
pub trait Regressor: Send + Sync {
    /// Predict the same-period estimate for `features`
    fn predict(&self, features: &FeatureRow) -> Result<f64, InferenceError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Time-series model that projects forward from its own retained history
pub trait Forecaster: Send + Sync {
    /// Forecast `steps` values past the end of the retained series
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, InferenceError>;

    fn name(&self) -> &str;
}
