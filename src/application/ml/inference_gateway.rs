use super::predictor::{Forecaster, Regressor};
use crate::domain::errors::InferenceError;
use crate::domain::features::FeatureRow;
use crate::domain::prediction::InferenceResult;
use std::sync::Arc;
use tracing::debug;

/// Forecast horizon requested from the forecaster on every call
pub const FORECAST_STEPS: usize = 1;

/// Runs both models on one feature row.
///
/// The two invocations are independent: the regressor sees the row, the
/// forecaster only projects its own history one step ahead. Either failing
/// fails the whole call.
#[derive(Clone)]
pub struct InferenceGateway {
    regressor: Arc<dyn Regressor>,
    forecaster: Arc<dyn Forecaster>,
}

impl InferenceGateway {
    pub fn new(regressor: Arc<dyn Regressor>, forecaster: Arc<dyn Forecaster>) -> Self {
        Self {
            regressor,
            forecaster,
        }
    }

    pub fn infer(&self, features: &FeatureRow) -> Result<InferenceResult, InferenceError> {
        let point_estimate = self.regressor.predict(features)?;

        let forecast_estimate = self
            .forecaster
            .forecast(FORECAST_STEPS)?
            .first()
            .copied()
            .ok_or(InferenceError::EmptyForecast {
                steps: FORECAST_STEPS,
            })?;

        debug!(
            regressor = self.regressor.name(),
            forecaster = self.forecaster.name(),
            point_estimate,
            forecast_estimate,
            "Inference complete"
        );

        Ok(InferenceResult::new(point_estimate, forecast_estimate))
    }
}
