use super::arima_forecaster::ArimaForecaster;
use super::inference_gateway::InferenceGateway;
use super::predictor::{Forecaster, Regressor};
use super::random_forest_regressor::RandomForestLevelRegressor;
use crate::config::ModelEnvConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Both models, loaded once and shared read-only for the process lifetime
#[derive(Clone)]
pub struct ModelRegistry {
    regressor: Arc<dyn Regressor>,
    forecaster: Arc<dyn Forecaster>,
}

impl ModelRegistry {
    pub fn new(regressor: Arc<dyn Regressor>, forecaster: Arc<dyn Forecaster>) -> Self {
        Self {
            regressor,
            forecaster,
        }
    }

    /// Load both artifacts. Either one failing aborts startup.
    pub fn load(config: &ModelEnvConfig) -> Result<Self> {
        let regressor = RandomForestLevelRegressor::load(&config.regressor_path)
            .context("Failed to load regressor")?;
        let forecaster = ArimaForecaster::load(&config.forecaster_path)
            .context("Failed to load forecaster")?;

        info!(
            "ModelRegistry: {} + {} ready",
            regressor.name(),
            forecaster.name()
        );

        Ok(Self::new(Arc::new(regressor), Arc::new(forecaster)))
    }

    pub fn regressor(&self) -> Arc<dyn Regressor> {
        self.regressor.clone()
    }

    pub fn forecaster(&self) -> Arc<dyn Forecaster> {
        self.forecaster.clone()
    }

    pub fn inference_gateway(&self) -> InferenceGateway {
        InferenceGateway::new(self.regressor(), self.forecaster())
    }
}
