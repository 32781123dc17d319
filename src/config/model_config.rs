//! Model artifact locations.

use super::Lookup;
use std::path::PathBuf;

pub const DEFAULT_REGRESSOR_PATH: &str = "models/random_forest_model.json";
pub const DEFAULT_FORECASTER_PATH: &str = "models/arima_model.json";

#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub regressor_path: PathBuf,
    pub forecaster_path: PathBuf,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            regressor_path: PathBuf::from(DEFAULT_REGRESSOR_PATH),
            forecaster_path: PathBuf::from(DEFAULT_FORECASTER_PATH),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let defaults = Self::default();
        Self {
            regressor_path: lookup("REGRESSOR_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.regressor_path),
            forecaster_path: lookup("FORECASTER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.forecaster_path),
        }
    }
}
