pub mod arima_forecaster;
pub mod inference_gateway;
pub mod model_registry;
pub mod predictor;
pub mod random_forest_regressor;

pub use inference_gateway::InferenceGateway;
pub use model_registry::ModelRegistry;
pub use predictor::{Forecaster, Regressor};
