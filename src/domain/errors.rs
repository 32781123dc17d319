use thiserror::Error;

/// Errors raised while turning a feature row into model outputs
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Missing required feature: {name}")]
    MissingFeature { name: String },

    #[error("Invalid value for feature '{name}': {reason}")]
    InvalidFeature { name: String, reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Regressor failed: {reason}")]
    Regressor { reason: String },

    #[error("Forecaster failed: {reason}")]
    Forecaster { reason: String },

    #[error("Forecaster returned no value for {steps} step(s)")]
    EmptyForecast { steps: usize },
}

impl InferenceError {
    /// True when the caller sent a bad feature row, as opposed to a model fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            InferenceError::MissingFeature { .. }
                | InferenceError::InvalidFeature { .. }
                | InferenceError::InvalidInput { .. }
        )
    }
}

/// Errors related to the prediction history store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Store unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to decode stored record: {reason}")]
    Decode { reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Decode {
            reason: e.to_string(),
        }
    }
}

/// Store configuration problems. Never user-visible: they degrade persistence to a no-op.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("STORE_URL is not set")]
    MissingStoreUrl,

    #[error("STORE_KEY is not set for REST store at {url}")]
    MissingStoreKey { url: String },

    #[error("Invalid STORE_URL '{url}': {reason}")]
    InvalidStoreUrl { url: String, reason: String },
}
