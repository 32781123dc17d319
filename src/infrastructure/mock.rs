use crate::application::ml::predictor::{Forecaster, Regressor};
use crate::domain::errors::{InferenceError, PersistenceError};
use crate::domain::features::FeatureRow;
use crate::domain::prediction::{NewPredictionRecord, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum RegressorBehavior {
    Constant(f64),
    Echo(String),
    Failing(String),
}

/// Scripted regressor for tests and local runs without model artifacts
#[derive(Debug, Clone)]
pub struct MockRegressor {
    behavior: RegressorBehavior,
}

impl MockRegressor {
    /// Always returns `value`, whatever the row contains
    pub fn constant(value: f64) -> Self {
        Self {
            behavior: RegressorBehavior::Constant(value),
        }
    }

    /// Returns the value of `feature`, as a model trained to output it directly would
    pub fn echo(feature: &str) -> Self {
        Self {
            behavior: RegressorBehavior::Echo(feature.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            behavior: RegressorBehavior::Failing(reason.to_string()),
        }
    }
}

impl Regressor for MockRegressor {
    fn predict(&self, features: &FeatureRow) -> Result<f64, InferenceError> {
        match &self.behavior {
            RegressorBehavior::Constant(v) => Ok(*v),
            RegressorBehavior::Echo(name) => features.get_f64(name),
            RegressorBehavior::Failing(reason) => Err(InferenceError::Regressor {
                reason: reason.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "Mock Regressor"
    }
}

#[derive(Debug, Clone)]
enum ForecasterBehavior {
    Constant(f64),
    Empty,
    Failing(String),
}

/// Scripted forecaster for tests
#[derive(Debug, Clone)]
pub struct MockForecaster {
    behavior: ForecasterBehavior,
}

impl MockForecaster {
    pub fn constant(value: f64) -> Self {
        Self {
            behavior: ForecasterBehavior::Constant(value),
        }
    }

    pub fn empty() -> Self {
        Self {
            behavior: ForecasterBehavior::Empty,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            behavior: ForecasterBehavior::Failing(reason.to_string()),
        }
    }
}

impl Forecaster for MockForecaster {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, InferenceError> {
        match &self.behavior {
            ForecasterBehavior::Constant(v) => Ok(vec![*v; steps]),
            ForecasterBehavior::Empty => Ok(Vec::new()),
            ForecasterBehavior::Failing(reason) => Err(InferenceError::Forecaster {
                reason: reason.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "Mock Forecaster"
    }
}

/// Store that is always unreachable. Counts attempted writes.
#[derive(Debug, Default)]
pub struct UnreachablePredictionRepository {
    attempts: AtomicUsize,
}

impl UnreachablePredictionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionRepository for UnreachablePredictionRepository {
    async fn insert(&self, _record: &NewPredictionRecord) -> Result<(), PersistenceError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PersistenceError::Unreachable {
            reason: "connection refused".to_string(),
        })
    }

    async fn find_recent(&self, _limit: usize) -> Result<Vec<PredictionRecord>, PersistenceError> {
        Err(PersistenceError::Unreachable {
            reason: "connection refused".to_string(),
        })
    }

    fn backend(&self) -> &str {
        "unreachable"
    }
}
