use crate::domain::advisory::Advisory;
use crate::domain::errors::PersistenceError;
use crate::domain::features::FeatureRow;
use crate::domain::prediction::{InferenceResult, NewPredictionRecord, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use crate::infrastructure::observability::Metrics;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of records served by the history endpoint
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Append/query contract for prediction history.
///
/// `record` reports store failures to its caller; `recent_history` never
/// fails and degrades to an empty list instead.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn record(
        &self,
        input: FeatureRow,
        result: &InferenceResult,
        advisory: Advisory,
    ) -> Result<(), PersistenceError>;

    async fn recent_history(&self, limit: usize) -> Vec<PredictionRecord>;

    /// Backend name, `"disabled"` for the no-op gateway
    fn backend(&self) -> &str;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Gateway over a configured history store
pub struct StoreGateway {
    repository: Arc<dyn PredictionRepository>,
    metrics: Metrics,
}

impl StoreGateway {
    pub fn new(repository: Arc<dyn PredictionRepository>, metrics: Metrics) -> Self {
        Self {
            repository,
            metrics,
        }
    }
}

#[async_trait]
impl PersistenceGateway for StoreGateway {
    async fn record(
        &self,
        input: FeatureRow,
        result: &InferenceResult,
        advisory: Advisory,
    ) -> Result<(), PersistenceError> {
        let record = NewPredictionRecord::new(input, result, advisory);
        let backend = self.repository.backend();

        match self.repository.insert(&record).await {
            Ok(()) => {
                self.metrics.inc_persistence(backend, "ok");
                debug!(backend, "Prediction recorded");
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_persistence(backend, "failed");
                Err(e)
            }
        }
    }

    async fn recent_history(&self, limit: usize) -> Vec<PredictionRecord> {
        if limit == 0 {
            return Vec::new();
        }

        match self.repository.find_recent(limit).await {
            Ok(mut records) => {
                // Stores are asked for newest-first; enforce it regardless of backend quirks.
                records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                records.truncate(limit);
                self.metrics.inc_history_reads("ok");
                records
            }
            Err(e) => {
                warn!(
                    backend = self.repository.backend(),
                    "History unavailable, returning empty list: {}", e
                );
                self.metrics.inc_history_reads("degraded");
                Vec::new()
            }
        }
    }

    fn backend(&self) -> &str {
        self.repository.backend()
    }
}

/// Gateway used when no store is configured: writes are dropped, history is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGateway;

#[async_trait]
impl PersistenceGateway for DisabledGateway {
    async fn record(
        &self,
        _input: FeatureRow,
        _result: &InferenceResult,
        _advisory: Advisory,
    ) -> Result<(), PersistenceError> {
        debug!("Persistence disabled, prediction not recorded");
        Ok(())
    }

    async fn recent_history(&self, _limit: usize) -> Vec<PredictionRecord> {
        Vec::new()
    }

    fn backend(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
