//! In-memory prediction history.
//!
//! Thread-safe through `Arc<RwLock>`. Used by tests and by local runs that
//! want `/history` without an external store. Data is lost on restart.

use crate::domain::errors::PersistenceError;
use crate::domain::prediction::{NewPredictionRecord, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of `PredictionRepository`.
/// Assigns ids and strictly increasing `created_at` timestamps on insert.
#[derive(Clone)]
pub struct InMemoryPredictionRepository {
    records: Arc<RwLock<Vec<PredictionRecord>>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryPredictionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn insert(&self, record: &NewPredictionRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.write().await;

        let mut created_at = Utc::now();
        if let Some(last) = records.last()
            && created_at <= last.created_at
        {
            created_at = last.created_at + Duration::microseconds(1);
        }

        let id = records.len() as i64 + 1;
        records.push(PredictionRecord {
            id: Some(id),
            input_data: record.input_data.clone(),
            prediction: record.prediction.clone(),
            source: record.source.clone(),
            created_at,
            extra: Default::default(),
        });
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, PersistenceError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn backend(&self) -> &str {
        "memory"
    }
}
