//! Repository Pattern Abstractions
//!
//! `PredictionRepository` is the contract every history store implements:
//! append one record, read the most recent ones back.
//!
//! # Implementations
//!
//! - `RestPredictionRepository`: PostgREST-compatible HTTP store (e.g. Supabase)
//! - `SqlitePredictionRepository`: local SQLite file via sqlx
//! - `InMemoryPredictionRepository`: `Arc<RwLock>` backed, for tests and development
//!
//! The store owns `id` and `created_at` assignment. Records are append-only.

use crate::domain::errors::PersistenceError;
use crate::domain::prediction::{NewPredictionRecord, PredictionRecord};
use async_trait::async_trait;

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Append a prediction record
    async fn insert(&self, record: &NewPredictionRecord) -> Result<(), PersistenceError>;

    /// Most recent records first, at most `limit`
    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, PersistenceError>;

    /// Short backend name for logs and metrics
    fn backend(&self) -> &str;
}
