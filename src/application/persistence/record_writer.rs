//! Background writer for prediction history.
//!
//! Request handlers hand records to a `RecordSink` without awaiting the store.
//! A single writer task drains the channel in order, so the history stays
//! append-only with one writer. Store failures are logged and dropped.

use super::gateway::PersistenceGateway;
use crate::domain::advisory::Advisory;
use crate::domain::features::FeatureRow;
use crate::domain::prediction::InferenceResult;
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Default capacity of the pending-record queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug)]
struct PendingRecord {
    input: FeatureRow,
    result: InferenceResult,
    advisory: Advisory,
}

/// Cheap, cloneable handle used by request handlers to submit records
#[derive(Clone)]
pub struct RecordSink {
    tx: Sender<PendingRecord>,
    backend: String,
    metrics: Metrics,
}

impl RecordSink {
    /// Queue a record for persistence. Never waits: a full or closed queue drops it.
    pub fn submit(&self, input: FeatureRow, result: InferenceResult, advisory: Advisory) {
        let pending = PendingRecord {
            input,
            result,
            advisory,
        };

        match self.tx.try_send(pending) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(backend = %self.backend, "Record queue full, dropping prediction record");
                self.metrics.inc_persistence(&self.backend, "dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(backend = %self.backend, "Record writer stopped, dropping prediction record");
                self.metrics.inc_persistence(&self.backend, "dropped");
            }
        }
    }
}

pub struct RecordWriter {
    gateway: Arc<dyn PersistenceGateway>,
    rx: Receiver<PendingRecord>,
}

impl RecordWriter {
    /// Spawn the writer task. It exits once every `RecordSink` clone is dropped
    /// and the queue has been drained.
    pub fn spawn(
        gateway: Arc<dyn PersistenceGateway>,
        capacity: usize,
        metrics: Metrics,
    ) -> (RecordSink, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink = RecordSink {
            tx,
            backend: gateway.backend().to_string(),
            metrics,
        };
        let writer = RecordWriter { gateway, rx };
        let handle = tokio::spawn(writer.run());
        (sink, handle)
    }

    async fn run(mut self) {
        info!(
            backend = self.gateway.backend(),
            "RecordWriter: started (enabled: {})",
            self.gateway.is_enabled()
        );

        let mut written = 0usize;
        let mut failed = 0usize;

        while let Some(pending) = self.rx.recv().await {
            match self
                .gateway
                .record(pending.input, &pending.result, pending.advisory)
                .await
            {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        backend = self.gateway.backend(),
                        "Failed to persist prediction: {}", e
                    );
                }
            }
        }

        info!(written, failed, "RecordWriter: queue closed, exiting");
    }
}
