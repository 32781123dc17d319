//! Push-based metrics reporter
//!
//! Periodically outputs a metrics snapshot as structured JSON to stdout,
//! alongside the pull-based `/metrics` endpoint.

use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub predictions: PredictionSnapshot,
    pub persistence: PersistenceSnapshot,
}

#[derive(Debug, Serialize)]
pub struct PredictionSnapshot {
    pub success: u64,
    pub input_error: u64,
    pub model_error: u64,
    pub non_finite_outputs: u64,
}

#[derive(Debug, Serialize)]
pub struct PersistenceSnapshot {
    pub backend: String,
    pub written: u64,
    pub failed: u64,
    pub dropped: u64,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
pub struct MetricsReporter {
    metrics: Metrics,
    backend: String,
    interval: Duration,
}

impl MetricsReporter {
    /// Create a new metrics reporter
    ///
    /// # Arguments
    /// * `metrics` - Prometheus metrics shared with the request path
    /// * `backend` - Persistence backend whose write counters are reported
    /// * `interval_seconds` - How often to output metrics (default: 60)
    pub fn new(metrics: Metrics, backend: &str, interval_seconds: u64) -> Self {
        Self {
            metrics,
            backend: backend.to_string(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    // Use a special prefix so logs can be easily filtered
                    println!("METRICS_JSON:{}", json);
                    info!(
                        "Predictions: {} ok / {} failed | Uptime: {}s",
                        snapshot.predictions.success,
                        snapshot.predictions.input_error + snapshot.predictions.model_error,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    /// Collect current metrics snapshot
    fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.metrics.refresh_uptime();
        let predictions = |outcome: &str| {
            Metrics::counter_value(&self.metrics.predictions_total, &[outcome]) as u64
        };
        let writes = |outcome: &str| {
            Metrics::counter_value(
                &self.metrics.persistence_writes_total,
                &[self.backend.as_str(), outcome],
            ) as u64
        };

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            predictions: PredictionSnapshot {
                success: predictions("success"),
                input_error: predictions("input_error"),
                model_error: predictions("model_error"),
                non_finite_outputs: self.metrics.non_finite_outputs_total.get() as u64,
            },
            persistence: PersistenceSnapshot {
                backend: self.backend.clone(),
                written: writes("ok"),
                failed: writes("failed"),
                dropped: writes("dropped"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot_collection() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_predictions("success");
        metrics.inc_predictions("success");
        metrics.inc_predictions("model_error");
        metrics.inc_persistence("sqlite", "ok");
        metrics.inc_persistence("sqlite", "dropped");

        let reporter = MetricsReporter::new(metrics, "sqlite", 60);
        let snapshot = reporter.collect_snapshot();

        assert_eq!(snapshot.predictions.success, 2);
        assert_eq!(snapshot.predictions.model_error, 1);
        assert_eq!(snapshot.persistence.written, 1);
        assert_eq!(snapshot.persistence.dropped, 1);
        assert!(!snapshot.timestamp.is_empty());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = MetricsSnapshot {
            timestamp: "2026-01-10T10:00:00Z".to_string(),
            uptime_seconds: 3600,
            version: "0.4.2".to_string(),
            predictions: PredictionSnapshot {
                success: 120,
                input_error: 3,
                model_error: 0,
                non_finite_outputs: 0,
            },
            persistence: PersistenceSnapshot {
                backend: "rest".to_string(),
                written: 118,
                failed: 2,
                dropped: 0,
            },
        };

        let json = serde_json::to_string(&snapshot).expect("Failed to serialize");
        assert!(json.contains("\"backend\":\"rest\""));
        assert!(json.contains("\"success\":120"));
    }
}
