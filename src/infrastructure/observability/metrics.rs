//! Prometheus metrics definitions for the advisory service
//!
//! All metrics use the `groundwater_` prefix.

use crate::domain::advisory::Advisory;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;
use std::time::Instant;

/// Prometheus metrics for the prediction pipeline
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    started_at: Instant,
    /// Predict calls by outcome (success, input_error, model_error)
    pub predictions_total: CounterVec,
    /// Advisories issued by level and recharge status
    pub advisories_total: CounterVec,
    /// Model outputs that were NaN or infinite
    pub non_finite_outputs_total: Counter,
    /// Inference latency in seconds (both models)
    pub inference_latency_seconds: Histogram,
    /// History store writes by backend and outcome (ok, failed, dropped)
    pub persistence_writes_total: CounterVec,
    /// History reads by outcome (ok, degraded)
    pub history_reads_total: CounterVec,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("groundwater_predictions_total", "Predict calls by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let advisories_total = CounterVec::new(
            Opts::new(
                "groundwater_advisories_total",
                "Advisories issued by level and recharge status",
            ),
            &["level_status", "recharge_status"],
        )?;
        registry.register(Box::new(advisories_total.clone()))?;

        let non_finite_outputs_total = Counter::with_opts(Opts::new(
            "groundwater_non_finite_outputs_total",
            "Model outputs that were NaN or infinite",
        ))?;
        registry.register(Box::new(non_finite_outputs_total.clone()))?;

        let inference_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "groundwater_inference_latency_seconds",
                "Time spent evaluating both models",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5,
            ]),
        )?;
        registry.register(Box::new(inference_latency_seconds.clone()))?;

        let persistence_writes_total = CounterVec::new(
            Opts::new(
                "groundwater_persistence_writes_total",
                "History store writes by backend and outcome",
            ),
            &["backend", "outcome"],
        )?;
        registry.register(Box::new(persistence_writes_total.clone()))?;

        let history_reads_total = CounterVec::new(
            Opts::new("groundwater_history_reads_total", "History reads by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(history_reads_total.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "groundwater_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            started_at: Instant::now(),
            predictions_total,
            advisories_total,
            non_finite_outputs_total,
            inference_latency_seconds,
            persistence_writes_total,
            history_reads_total,
            uptime_seconds,
        })
    }

    /// Seconds since the registry was created, also published as the uptime gauge
    pub fn refresh_uptime(&self) -> u64 {
        let uptime = self.started_at.elapsed().as_secs();
        self.uptime_seconds.set(uptime as f64);
        uptime
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.refresh_uptime();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_predictions(&self, outcome: &str) {
        self.predictions_total.with_label_values(&[outcome]).inc();
    }

    pub fn inc_advisory(&self, advisory: &Advisory) {
        self.advisories_total
            .with_label_values(&[
                advisory.level_status.code(),
                advisory.recharge_status.code(),
            ])
            .inc();
    }

    pub fn inc_persistence(&self, backend: &str, outcome: &str) {
        self.persistence_writes_total
            .with_label_values(&[backend, outcome])
            .inc();
    }

    pub fn inc_history_reads(&self, outcome: &str) {
        self.history_reads_total.with_label_values(&[outcome]).inc();
    }

    /// Current value of one label combination of a counter
    pub fn counter_value(counter: &CounterVec, label_values: &[&str]) -> f64 {
        counter.with_label_values(label_values).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::advisory::{LevelStatus, RechargeStatus};

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        let output = metrics.render();
        assert!(output.contains("groundwater_uptime_seconds"));
        assert!(output.contains("groundwater_inference_latency_seconds"));
    }

    #[test]
    fn test_prediction_counter() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_predictions("success");
        metrics.inc_predictions("success");
        metrics.inc_predictions("input_error");

        assert_eq!(Metrics::counter_value(&metrics.predictions_total, &["success"]), 2.0);
        let output = metrics.render();
        assert!(output.contains("groundwater_predictions_total"));
        assert!(output.contains("input_error"));
    }

    #[test]
    fn test_advisory_labels_use_codes() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_advisory(&Advisory {
            level_status: LevelStatus::BelowAverage,
            recharge_status: RechargeStatus::AtRisk,
        });

        let output = metrics.render();
        assert!(output.contains("level_status=\"BELOW_AVERAGE\""));
        assert!(output.contains("recharge_status=\"AT_RISK\""));
    }

    #[test]
    fn test_persistence_counter() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_persistence("sqlite", "ok");
        metrics.inc_persistence("rest", "failed");

        assert_eq!(
            Metrics::counter_value(&metrics.persistence_writes_total, &["rest", "failed"]),
            1.0
        );
    }
}
