//! Observability for the advisory service
//!
//! Metrics are exposed two ways:
//!
//! 1. **Prometheus text** on `GET /metrics`
//! 2. **Structured JSON Logs**: periodic `METRICS_JSON:` lines on stdout (for Loki, Fluentd, CloudWatch)

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
