//! Predict and History request orchestration.
//!
//! Predict runs Inference, Decision and response assembly synchronously, then
//! hands the record to the background writer. The response never depends on
//! the store.

use crate::application::decision_engine::decide;
use crate::application::ml::InferenceGateway;
use crate::application::persistence::{PersistenceGateway, RecordSink};
use crate::domain::errors::InferenceError;
use crate::domain::features::FeatureRow;
use crate::domain::prediction::{PredictionRecord, PredictionResponse};
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

pub struct PredictionService {
    inference: InferenceGateway,
    persistence: Arc<dyn PersistenceGateway>,
    sink: RecordSink,
    metrics: Metrics,
    history_limit: usize,
}

impl PredictionService {
    pub fn new(
        inference: InferenceGateway,
        persistence: Arc<dyn PersistenceGateway>,
        sink: RecordSink,
        metrics: Metrics,
        history_limit: usize,
    ) -> Self {
        Self {
            inference,
            persistence,
            sink,
            metrics,
            history_limit,
        }
    }

    pub fn predict(&self, features: FeatureRow) -> Result<PredictionResponse, InferenceError> {
        let span = info_span!("predict", request_id = %Uuid::new_v4());
        let _enter = span.enter();

        let started = Instant::now();
        let inferred = self.inference.infer(&features);
        self.metrics
            .inference_latency_seconds
            .observe(started.elapsed().as_secs_f64());

        let result = match inferred {
            Ok(result) => result,
            Err(e) => {
                let outcome = if e.is_input_error() {
                    "input_error"
                } else {
                    "model_error"
                };
                self.metrics.inc_predictions(outcome);
                warn!(outcome, "Prediction failed: {}", e);
                return Err(e);
            }
        };

        if !result.is_finite() {
            self.metrics.non_finite_outputs_total.inc();
            warn!(
                point_estimate = result.point_estimate,
                forecast_estimate = result.forecast_estimate,
                "Model produced a non-finite output"
            );
        }

        let advisory = decide(&result);
        let response = PredictionResponse::assemble(&result, advisory);

        self.sink.submit(features, result, advisory);

        self.metrics.inc_predictions("success");
        self.metrics.inc_advisory(&advisory);
        debug!(
            level_status = %advisory.level_status,
            recharge_status = %advisory.recharge_status,
            "Prediction served"
        );

        Ok(response)
    }

    /// Most recent records, newest first. Empty when the store is unavailable.
    pub async fn history(&self) -> Vec<PredictionRecord> {
        self.persistence.recent_history(self.history_limit).await
    }

    pub fn persistence_backend(&self) -> &str {
        self.persistence.backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::persistence::{DisabledGateway, RecordWriter, StoreGateway};
    use crate::domain::advisory::{LevelStatus, RechargeStatus};
    use crate::infrastructure::mock::{
        MockForecaster, MockRegressor, UnreachablePredictionRepository,
    };
    use crate::infrastructure::repositories::InMemoryPredictionRepository;
    use tokio::task::JoinHandle;

    fn service_with(
        regressor: MockRegressor,
        forecaster: MockForecaster,
        persistence: Arc<dyn PersistenceGateway>,
    ) -> (PredictionService, JoinHandle<()>) {
        let metrics = Metrics::new().unwrap();
        let (sink, handle) = RecordWriter::spawn(persistence.clone(), 16, metrics.clone());
        let inference = InferenceGateway::new(Arc::new(regressor), Arc::new(forecaster));
        let service = PredictionService::new(inference, persistence, sink, metrics, 10);
        (service, handle)
    }

    fn row() -> FeatureRow {
        FeatureRow::new().with("feature", 1.0)
    }

    #[tokio::test]
    async fn test_scenario_critical_level() {
        let (service, _) = service_with(
            MockRegressor::constant(0.4),
            MockForecaster::constant(1.0),
            Arc::new(DisabledGateway),
        );

        let response = service.predict(row()).unwrap();
        assert_eq!(response.rf_prediction, 0.4);
        assert_eq!(response.arima_forecast, 1.0);
        assert_eq!(
            response.insights.level_status,
            LevelStatus::Critical.message()
        );
    }

    #[tokio::test]
    async fn test_scenario_below_average_at_risk() {
        let (service, _) = service_with(
            MockRegressor::constant(2.5),
            MockForecaster::constant(2.0),
            Arc::new(DisabledGateway),
        );

        let response = service.predict(row()).unwrap();
        assert_eq!(
            response.insights.level_status,
            LevelStatus::BelowAverage.message()
        );
        assert_eq!(
            response.insights.recharge_status,
            RechargeStatus::AtRisk.message()
        );
    }

    #[tokio::test]
    async fn test_scenario_stable_improving_is_recorded() {
        let metrics = Metrics::new().unwrap();
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let gateway: Arc<dyn PersistenceGateway> =
            Arc::new(StoreGateway::new(repo.clone(), metrics.clone()));
        let (service, handle) = service_with(
            MockRegressor::constant(5.0),
            MockForecaster::constant(6.0),
            gateway,
        );

        let response = service.predict(row()).unwrap();
        assert_eq!(response.insights.level_status, LevelStatus::Stable.message());
        assert_eq!(
            response.insights.recharge_status,
            RechargeStatus::Improving.message()
        );

        // Dropping the service closes the queue and lets the writer drain
        let history_gateway = StoreGateway::new(repo, metrics);
        drop(service);
        handle.await.unwrap();

        let history = history_gateway.recent_history(10).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prediction, response);
        assert_eq!(history[0].source, "backend");
    }

    #[tokio::test]
    async fn test_regressor_failure_records_nothing() {
        let metrics = Metrics::new().unwrap();
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let (service, handle) = service_with(
            MockRegressor::failing("tree ensemble unavailable"),
            MockForecaster::constant(2.0),
            Arc::new(StoreGateway::new(repo.clone(), metrics)),
        );

        let err = service.predict(row()).unwrap_err();
        assert!(matches!(err, InferenceError::Regressor { .. }));

        drop(service);
        handle.await.unwrap();
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_change_response() {
        let metrics = Metrics::new().unwrap();
        let failing: Arc<dyn PersistenceGateway> = Arc::new(StoreGateway::new(
            Arc::new(UnreachablePredictionRepository::new()),
            metrics,
        ));
        let (with_failing_store, handle) = service_with(
            MockRegressor::constant(2.5),
            MockForecaster::constant(2.0),
            failing,
        );
        let (without_store, _) = service_with(
            MockRegressor::constant(2.5),
            MockForecaster::constant(2.0),
            Arc::new(DisabledGateway),
        );

        let a = with_failing_store.predict(row()).unwrap();
        let b = without_store.predict(row()).unwrap();
        assert_eq!(a, b);

        drop(with_failing_store);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_feature_yields_error_not_partial_result() {
        let (service, _) = service_with(
            MockRegressor::echo("rainfall_mm"),
            MockForecaster::constant(2.0),
            Arc::new(DisabledGateway),
        );

        let err = service.predict(row()).unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(
            Metrics::counter_value(&service.metrics.predictions_total, &["input_error"]),
            1.0
        );
    }

    #[tokio::test]
    async fn test_non_finite_output_is_counted() {
        let (service, _) = service_with(
            MockRegressor::constant(f64::NAN),
            MockForecaster::constant(2.0),
            Arc::new(DisabledGateway),
        );

        let response = service.predict(row()).unwrap();
        assert_eq!(
            response.insights.level_status,
            LevelStatus::Critical.message()
        );
        assert_eq!(service.metrics.non_finite_outputs_total.get(), 1.0);
    }

    #[tokio::test]
    async fn test_history_without_store_is_empty() {
        let (service, _) = service_with(
            MockRegressor::constant(1.0),
            MockForecaster::constant(1.0),
            Arc::new(DisabledGateway),
        );

        service.predict(row()).unwrap();
        assert!(service.history().await.is_empty());
        assert_eq!(service.persistence_backend(), "disabled");
    }
}
