use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::bootstrap::PersistenceBootstrap;
use crate::application::ml::ModelRegistry;
use crate::application::persistence::{PersistenceGateway, RecordWriter};
use crate::application::prediction_service::PredictionService;
use crate::config::Config;
use crate::infrastructure::observability::Metrics;

/// Fully wired service: models loaded, store resolved, writer running
pub struct Application {
    pub metrics: Metrics,
    pub service: Arc<PredictionService>,
    writer: JoinHandle<()>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!("Building Groundwater Application...");

        let metrics = Metrics::new().context("Failed to create metrics registry")?;
        let models = ModelRegistry::load(&config.models)?;
        let persistence = PersistenceBootstrap::init(&config.store, metrics.clone()).await;

        Ok(Self::assemble(&config, models, persistence, metrics))
    }

    /// Wire already-built parts together. Must run inside a Tokio runtime.
    pub fn assemble(
        config: &Config,
        models: ModelRegistry,
        persistence: Arc<dyn PersistenceGateway>,
        metrics: Metrics,
    ) -> Self {
        let (sink, writer) = RecordWriter::spawn(
            persistence.clone(),
            config.store.queue_capacity,
            metrics.clone(),
        );

        let service = Arc::new(PredictionService::new(
            models.inference_gateway(),
            persistence,
            sink,
            metrics.clone(),
            config.server.history_limit,
        ));

        Self {
            metrics,
            service,
            writer,
        }
    }

    /// Stop accepting records and give the writer `grace` to drain the queue.
    /// Every other clone of `service` must be dropped first.
    pub async fn shutdown(self, grace: Duration) {
        info!("Initiating Graceful Shutdown Sequence...");
        drop(self.service);

        match tokio::time::timeout(grace, self.writer).await {
            Ok(Ok(())) => info!("Pending prediction records flushed"),
            Ok(Err(e)) => warn!("Record writer task failed: {}", e),
            Err(_) => warn!(
                "Record writer did not drain within {:?}, pending records dropped",
                grace
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::persistence::StoreGateway;
    use crate::domain::features::FeatureRow;
    use crate::infrastructure::mock::{MockForecaster, MockRegressor};
    use crate::infrastructure::repositories::InMemoryPredictionRepository;

    #[tokio::test]
    async fn test_shutdown_flushes_pending_records() {
        let metrics = Metrics::new().unwrap();
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let persistence = Arc::new(StoreGateway::new(repo.clone(), metrics.clone()));
        let models = ModelRegistry::new(
            Arc::new(MockRegressor::constant(2.5)),
            Arc::new(MockForecaster::constant(2.0)),
        );
        let app = Application::assemble(&Config::default(), models, persistence, metrics);

        for _ in 0..3 {
            app.service.predict(FeatureRow::new()).unwrap();
        }
        app.shutdown(Duration::from_secs(5)).await;

        assert_eq!(repo.count().await, 3);
    }

    #[tokio::test]
    async fn test_build_fails_without_model_artifacts() {
        let mut config = Config::default();
        config.models.regressor_path = "/nonexistent/rf.json".into();

        assert!(Application::build(config).await.is_err());
    }
}
