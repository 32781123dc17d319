use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::persistence::{DisabledGateway, PersistenceGateway, StoreGateway};
use crate::config::{StoreEnvConfig, StoreSettings};
use crate::domain::repositories::PredictionRepository;
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::persistence::{
    Database, RestPredictionRepository, SqlitePredictionRepository,
};

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    /// Resolve the history store once. Any configuration or connection
    /// problem degrades to the no-op gateway; it never fails startup.
    pub async fn init(config: &StoreEnvConfig, metrics: Metrics) -> Arc<dyn PersistenceGateway> {
        let settings = match config.resolve() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Persistence disabled: {}", e);
                return Arc::new(DisabledGateway);
            }
        };

        match Self::connect(&settings).await {
            Ok(repository) => {
                info!(backend = repository.backend(), "Persistence enabled");
                Arc::new(StoreGateway::new(repository, metrics))
            }
            Err(e) => {
                warn!(
                    backend = settings.backend(),
                    "Persistence disabled, store unavailable: {:#}", e
                );
                Arc::new(DisabledGateway)
            }
        }
    }

    async fn connect(settings: &StoreSettings) -> Result<Arc<dyn PredictionRepository>> {
        match settings {
            StoreSettings::Sqlite { url } => {
                info!("Initializing Database at {}", url);
                let db = Database::new(url)
                    .await
                    .context("Failed to initialize database")?;
                Ok(Arc::new(SqlitePredictionRepository::new(db.pool)))
            }
            StoreSettings::Rest {
                base_url,
                key,
                table,
                timeout,
            } => {
                info!("Using REST store at {} (table: {})", base_url, table);
                let repository = RestPredictionRepository::new(base_url, key, table, *timeout)
                    .context("Failed to configure REST store")?;
                Ok(Arc::new(repository))
            }
        }
    }
}
