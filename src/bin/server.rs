//! Groundwater Server - advisory HTTP API
//!
//! Loads both models, resolves the optional history store and serves the
//! HTTP API until Ctrl+C. Metrics are exposed on `/metrics` and pushed via
//! structured JSON logs to stdout.
//!
//! # Usage
//! ```sh
//! STORE_URL=sqlite://data/history.db cargo run --bin server -- --port 5000
//! ```
//!
//! # Environment Variables
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::{Context, Result};
use clap::Parser;
use groundwater::application::system::Application;
use groundwater::config::Config;
use groundwater::infrastructure::observability::MetricsReporter;
use groundwater::interfaces::http::{self, AppState};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Time the record writer gets to flush after the listener stops
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(author, version, about = "Groundwater advisory API server", long_about = None)]
struct Args {
    /// Bind host (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Regressor artifact (overrides REGRESSOR_MODEL_PATH)
    #[arg(long)]
    regressor: Option<PathBuf>,

    /// Forecaster artifact (overrides FORECASTER_MODEL_PATH)
    #[arg(long)]
    forecaster: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = self.regressor {
            config.models.regressor_path = path;
        }
        if let Some(path) = self.forecaster {
            config.models.forecaster_path = path;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Groundwater Server {} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = Config::from_env()?;
    args.apply(&mut config);
    info!(
        "Configuration loaded: Bind={}, ErrorStatus={:?}, HistoryLimit={}",
        config.server.bind_address(),
        config.server.error_status,
        config.server.history_limit
    );

    let app = Application::build(config.clone()).await?;

    // Start metrics reporter if enabled
    if config.observability.enabled {
        let reporter = MetricsReporter::new(
            app.metrics.clone(),
            app.service.persistence_backend(),
            config.observability.interval_secs,
        );

        tokio::spawn(async move {
            reporter.run().await;
        });

        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability.interval_secs
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    let state = AppState::new(
        app.service.clone(),
        config.server.error_status,
        app.metrics.clone(),
    );
    let router = http::router(state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server listening on {}. Press Ctrl+C to shutdown.", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received.");
        })
        .await
        .context("HTTP server failed")?;

    app.shutdown(SHUTDOWN_GRACE).await;
    info!("Exiting.");

    Ok(())
}
