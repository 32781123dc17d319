//! HTTP interface: `/`, `/predict`, `/history` and `/metrics`.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::prediction_service::PredictionService;
use crate::config::ErrorStatusPolicy;
use crate::infrastructure::observability::Metrics;

pub mod routes;

pub const LIVENESS_MESSAGE: &str = "🌊 Groundwater AI API is running!";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub error_policy: ErrorStatusPolicy,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        service: Arc<PredictionService>,
        error_policy: ErrorStatusPolicy,
        metrics: Metrics,
    ) -> Self {
        Self {
            service,
            error_policy,
            metrics,
        }
    }
}

/// Build the router with tracing and permissive CORS
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::liveness))
        .route("/predict", post(routes::predict))
        .route("/history", get(routes::history))
        .route("/metrics", get(routes::metrics))
        // Middleware layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
