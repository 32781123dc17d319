//! API route handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::{AppState, LIVENESS_MESSAGE};
use crate::config::ErrorStatusPolicy;
use crate::domain::errors::InferenceError;
use crate::domain::features::FeatureRow;
use crate::domain::prediction::PredictionRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub predictions: Vec<PredictionRecord>,
}

pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Run the pipeline on a JSON object of features.
/// Parse errors take the same path as inference errors.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = parse_features(&body).and_then(|features| state.service.predict(features));

    match outcome {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = error_status(state.error_policy, &e);
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

pub async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        predictions: state.service.history().await,
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn parse_features(body: &[u8]) -> Result<FeatureRow, InferenceError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| InferenceError::InvalidInput {
            reason: format!("request body is not valid JSON: {}", e),
        })?;
    FeatureRow::try_from(value)
}

fn error_status(policy: ErrorStatusPolicy, error: &InferenceError) -> StatusCode {
    match policy {
        ErrorStatusPolicy::Uniform => StatusCode::OK,
        ErrorStatusPolicy::Strict if error.is_input_error() => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorStatusPolicy::Strict => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
