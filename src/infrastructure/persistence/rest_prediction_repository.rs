//! PostgREST-compatible prediction store (Supabase and friends).
//!
//! Rows are appended with `POST /rest/v1/{table}` and read back with
//! `GET /rest/v1/{table}?select=*&order=created_at.desc&limit=N`. The store
//! assigns `id` and `created_at`.

use crate::domain::errors::PersistenceError;
use crate::domain::prediction::{NewPredictionRecord, PredictionRecord};
use crate::domain::repositories::PredictionRepository;
use crate::infrastructure::core::HttpClientFactory;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub struct RestPredictionRepository {
    client: ClientWithMiddleware,
    table_url: Url,
}

impl RestPredictionRepository {
    pub fn new(
        base_url: &Url,
        api_key: &str,
        table: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut table_url = base_url.clone();
        let path = format!("{}/rest/v1/{}", base_url.path().trim_end_matches('/'), table);
        table_url.set_path(&path);
        table_url.set_query(None);

        Ok(Self {
            client: HttpClientFactory::create_store_client(api_key, timeout)?,
            table_url,
        })
    }

    fn history_url(&self, limit: usize) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc")
            .append_pair("limit", &limit.to_string());
        url
    }

    async fn rejected(response: reqwest::Response) -> PersistenceError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        PersistenceError::Rejected { status, body }
    }
}

fn unreachable(e: reqwest_middleware::Error) -> PersistenceError {
    PersistenceError::Unreachable {
        reason: e.to_string(),
    }
}

/// Rows that do not decode are skipped so one bad row does not hide the rest.
fn decode_rows(rows: Vec<Value>) -> Vec<PredictionRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned();
            match serde_json::from_value::<PredictionRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(?id, "Skipping unreadable prediction row: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl PredictionRepository for RestPredictionRepository {
    async fn insert(&self, record: &NewPredictionRecord) -> Result<(), PersistenceError> {
        let body = serde_json::to_string(record)?;

        let response = self
            .client
            .post(self.table_url.clone())
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .body(body)
            .send()
            .await
            .map_err(unreachable)?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        debug!(status = response.status().as_u16(), "Prediction appended to REST store");
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, PersistenceError> {
        let response = self
            .client
            .get(self.history_url(limit))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(unreachable)?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| PersistenceError::Decode {
                reason: e.to_string(),
            })?;
        Ok(decode_rows(rows))
    }

    fn backend(&self) -> &str {
        "rest"
    }
}
