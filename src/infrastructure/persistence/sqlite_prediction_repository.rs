use crate::domain::errors::PersistenceError;
use crate::domain::prediction::{NewPredictionRecord, PredictionRecord, parse_timestamp};
use crate::domain::repositories::PredictionRepository;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

/// Prediction history in the local `predictions` table.
/// JSON columns are stored as text; `created_at` is assigned by SQLite.
pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<PredictionRecord, PersistenceError> {
        let input_data: String = row.try_get("input_data")?;
        let prediction: String = row.try_get("prediction")?;
        let created_at: String = row.try_get("created_at")?;

        let created_at = parse_timestamp(&created_at).ok_or_else(|| PersistenceError::Decode {
            reason: format!("created_at '{}' is not a timestamp", created_at),
        })?;

        Ok(PredictionRecord {
            id: Some(row.try_get("id")?),
            input_data: serde_json::from_str(&input_data)?,
            prediction: serde_json::from_str(&prediction)?,
            source: row.try_get("source")?,
            created_at,
            extra: Default::default(),
        })
    }

    /// Undecodable rows are skipped so one bad row does not hide the rest.
    fn map_rows_to_records(rows: Vec<SqliteRow>) -> Vec<PredictionRecord> {
        rows.iter()
            .filter_map(|row| match Self::map_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    let id: Option<i64> = row.try_get("id").ok();
                    warn!(?id, "Skipping unreadable prediction row: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn insert(&self, record: &NewPredictionRecord) -> Result<(), PersistenceError> {
        let input_data = serde_json::to_string(&record.input_data)?;
        let prediction = serde_json::to_string(&record.prediction)?;

        let result = sqlx::query(
            r#"
            INSERT INTO predictions (input_data, prediction, source)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(input_data)
        .bind(prediction)
        .bind(&record.source)
        .execute(&self.pool)
        .await?;

        debug!("Persisted prediction {}", result.last_insert_rowid());
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, PersistenceError> {
        let rows = sqlx::query(
            "SELECT id, input_data, prediction, source, created_at FROM predictions ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(Self::map_rows_to_records(rows))
    }

    fn backend(&self) -> &str {
        "sqlite"
    }
}
