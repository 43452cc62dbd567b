//! Repository for the `message_history` table.

use bulkline_core::dispatch::DispatchOutcome;
use bulkline_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::outcome::{HistoryQuery, MessageHistoryEntry};

/// Column list for `message_history` queries.
const COLUMNS: &str = "id, run_id, instance_id, recipient, message, status, error_kind, error, \
                       delay_secs, elapsed_secs, sent_at";

/// Provides append/read/clear operations for dispatch outcomes.
pub struct OutcomeRepo;

impl OutcomeRepo {
    /// Append one outcome, returning the generated ID.
    ///
    /// `sent_at` is assigned by the database.
    pub async fn insert(pool: &PgPool, outcome: &DispatchOutcome) -> Result<DbId, sqlx::Error> {
        let delay_secs = i64::try_from(outcome.delay_secs).unwrap_or(i64::MAX);

        sqlx::query_scalar(
            "INSERT INTO message_history \
                (run_id, instance_id, recipient, message, status, error_kind, error, \
                 delay_secs, elapsed_secs) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(outcome.run_id)
        .bind(&outcome.instance_id)
        .bind(&outcome.recipient)
        .bind(&outcome.message)
        .bind(outcome.status.as_str())
        .bind(outcome.error.as_ref().map(|e| e.kind.as_str()))
        .bind(outcome.error.as_ref().map(|e| e.message.as_str()))
        .bind(delay_secs)
        .bind(outcome.elapsed_secs)
        .fetch_one(pool)
        .await
    }

    /// List recent outcomes, newest first.
    ///
    /// When `run_id` is set, lists that run's outcomes in recipient order
    /// instead.
    pub async fn list(
        pool: &PgPool,
        params: &HistoryQuery,
    ) -> Result<Vec<MessageHistoryEntry>, sqlx::Error> {
        let limit = params.effective_limit();

        match params.run_id {
            Some(run_id) => Self::list_by_run(pool, run_id, limit).await,
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM message_history \
                     ORDER BY sent_at DESC, id DESC LIMIT $1"
                );
                sqlx::query_as::<_, MessageHistoryEntry>(&query)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// List the outcomes of a single run in the order they were recorded.
    pub async fn list_by_run(
        pool: &PgPool,
        run_id: Uuid,
        limit: i64,
    ) -> Result<Vec<MessageHistoryEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM message_history WHERE run_id = $1 ORDER BY id LIMIT $2");
        sqlx::query_as::<_, MessageHistoryEntry>(&query)
            .bind(run_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete every history row. Returns the number of rows removed.
    pub async fn clear(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM message_history")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
