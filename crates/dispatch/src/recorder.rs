//! Outcome persistence seam used by the orchestrator.

use async_trait::async_trait;
use bulkline_core::dispatch::DispatchOutcome;
use bulkline_db::repositories::OutcomeRepo;
use bulkline_db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable, append-only sink for dispatch outcomes.
///
/// Called once per recipient from a single run's task, in recipient order.
#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    async fn append(&self, outcome: &DispatchOutcome) -> Result<(), RecorderError>;
}

/// Records outcomes as `message_history` rows.
pub struct PgOutcomeRecorder {
    pool: DbPool,
}

impl PgOutcomeRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutcomeRecorder for PgOutcomeRecorder {
    async fn append(&self, outcome: &DispatchOutcome) -> Result<(), RecorderError> {
        let id = OutcomeRepo::insert(&self.pool, outcome).await?;
        tracing::trace!(history_id = id, run_id = %outcome.run_id, "Outcome recorded");
        Ok(())
    }
}
