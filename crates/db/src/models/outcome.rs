//! Dispatch outcome (message history) entity model.

use bulkline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Default page size for history listings.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Maximum page size for history listings.
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// A row from the `message_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageHistoryEntry {
    pub id: DbId,
    pub run_id: Uuid,
    pub instance_id: String,
    pub recipient: String,
    pub message: String,
    pub status: String,
    pub error_kind: Option<String>,
    pub error: Option<String>,
    pub delay_secs: i64,
    pub elapsed_secs: f64,
    pub sent_at: Timestamp,
}

/// Query parameters for `GET /messages/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Restrict to a single dispatch run.
    pub run_id: Option<Uuid>,
}

impl HistoryQuery {
    /// The effective limit after applying the default and the cap.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(HistoryQuery::default().effective_limit(), 50);

        let query = HistoryQuery {
            limit: Some(500),
            run_id: None,
        };
        assert_eq!(query.effective_limit(), 100);

        let query = HistoryQuery {
            limit: Some(0),
            run_id: None,
        };
        assert_eq!(query.effective_limit(), 1);
    }
}
