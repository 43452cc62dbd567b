//! Message template entity model and DTOs.

use bulkline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `message_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageTemplate {
    pub id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /templates` and `PUT /templates/{id}`.
#[derive(Debug, Deserialize)]
pub struct TemplateInput {
    pub content: String,
}
