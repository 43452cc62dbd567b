//! Repository for the `message_templates` table.

use bulkline_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::MessageTemplate;

/// Column list for `message_templates` queries.
const COLUMNS: &str = "id, content, created_at, updated_at";

/// Provides CRUD operations for message templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// List all templates in creation order.
    pub async fn list(pool: &PgPool) -> Result<Vec<MessageTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM message_templates ORDER BY id");
        sqlx::query_as::<_, MessageTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MessageTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM message_templates WHERE id = $1");
        sqlx::query_as::<_, MessageTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, content: &str) -> Result<MessageTemplate, sqlx::Error> {
        let query =
            format!("INSERT INTO message_templates (content) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, MessageTemplate>(&query)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Replace a template's content. Returns `None` if the ID does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<MessageTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE message_templates SET content = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageTemplate>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a template. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM message_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
