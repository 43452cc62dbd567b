//! Handlers for message template CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bulkline_core::error::CoreError;
use bulkline_core::templates::validate_template_content;
use bulkline_core::types::DbId;
use bulkline_db::models::template::TemplateInput;
use bulkline_db::repositories::TemplateRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/templates
pub async fn list_templates(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/v1/templates
///
/// Content is trimmed and must be non-empty.
pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<TemplateInput>,
) -> AppResult<impl IntoResponse> {
    let content = validate_template_content(&input.content)?;

    let template = TemplateRepo::create(&state.pool, &content).await?;

    tracing::info!(template_id = template.id, "Template created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PUT /api/v1/templates/{id}
pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Json(input): Json<TemplateInput>,
) -> AppResult<impl IntoResponse> {
    let content = validate_template_content(&input.content)?;

    let template = TemplateRepo::update(&state.pool, template_id, &content)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MessageTemplate",
            id: template_id,
        }))?;

    tracing::info!(template_id, "Template updated");

    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TemplateRepo::delete(&state.pool, template_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "MessageTemplate",
            id: template_id,
        }));
    }

    tracing::info!(template_id, "Template deleted");

    Ok(StatusCode::NO_CONTENT)
}
