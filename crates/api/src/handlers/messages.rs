//! Handlers for starting bulk dispatch runs and reading message history.
//!
//! `POST /messages/send` validates the request, builds a [`DispatchJob`] and
//! hands it to the orchestrator. It answers `202 Accepted` as soon as the run
//! is spawned; progress arrives over the WebSocket.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bulkline_core::dispatch::{DelayRange, DispatchJob};
use bulkline_core::error::CoreError;
use bulkline_core::types::DbId;
use bulkline_db::models::outcome::HistoryQuery;
use bulkline_db::repositories::{OutcomeRepo, TemplateRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /messages/send`.
///
/// Exactly one of `template_id` and `message` must be set.
#[derive(Debug, Deserialize)]
pub struct SendMessagesRequest {
    pub instance: String,
    pub numbers: Vec<String>,
    #[serde(default)]
    pub template_id: Option<DbId>,
    #[serde(default)]
    pub message: Option<String>,
    /// `[min, max]` seconds between sends. Defaults to `[10, 30]`.
    #[serde(default)]
    pub delay_range: Option<[u64; 2]>,
}

/// Body of the `202 Accepted` answer.
#[derive(Debug, Serialize)]
pub struct SendAccepted {
    pub run_id: Uuid,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryCleared {
    pub deleted: u64,
}

/// POST /api/v1/messages/send
pub async fn send_messages(
    State(state): State<AppState>,
    Json(input): Json<SendMessagesRequest>,
) -> AppResult<impl IntoResponse> {
    let delay_range = match input.delay_range {
        Some(bounds) => DelayRange::try_from(bounds)?,
        None => DelayRange::default(),
    };

    let message = match (input.template_id, input.message) {
        (Some(template_id), None) => {
            TemplateRepo::find_by_id(&state.pool, template_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "MessageTemplate",
                    id: template_id,
                }))?
                .content
        }
        (None, Some(message)) => message,
        _ => {
            return Err(AppError::BadRequest(
                "exactly one of template_id or message is required".into(),
            ))
        }
    };

    let recipients = input
        .numbers
        .into_iter()
        .map(|n| n.trim().to_string())
        .collect();

    let job = DispatchJob::new(input.instance.trim(), message, recipients, delay_range)?;
    let accepted = SendAccepted {
        run_id: job.run_id(),
        total: job.total(),
    };

    // The run outlives the request; its handle is not needed here.
    let _ = state.orchestrator.spawn(job);

    tracing::info!(
        run_id = %accepted.run_id,
        total = accepted.total,
        "Bulk dispatch accepted",
    );

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: accepted })))
}

/// GET /api/v1/messages/history
///
/// Newest first, or a single run's outcomes in order when `run_id` is given.
pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = OutcomeRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: entries }))
}

/// DELETE /api/v1/messages/history
pub async fn clear_history(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let deleted = OutcomeRepo::clear(&state.pool).await?;

    tracing::warn!(deleted, "Message history cleared");

    Ok(Json(DataResponse {
        data: HistoryCleared { deleted },
    }))
}
