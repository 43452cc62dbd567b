//! Route definitions for bulk sends and message history.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Message routes mounted at `/messages`.
///
/// ```text
/// POST   /send       -> send_messages
/// GET    /history    -> list_history
/// DELETE /history    -> clear_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(messages::send_messages))
        .route(
            "/history",
            get(messages::list_history).delete(messages::clear_history),
        )
}
