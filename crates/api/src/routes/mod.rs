pub mod health;
pub mod instances;
pub mod messages;
pub mod templates;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                  WebSocket (dispatch events)
///
/// /templates                           list, create
/// /templates/{id}                      update, delete
///
/// /messages/send                       start a bulk dispatch run (POST)
/// /messages/history                    list (?limit, run_id), clear (DELETE)
///
/// /instances                           list gateway instances
/// /instances/{name}/status             resolved connection status
/// /instances/{name}/check-numbers      account lookup (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/templates", templates::router())
        .nest("/messages", messages::router())
        .nest("/instances", instances::router())
}
