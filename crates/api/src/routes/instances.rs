//! Route definitions for gateway instances.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::instances;
use crate::state::AppState;

/// Instance routes mounted at `/instances`.
///
/// ```text
/// GET    /                        -> list_instances
/// GET    /{name}/status           -> instance_status
/// POST   /{name}/check-numbers    -> check_numbers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(instances::list_instances))
        .route("/{name}/status", get(instances::instance_status))
        .route("/{name}/check-numbers", post(instances::check_numbers))
}
