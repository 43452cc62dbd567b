use std::sync::Arc;

use bulkline_dispatch::DispatchOrchestrator;
use bulkline_gateway::GatewayApi;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bulkline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (dashboard clients).
    pub ws_manager: Arc<WsManager>,
    /// Messaging gateway client, used directly for instance lookups.
    pub gateway: Arc<GatewayApi>,
    /// Runs bulk dispatch jobs in the background.
    pub orchestrator: Arc<DispatchOrchestrator>,
}
