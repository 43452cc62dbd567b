use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bulkline_api::config::ServerConfig;
use bulkline_api::relay::EventRelay;
use bulkline_api::router::build_app_router;
use bulkline_api::state::AppState;
use bulkline_api::ws;
use bulkline_dispatch::{DispatchOrchestrator, PgOutcomeRecorder};
use bulkline_events::EventBus;
use bulkline_gateway::{GatewayApi, GatewayConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bulkline_api=debug,bulkline_dispatch=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let gateway_config =
        GatewayConfig::from_env().unwrap_or_else(|e| panic!("Invalid gateway configuration: {e}"));
    tracing::info!(base_url = %gateway_config.base_url, "Loaded gateway configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = bulkline_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    bulkline_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    bulkline_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- WebSocket manager + heartbeat ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Event bus + relay to WebSocket clients ---
    let event_bus = Arc::new(EventBus::default());
    let relay = EventRelay::new(Arc::clone(&ws_manager));
    let relay_handle = tokio::spawn(relay.run(event_bus.subscribe()));
    tracing::info!("Event relay started");

    // --- Gateway + dispatch orchestrator ---
    let gateway = Arc::new(GatewayApi::new(gateway_config));
    let shutdown = CancellationToken::new();
    let orchestrator = Arc::new(
        DispatchOrchestrator::new(
            gateway.clone(),
            Arc::new(PgOutcomeRecorder::new(pool.clone())),
            event_bus.clone(),
        )
        .with_shutdown(shutdown.clone()),
    );

    // --- App state + router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        gateway,
        orchestrator: Arc::clone(&orchestrator),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop in-flight runs at their next pause. Each run emits its
    // send_complete before letting go of the bus.
    shutdown.cancel();
    drop(orchestrator);
    drop(event_bus);

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, relay_handle).await.is_err() {
        tracing::warn!("Event relay did not stop in time");
    } else {
        tracing::info!("Event relay stopped");
    }

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
