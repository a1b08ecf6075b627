use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use queuedesk_api::background::session_cleanup;
use queuedesk_api::config::ServerConfig;
use queuedesk_api::notifications::QueueNotifier;
use queuedesk_api::router::build_app_router;
use queuedesk_api::state::AppState;
use queuedesk_api::{bootstrap, ws};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queuedesk_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = queuedesk_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    queuedesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    queuedesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::ensure_admin(&pool, admin)
            .await
            .expect("Failed to create bootstrap admin");
    }

    // Stops the heartbeat and session sweeps on shutdown.
    let background_cancel = CancellationToken::new();

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = tokio::spawn(ws::heartbeat::run(
        Arc::clone(&ws_manager),
        Duration::from_secs(config.ws_heartbeat_interval_secs),
        background_cancel.clone(),
    ));

    // --- Event bus ---
    let event_bus = Arc::new(queuedesk_events::EventBus::default());

    let persistence_handle = tokio::spawn(queuedesk_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    let notifier = QueueNotifier::new(pool.clone(), Arc::clone(&ws_manager), config.queue);
    let notifier_handle = tokio::spawn(notifier.run(event_bus.subscribe()));

    // --- Background jobs ---
    let cleanup_handle = tokio::spawn(session_cleanup::run(
        pool.clone(),
        Duration::from_secs(config.session_cleanup_interval_secs),
        background_cancel.clone(),
    ));

    tracing::info!("Event services started (persistence, queue notifier, session cleanup)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
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
    let wait = Duration::from_secs(5);

    let cleanup = async {
        background_cancel.cancel();
        let _ = tokio::time::timeout(wait, cleanup_handle).await;
        let _ = tokio::time::timeout(wait, heartbeat_handle).await;

        // Dropping the last bus handle closes the channel; both consumers then exit.
        drop(event_bus);
        let _ = tokio::time::timeout(wait, persistence_handle).await;
        let _ = tokio::time::timeout(wait, notifier_handle).await;
        tracing::info!("Event services shut down");

        ws_manager.shutdown_all().await;
    };
    if tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), cleanup)
        .await
        .is_err()
    {
        tracing::warn!("Shutdown cleanup timed out");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT, or SIGTERM on Unix.
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
