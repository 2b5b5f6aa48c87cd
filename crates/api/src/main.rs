use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upqueue_api::config::ServerConfig;
use upqueue_api::router::build_app_router;
use upqueue_api::state::AppState;
use upqueue_drive::{DriveApi, DriveConfig, DriveUploader};
use upqueue_worker::Dispatcher;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "upqueue_api=debug,upqueue_worker=debug,upqueue_drive=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        workers = config.dispatcher.pool_size,
        queue_capacity = config.dispatcher.queue_capacity,
        "Loaded server configuration",
    );

    // --- Storage backend ---
    let drive_config = DriveConfig::from_env().expect("Invalid Drive configuration");
    let drive = DriveApi::new(drive_config).expect("Failed to build Drive HTTP client");
    let uploader = Arc::new(DriveUploader::new(drive));

    // --- Dispatcher ---
    let dispatcher = Dispatcher::new(config.dispatcher, uploader);
    let dispatcher_handle = dispatcher.start().expect("Dispatcher already started");

    // --- App state ---
    let state = AppState {
        dispatcher: dispatcher.clone(),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid UPQUEUE_HOST address"),
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

    // --- Post-shutdown drain ---
    tracing::info!(
        in_flight = dispatcher.in_flight(),
        "Server stopped accepting connections, draining uploads",
    );

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, dispatcher.wait()).await.is_err() {
        tracing::warn!(
            in_flight = dispatcher.in_flight(),
            "Uploads still in flight after shutdown timeout",
        );
    }

    dispatcher.quit();
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
