use std::net::SocketAddr;
use std::time::Duration;

use ephany_api::config::ServerConfig;
use ephany_api::router::build_app_router;
use ephany_api::server::{serve_with_grace, Shutdown};
use ephany_api::state::AppState;
use ephany_core::attributes::AttributeSchema;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ephany_api=debug,ephany_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        enabled = config.api_keys.enabled,
        clients = config.api_keys.clients.len(),
        prefixes = ?config.api_keys.protected_prefixes,
        "API key check configured",
    );

    // --- App state ---
    let state = AppState::new(config.clone(), AttributeSchema::default());

    // --- Router ---
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

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    let outcome = serve_with_grace(listener, app, shutdown_signal(), grace)
        .await
        .expect("Server error");

    match outcome {
        Shutdown::Drained => tracing::info!("Graceful shutdown complete"),
        Shutdown::GraceExpired => tracing::warn!("Shutdown finished with requests still open"),
    }
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
