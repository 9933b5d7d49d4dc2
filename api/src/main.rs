use anyhow::Result;
use std::net::SocketAddr;

mod handlers;
mod routes;
mod state;

use common::config::Settings;
use common::{bootstrap, telemetry};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    bootstrap::init_human_tracing();

    tracing::info!("Starting TalentGrid API server");

    // Load configuration
    let config = Settings::load()?;
    if let Err(reason) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", reason);
    }
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Configuration loaded"
    );

    // Initialize database connection pool
    let db_pool = bootstrap::init_database_pool(&config).await?;
    tracing::info!("Database connection pool established");

    // Initialize Prometheus metrics recorder; /metrics renders the handle
    let metrics_handle = telemetry::init_metrics_recorder()?;

    // Notification plumbing shared by the job and application handlers
    let notifier = bootstrap::init_notifier(&config, &db_pool)?;

    // Create application state
    let state = AppState::new(db_pool, notifier, config.clone(), metrics_handle);

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}
