// Scheduler binary entry point
//
// Runs the background recommendation pipeline: the fixed-interval
// refresh pass and the daily profile nudge.

use common::bootstrap;
use common::config::Settings;
use common::scheduler::{Pipeline, PipelineEngine};
use common::telemetry;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing/logging
    bootstrap::init_json_tracing();

    info!("Starting TalentGrid recommendation scheduler");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    if let Err(reason) = settings.validate() {
        error!(reason = %reason, "Invalid configuration");
        return Err(reason.into());
    }

    info!(
        refresh_interval_seconds = settings.scheduler.refresh_interval_seconds,
        nudge_cron = %settings.scheduler.nudge_cron,
        timezone = %settings.scheduler.timezone,
        "Configuration loaded"
    );

    // Expose Prometheus metrics on the configured port
    telemetry::init_metrics(settings.observability.metrics_port)?;

    // Initialize database connection pool
    let db_pool = bootstrap::init_database_pool(&settings).await.map_err(|e| {
        error!(error = %e, "Failed to initialize database pool");
        e
    })?;

    // Wire stores and the notifier
    let (user_store, job_store) = bootstrap::init_pipeline_stores(&db_pool);
    let notifier = bootstrap::init_notifier(&settings, &db_pool).map_err(|e| {
        error!(error = %e, "Failed to initialize notifier");
        e
    })?;

    // Create the pipeline engine
    let engine = PipelineEngine::new(&settings.scheduler, user_store, job_store, notifier)
        .map_err(|e| {
            error!(error = %e, "Failed to create pipeline engine");
            e
        })?;
    info!("Pipeline engine created");

    // Set up graceful shutdown
    let engine = Arc::new(engine);
    let engine_for_shutdown = engine.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        info!("Received Ctrl+C signal, initiating graceful shutdown");
        engine_for_shutdown.stop().await;
    });

    // Run the trigger loop
    info!("Starting pipeline trigger loop");
    if let Err(e) = engine.start().await {
        error!(error = %e, "Pipeline error");
        return Err(e.into());
    }

    info!("Scheduler stopped");
    Ok(())
}
