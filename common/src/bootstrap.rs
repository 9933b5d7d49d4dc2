// Bootstrap utilities for binary initialization
// Purpose: Eliminate code duplication across main.rs files (api, scheduler)

use crate::config::Settings;
use crate::db::DbPool;
use crate::mailer::{HttpMailer, Mailer};
use crate::matching::MatchEngine;
use crate::notify::{Dispatcher, Notifier};
use crate::store::{PgJobStore, PgUserStore, UserStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Initialize database pool
/// Used by: API server, Scheduler
///
/// # Errors
/// Returns error if database pool initialization fails
#[tracing::instrument(skip(settings))]
pub async fn init_database_pool(settings: &Settings) -> Result<DbPool> {
    info!("Initializing database pool");

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;

    info!("Database pool initialized");
    Ok(db_pool)
}

/// Initialize the outbound mailer from configuration
/// Used by: API server, Scheduler
///
/// # Errors
/// Returns error if the underlying HTTP client cannot be built
#[tracing::instrument(skip(settings))]
pub fn init_mailer(settings: &Settings) -> Result<Arc<dyn Mailer>> {
    info!(
        endpoint = %settings.mailer.endpoint,
        timeout_seconds = settings.mailer.timeout_seconds,
        "Initializing outbound mailer"
    );

    let mailer =
        HttpMailer::new(settings.mailer.clone()).context("Failed to initialize outbound mailer")?;

    Ok(Arc::new(mailer))
}

/// Wire the notifier: match engine over the user store, dispatcher over
/// the mailer with the configured send concurrency
/// Used by: API server, Scheduler
///
/// # Errors
/// Returns error if the mailer cannot be initialized
#[tracing::instrument(skip(settings, db_pool))]
pub fn init_notifier(settings: &Settings, db_pool: &DbPool) -> Result<Arc<Notifier>> {
    let mailer = init_mailer(settings)?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db_pool.clone()));
    let dispatcher = Arc::new(Dispatcher::new(mailer, settings.mailer.max_in_flight));
    let notifier = Notifier::new(MatchEngine::new(users), dispatcher);

    info!(
        max_in_flight = settings.mailer.max_in_flight,
        "Notifier initialized"
    );
    Ok(Arc::new(notifier))
}

/// Build the store handles the pipeline engine needs
/// Used by: Scheduler
pub fn init_pipeline_stores(db_pool: &DbPool) -> (Arc<PgUserStore>, Arc<PgJobStore>) {
    (
        Arc::new(PgUserStore::new(db_pool.clone())),
        Arc::new(PgJobStore::new(db_pool.clone())),
    )
}

/// Initialize tracing for JSON logging
/// Used by: Scheduler
///
/// This sets up structured JSON logging with an environment filter
pub fn init_json_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scheduler=info,common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Initialize tracing for human-readable logging
/// Used by: API server (development)
///
/// This sets up human-readable logging with environment filter
pub fn init_human_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
