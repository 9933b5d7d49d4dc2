use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use common::config::Settings;
use common::db::DbPool;
use common::notify::Notifier;
use common::store::{
    ApplicationStore, CompanyStore, JobStore, PgApplicationStore, PgCompanyStore, PgJobStore,
    PgUserStore, UserStore,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub users: Arc<dyn UserStore>,
    pub jobs: Arc<dyn JobStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub notifier: Arc<Notifier>,
    pub config: Arc<Settings>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Create a new AppState instance with Postgres-backed stores
    pub fn new(
        db_pool: DbPool,
        notifier: Arc<Notifier>,
        config: Settings,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(db_pool.clone())),
            jobs: Arc::new(PgJobStore::new(db_pool.clone())),
            applications: Arc::new(PgApplicationStore::new(db_pool.clone())),
            companies: Arc::new(PgCompanyStore::new(db_pool.clone())),
            db_pool,
            notifier,
            config: Arc::new(config),
            metrics,
        }
    }
}
