use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Job board endpoints
    let api_routes = Router::new()
        .route("/api/jobs", post(handlers::jobs::create_job))
        .route("/api/jobs/:id", delete(handlers::jobs::delete_job))
        .route(
            "/api/jobs/:id/applications",
            post(handlers::applications::apply_to_job),
        )
        .route(
            "/api/applications/:id/status",
            put(handlers::applications::update_application_status),
        );

    // Probe endpoints (no authentication, scraped by Prometheus and the
    // load balancer)
    let probe_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics_handler));

    // Combine all routes
    Router::new()
        .merge(api_routes)
        .merge(probe_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
