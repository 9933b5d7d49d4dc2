// Telemetry module for structured logging, metrics, and tracing

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting and trace context
///
/// This function sets up the tracing subscriber with:
/// - JSON formatting for structured logs
/// - Trace context (trace_id, span_id) in all log entries
/// - Log levels from configuration or environment
/// - Optional OpenTelemetry integration
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str, tracing_endpoint: Option<&str>) -> Result<()> {
    // Create environment filter from log level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    // Create JSON formatting layer with trace context
    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    // Initialize the subscriber with optional OpenTelemetry layer
    let registry = tracing_subscriber::registry().with(json_layer);

    if let Some(endpoint) = tracing_endpoint {
        // Initialize OpenTelemetry if endpoint is provided
        let tracer = init_tracer(endpoint)?;
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        registry
            .with(telemetry_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    }

    tracing::info!(
        log_level = log_level,
        tracing_endpoint = tracing_endpoint,
        "Structured logging initialized with JSON formatting"
    );

    Ok(())
}

/// Initialize OpenTelemetry tracer with OTLP exporter
///
/// This function sets up OpenTelemetry tracing with:
/// - OTLP exporter to send traces to a collector (e.g., Jaeger)
/// - Service name and version as resource attributes
/// - Random ID generator for trace and span IDs
/// - Always-on sampler for all traces
#[tracing::instrument(skip_all)]
fn init_tracer(endpoint: &str) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry_sdk::runtime::Tokio;

    // Create OTLP exporter
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to build span exporter: {}", e))?;

    // Create tracer provider with resource attributes
    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "talentgrid-pipeline"),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build();

    // Set global tracer provider
    global::set_tracer_provider(tracer_provider.clone());

    // Get tracer
    let tracer = tracer_provider.tracer("talentgrid-pipeline");

    tracing::info!(
        endpoint = endpoint,
        "OpenTelemetry tracer initialized with OTLP exporter"
    );

    Ok(tracer)
}

/// Shutdown OpenTelemetry tracer provider
///
/// This should be called on graceful shutdown to flush remaining spans
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

/// Initialize Prometheus metrics exporter with its own HTTP listener
///
/// This function sets up the Prometheus metrics exporter and registers all metrics:
/// - notifications_sent_total / notifications_failed_total: per-event send outcomes
/// - notification_send_duration_seconds: histogram of provider call latency
/// - recommendation_refresh_* counters and duration histogram for scheduler runs
/// - profile_nudges_sent_total: daily nudge deliveries
#[tracing::instrument(skip_all)]
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    // Build and install the Prometheus exporter
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    register_metric_descriptions();

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

/// Initialize the Prometheus recorder without a listener
///
/// The API server serves metrics from its own router; the returned
/// handle renders the scrape payload.
#[tracing::instrument(skip_all)]
pub fn init_metrics_recorder() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    register_metric_descriptions();

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

fn register_metric_descriptions() {
    describe_counter!(
        "notifications_sent_total",
        "Total number of notification emails delivered"
    );
    describe_counter!(
        "notifications_failed_total",
        "Total number of notification emails that failed to send"
    );
    describe_histogram!(
        "notification_send_duration_seconds",
        "Duration of individual notification sends in seconds"
    );
    describe_counter!(
        "recommendation_refresh_runs_total",
        "Total number of recommendation refresh passes"
    );
    describe_counter!(
        "recommendation_refresh_failures_total",
        "Total number of per-user failures during recommendation refresh"
    );
    describe_counter!(
        "recommendation_refresh_users_skipped_total",
        "Total number of users skipped because their profile cannot match any job"
    );
    describe_histogram!(
        "recommendation_refresh_duration_seconds",
        "Duration of full recommendation refresh passes in seconds"
    );
    describe_gauge!(
        "recommendation_refresh_last_added",
        "Recommendations added during the most recent refresh pass"
    );
    describe_counter!(
        "profile_nudges_sent_total",
        "Total number of profile completion nudge emails sent"
    );
}

/// Record a delivered notification email
#[inline]
pub fn record_notification_sent(kind: &str, duration_seconds: f64) {
    counter!("notifications_sent_total", "kind" => kind.to_string()).increment(1);
    histogram!(
        "notification_send_duration_seconds",
        "kind" => kind.to_string()
    )
    .record(duration_seconds);
}

/// Record a notification email that failed to send
#[inline]
pub fn record_notification_failed(kind: &str) {
    counter!("notifications_failed_total", "kind" => kind.to_string()).increment(1);
}

/// Record a completed recommendation refresh pass
#[inline]
pub fn record_refresh_run(duration_seconds: f64, added: usize) {
    counter!("recommendation_refresh_runs_total").increment(1);
    histogram!("recommendation_refresh_duration_seconds").record(duration_seconds);
    gauge!("recommendation_refresh_last_added").set(added as f64);
}

/// Record a per-user failure inside a refresh pass
#[inline]
pub fn record_refresh_failure() {
    counter!("recommendation_refresh_failures_total").increment(1);
}

/// Record a user skipped because their profile lists no skills
#[inline]
pub fn record_refresh_user_skipped() {
    counter!("recommendation_refresh_users_skipped_total").increment(1);
}

/// Record profile nudge emails sent in one daily pass
#[inline]
pub fn record_profile_nudges(count: usize) {
    counter!("profile_nudges_sent_total").increment(count as u64);
}
