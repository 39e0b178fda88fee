use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    sync_operations_total: IntCounterVec,
}

impl Metrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        let sync_operations_total = IntCounterVec::new(
            Opts::new(
                "document_sync_operations_total",
                "Controller operations against the document store",
            ),
            &["operation", "outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(sync_operations_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            sync_operations_total,
        })
    }
}

/// Create and register all collectors. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    if METRICS.set(Metrics::build()?).is_err() {
        tracing::debug!("Metrics registry already initialized");
    }
    Ok(())
}

/// Count one controller operation. Does nothing before [`init_metrics`].
pub fn record_operation(operation: &str, outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .sync_operations_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
}

pub fn record_http_request(method: &str, path: &str, status: &str, seconds: f64) {
    if let Some(metrics) = METRICS.get() {
        let labels = [method, path, status];
        metrics.http_requests_total.with_label_values(&labels).inc();
        metrics
            .http_request_duration_seconds
            .with_label_values(&labels)
            .observe(seconds);
    }
}

pub fn get_metrics() -> String {
    let Some(metrics) = METRICS.get() else {
        return "# Metrics registry not initialized".to_string();
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
