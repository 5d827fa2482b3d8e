//! Prometheus metrics for request counts and latency.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

use crate::error::Result;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP responses counter metric name.
pub const METRIC_HTTP_RESPONSES: &str = "http_responses_total";
/// Handler panics counter metric name.
pub const METRIC_HANDLER_PANICS: &str = "handler_panics_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_counter!(
        METRIC_HTTP_RESPONSES,
        "Total number of HTTP responses by status code"
    );
    describe_counter!(
        METRIC_HANDLER_PANICS,
        "Total number of handler panics converted to 500 responses"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter listening on `0.0.0.0:{port}`.
pub fn install_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment the response counter for a status code.
pub fn inc_http_responses(status: u16) {
    counter!(METRIC_HTTP_RESPONSES, "status" => status.to_string()).increment(1);
}

/// Increment the handler panic counter.
pub fn inc_handler_panics() {
    counter!(METRIC_HANDLER_PANICS).increment(1);
}
