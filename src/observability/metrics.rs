//! Metrics registration and recording helpers.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on its own listener and register metric
/// descriptions.
pub fn init_metrics(address: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;

    describe_counter!("http_requests_total", "Total HTTP requests handled");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds"
    );
    describe_counter!("engine_errors_total", "Astrology engine call failures");

    tracing::info!(%address, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

/// Record one failed engine call, labeled by failure kind.
pub fn record_engine_error(kind: &'static str) {
    counter!("engine_errors_total", "kind" => kind).increment(1);
}
