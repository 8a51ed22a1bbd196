//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): responses by method, status, stage
//! - `site_request_duration_seconds` (histogram): latency by stage
//! - `site_renders_total` (counter): template renders by outcome
//! - `site_asset_cache_lookups_total` (counter): cache lookups by space, hit
//! - `site_backend_requests_total` (counter): backend round trips by status
//!
//! # Design Decisions
//! - The Prometheus exporter is only installed when an address is configured
//! - Recording without an installed recorder is a no-op

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, stage: &'static str, start: Instant) {
    counter!(
        "site_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "stage" => stage
    )
    .increment(1);
    histogram!("site_request_duration_seconds", "stage" => stage)
        .record(start.elapsed().as_secs_f64());
}

/// Record a template render outcome ("ok" or "error").
pub fn record_render(outcome: &'static str) {
    counter!("site_renders_total", "outcome" => outcome).increment(1);
}

/// Record an asset cache lookup.
pub fn record_cache_lookup(space: &'static str, hit: bool) {
    counter!(
        "site_asset_cache_lookups_total",
        "space" => space,
        "hit" => if hit { "true" } else { "false" }
    )
    .increment(1);
}

/// Record a backend round trip; `status` is `None` on transport failure.
pub fn record_backend(status: Option<u16>) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    counter!("site_backend_requests_total", "status" => status).increment(1);
}
