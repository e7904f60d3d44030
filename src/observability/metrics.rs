//! Metrics collection and exposition.
//!
//! # Metrics
//! - `plp_requests_total` (counter): requests by kind (page, proxy) and status
//! - `plp_request_duration_seconds` (histogram): latency by kind
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Which part of the server answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Page,
    Proxy,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Page => "page",
            RequestKind::Proxy => "proxy",
        }
    }
}

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(kind: RequestKind, status: u16, start: Instant) {
    metrics::counter!(
        "plp_requests_total",
        "kind" => kind.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("plp_request_duration_seconds", "kind" => kind.as_str())
        .record(start.elapsed().as_secs_f64());
}
