//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound relay requests by outcome
//! - `relay_upstream_rejections_total` (counter): non-success upstream statuses
//! - `relay_sessions_active` (gauge): sessions currently streaming
//! - `relay_session_terminations_total` (counter): sessions by terminal cause
//! - `relay_session_duration_seconds` (histogram): streaming lifetime
//! - `relay_forwarded_bytes_total` (counter): upstream bytes passed through
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

pub fn record_request(outcome: &'static str) {
    counter!("relay_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_upstream_rejection(status: u16) {
    counter!("relay_upstream_rejections_total", "status" => status.to_string()).increment(1);
}

pub fn record_session_opened() {
    gauge!("relay_sessions_active").increment(1.0);
}

pub fn record_session_closed(cause: &'static str, lifetime: Duration) {
    gauge!("relay_sessions_active").decrement(1.0);
    counter!("relay_session_terminations_total", "cause" => cause).increment(1);
    histogram!("relay_session_duration_seconds").record(lifetime.as_secs_f64());
}

pub fn record_forwarded_bytes(len: usize) {
    counter!("relay_forwarded_bytes_total").increment(len as u64);
}
