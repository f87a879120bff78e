//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_admission_total` (counter): admission decisions by `decision`
//! - `gateway_rate_limit_tracked_keys` (gauge): stored window records
//! - `gateway_rate_limit_evicted_total` (counter): records dropped by sweeps
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(admitted: bool) {
    let decision = if admitted { "admitted" } else { "rejected" };
    counter!("gateway_admission_total", "decision" => decision).increment(1);
}

pub fn record_tracked_keys(count: usize) {
    gauge!("gateway_rate_limit_tracked_keys").set(count as f64);
}

pub fn record_evicted(count: usize) {
    counter!("gateway_rate_limit_evicted_total").increment(count as u64);
}
