//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_calls_total` (counter): calls by endpoint, outcome
//! - `balancer_call_duration_seconds` (histogram): latency per endpoint
//! - `balancer_retries_total` (counter): attempts beyond the first
//! - `balancer_endpoint_health` (gauge): 1=healthy, 0=unhealthy
//! - `balancer_probes_total` (counter): probes by endpoint, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one attempt against an endpoint.
pub fn record_call(endpoint: &str, outcome: &'static str, start: Instant) {
    counter!("balancer_calls_total", "endpoint" => endpoint.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("balancer_call_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record an attempt beyond the first.
pub fn record_retry() {
    counter!("balancer_retries_total").increment(1);
}

pub fn record_endpoint_health(endpoint: &str, healthy: bool) {
    gauge!("balancer_endpoint_health", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_probe(endpoint: &str, passed: bool) {
    let outcome = if passed { "passed" } else { "failed" };
    counter!("balancer_probes_total", "endpoint" => endpoint.to_string(), "outcome" => outcome)
        .increment(1);
}
