//! Metrics collection and exposition.
//!
//! # Metrics
//! - `board_requests_total` (counter): requests by method, status
//! - `board_request_duration_seconds` (histogram): latency by method
//! - `board_reconciliations_total` (counter): PATCH outcomes
//! - `board_check_updates_total` (counter): applied / unmatched check patches
//! - `board_panics_recovered_total` (counter): handler panics by path

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with its own HTTP listener.
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "board_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("board_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reconcile(outcome: &'static str, applied: usize, unmatched: usize) {
    counter!("board_reconciliations_total", "outcome" => outcome).increment(1);
    counter!("board_check_updates_total", "result" => "applied").increment(applied as u64);
    counter!("board_check_updates_total", "result" => "unmatched").increment(unmatched as u64);
}

pub fn record_panic(path: &str) {
    counter!("board_panics_recovered_total", "path" => path.to_string()).increment(1);
}
