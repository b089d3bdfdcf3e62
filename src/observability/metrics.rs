//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_operations_total` (counter): operations by name and outcome
//! - `relay_confirmation_seconds` (histogram): submit-to-receipt latency
//! - `relay_rpc_healthy` (gauge): 1=reachable, 0=unreachable
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(%addr, "Started metrics server");
    Ok(())
}

/// Record the outcome of one relay operation.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    counter!(
        "relay_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record how long a submitted transaction took to confirm.
pub fn record_confirmation(duration: Duration) {
    histogram!("relay_confirmation_seconds").record(duration.as_secs_f64());
}

/// Record RPC reachability.
pub fn record_rpc_health(healthy: bool) {
    gauge!("relay_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
