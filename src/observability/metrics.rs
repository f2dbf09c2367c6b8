//! Metrics collection and exposition.
//!
//! # Metrics
//! - `page_router_dispatch_total` (counter): dispatches by app and outcome
//! - `page_router_dispatch_duration_seconds` (histogram): dispatch latency by app
//! - `page_router_pages` (gauge): pages in the live deployment
//! - `page_router_deployments_total` (counter): deployments activated

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatch.
pub fn record_dispatch(app: &str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "page_router_dispatch_total",
        "app" => app.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("page_router_dispatch_duration_seconds", "app" => app.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record that a deployment with `pages` pages went live.
pub fn record_deployment(pages: usize) {
    metrics::counter!("page_router_deployments_total").increment(1);
    metrics::gauge!("page_router_pages").set(pages as f64);
}
