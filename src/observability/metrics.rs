//! Metrics collection and exposition.
//!
//! # Metrics
//! - `view_router_navigations_total` (counter): navigations by outcome
//! - `view_router_fallback_redirects_total` (counter): unknown paths sent home
//! - `view_router_component_loads_total` (counter): lazy loads by component, result
//! - `view_router_component_load_seconds` (histogram): lazy load latency
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_navigation(outcome: &'static str) {
    counter!("view_router_navigations_total", "outcome" => outcome).increment(1);
}

pub fn record_fallback_redirect() {
    counter!("view_router_fallback_redirects_total").increment(1);
}

pub fn record_component_load(component: &str, result: &'static str, started: Instant) {
    counter!(
        "view_router_component_loads_total",
        "component" => component.to_string(),
        "result" => result
    )
    .increment(1);
    histogram!(
        "view_router_component_load_seconds",
        "component" => component.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}
