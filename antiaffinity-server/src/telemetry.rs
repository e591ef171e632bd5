//! Prometheus Metrics and Logging Setup
//!
//! Exposes metrics at GET /metrics in Prometheus text format.
//! Uses the `metrics` crate with prometheus exporter.

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing, honouring RUST_LOG and falling back to `default_level`
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Initialize the Prometheus metrics exporter and install it as the global recorder.
/// Returns the handle for rendering metrics on the /metrics endpoint.
pub fn init_metrics() -> anyhow::Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// Create metrics route that can be merged into any Router
pub fn routes<S: Clone + Send + Sync + 'static>(
    handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router<S> {
    let handle = Arc::new(handle);
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move { h.render() }
        }),
    )
}
