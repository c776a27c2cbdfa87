//! Prometheus metrics for chat-service.
//!
//! HTTP metrics come from `service_core::middleware::metrics`; this module
//! adds chat-model outcome and latency, and renders everything for `/metrics`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Safe to call more than once.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!("Failed to install Prometheus recorder: {}", e),
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one chat-model call. `outcome` is `success` or an error kind.
pub fn record_chat_call(model: &str, outcome: &'static str, elapsed: Duration) {
    counter!(
        "chat_requests_total",
        "model" => model.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("chat_model_latency_seconds", "model" => model.to_string())
        .record(elapsed.as_secs_f64());
}
