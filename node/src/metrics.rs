//! # Prometheus Metrics
//!
//! Exposes operational metrics for the memory node. Scraped by Prometheus
//! at the `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so
//! they do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (wraps `Arc` internally via prometheus handles) so it can
/// be shared across request handlers.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Total number of agent identities registered.
    pub agents_registered_total: IntCounter,
    /// Total number of successful identity recoveries.
    pub identities_recovered_total: IntCounter,
    /// Total number of memory versions stored.
    pub memories_stored_total: IntCounter,
    /// Total number of `clear` operations that completed.
    pub memories_cleared_total: IntCounter,
    /// Total number of requests rejected by signature verification.
    pub auth_failures_total: IntCounter,
    /// Histogram of request handling latency in seconds.
    pub request_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("claw".into()), None)
            .expect("failed to create prometheus registry");

        let agents_registered_total = IntCounter::new(
            "agents_registered_total",
            "Total number of agent identities registered",
        )
        .expect("metric creation");
        registry
            .register(Box::new(agents_registered_total.clone()))
            .expect("metric registration");

        let identities_recovered_total = IntCounter::new(
            "identities_recovered_total",
            "Total number of successful identity recoveries",
        )
        .expect("metric creation");
        registry
            .register(Box::new(identities_recovered_total.clone()))
            .expect("metric registration");

        let memories_stored_total = IntCounter::new(
            "memories_stored_total",
            "Total number of memory versions stored",
        )
        .expect("metric creation");
        registry
            .register(Box::new(memories_stored_total.clone()))
            .expect("metric registration");

        let memories_cleared_total = IntCounter::new(
            "memories_cleared_total",
            "Total number of completed clear operations",
        )
        .expect("metric creation");
        registry
            .register(Box::new(memories_cleared_total.clone()))
            .expect("metric registration");

        let auth_failures_total = IntCounter::new(
            "auth_failures_total",
            "Total number of requests rejected by signature verification",
        )
        .expect("metric creation");
        registry
            .register(Box::new(auth_failures_total.clone()))
            .expect("metric registration");

        let request_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "request_latency_seconds",
                "End-to-end request handling latency in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(request_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            agents_registered_total,
            identities_recovered_total,
            memories_stored_total,
            memories_cleared_total,
            auth_failures_total,
            request_latency_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
