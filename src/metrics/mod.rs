//! # Metrics Collection Module
//!
//! Prometheus export and a JSON stats view over the provider registry.
//!
//! ## Overview
//!
//! This module exposes two endpoints:
//! - `GET /metrics` - Prometheus text format metrics
//! - `GET /api/stats` - JSON format statistics
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `genesis_requests_total{provider, request_type, status}` - Provider attempts
//! - `genesis_fallbacks_total{request_type}` - Requests answered with fallback text
//! - `genesis_circuit_transitions_total{provider, to}` - Breaker state changes
//! - `genesis_recovery_attempts_total{category, outcome}` - Recovery strategy runs
//!
//! **Histograms:**
//! - `genesis_provider_latency_seconds{provider}` - Time to first chunk
//!
//! **Gauges:**
//! - `genesis_providers_total` - Registered providers
//! - `genesis_providers_available` - Active providers with a non-open breaker
//! - `genesis_provider_reliability{provider}` - Rolling reliability score
//! - `genesis_provider_performance{provider}` - Rolling performance score

pub mod handler;
pub mod types;

pub use types::*;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::registry::ProviderRegistry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

/// Computes gauges from the registry and renders Prometheus output.
pub struct MetricsCollector {
    registry: Arc<ProviderRegistry>,
    start_time: Instant,
    /// Sanitized label cache
    label_cache: DashMap<String, String>,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            registry,
            start_time,
            label_cache: DashMap::new(),
            prometheus_handle,
        }
    }

    /// Get sanitized Prometheus label (cached).
    ///
    /// Replaces every character outside `[a-zA-Z0-9_]` with an underscore
    /// and prefixes a leading digit.
    pub fn sanitize_label(&self, label: &str) -> String {
        if let Some(cached) = self.label_cache.get(label) {
            return cached.clone();
        }

        let mut sanitized = label
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();

        if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            sanitized.insert(0, '_');
        }

        self.label_cache
            .insert(label.to_string(), sanitized.clone());
        sanitized
    }

    /// Update provider gauges from the registry.
    pub fn update_provider_gauges(&self) {
        let statuses = self.registry.statuses();

        metrics::gauge!("genesis_providers_total").set(statuses.len() as f64);
        let available = statuses.values().filter(|s| s.available).count();
        metrics::gauge!("genesis_providers_available").set(available as f64);

        for (id, status) in &statuses {
            let label = self.sanitize_label(id);
            metrics::gauge!("genesis_provider_reliability", "provider" => label.clone())
                .set(status.reliability);
            metrics::gauge!("genesis_provider_performance", "provider" => label)
                .set(status.performance);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Provider latency buckets span fast cached answers to slow long-form
/// generations: [0.1, 0.25, 0.5, 1, 2.5, 5, 10, 30, 60, 120] seconds.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let latency_buckets = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("genesis_provider_latency_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// The installed recorder's handle, or a detached one when a recorder is
/// already installed (tests, embedding applications).
pub fn metrics_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating detached handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
