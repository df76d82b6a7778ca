//! # Metrics HTTP Handlers

use super::{ProviderSummary, RequestStats, StatsResponse};
use crate::api::AppState;
use crate::registry::ProviderRegistry;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Handler for GET /metrics (Prometheus text format).
///
/// Always returns 200, with empty text before anything was recorded.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics_collector.update_provider_gauges();

    let metrics = state.metrics_collector.render_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    )
}

/// Handler for GET /api/stats (JSON).
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics_collector.update_provider_gauges();

    let providers = compute_provider_stats(state.metrics_collector.registry());
    let requests = compute_request_stats(&providers);

    Json(StatsResponse {
        uptime_seconds: state.metrics_collector.uptime_seconds(),
        requests,
        providers,
        recovery: state.router.recovery().stats(),
        in_flight: state.router.in_flight_count(),
    })
}

/// Sum provider totals.
pub fn compute_request_stats(providers: &[ProviderSummary]) -> RequestStats {
    RequestStats {
        total: providers.iter().map(|p| p.calls).sum(),
        success: providers.iter().map(|p| p.successful_calls).sum(),
        errors: providers.iter().map(|p| p.failed_calls).sum(),
    }
}

/// Per-provider statistics from the registry atomics.
pub fn compute_provider_stats(registry: &ProviderRegistry) -> Vec<ProviderSummary> {
    registry
        .all()
        .iter()
        .map(|entry| {
            let stats = &entry.stats;
            let descriptor = entry.descriptor();
            ProviderSummary {
                id: descriptor.id,
                name: descriptor.name,
                calls: stats.total_calls.load(Ordering::Relaxed),
                successful_calls: stats.successful_calls.load(Ordering::Relaxed),
                failed_calls: stats.failed_calls.load(Ordering::Relaxed),
                average_latency_ms: stats.avg_latency_ms.load(Ordering::Relaxed),
                performance: stats.performance(),
                reliability: stats.reliability(),
                circuit_state: registry.breaker(entry.id()).state().as_str().to_string(),
            }
        })
        .collect()
}
