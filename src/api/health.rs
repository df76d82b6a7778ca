//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub providers: ProviderCounts,
}

#[derive(Debug, Serialize)]
pub struct ProviderCounts {
    pub total: usize,
    pub available: usize,
}

/// GET /health
///
/// `healthy` when every provider is available, `degraded` when some are,
/// `unhealthy` when none are. Requests are still answered with fallback
/// text in every case.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let statuses = state.router.provider_status();
    let total = statuses.len();
    let available = statuses.values().filter(|s| s.available).count();

    let status = match (available, total) {
        (a, t) if a == t && t > 0 => "healthy",
        (a, _) if a > 0 => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: ProviderCounts { total, available },
    })
}
