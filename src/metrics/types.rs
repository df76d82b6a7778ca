//! # Metrics Types
//!
//! Data structures for the JSON stats response.

use crate::recovery::RecoveryStats;
use serde::Serialize;

/// JSON response for GET /api/stats.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub uptime_seconds: u64,
    /// Aggregate provider call counts
    pub requests: RequestStats,
    /// Per-provider breakdown, in priority order
    pub providers: Vec<ProviderSummary>,
    pub recovery: RecoveryStats,
    /// Response streams currently open
    pub in_flight: usize,
}

/// Aggregate provider call statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub total: u64,
    pub success: u64,
    pub errors: u64,
}

/// Per-provider statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    /// EMA of time to first chunk
    pub average_latency_ms: u32,
    pub performance: f64,
    pub reliability: f64,
    pub circuit_state: String,
}
