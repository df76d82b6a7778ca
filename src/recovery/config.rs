//! Configuration for error recovery.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry and error-log settings for the recovery system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Strategy attempts before falling back to the generic strategy (at least one)
    pub max_retries: u32,
    /// Delay after the first failed attempt
    pub base_delay_ms: u64,
    /// Upper bound for any single delay
    pub max_delay_ms: u64,
    /// Growth factor applied per attempt
    pub backoff_multiplier: f64,
    /// Entries kept in the error log before the oldest is evicted
    pub error_log_capacity: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            error_log_capacity: 100,
        }
    }
}

impl RecoveryConfig {
    /// Delay to wait after failed attempt number `attempt` (0-based):
    /// `base_delay * multiplier^attempt`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt.min(i32::MAX as u32) as i32);
        let millis = (self.base_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }
}
