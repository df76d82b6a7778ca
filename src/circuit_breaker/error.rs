//! Error raised when a breaker short-circuits a call.

use std::time::Duration;
use thiserror::Error;

/// The breaker rejected the call without invoking the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit open for provider '{provider_id}' (retry in {}ms)", retry_after.as_millis())]
pub struct CircuitOpenError {
    /// Provider the breaker guards
    pub provider_id: String,
    /// Time until a probe will be admitted (zero while a probe is in flight)
    pub retry_after: Duration,
}
