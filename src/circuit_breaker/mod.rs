//! Per-provider circuit breaker.
//!
//! A breaker counts consecutive failures of one provider. At the configured
//! threshold it *opens* and calls fail fast without touching the network.
//! Once the reset timeout has elapsed the breaker goes *half-open* and admits
//! a single probe: success closes it again, failure re-opens it and restarts
//! the timer.
//!
//! ```text
//! Closed --(failures >= threshold)--> Open --(reset timeout)--> HalfOpen
//!    ^                                  ^                          |
//!    |                                  +------(probe fails)-------+
//!    +-----------------------(probe succeeds)----------------------+
//! ```

mod config;
mod error;


pub use config::*;
pub use error::*;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls pass through
    Closed,
    /// Calls fail fast
    Open,
    /// One probe call is admitted
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// How a call was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Normal,
    Probe,
}

/// Clears the probe flag if a probe is dropped before it reports back.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.lock().probe_in_flight = false;
        }
    }
}

/// Failure-isolation state machine guarding one provider.
#[derive(Debug)]
pub struct CircuitBreaker {
    provider_id: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a closed breaker for `provider_id`.
    pub fn new(provider_id: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            provider_id: provider_id.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        // State stays consistent across a poisoned lock: every write is a
        // plain field assignment.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `operation` if the breaker permits it.
    ///
    /// Returns the synthetic [`CircuitOpenError`] (converted into `E`) without
    /// calling `operation` when the breaker is open, or half-open with a probe
    /// already in flight.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CircuitOpenError>,
    {
        let admission = self.admit().map_err(E::from)?;
        let mut guard = ProbeGuard {
            breaker: self,
            armed: admission == Admission::Probe,
        };

        let result = operation().await;
        guard.armed = false;

        match &result {
            Ok(_) => self.on_success(),
            Err(_) => self.on_failure(),
        }
        result
    }

    fn admit(&self) -> Result<Admission, CircuitOpenError> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Ok(Admission::Normal),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                let timeout = self.config.reset_timeout();
                if elapsed >= timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    drop(inner);
                    self.record_transition(CircuitState::Open, CircuitState::HalfOpen);
                    Ok(Admission::Probe)
                } else {
                    Err(CircuitOpenError {
                        provider_id: self.provider_id.clone(),
                        retry_after: timeout - elapsed,
                    })
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(CircuitOpenError {
                        provider_id: self.provider_id.clone(),
                        retry_after: std::time::Duration::ZERO,
                    })
                } else {
                    inner.probe_in_flight = true;
                    Ok(Admission::Probe)
                }
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.lock();
        let previous = inner.state;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        drop(inner);

        if previous != CircuitState::Closed {
            self.record_transition(previous, CircuitState::Closed);
        }
    }

    fn on_failure(&self) {
        let now = Instant::now();
        let mut inner = self.lock();
        let previous = inner.state;

        match inner.state {
            CircuitState::HalfOpen => {
                inner.failure_count += 1;
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                inner.probe_in_flight = false;
            }
            CircuitState::Closed => {
                let stale = inner
                    .last_failure
                    .map(|t| now.duration_since(t) > self.config.monitoring_period())
                    .unwrap_or(false);
                inner.failure_count = if stale { 1 } else { inner.failure_count + 1 };
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                }
            }
            // A call admitted while closed finished after another call opened
            // the breaker.
            CircuitState::Open => {
                inner.failure_count += 1;
            }
        }
        inner.last_failure = Some(now);
        let current = inner.state;
        let failures = inner.failure_count;
        drop(inner);

        if current != previous {
            tracing::warn!(
                provider_id = %self.provider_id,
                failure_count = failures,
                "Circuit breaker opened"
            );
            self.record_transition(previous, current);
        }
    }

    /// Force the breaker closed and clear the failure counter.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let previous = inner.state;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.last_failure = None;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        drop(inner);

        tracing::info!(provider_id = %self.provider_id, "Circuit breaker reset");
        if previous != CircuitState::Closed {
            self.record_transition(previous, CircuitState::Closed);
        }
    }

    /// Current state as callers would observe it.
    ///
    /// An open breaker whose reset timeout has elapsed reports `HalfOpen`;
    /// the stored state only moves when the next call is admitted.
    pub fn state(&self) -> CircuitState {
        let inner = self.lock();
        match (inner.state, inner.opened_at) {
            (CircuitState::Open, Some(opened_at))
                if opened_at.elapsed() >= self.config.reset_timeout() =>
            {
                CircuitState::HalfOpen
            }
            (state, _) => state,
        }
    }

    /// Consecutive failures recorded since the last success or reset.
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// When the most recent failure was recorded.
    pub fn last_failure(&self) -> Option<Instant> {
        self.lock().last_failure
    }

    fn record_transition(&self, from: CircuitState, to: CircuitState) {
        tracing::debug!(
            provider_id = %self.provider_id,
            from = from.as_str(),
            to = to.as_str(),
            "Circuit breaker transition"
        );
        metrics::counter!("genesis_circuit_transitions_total",
            "provider" => self.provider_id.clone(),
            "to" => to.as_str()
        )
        .increment(1);
    }
}
