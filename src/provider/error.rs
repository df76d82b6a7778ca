//! Error types for provider operations.

use crate::circuit_breaker::CircuitOpenError;
use crate::recovery::{Categorized, ErrorCategory};
use thiserror::Error;

/// Errors that can occur while calling a provider.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing credentials or other configuration problem.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider's circuit breaker rejected the call.
    #[error(transparent)]
    CircuitOpen(#[from] CircuitOpenError),
}

impl ProviderError {
    /// Map a reqwest error, distinguishing timeouts.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_ms)
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

impl Categorized for ProviderError {
    fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => ErrorCategory::Network,
            ProviderError::Upstream { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Auth
            }
            ProviderError::Configuration(_) => ErrorCategory::Auth,
            ProviderError::Upstream { .. }
            | ProviderError::InvalidResponse(_)
            | ProviderError::CircuitOpen(_) => ErrorCategory::Provider,
        }
    }
}
