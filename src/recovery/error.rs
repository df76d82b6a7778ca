use super::ErrorCategory;
use thiserror::Error;

/// Errors raised while running a recovery strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("recovery strategy '{strategy}' failed: {reason}")]
    StrategyFailed {
        strategy: &'static str,
        reason: String,
    },

    #[error("no recovery strategy registered for category '{0}'")]
    NoStrategy(ErrorCategory),
}
