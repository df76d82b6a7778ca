//! Error types for request routing

use crate::registry::RegistryError;
use thiserror::Error;

/// Errors returned to callers of the router.
///
/// Provider failures never appear here: they are absorbed by failover and
/// fallback text. Only misuse of the API is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The prompt is empty or whitespace
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// A request parameter is out of range
    #[error("invalid value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// No provider with this id is registered
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
}

impl From<RegistryError> for RoutingError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::ProviderNotFound(id) | RegistryError::DuplicateProvider(id) => {
                RoutingError::UnknownProvider(id)
            }
        }
    }
}
