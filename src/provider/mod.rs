//! Provider agents.
//!
//! A [`ProviderAgent`] hides one vendor's HTTP protocol behind a uniform
//! streaming interface so the router never branches on vendor type.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub mod anthropic;
pub mod error;
pub mod factory;
pub mod google;
pub mod openai;
pub mod sse;
pub mod types;

pub use error::ProviderError;
pub use factory::{create_agent, resolve_api_key};
pub use types::{
    Capability, CompletionCall, HealthStatus, ProviderDescriptor, ProviderKind, ProviderTunables,
};

/// Stream of text deltas produced by a provider.
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// Uniform interface over every AI vendor API.
///
/// # Object Safety
///
/// Designed to be stored as `Arc<dyn ProviderAgent>`; async methods use
/// `async_trait`.
///
/// # Cancellation Safety
///
/// Dropping a returned future or stream aborts the in-flight HTTP request.
#[async_trait]
pub trait ProviderAgent: Send + Sync + 'static {
    /// Provider id this agent serves (e.g. "openai-gpt4").
    fn id(&self) -> &str;

    /// Vendor API family.
    fn kind(&self) -> ProviderKind;

    /// Start a streaming completion.
    ///
    /// Resolves once the provider accepted the request (2xx). Errors after
    /// that point arrive as items of the returned stream.
    ///
    /// # Returns
    ///
    /// - `Ok(TextStream)` when the provider accepted the request
    /// - `Err(ProviderError::Upstream)` on a non-2xx status
    /// - `Err(ProviderError::Network)` / `Err(ProviderError::Timeout)` on transport failure
    async fn stream_completion(&self, call: CompletionCall) -> Result<TextStream, ProviderError>;

    /// Lightweight reachability and credential check.
    async fn health_check(&self) -> Result<HealthStatus, ProviderError>;
}
