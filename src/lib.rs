//! Genesis - multi-provider AI router
//!
//! Routes genealogy and heritage prompts to OpenAI, Anthropic or Google
//! models. Each provider sits behind its own circuit breaker; failures are
//! handed to an error recovery system, and when no provider can answer the
//! caller still receives a streamed, prepared response.

pub mod api;
pub mod circuit_breaker;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod recovery;
pub mod registry;
pub mod routing;
