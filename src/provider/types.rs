//! Supporting types for provider descriptors and outbound calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor API family a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions API
    OpenAI,
    /// Anthropic Messages API
    Anthropic,
    /// Google Generative Language API
    Google,
    /// Any other OpenAI-compatible endpoint
    Other,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Capability tags advertised by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Chat,
    Analysis,
    Generation,
    Coding,
    Business,
    Cultural,
    Creative,
    Technical,
    Research,
    Reasoning,
    Multimodal,
}

/// Per-provider defaults applied when a request does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTunables {
    /// Default sampling temperature
    pub temperature: f32,
    /// Whether the provider streams responses
    pub streaming: bool,
}

impl Default for ProviderTunables {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            streaming: true,
        }
    }
}

/// Static configuration for one AI provider.
///
/// Built once at startup from the provider table. Only `is_active` changes
/// afterwards (through enable/disable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Stable provider id (e.g. "openai-gpt4")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// API family
    pub kind: ProviderKind,
    /// Base URL for API requests
    pub endpoint: String,
    /// Model names served by this provider, preferred first
    pub models: Vec<String>,
    /// Capability tags
    pub capabilities: Vec<Capability>,
    /// Cost per token in USD
    pub cost_per_token: f64,
    /// Upper bound on output tokens per call
    pub max_tokens: u32,
    /// Whether the router may use this provider
    pub is_active: bool,
    /// Priority rank (lower = preferred)
    pub priority: u32,
    /// Default tunables
    pub tunables: ProviderTunables,
}

impl ProviderDescriptor {
    /// The model used when the routing table does not name one.
    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }

    /// Whether `model` is served by this provider.
    pub fn serves(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

/// A single outbound completion call, already resolved against a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCall {
    /// Concrete model name
    pub model: String,
    /// Optional system/context text
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Output token cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Outcome of a provider health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Provider answered successfully.
    Healthy,
    /// Provider answered with an error status.
    Unhealthy,
}
