//! Provider table configuration

use crate::provider::{Capability, ProviderDescriptor, ProviderKind, ProviderTunables};
use serde::{Deserialize, Serialize};

/// One `[[providers]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    pub kind: ProviderKind,
    pub endpoint: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub cost_per_token: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_true")]
    pub streaming: bool,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Initial performance score (0.0 - 1.0)
    #[serde(default = "default_performance")]
    pub performance: f64,
    /// Initial reliability score (0.0 - 1.0)
    #[serde(default = "default_reliability")]
    pub reliability: f64,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    50
}

fn default_temperature() -> f32 {
    0.7
}

fn default_performance() -> f64 {
    0.8
}

fn default_reliability() -> f64 {
    0.9
}

impl ProviderConfig {
    /// Build the runtime descriptor for this entry.
    pub fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            endpoint: self.endpoint.clone(),
            models: self.models.clone(),
            capabilities: self.capabilities.clone(),
            cost_per_token: self.cost_per_token,
            max_tokens: self.max_tokens,
            is_active: self.active,
            priority: self.priority,
            tunables: ProviderTunables {
                temperature: self.temperature,
                streaming: self.streaming,
            },
        }
    }
}

/// The built-in provider table used when no `[[providers]]` are configured.
pub fn default_providers() -> Vec<ProviderConfig> {
    use Capability::*;

    vec![
        ProviderConfig {
            id: "openai-gpt4".to_string(),
            name: "OpenAI GPT-4".to_string(),
            kind: ProviderKind::OpenAI,
            endpoint: "https://api.openai.com".to_string(),
            models: vec!["gpt-4".to_string(), "gpt-3.5-turbo".to_string()],
            capabilities: vec![Chat, Analysis, Business, Coding, Reasoning, Technical],
            cost_per_token: 0.00003,
            max_tokens: 8192,
            active: true,
            priority: 1,
            temperature: 0.7,
            streaming: true,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            performance: 0.9,
            reliability: 0.95,
        },
        ProviderConfig {
            id: "anthropic-claude".to_string(),
            name: "Anthropic Claude".to_string(),
            kind: ProviderKind::Anthropic,
            endpoint: "https://api.anthropic.com".to_string(),
            models: vec!["claude-3-sonnet".to_string(), "claude-3-haiku".to_string()],
            capabilities: vec![Chat, Analysis, Cultural, Creative, Research, Reasoning],
            cost_per_token: 0.000015,
            max_tokens: 4096,
            active: true,
            priority: 2,
            temperature: 0.7,
            streaming: true,
            api_key_env: Some("ANTHROPIC_API_KEY".to_string()),
            performance: 0.88,
            reliability: 0.93,
        },
        ProviderConfig {
            id: "google-gemini".to_string(),
            name: "Google Gemini".to_string(),
            kind: ProviderKind::Google,
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            models: vec!["gemini-pro".to_string()],
            capabilities: vec![Chat, Generation, Multimodal, Research, Technical],
            cost_per_token: 0.0000005,
            max_tokens: 2048,
            active: true,
            priority: 3,
            temperature: 0.7,
            streaming: true,
            api_key_env: Some("GOOGLE_AI_API_KEY".to_string()),
            performance: 0.82,
            reliability: 0.9,
        },
    ]
}
