//! Request envelope and hints.

use super::RoutingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of work a request asks for; selects the routing table row and the
/// fallback text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    #[default]
    Chat,
    Analysis,
    Generation,
    Coding,
    Business,
    Cultural,
    Creative,
    Technical,
    Research,
}

impl RequestType {
    pub const ALL: [RequestType; 9] = [
        RequestType::Chat,
        RequestType::Analysis,
        RequestType::Generation,
        RequestType::Coding,
        RequestType::Business,
        RequestType::Cultural,
        RequestType::Creative,
        RequestType::Technical,
        RequestType::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Chat => "chat",
            RequestType::Analysis => "analysis",
            RequestType::Generation => "generation",
            RequestType::Coding => "coding",
            RequestType::Business => "business",
            RequestType::Cultural => "cultural",
            RequestType::Creative => "creative",
            RequestType::Technical => "technical",
            RequestType::Research => "research",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown request type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityHint {
    Fast,
    #[default]
    Balanced,
    Best,
}

/// One routed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub prompt: String,
    /// System/context text sent ahead of the prompt
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub request_type: RequestType,
    /// Output token cap; defaults to the provider's limit
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 - 2.0); defaults to the provider's tunable
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub quality: QualityHint,
}

impl RequestEnvelope {
    pub fn new(prompt: impl Into<String>, request_type: RequestType) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
            request_type,
            max_tokens: None,
            temperature: None,
            user_id: None,
            urgency: Urgency::default(),
            quality: QualityHint::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Reject requests no provider could serve.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.prompt.trim().is_empty() {
            return Err(RoutingError::EmptyPrompt);
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(RoutingError::InvalidParameter {
                    param: "temperature".to_string(),
                    message: format!("{} is outside 0.0 - 2.0", temperature),
                });
            }
        }
        if self.max_tokens == Some(0) {
            return Err(RoutingError::InvalidParameter {
                param: "max_tokens".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
