//! OpenAI agent implementation.

use super::{
    sse, CompletionCall, HealthStatus, ProviderAgent, ProviderError, ProviderKind, TextStream,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// OpenAI agent implementation.
///
/// Handles OpenAI (and OpenAI-compatible) APIs with Bearer authentication:
/// - Health check via GET /v1/models
/// - Streaming chat completion via POST /v1/chat/completions (SSE)
pub struct OpenAIAgent {
    /// Provider id
    id: String,
    /// API family (OpenAI or another compatible endpoint)
    kind: ProviderKind,
    /// Base URL (e.g., "https://api.openai.com")
    base_url: String,
    /// API key for Bearer authentication
    api_key: String,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
    /// Deadline for establishing a completion
    timeout: Duration,
}

impl OpenAIAgent {
    pub fn new(
        id: String,
        base_url: String,
        api_key: String,
        client: Arc<Client>,
        timeout: Duration,
    ) -> Self {
        Self {
            id,
            kind: ProviderKind::OpenAI,
            base_url,
            api_key,
            client,
            timeout,
        }
    }

    /// Same agent reporting a different provider kind (OpenAI-compatible APIs).
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    fn build_request(call: CompletionCall) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = call.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: call.prompt,
        });

        OpenAIRequest {
            model: call.model,
            messages,
            max_tokens: call.max_tokens,
            temperature: call.temperature,
            stream: true,
        }
    }

    /// Extract the text delta from one streamed chunk.
    fn extract_delta(payload: &str) -> Result<Option<String>, ProviderError> {
        let chunk: OpenAIStreamChunk = serde_json::from_str(payload).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse OpenAI stream chunk: {}", e))
        })?;
        Ok(chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content))
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    #[serde(default)]
    delta: OpenAIDelta,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
}

#[async_trait]
impl ProviderAgent for OpenAIAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn stream_completion(&self, call: CompletionCall) -> Result<TextStream, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&Self::build_request(call))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(sse::text_stream(response.bytes_stream(), Self::extract_delta))
    }

    async fn health_check(&self) -> Result<HealthStatus, ProviderError> {
        let url = format!("{}/v1/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, 5000))?;

        if response.status().is_success() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }
}
