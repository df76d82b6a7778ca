//! Google AI (Gemini) agent implementation.

use super::{
    sse, CompletionCall, HealthStatus, ProviderAgent, ProviderError, ProviderKind, TextStream,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Google AI agent implementation.
///
/// Handles Google Gemini API calls with query-parameter authentication:
/// - Health check via GET /v1beta/models?key={key}
/// - Streaming completion via POST /v1beta/models/{model}:streamGenerateContent?alt=sse&key={key}
pub struct GoogleAIAgent {
    /// Provider id
    id: String,
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    base_url: String,
    /// API key for query parameter authentication
    api_key: String,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
    timeout: Duration,
}

impl GoogleAIAgent {
    pub fn new(
        id: String,
        base_url: String,
        api_key: String,
        client: Arc<Client>,
        timeout: Duration,
    ) -> Self {
        Self {
            id,
            base_url,
            api_key,
            client,
            timeout,
        }
    }

    fn build_request(call: CompletionCall) -> GoogleRequest {
        GoogleRequest {
            contents: vec![GoogleContent {
                role: "user".to_string(),
                parts: vec![GooglePart { text: call.prompt }],
            }],
            system_instruction: call.system.map(|text| GoogleSystemInstruction {
                parts: vec![GooglePart { text }],
            }),
            generation_config: GoogleGenerationConfig {
                temperature: call.temperature,
                max_output_tokens: call.max_tokens,
            },
        }
    }

    /// Join every text part of the first candidate.
    fn extract_delta(payload: &str) -> Result<Option<String>, ProviderError> {
        let chunk: GoogleStreamChunk = serde_json::from_str(payload).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Google stream chunk: {}", e))
        })?;

        Ok(chunk.candidates.into_iter().next().map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        }))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest {
    contents: Vec<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GoogleSystemInstruction>,
    generation_config: GoogleGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GooglePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GoogleSystemInstruction {
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GoogleStreamChunk {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: GoogleContent,
}

#[async_trait]
impl ProviderAgent for GoogleAIAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn stream_completion(&self, call: CompletionCall) -> Result<TextStream, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, call.model, self.api_key
        );
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .post(&url)
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
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);

        let response = self
            .client
            .get(&url)
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
