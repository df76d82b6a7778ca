//! Anthropic Claude agent implementation.
//!
//! Speaks the Messages API and unwraps `content_block_delta` events into
//! plain text deltas.

use super::{
    sse, CompletionCall, HealthStatus, ProviderAgent, ProviderError, ProviderKind, TextStream,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic agent implementation.
///
/// Handles Anthropic Claude API calls with API key authentication:
/// - Health check via GET /v1/models
/// - Streaming completion via POST /v1/messages with x-api-key header
pub struct AnthropicAgent {
    /// Provider id
    id: String,
    /// Base URL (e.g., "https://api.anthropic.com")
    base_url: String,
    /// API key for x-api-key authentication
    api_key: String,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
    timeout: Duration,
}

impl AnthropicAgent {
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

    fn build_request(call: CompletionCall) -> AnthropicRequest {
        AnthropicRequest {
            model: call.model,
            system: call.system,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: call.prompt,
            }],
            max_tokens: call.max_tokens,
            temperature: call.temperature,
            stream: true,
        }
    }

    /// Pull the text out of a `content_block_delta` event; every other event
    /// type carries no text. An `error` event mid-stream is surfaced.
    fn extract_delta(payload: &str) -> Result<Option<String>, ProviderError> {
        let event: AnthropicStreamEvent = serde_json::from_str(payload).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Anthropic event: {}", e))
        })?;

        match event.event_type.as_str() {
            "content_block_delta" => Ok(event.delta.and_then(|d| d.text)),
            "error" => {
                let message = event
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Unknown stream error".to_string());
                Err(ProviderError::Upstream {
                    status: 500,
                    message,
                })
            }
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<AnthropicDelta>,
    error: Option<AnthropicStreamError>,
}

#[derive(Debug, Deserialize)]
struct AnthropicDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamError {
    message: String,
}

#[async_trait]
impl ProviderAgent for AnthropicAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn stream_completion(&self, call: CompletionCall) -> Result<TextStream, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
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
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use mockito::{Matcher, Server};

    fn test_agent(base_url: String) -> AnthropicAgent {
        AnthropicAgent::new(
            "anthropic-claude".to_string(),
            base_url,
            "sk-ant-test".to_string(),
            Arc::new(Client::new()),
            Duration::from_secs(5),
        )
    }

    fn call() -> CompletionCall {
        CompletionCall {
            model: "claude-3-sonnet".to_string(),
            system: Some("Respect cultural context.".to_string()),
            prompt: "Tell me about Yoruba naming ceremonies".to_string(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_stream_completion_sends_headers_and_system() {
        let mut server = Server::new_async().await;
        let body = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Naming \"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"ceremonies\"}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "claude-3-sonnet",
                "system": "Respect cultural context.",
                "stream": true
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let agent = test_agent(server.url());
        let stream = agent.stream_completion(call()).await.unwrap();
        let text: Vec<String> = stream.map(|r| r.unwrap()).collect().await;

        mock.assert_async().await;
        assert_eq!(text, vec!["Naming ", "ceremonies"]);
    }

    #[tokio::test]
    async fn test_stream_completion_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(r#"{"type":"error","error":{"type":"authentication_error"}}"#)
            .create_async()
            .await;

        let agent = test_agent(server.url());
        let result = agent.stream_completion(call()).await;
        assert!(matches!(
            result,
            Err(ProviderError::Upstream { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_health_check_uses_models_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/models")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let agent = test_agent(server.url());
        assert_eq!(agent.health_check().await.unwrap(), HealthStatus::Healthy);
        mock.assert_async().await;
    }

    #[test]
    fn test_extract_delta_skips_non_text_events() {
        assert_eq!(
            AnthropicAgent::extract_delta(r#"{"type":"ping"}"#).unwrap(),
            None
        );
        assert_eq!(
            AnthropicAgent::extract_delta(
                r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"hi"}}"#
            )
            .unwrap(),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_extract_delta_error_event() {
        let result = AnthropicAgent::extract_delta(
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        );
        assert!(matches!(
            result,
            Err(ProviderError::Upstream { ref message, .. }) if message == "Overloaded"
        ));
    }
}
