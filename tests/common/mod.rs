//! Shared helpers for Genesis integration tests.
//!
//! Provides SSE bodies in each provider's wire format, wiremock mounts,
//! provider tables pointing at mock servers, and app builders.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use futures_util::StreamExt;
use genesis::api::{create_router, AppState};
use genesis::circuit_breaker::CircuitBreakerConfig;
use genesis::config::{GenesisConfig, ProviderConfig};
use genesis::provider::ProviderKind;
use genesis::routing::{AIRouter, ResponseChunk, ResponseStream};
use std::sync::Arc;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// SSE Bodies
// =============================================================================

/// OpenAI chat-completions stream for `parts`.
pub fn openai_sse(parts: &[&str]) -> String {
    let mut body = String::from("data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for part in parts {
        let chunk = serde_json::json!({ "choices": [{ "delta": { "content": part } }] });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// Anthropic Messages stream for `parts`.
pub fn anthropic_sse(parts: &[&str]) -> String {
    let mut body = String::from(
        "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
    );
    for part in parts {
        let event = serde_json::json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": { "type": "text_delta", "text": part }
        });
        body.push_str(&format!("event: content_block_delta\ndata: {}\n\n", event));
    }
    body.push_str("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
    body
}

/// Gemini `streamGenerateContent?alt=sse` stream for `parts`.
pub fn google_sse(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| {
            let chunk = serde_json::json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": part }] } }]
            });
            format!("data: {}\r\n\r\n", chunk)
        })
        .collect()
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

// =============================================================================
// Mock Providers
// =============================================================================

/// Mount an OpenAI completion endpoint streaming `parts`.
pub async fn mount_openai(server: &MockServer, parts: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(sse_response(openai_sse(parts)))
        .mount(server)
        .await;
}

/// Mount an Anthropic completion endpoint streaming `parts`.
pub async fn mount_anthropic(server: &MockServer, parts: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(sse_response(anthropic_sse(parts)))
        .mount(server)
        .await;
}

/// Mount a Gemini completion endpoint streaming `parts`.
pub async fn mount_google(server: &MockServer, parts: &[&str]) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:streamGenerateContent$"))
        .respond_with(sse_response(google_sse(parts)))
        .mount(server)
        .await;
}

/// Mount a completion endpoint answering `status` for every POST.
pub async fn mount_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream exploded"))
        .mount(server)
        .await;
}

// =============================================================================
// Configuration Builders
// =============================================================================

/// Export a key under `var` and return the variable name.
///
/// Each test uses its own variable so parallel tests do not interfere.
pub fn test_key(var: &str) -> String {
    std::env::set_var(var, "sk-integration-test");
    var.to_string()
}

/// One provider entry pointing at `endpoint`, reading its key from `key_env`.
pub fn provider(
    id: &str,
    kind: ProviderKind,
    endpoint: &str,
    model: &str,
    priority: u32,
    key_env: Option<String>,
) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        endpoint: endpoint.to_string(),
        models: vec![model.to_string()],
        capabilities: vec![],
        cost_per_token: 0.0,
        max_tokens: 1024,
        active: true,
        priority,
        temperature: 0.7,
        streaming: true,
        api_key_env: key_env,
        performance: 0.8,
        reliability: 0.9,
    }
}

/// The built-in provider ids pointed at mock servers.
pub fn mock_table(
    openai: &MockServer,
    anthropic: &MockServer,
    google: &MockServer,
    key_env: &str,
) -> Vec<ProviderConfig> {
    let key = Some(test_key(key_env));
    vec![
        provider("openai-gpt4", ProviderKind::OpenAI, &openai.uri(), "gpt-4", 1, key.clone()),
        provider(
            "anthropic-claude",
            ProviderKind::Anthropic,
            &anthropic.uri(),
            "claude-3-sonnet",
            2,
            key.clone(),
        ),
        provider("google-gemini", ProviderKind::Google, &google.uri(), "gemini-pro", 3, key),
    ]
}

/// Config for `providers` with a quick breaker, short recovery backoff and
/// no fallback pacing.
pub fn test_config(providers: Vec<ProviderConfig>, threshold: u32, reset_ms: u64) -> GenesisConfig {
    let mut config = GenesisConfig::default();
    config.providers = providers;
    config.circuit_breaker = CircuitBreakerConfig {
        failure_threshold: threshold,
        reset_timeout_ms: reset_ms,
        monitoring_period_ms: 60_000,
    };
    config.recovery.base_delay_ms = 10;
    config.recovery.max_delay_ms = 50;
    config.streaming.fallback_chunk_delay_ms = 0;
    config.streaming.provider_timeout_seconds = 5;
    config
}

// =============================================================================
// App Builders
// =============================================================================

/// Router and HTTP app sharing one [`AIRouter`].
pub fn test_app(config: GenesisConfig) -> (axum::Router, Arc<AIRouter>) {
    let router = Arc::new(AIRouter::from_config(&config));
    let state = Arc::new(AppState::new(Arc::new(config), Arc::clone(&router)));
    (create_router(state), router)
}

/// JSON POST request.
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Empty-bodied POST request.
pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Read a response body to a string.
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Wait until every error reported to `router` has finished recovery.
pub async fn recovery_settled(router: &AIRouter, reported: u64) -> genesis::recovery::RecoveryStats {
    let mut stats = router.recovery().stats();
    for _ in 0..200 {
        stats = router.recovery().stats();
        let finished = stats.recovered + stats.fell_back + stats.failed + stats.deferred;
        if stats.errors_handled >= reported && finished == stats.errors_handled {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    stats
}

// =============================================================================
// Stream Helpers
// =============================================================================

/// Drain a response stream; returns the joined text and every chunk.
pub async fn collect(mut stream: ResponseStream) -> (String, Vec<ResponseChunk>) {
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk);
    }
    let text = chunks.iter().map(|c| c.text.as_str()).collect();
    (text, chunks)
}

/// `data:` payloads of an SSE body whose event is `chunk`, parsed as chunks.
pub fn sse_chunks(body: &str) -> Vec<ResponseChunk> {
    body.split("\n\n")
        .filter(|event| event.lines().any(|l| l == "event: chunk"))
        .filter_map(|event| {
            event
                .lines()
                .find_map(|l| l.strip_prefix("data: ").or_else(|| l.strip_prefix("data:")))
                .map(str::to_string)
        })
        .map(|data| serde_json::from_str(&data).unwrap())
        .collect()
}
