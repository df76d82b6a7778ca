//! End-to-end routing tests against wiremock providers.
//!
//! Every provider speaks its real wire format; the router sees real HTTP
//! failures, breaker trips and recoveries.

mod common;

use common::*;
use genesis::circuit_breaker::CircuitState;
use genesis::provider::ProviderKind;
use genesis::routing::{fallback_text, AIRouter, ChunkOrigin, RequestEnvelope, RequestType};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat(prompt: &str) -> RequestEnvelope {
    RequestEnvelope::new(prompt, RequestType::Chat)
}

async fn completion_posts(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .count()
}

#[tokio::test]
async fn test_openai_answer_streams_through() {
    let server = MockServer::start().await;
    mount_openai(&server, &["Your ", "great-grandmother ", "emigrated in 1892."]).await;

    let key = test_key("GENESIS_IT_ROUTER_OPENAI");
    let config = test_config(
        vec![provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, Some(key))],
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    let (text, chunks) = collect(router.route_request(chat("When did she emigrate?")).unwrap()).await;
    assert_eq!(text, "Your great-grandmother emigrated in 1892.");
    assert!(chunks.iter().all(|c| c.origin
        == ChunkOrigin::Provider {
            provider_id: "openai-gpt4".into(),
            model: "gpt-4".into()
        }));

    let status = router.registry().status("openai-gpt4").unwrap();
    assert_eq!(status.total_calls, 1);
    assert_eq!(status.circuit_state, CircuitState::Closed);
}

#[tokio::test]
async fn test_cultural_request_goes_to_anthropic() {
    let openai = MockServer::start().await;
    let anthropic = MockServer::start().await;
    let google = MockServer::start().await;
    mount_openai(&openai, &["wrong provider"]).await;
    mount_anthropic(&anthropic, &["Naming ", "ceremonies ", "matter."]).await;
    mount_google(&google, &["wrong provider"]).await;

    let config = test_config(
        mock_table(&openai, &anthropic, &google, "GENESIS_IT_ROUTER_CULTURAL"),
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    let request = RequestEnvelope::new("Why do names matter?", RequestType::Cultural);
    let (text, chunks) = collect(router.route_request(request).unwrap()).await;

    assert_eq!(text, "Naming ceremonies matter.");
    assert!(matches!(
        &chunks[0].origin,
        ChunkOrigin::Provider { provider_id, model }
            if provider_id == "anthropic-claude" && model == "claude-3-sonnet"
    ));
    assert!(openai.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failover_to_next_provider_in_priority_order() {
    let openai = MockServer::start().await;
    let anthropic = MockServer::start().await;
    let google = MockServer::start().await;
    mount_failure(&openai, 503).await;
    mount_failure(&anthropic, 500).await;
    mount_google(&google, &["Three ", "generations ", "of farmers."]).await;

    let config = test_config(
        mock_table(&openai, &anthropic, &google, "GENESIS_IT_ROUTER_FAILOVER"),
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    let (text, chunks) = collect(router.route_request(chat("Who were they?")).unwrap()).await;
    assert_eq!(text, "Three generations of farmers.");
    assert!(!chunks[0].is_fallback());

    let statuses = router.provider_status();
    assert_eq!(statuses["openai-gpt4"].failure_count, 1);
    assert_eq!(statuses["anthropic-claude"].failure_count, 1);
    assert_eq!(statuses["google-gemini"].failure_count, 0);
}

/// Three consecutive failures open the breaker; the fourth call never
/// reaches the provider.
#[tokio::test]
async fn test_breaker_short_circuits_after_threshold() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let key = test_key("GENESIS_IT_ROUTER_THRESHOLD");
    let config = test_config(
        vec![provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, Some(key))],
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    for _ in 0..3 {
        let (text, _) = collect(router.route_request(chat("Hello")).unwrap()).await;
        assert_eq!(text, fallback_text(RequestType::Chat));
    }
    assert!(router.provider_status()["openai-gpt4"].circuit_breaker_open);

    let (text, chunks) = collect(router.route_request(chat("Hello again")).unwrap()).await;
    assert_eq!(text, fallback_text(RequestType::Chat));
    assert!(chunks.iter().all(|c| c.is_fallback()));

    server.verify().await;
}

/// A provider whose health endpoint is fine while completions fail stays
/// short-circuited for the whole reset timeout, even after recovery runs.
#[tokio::test]
async fn test_healthy_models_endpoint_does_not_close_open_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
        .mount(&server)
        .await;

    let key = test_key("GENESIS_IT_ROUTER_HEALTHY_MODELS");
    let config = test_config(
        vec![provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, Some(key))],
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    for _ in 0..3 {
        collect(router.route_request(chat("Hello")).unwrap()).await;
    }
    recovery_settled(&router, 3).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(router.provider_status()["openai-gpt4"].circuit_breaker_open);

    assert_eq!(completion_posts(&server).await, 3);

    let (text, _) = collect(router.route_request(chat("Hello again")).unwrap()).await;
    assert_eq!(text, fallback_text(RequestType::Chat));
    assert_eq!(completion_posts(&server).await, 3);
}

/// Once the reset timeout has passed the next call goes to the provider
/// again, and its success closes the breaker.
#[tokio::test]
async fn test_breaker_admits_probe_after_reset_timeout() {
    let server = MockServer::start().await;
    mount_failure(&server, 500).await;

    let key = test_key("GENESIS_IT_ROUTER_RESET");
    let config = test_config(
        vec![provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, Some(key))],
        3,
        200,
    );
    let router = AIRouter::from_config(&config);

    for _ in 0..3 {
        collect(router.route_request(chat("Hello")).unwrap()).await;
    }
    assert!(router.provider_status()["openai-gpt4"].circuit_breaker_open);

    server.reset().await;
    mount_openai(&server, &["Back ", "online."]).await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    let (text, _) = collect(router.route_request(chat("Hello")).unwrap()).await;
    assert_eq!(text, "Back online.");

    let status = router.registry().status("openai-gpt4").unwrap();
    assert_eq!(status.circuit_state, CircuitState::Closed);
    assert_eq!(status.failure_count, 0);
}

/// Without usable credentials a business request gets the business
/// fallback, not the generic one.
#[tokio::test]
async fn test_business_request_without_credentials_gets_business_fallback() {
    let server = MockServer::start().await;
    let unset = Some("GENESIS_IT_ROUTER_NEVER_SET".to_string());
    let config = test_config(
        vec![
            provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, unset.clone()),
            provider(
                "anthropic-claude",
                ProviderKind::Anthropic,
                &server.uri(),
                "claude-3-sonnet",
                2,
                unset,
            ),
        ],
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    let request = RequestEnvelope::new("How do I grow my archive service?", RequestType::Business);
    let (text, chunks) = collect(router.route_request(request).unwrap()).await;

    assert_eq!(text, fallback_text(RequestType::Business));
    assert_ne!(text, fallback_text(RequestType::Chat));
    assert!(chunks.len() > 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_all_breakers_open_still_yields_fallback() {
    let openai = MockServer::start().await;
    let anthropic = MockServer::start().await;
    let google = MockServer::start().await;
    for server in [&openai, &anthropic, &google] {
        mount_failure(server, 500).await;
    }

    let config = test_config(
        mock_table(&openai, &anthropic, &google, "GENESIS_IT_ROUTER_ALL_OPEN"),
        1,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    collect(router.route_request(chat("first")).unwrap()).await;
    assert!(router
        .provider_status()
        .values()
        .all(|status| status.circuit_breaker_open));

    let (text, chunks) = collect(router.route_request(chat("second")).unwrap()).await;
    assert!(!text.is_empty());
    assert_eq!(text, fallback_text(RequestType::Chat));
    assert!(chunks.iter().all(|c| c.is_fallback()));
}

#[tokio::test]
async fn test_enable_provider_closes_open_breaker() {
    let server = MockServer::start().await;
    mount_failure(&server, 500).await;

    let key = test_key("GENESIS_IT_ROUTER_ENABLE");
    let config = test_config(
        vec![provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, Some(key))],
        1,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    collect(router.route_request(chat("Hello")).unwrap()).await;
    assert!(router.provider_status()["openai-gpt4"].circuit_breaker_open);

    router.enable_provider("openai-gpt4", None).unwrap();

    let status = &router.provider_status()["openai-gpt4"];
    assert!(!status.circuit_breaker_open);
    assert_eq!(status.circuit_state, CircuitState::Closed);
    assert!(status.is_active);
}

#[tokio::test]
async fn test_request_log_sink_receives_one_row() {
    let provider_server = MockServer::start().await;
    let sink = MockServer::start().await;
    mount_openai(&provider_server, &["Logged ", "answer."]).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/ai_requests"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&sink)
        .await;

    let key = test_key("GENESIS_IT_ROUTER_LOG");
    let mut config = test_config(
        vec![provider(
            "openai-gpt4",
            ProviderKind::OpenAI,
            &provider_server.uri(),
            "gpt-4",
            1,
            Some(key),
        )],
        3,
        30_000,
    );
    config.request_log.endpoint = Some(format!("{}/rest/v1/ai_requests", sink.uri()));
    let router = AIRouter::from_config(&config);

    let request = chat("Log me").with_user("user-7");
    collect(router.route_request(request).unwrap()).await;

    let mut rows = Vec::new();
    for _ in 0..50 {
        rows = sink.received_requests().await.unwrap();
        if !rows.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(rows.len(), 1);

    let row: serde_json::Value = serde_json::from_slice(&rows[0].body).unwrap();
    assert_eq!(row["user_id"], "user-7");
    assert_eq!(row["provider_id"], "openai-gpt4");
    assert_eq!(row["status"], "completed");
    assert_eq!(row["fallback_used"], false);
    assert_eq!(row["response_chars"], "Logged answer.".len());
}

#[tokio::test]
async fn test_provider_failures_reach_recovery_system() {
    let server = MockServer::start().await;
    mount_failure(&server, 401).await;

    let key = test_key("GENESIS_IT_ROUTER_RECOVERY");
    let config = test_config(
        vec![provider("openai-gpt4", ProviderKind::OpenAI, &server.uri(), "gpt-4", 1, Some(key))],
        3,
        30_000,
    );
    let router = AIRouter::from_config(&config);

    collect(router.route_request(chat("Hello")).unwrap()).await;

    let mut handled = 0;
    for _ in 0..50 {
        handled = router.recovery().stats().errors_handled;
        if handled > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(handled, 1);

    let recent = router.recovery().recent_errors(1);
    assert_eq!(recent[0].category.as_str(), "auth");
    assert_eq!(recent[0].component, "ai-router");
}
