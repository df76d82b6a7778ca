//! Agent factory for creating ProviderAgent trait objects from descriptors.

use super::{
    anthropic::AnthropicAgent, google::GoogleAIAgent, openai::OpenAIAgent, ProviderAgent,
    ProviderDescriptor, ProviderError, ProviderKind,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Create an agent for a provider.
///
/// # Arguments
///
/// * `descriptor` - Provider descriptor (id, kind and endpoint are used)
/// * `api_key` - Credential for the provider
/// * `client` - Shared HTTP client for connection pooling
/// * `timeout` - Deadline for establishing a completion
///
/// # Examples
///
/// ```
/// use genesis::provider::{create_agent, ProviderDescriptor, ProviderKind, ProviderTunables};
/// use reqwest::Client;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let descriptor = ProviderDescriptor {
///     id: "openai-gpt4".to_string(),
///     name: "OpenAI GPT-4".to_string(),
///     kind: ProviderKind::OpenAI,
///     endpoint: "https://api.openai.com".to_string(),
///     models: vec!["gpt-4".to_string()],
///     capabilities: vec![],
///     cost_per_token: 0.00003,
///     max_tokens: 4096,
///     is_active: true,
///     priority: 1,
///     tunables: ProviderTunables::default(),
/// };
/// let agent = create_agent(
///     &descriptor,
///     "sk-test".to_string(),
///     Arc::new(Client::new()),
///     Duration::from_secs(120),
/// );
///
/// assert_eq!(agent.id(), "openai-gpt4");
/// ```
pub fn create_agent(
    descriptor: &ProviderDescriptor,
    api_key: String,
    client: Arc<Client>,
    timeout: Duration,
) -> Arc<dyn ProviderAgent> {
    let id = descriptor.id.clone();
    let url = descriptor.endpoint.trim_end_matches('/').to_string();

    match descriptor.kind {
        ProviderKind::OpenAI => Arc::new(OpenAIAgent::new(id, url, api_key, client, timeout)),
        ProviderKind::Anthropic => Arc::new(AnthropicAgent::new(id, url, api_key, client, timeout)),
        ProviderKind::Google => Arc::new(GoogleAIAgent::new(id, url, api_key, client, timeout)),
        ProviderKind::Other => Arc::new(
            OpenAIAgent::new(id, url, api_key, client, timeout).with_kind(ProviderKind::Other),
        ),
    }
}

/// Read a provider's API key from the environment variable named by
/// `api_key_env`.
///
/// A missing variable name, an unset variable, or an empty value is a
/// [`ProviderError::Configuration`] error.
pub fn resolve_api_key(api_key_env: Option<&str>) -> Result<String, ProviderError> {
    let env_var = api_key_env.ok_or_else(|| {
        ProviderError::Configuration("provider has no 'api_key_env' configured".to_string())
    })?;

    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        Ok(_) => Err(ProviderError::Configuration(format!(
            "API key env var '{}' is empty",
            env_var
        ))),
        Err(e) => Err(ProviderError::Configuration(format!(
            "Failed to read API key from env var '{}': {}",
            env_var, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderTunables;

    fn descriptor(kind: ProviderKind) -> ProviderDescriptor {
        ProviderDescriptor {
            id: format!("{}-test", kind),
            name: "Test".to_string(),
            kind,
            endpoint: "http://localhost:1234/".to_string(),
            models: vec!["m".to_string()],
            capabilities: vec![],
            cost_per_token: 0.0,
            max_tokens: 1024,
            is_active: true,
            priority: 1,
            tunables: ProviderTunables::default(),
        }
    }

    fn build(kind: ProviderKind) -> Arc<dyn ProviderAgent> {
        create_agent(
            &descriptor(kind),
            "key".to_string(),
            Arc::new(Client::new()),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_create_agent_per_kind() {
        assert_eq!(build(ProviderKind::OpenAI).kind(), ProviderKind::OpenAI);
        assert_eq!(build(ProviderKind::Anthropic).kind(), ProviderKind::Anthropic);
        assert_eq!(build(ProviderKind::Google).kind(), ProviderKind::Google);
        assert_eq!(build(ProviderKind::Other).kind(), ProviderKind::Other);
        assert_eq!(build(ProviderKind::Google).id(), "google-test");
    }

    #[test]
    fn test_resolve_api_key_from_env() {
        std::env::set_var("GENESIS_FACTORY_TEST_KEY", "sk-from-env");
        let key = resolve_api_key(Some("GENESIS_FACTORY_TEST_KEY")).unwrap();
        assert_eq!(key, "sk-from-env");
        std::env::remove_var("GENESIS_FACTORY_TEST_KEY");
    }

    #[test]
    fn test_resolve_api_key_missing_env_var() {
        let result = resolve_api_key(Some("GENESIS_FACTORY_TEST_UNSET_VAR_12345"));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_resolve_api_key_empty_value() {
        std::env::set_var("GENESIS_FACTORY_TEST_EMPTY", "  ");
        let result = resolve_api_key(Some("GENESIS_FACTORY_TEST_EMPTY"));
        assert!(matches!(result, Err(ProviderError::Configuration(ref m)) if m.contains("empty")));
        std::env::remove_var("GENESIS_FACTORY_TEST_EMPTY");
    }

    #[test]
    fn test_resolve_api_key_without_env_name() {
        assert!(matches!(
            resolve_api_key(None),
            Err(ProviderError::Configuration(_))
        ));
    }
}
