//! Response streaming and request-log configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and deadlines for response streams
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Delay between words of a fallback response
    pub fallback_chunk_delay_ms: u64,
    /// Deadline for a provider to accept a completion request
    pub provider_timeout_seconds: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            fallback_chunk_delay_ms: 30,
            provider_timeout_seconds: 120,
        }
    }
}

impl StreamingConfig {
    pub fn fallback_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_chunk_delay_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }
}

/// Optional REST sink for request/response rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLogConfig {
    /// Endpoint receiving one JSON row per request (e.g. a Supabase table)
    pub endpoint: Option<String>,
    /// Environment variable holding the sink's API key
    pub api_key_env: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.fallback_chunk_delay(), Duration::from_millis(30));
        assert_eq!(config.provider_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_request_log_disabled_by_default() {
        assert!(RequestLogConfig::default().endpoint.is_none());
    }
}
