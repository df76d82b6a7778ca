//! Per-request audit records.
//!
//! The router hands one [`RequestRecord`] to a [`RequestLogSink`] when a
//! stream finishes. Sinks are fire and forget: they must not block and their
//! failures never reach the caller.

use super::RequestType;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// How a routed request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// A provider streamed the whole answer
    Completed,
    /// Every candidate failed; fallback text was streamed
    Fallback,
    /// The caller cancelled
    Cancelled,
    /// The provider failed after streaming part of the answer
    Truncated,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Completed => "completed",
            RequestStatus::Fallback => "fallback",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Truncated => "truncated",
        }
    }
}

/// One row of the request log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub request_id: String,
    pub user_id: Option<String>,
    pub request_type: RequestType,
    pub provider_id: Option<String>,
    pub model: Option<String>,
    pub fallback_used: bool,
    pub prompt_chars: usize,
    pub response_chars: usize,
    pub latency_ms: u64,
    pub status: RequestStatus,
    pub timestamp: DateTime<Utc>,
}

/// Destination for request records.
pub trait RequestLogSink: Send + Sync + 'static {
    fn record(&self, record: RequestRecord);
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRequestLog;

impl RequestLogSink for TracingRequestLog {
    fn record(&self, record: RequestRecord) {
        tracing::info!(
            request_id = %record.request_id,
            user_id = record.user_id.as_deref().unwrap_or("-"),
            request_type = %record.request_type,
            provider_id = record.provider_id.as_deref().unwrap_or("-"),
            model = record.model.as_deref().unwrap_or("-"),
            fallback_used = record.fallback_used,
            prompt_chars = record.prompt_chars,
            response_chars = record.response_chars,
            latency_ms = record.latency_ms,
            status = record.status.as_str(),
            "Request completed"
        );
    }
}

/// POSTs each record as JSON to a REST endpoint (e.g. a Supabase table).
///
/// The key, when present, is sent both as `apikey` and as a bearer token.
#[derive(Debug, Clone)]
pub struct HttpRequestLog {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRequestLog {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(
        client: Client,
        endpoint: String,
        api_key: Option<String>,
        record: RequestRecord,
    ) -> Result<(), reqwest::Error> {
        let mut request = client.post(&endpoint).json(&record);
        if let Some(key) = &api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}

impl RequestLogSink for HttpRequestLog {
    fn record(&self, record: RequestRecord) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(request_id = %record.request_id, "No runtime, request log row dropped");
            return;
        };
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();

        handle.spawn(async move {
            let request_id = record.request_id.clone();
            if let Err(e) = Self::send(client, endpoint, api_key, record).await {
                tracing::warn!(%request_id, error = %e, "Failed to write request log row");
            }
        });
    }
}
