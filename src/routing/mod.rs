//! Request routing
//!
//! [`AIRouter`] turns a [`RequestEnvelope`] into a lazy [`ResponseStream`].
//! Candidates come from the static routing table ([`selection`]); each call
//! runs inside the provider's circuit breaker. A failed provider is reported
//! to the recovery system and the next candidate is tried. When every
//! candidate fails the stream carries the pre-authored fallback text for the
//! request type, so provider errors never reach the caller.

pub mod error;
pub mod fallback;
pub mod request;
pub mod request_log;
pub mod selection;
pub mod stream;


pub use error::RoutingError;
pub use fallback::{fallback_text, word_chunks};
pub use request::{QualityHint, RequestEnvelope, RequestType, Urgency};
pub use request_log::{
    HttpRequestLog, RequestLogSink, RequestRecord, RequestStatus, TracingRequestLog,
};
pub use selection::{plan, route_for, Candidate, Route};
pub use stream::{ChunkOrigin, ResponseChunk, ResponseStream};

use crate::config::{GenesisConfig, StreamingConfig};
use crate::logging::{generate_request_id, truncate_prompt};
use crate::provider::{CompletionCall, ProviderDescriptor, ProviderError, TextStream};
use crate::recovery::{ErrorContext, ErrorRecoverySystem};
use crate::registry::{ProviderRegistry, ProviderStatus};
use chrono::Utc;
use dashmap::DashMap;
use futures_util::{Stream, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Component name used when reporting errors to the recovery system.
const COMPONENT: &str = "ai-router";

/// Routes requests across AI providers.
///
/// # Examples
///
/// ```no_run
/// use genesis::config::GenesisConfig;
/// use genesis::routing::{AIRouter, RequestEnvelope, RequestType};
/// use futures_util::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let router = AIRouter::from_config(&GenesisConfig::default());
/// let request = RequestEnvelope::new("What does the surname Okafor mean?", RequestType::Cultural);
///
/// let mut stream = router.route_request(request)?;
/// while let Some(chunk) = stream.next().await {
///     print!("{}", chunk.text);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AIRouter {
    registry: Arc<ProviderRegistry>,
    recovery: Arc<ErrorRecoverySystem>,
    request_log: Arc<dyn RequestLogSink>,
    in_flight: Arc<DashMap<String, CancellationToken>>,
    streaming: StreamingConfig,
    content_logging: bool,
}

impl AIRouter {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        recovery: Arc<ErrorRecoverySystem>,
        streaming: StreamingConfig,
    ) -> Self {
        Self {
            registry,
            recovery,
            request_log: Arc::new(TracingRequestLog),
            in_flight: Arc::new(DashMap::new()),
            streaming,
            content_logging: false,
        }
    }

    /// Build the registry, the recovery system with its built-in strategies
    /// and the request log sink from `config`.
    pub fn from_config(config: &GenesisConfig) -> Self {
        let registry = Arc::new(ProviderRegistry::new(
            config.providers.clone(),
            config.circuit_breaker.clone(),
            config.streaming.provider_timeout(),
        ));
        let recovery = Arc::new(ErrorRecoverySystem::with_builtin_strategies(
            config.recovery.clone(),
            Arc::clone(&registry),
        ));

        let mut router = Self::new(registry, recovery, config.streaming.clone())
            .with_content_logging(config.logging.enable_content_logging);

        if let Some(endpoint) = &config.request_log.endpoint {
            let api_key = config
                .request_log
                .api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|key| !key.is_empty());
            tracing::info!(%endpoint, "Request log sink enabled");
            router = router.with_request_log(Arc::new(HttpRequestLog::new(
                reqwest::Client::new(),
                endpoint.clone(),
                api_key,
            )));
        }
        router
    }

    pub fn with_request_log(mut self, sink: Arc<dyn RequestLogSink>) -> Self {
        self.request_log = sink;
        self
    }

    /// Log truncated prompt text with routing events.
    pub fn with_content_logging(mut self, enabled: bool) -> Self {
        self.content_logging = enabled;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn recovery(&self) -> &Arc<ErrorRecoverySystem> {
        &self.recovery
    }

    /// Route `request` and return its response stream.
    ///
    /// The stream is lazy: providers are contacted on first poll. It always
    /// produces an answer, from a provider or from fallback text, unless it
    /// is cancelled.
    ///
    /// # Errors
    ///
    /// Only for requests no provider could serve: an empty prompt, an
    /// out-of-range temperature or a zero token cap.
    pub fn route_request(&self, request: RequestEnvelope) -> Result<ResponseStream, RoutingError> {
        request.validate()?;

        let request_id = generate_request_id();
        let cancel = CancellationToken::new();
        let job = RouteJob {
            request_id: request_id.clone(),
            request,
            registry: Arc::clone(&self.registry),
            recovery: Arc::clone(&self.recovery),
            request_log: Arc::clone(&self.request_log),
            cancel: cancel.clone(),
            chunk_delay: self.streaming.fallback_chunk_delay(),
            content_logging: self.content_logging,
        };

        Ok(ResponseStream::new(
            request_id,
            cancel,
            job.run().boxed(),
            Arc::clone(&self.in_flight),
        ))
    }

    /// Status of every provider keyed by id.
    pub fn provider_status(&self) -> BTreeMap<String, ProviderStatus> {
        self.registry.statuses()
    }

    /// Activate a provider, close its breaker and rebuild its agent.
    ///
    /// With `api_key` the agent is rebuilt from that key. Without it an
    /// existing agent is kept, otherwise the key is read from the
    /// provider's environment variable. A provider left without credentials
    /// is still enabled; routing skips it until a key is supplied.
    pub fn enable_provider(&self, id: &str, api_key: Option<String>) -> Result<(), RoutingError> {
        let entry = self
            .registry
            .get(id)
            .ok_or_else(|| RoutingError::UnknownProvider(id.to_string()))?;

        entry.set_active(true);
        self.registry.breaker(id).reset();

        if api_key.is_some() || entry.agent().is_err() {
            if let Err(e) = self.registry.install_agent(id, api_key)? {
                tracing::warn!(provider_id = %id, error = %e, "Provider enabled without credentials");
            }
        }
        tracing::info!(provider_id = %id, "Provider enabled");
        Ok(())
    }

    pub fn disable_provider(&self, id: &str) -> Result<(), RoutingError> {
        self.registry.set_active(id, false)?;
        tracing::info!(provider_id = %id, "Provider disabled");
        Ok(())
    }

    /// Close the provider's breaker and clear its failure count.
    pub fn reset_provider(&self, id: &str) -> Result<(), RoutingError> {
        if self.registry.get(id).is_none() {
            return Err(RoutingError::UnknownProvider(id.to_string()));
        }
        self.registry.breaker(id).reset();
        Ok(())
    }

    /// Cancel a live stream by request id.
    ///
    /// Returns false when no stream with that id is alive.
    pub fn cancel_request(&self, request_id: &str) -> bool {
        match self.in_flight.get(request_id) {
            Some(token) => {
                token.cancel();
                tracing::info!(%request_id, "Request cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of response streams currently alive.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// Why a candidate produced no stream.
enum AttemptError {
    Cancelled,
    Failed(ProviderError),
}

/// A provider that accepted the call and produced its first text.
struct Opened {
    first: String,
    rest: TextStream,
}

enum Next {
    Cancelled,
    Item(Option<Result<String, ProviderError>>),
}

/// Writes the request record once, however the stream ends.
///
/// A stream dropped before it finished is recorded as cancelled.
struct Ledger {
    sink: Arc<dyn RequestLogSink>,
    record: RequestRecord,
    started: Instant,
    finished: bool,
}

impl Ledger {
    fn finish(&mut self, status: RequestStatus) {
        self.record.status = status;
        self.finished = true;
    }
}

impl Drop for Ledger {
    fn drop(&mut self) {
        if !self.finished {
            self.record.status = RequestStatus::Cancelled;
        }
        self.record.latency_ms = self.started.elapsed().as_millis() as u64;
        self.sink.record(self.record.clone());
    }
}

/// Everything one routed request needs, owned by its stream.
struct RouteJob {
    request_id: String,
    request: RequestEnvelope,
    registry: Arc<ProviderRegistry>,
    recovery: Arc<ErrorRecoverySystem>,
    request_log: Arc<dyn RequestLogSink>,
    cancel: CancellationToken,
    chunk_delay: Duration,
    content_logging: bool,
}

impl RouteJob {
    fn run(self) -> impl Stream<Item = ResponseChunk> + Send + 'static {
        async_stream::stream! {
            let job = self;
            let request_type = job.request.request_type;
            let mut ledger = Ledger {
                sink: Arc::clone(&job.request_log),
                record: RequestRecord {
                    request_id: job.request_id.clone(),
                    user_id: job.request.user_id.clone(),
                    request_type,
                    provider_id: None,
                    model: None,
                    fallback_used: false,
                    prompt_chars: job.request.prompt.chars().count(),
                    response_chars: 0,
                    latency_ms: 0,
                    status: RequestStatus::Cancelled,
                    timestamp: Utc::now(),
                },
                started: Instant::now(),
                finished: false,
            };

            let active: Vec<ProviderDescriptor> = job
                .registry
                .active_by_priority()
                .iter()
                .map(|entry| entry.descriptor())
                .collect();
            let candidates = plan(request_type, &active);
            let preview = truncate_prompt(&job.request.prompt, job.content_logging);

            tracing::info!(
                request_id = %job.request_id,
                %request_type,
                urgency = ?job.request.urgency,
                quality = ?job.request.quality,
                candidates = candidates.len(),
                prompt = preview.as_deref().unwrap_or("-"),
                "Routing request"
            );

            'candidates: for candidate in &candidates {
                let opened = match job.open(candidate).await {
                    Ok(opened) => opened,
                    Err(AttemptError::Cancelled) => {
                        ledger.finish(RequestStatus::Cancelled);
                        break 'candidates;
                    }
                    Err(AttemptError::Failed(e)) => {
                        job.report(&e);
                        continue;
                    }
                };

                let origin = ChunkOrigin::Provider {
                    provider_id: candidate.provider_id.clone(),
                    model: candidate.model.clone(),
                };
                ledger.record.provider_id = Some(candidate.provider_id.clone());
                ledger.record.model = Some(candidate.model.clone());
                ledger.record.response_chars += opened.first.chars().count();
                yield ResponseChunk { text: opened.first, origin: origin.clone() };

                let mut rest = opened.rest;
                loop {
                    let next = tokio::select! {
                        biased;
                        _ = job.cancel.cancelled() => Next::Cancelled,
                        item = rest.next() => Next::Item(item),
                    };
                    match next {
                        Next::Cancelled => {
                            ledger.finish(RequestStatus::Cancelled);
                            break 'candidates;
                        }
                        Next::Item(Some(Ok(text))) => {
                            if text.is_empty() {
                                continue;
                            }
                            ledger.record.response_chars += text.chars().count();
                            yield ResponseChunk { text, origin: origin.clone() };
                        }
                        Next::Item(Some(Err(e))) => {
                            tracing::warn!(
                                request_id = %job.request_id,
                                provider_id = %candidate.provider_id,
                                error = %e,
                                "Provider failed mid-stream, keeping partial answer"
                            );
                            job.report(&e);
                            ledger.finish(RequestStatus::Truncated);
                            break 'candidates;
                        }
                        Next::Item(None) => {
                            ledger.finish(RequestStatus::Completed);
                            break 'candidates;
                        }
                    }
                }
            }

            if !ledger.finished {
                tracing::warn!(
                    request_id = %job.request_id,
                    %request_type,
                    attempted = candidates.len(),
                    "No provider answered, streaming fallback response"
                );
                metrics::counter!("genesis_fallbacks_total", "request_type" => request_type.as_str())
                    .increment(1);
                ledger.record.fallback_used = true;
                ledger.finish(RequestStatus::Fallback);

                for (i, word) in word_chunks(fallback_text(request_type)).into_iter().enumerate() {
                    let cancelled = if i == 0 {
                        job.cancel.is_cancelled()
                    } else {
                        tokio::select! {
                            biased;
                            _ = job.cancel.cancelled() => true,
                            _ = tokio::time::sleep(job.chunk_delay) => false,
                        }
                    };
                    if cancelled {
                        ledger.finish(RequestStatus::Cancelled);
                        break;
                    }
                    ledger.record.response_chars += word.chars().count();
                    yield ResponseChunk { text: word, origin: ChunkOrigin::Fallback };
                }
            }
        }
    }

    /// Call one candidate through its breaker and wait for the first text.
    async fn open(&self, candidate: &Candidate) -> Result<Opened, AttemptError> {
        let provider_id = candidate.provider_id.as_str();
        let entry = self.registry.get(provider_id).ok_or_else(|| {
            AttemptError::Failed(ProviderError::Configuration(format!(
                "provider '{}' is not registered",
                provider_id
            )))
        })?;

        // Missing credentials never reach the breaker.
        let agent = entry.agent().map_err(|e| {
            tracing::debug!(request_id = %self.request_id, %provider_id, "Skipping provider without credentials");
            AttemptError::Failed(e)
        })?;

        let descriptor = entry.descriptor();
        let call = CompletionCall {
            model: candidate.model.clone(),
            system: self.request.context.clone(),
            prompt: self.request.prompt.clone(),
            max_tokens: self.request.max_tokens.unwrap_or(descriptor.max_tokens),
            temperature: self
                .request
                .temperature
                .unwrap_or(descriptor.tunables.temperature),
        };

        let breaker = self.registry.breaker(provider_id);
        let started = Instant::now();
        let attempt = breaker.execute(|| async move {
            let mut stream = agent.stream_completion(call).await?;
            loop {
                match stream.next().await {
                    Some(Ok(text)) if text.is_empty() => continue,
                    Some(Ok(text)) => return Ok((text, stream)),
                    Some(Err(e)) => return Err(e),
                    None => {
                        return Err(ProviderError::InvalidResponse(
                            "provider returned an empty response".to_string(),
                        ))
                    }
                }
            }
        });

        // Dropping the attempt on cancel releases a half-open probe without
        // counting a failure.
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(AttemptError::Cancelled),
            result = attempt => result,
        };
        let request_type = self.request.request_type.as_str();

        match result {
            Ok((first, rest)) => {
                let latency = started.elapsed();
                entry.stats.record_success(latency.as_millis() as u32);
                metrics::counter!("genesis_requests_total",
                    "provider" => provider_id.to_string(),
                    "request_type" => request_type,
                    "status" => "success"
                )
                .increment(1);
                metrics::histogram!("genesis_provider_latency_seconds",
                    "provider" => provider_id.to_string()
                )
                .record(latency.as_secs_f64());
                tracing::info!(
                    request_id = %self.request_id,
                    %provider_id,
                    model = %candidate.model,
                    latency_ms = latency.as_millis() as u64,
                    "Provider accepted request"
                );
                Ok(Opened { first, rest })
            }
            Err(e) => {
                let status = match &e {
                    ProviderError::CircuitOpen(_) => "circuit_open",
                    _ => {
                        entry.stats.record_failure();
                        "error"
                    }
                };
                metrics::counter!("genesis_requests_total",
                    "provider" => provider_id.to_string(),
                    "request_type" => request_type,
                    "status" => status
                )
                .increment(1);
                tracing::warn!(
                    request_id = %self.request_id,
                    %provider_id,
                    error = %e,
                    "Provider attempt failed, trying next candidate"
                );
                Err(AttemptError::Failed(e))
            }
        }
    }

    /// Hand a provider failure to the recovery system without waiting.
    fn report(&self, error: &ProviderError) {
        let context =
            ErrorContext::from_error(COMPONENT, error).with_user(self.request.user_id.clone());
        let recovery = Arc::clone(&self.recovery);
        tokio::spawn(async move {
            recovery.handle_error(context).await;
        });
    }
}
