use crate::circuit_breaker::CircuitState;
use crate::provider::{Capability, ProviderAgent, ProviderDescriptor, ProviderError, ProviderKind};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Weight of the newest sample in the rolling scores.
const EMA_ALPHA: f64 = 0.2;

/// Rolling per-provider call statistics.
///
/// Scores are stored as `f64` bit patterns so every field stays lock-free.
#[derive(Debug)]
pub struct ProviderStats {
    /// Lifetime calls attempted (atomic)
    pub total_calls: AtomicU64,
    /// Calls that produced a response (atomic)
    pub successful_calls: AtomicU64,
    /// Calls that failed before producing a response (atomic)
    pub failed_calls: AtomicU64,
    /// Rolling average time to first chunk in milliseconds (EMA with α=0.2)
    pub avg_latency_ms: AtomicU32,
    performance: AtomicU64,
    reliability: AtomicU64,
}

impl ProviderStats {
    /// Seed the rolling scores (clamped to 0.0 - 1.0).
    pub fn new(performance: f64, reliability: f64) -> Self {
        Self {
            total_calls: AtomicU64::new(0),
            successful_calls: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
            avg_latency_ms: AtomicU32::new(0),
            performance: AtomicU64::new(performance.clamp(0.0, 1.0).to_bits()),
            reliability: AtomicU64::new(reliability.clamp(0.0, 1.0).to_bits()),
        }
    }

    pub fn performance(&self) -> f64 {
        f64::from_bits(self.performance.load(Ordering::SeqCst))
    }

    pub fn reliability(&self) -> f64 {
        f64::from_bits(self.reliability.load(Ordering::SeqCst))
    }

    /// Record a call that produced a response after `latency_ms`.
    pub fn record_success(&self, latency_ms: u32) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        self.successful_calls.fetch_add(1, Ordering::SeqCst);
        self.update_latency(latency_ms);

        let sample = 1.0 / (1.0 + f64::from(latency_ms) / 1000.0);
        Self::blend(&self.performance, sample);
        Self::blend(&self.reliability, 1.0);
    }

    /// Record a call that failed.
    pub fn record_failure(&self) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        self.failed_calls.fetch_add(1, Ordering::SeqCst);
        Self::blend(&self.reliability, 0.0);
    }

    /// EMA: new = (sample + 4*old) / 5. First sample sets the initial value.
    fn update_latency(&self, latency_ms: u32) {
        loop {
            let current = self.avg_latency_ms.load(Ordering::SeqCst);
            let new_val = if current == 0 {
                latency_ms
            } else {
                ((u64::from(latency_ms) + 4 * u64::from(current)) / 5) as u32
            };
            if self
                .avg_latency_ms
                .compare_exchange(current, new_val, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return;
            }
        }
    }

    fn blend(score: &AtomicU64, sample: f64) {
        loop {
            let bits = score.load(Ordering::SeqCst);
            let old = f64::from_bits(bits);
            let new = (EMA_ALPHA * sample + (1.0 - EMA_ALPHA) * old).clamp(0.0, 1.0);
            if score
                .compare_exchange(bits, new.to_bits(), Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return;
            }
        }
    }
}

/// A registered provider: static descriptor plus runtime state.
///
/// Only the active flag, the agent and the stats change after registration.
pub struct ProviderEntry {
    descriptor: ProviderDescriptor,
    active: AtomicBool,
    /// Environment variable the API key is read from
    api_key_env: Option<String>,
    /// Agent, or the configuration error explaining why there is none
    agent: RwLock<Result<Arc<dyn ProviderAgent>, ProviderError>>,
    pub stats: ProviderStats,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("id", &self.descriptor.id)
            .field("active", &self.is_active())
            .field("has_agent", &self.agent().is_ok())
            .finish()
    }
}

impl ProviderEntry {
    /// Create an entry without an agent yet.
    pub fn new(
        descriptor: ProviderDescriptor,
        api_key_env: Option<String>,
        stats: ProviderStats,
    ) -> Self {
        let missing = ProviderError::Configuration(format!(
            "no credentials loaded for provider '{}'",
            descriptor.id
        ));
        Self {
            active: AtomicBool::new(descriptor.is_active),
            descriptor,
            api_key_env,
            agent: RwLock::new(Err(missing)),
            stats,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// The descriptor with the current active flag.
    pub fn descriptor(&self) -> ProviderDescriptor {
        let mut descriptor = self.descriptor.clone();
        descriptor.is_active = self.is_active();
        descriptor
    }

    pub fn kind(&self) -> ProviderKind {
        self.descriptor.kind
    }

    pub fn priority(&self) -> u32 {
        self.descriptor.priority
    }

    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// The agent, or the configuration error recorded when it could not be built.
    pub fn agent(&self) -> Result<Arc<dyn ProviderAgent>, ProviderError> {
        self.agent
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn set_agent(&self, agent: Result<Arc<dyn ProviderAgent>, ProviderError>) {
        *self.agent.write().unwrap_or_else(|e| e.into_inner()) = agent;
    }
}

/// Serializable status of one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub id: String,
    pub name: String,
    pub kind: ProviderKind,
    /// Active and not short-circuited by an open breaker
    pub available: bool,
    pub is_active: bool,
    pub has_credentials: bool,
    pub performance: f64,
    pub reliability: f64,
    pub capabilities: Vec<Capability>,
    pub models: Vec<String>,
    pub priority: u32,
    pub circuit_state: CircuitState,
    pub circuit_breaker_open: bool,
    pub failure_count: u32,
    pub total_calls: u64,
    pub avg_latency_ms: u32,
}

impl ProviderStatus {
    pub fn new(entry: &ProviderEntry, circuit_state: CircuitState, failure_count: u32) -> Self {
        let is_active = entry.is_active();
        Self {
            id: entry.descriptor.id.clone(),
            name: entry.descriptor.name.clone(),
            kind: entry.descriptor.kind,
            available: is_active && circuit_state != CircuitState::Open,
            is_active,
            has_credentials: entry.agent().is_ok(),
            performance: entry.stats.performance(),
            reliability: entry.stats.reliability(),
            capabilities: entry.descriptor.capabilities.clone(),
            models: entry.descriptor.models.clone(),
            priority: entry.descriptor.priority,
            circuit_state,
            circuit_breaker_open: circuit_state == CircuitState::Open,
            failure_count,
            total_calls: entry.stats.total_calls.load(Ordering::SeqCst),
            avg_latency_ms: entry.stats.avg_latency_ms.load(Ordering::SeqCst),
        }
    }
}
