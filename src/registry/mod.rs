//! Provider Registry module.
//!
//! Thread-safe in-memory storage of AI providers, their agents and their
//! circuit breakers.

mod error;
mod provider;

pub use error::*;
pub use provider::*;

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::config::ProviderConfig;
use crate::provider::{
    create_agent, resolve_api_key, HealthStatus, ProviderAgent, ProviderError,
};
use dashmap::DashMap;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Outcome of [`ProviderRegistry::probe_tripped`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Health checks issued to providers past their reset timeout.
    pub probed: usize,
    /// Providers whose breaker was closed after a healthy answer.
    pub recovered: usize,
    /// Open breakers still inside their reset timeout.
    pub cooling: usize,
}

/// The Provider Registry stores every configured AI provider.
///
/// The provider table is loaded lazily, exactly once, on first use. Circuit
/// breakers are created on first reference to a provider id and live for
/// the lifetime of the registry.
///
/// # Examples
///
/// ```
/// use genesis::circuit_breaker::CircuitBreakerConfig;
/// use genesis::config::default_providers;
/// use genesis::registry::ProviderRegistry;
/// use std::time::Duration;
///
/// let registry = ProviderRegistry::new(
///     default_providers(),
///     CircuitBreakerConfig::default(),
///     Duration::from_secs(120),
/// );
/// assert!(!registry.is_initialized());
/// assert_eq!(registry.provider_count(), 3);
/// assert!(registry.is_initialized());
/// ```
pub struct ProviderRegistry {
    table: Vec<ProviderConfig>,
    providers: DashMap<String, Arc<ProviderEntry>>,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    breaker_config: CircuitBreakerConfig,
    client: Arc<Client>,
    provider_timeout: Duration,
    init: OnceLock<()>,
}

impl ProviderRegistry {
    /// Create a registry for `table`. Nothing is loaded until first use.
    pub fn new(
        table: Vec<ProviderConfig>,
        breaker_config: CircuitBreakerConfig,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            table,
            providers: DashMap::new(),
            breakers: DashMap::new(),
            breaker_config,
            client: Arc::new(Client::new()),
            provider_timeout,
            init: OnceLock::new(),
        }
    }

    /// Load the provider table if that has not happened yet.
    ///
    /// Concurrent callers block until the single load completes.
    pub fn ensure_initialized(&self) {
        self.init.get_or_init(|| {
            for config in &self.table {
                let entry = ProviderEntry::new(
                    config.descriptor(),
                    config.api_key_env.clone(),
                    ProviderStats::new(config.performance, config.reliability),
                );
                if let Err(e) = self.insert(entry) {
                    tracing::warn!(error = %e, "Skipping provider");
                }
            }
            let ready = self.load_credentials();
            tracing::info!(
                providers = self.providers.len(),
                with_credentials = ready,
                "Provider registry initialized"
            );
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.init.get().is_some()
    }

    /// Add a provider outside the configured table.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateProvider` if the id is taken.
    pub fn register(&self, entry: ProviderEntry) -> Result<(), RegistryError> {
        self.ensure_initialized();
        self.insert(entry)
    }

    fn insert(&self, entry: ProviderEntry) -> Result<(), RegistryError> {
        let id = entry.id().to_string();
        if self.providers.contains_key(&id) {
            return Err(RegistryError::DuplicateProvider(id));
        }
        self.providers.insert(id, Arc::new(entry));
        Ok(())
    }

    /// Get a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<ProviderEntry>> {
        self.ensure_initialized();
        self.providers.get(id).map(|entry| Arc::clone(entry.value()))
    }

    fn require(&self, id: &str) -> Result<Arc<ProviderEntry>, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))
    }

    /// All providers, ordered by priority rank then id.
    pub fn all(&self) -> Vec<Arc<ProviderEntry>> {
        self.ensure_initialized();
        let mut entries: Vec<_> = self
            .providers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        entries.sort_by(|a, b| a.priority().cmp(&b.priority()).then_with(|| a.id().cmp(b.id())));
        entries
    }

    /// Active providers, ordered by priority rank then id.
    pub fn active_by_priority(&self) -> Vec<Arc<ProviderEntry>> {
        self.all().into_iter().filter(|e| e.is_active()).collect()
    }

    pub fn provider_count(&self) -> usize {
        self.ensure_initialized();
        self.providers.len()
    }

    /// The breaker guarding `id`, created on first reference.
    pub fn breaker(&self, id: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.get(id) {
            return Arc::clone(breaker.value());
        }
        let breaker = self
            .breakers
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(id, self.breaker_config.clone())));
        Arc::clone(breaker.value())
    }

    /// Set or clear the active flag.
    pub fn set_active(&self, id: &str, active: bool) -> Result<(), RegistryError> {
        self.require(id)?.set_active(active);
        Ok(())
    }

    /// Rebuild the agent for `id` from an explicit key, or from its
    /// environment variable when `api_key` is `None`.
    ///
    /// A missing key leaves the provider without an agent; that is reported
    /// as `Ok(Err(ProviderError::Configuration))`.
    pub fn install_agent(
        &self,
        id: &str,
        api_key: Option<String>,
    ) -> Result<Result<(), ProviderError>, RegistryError> {
        let entry = self.require(id)?;
        Ok(self.build_agent(&entry, api_key))
    }

    fn build_agent(&self, entry: &ProviderEntry, api_key: Option<String>) -> Result<(), ProviderError> {
        let key = match api_key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            Some(_) => Err(ProviderError::Configuration(format!(
                "empty API key supplied for provider '{}'",
                entry.id()
            ))),
            None => resolve_api_key(entry.api_key_env()),
        };

        match key {
            Ok(key) => {
                let agent = create_agent(
                    &entry.descriptor(),
                    key,
                    Arc::clone(&self.client),
                    self.provider_timeout,
                );
                entry.set_agent(Ok(agent));
                Ok(())
            }
            Err(e) => {
                tracing::debug!(provider_id = %entry.id(), error = %e, "Provider has no credentials");
                entry.set_agent(Err(e.clone()));
                Err(e)
            }
        }
    }

    /// Replace the agent for `id` with a custom implementation.
    pub fn set_agent(
        &self,
        id: &str,
        agent: Arc<dyn ProviderAgent>,
    ) -> Result<(), RegistryError> {
        self.require(id)?.set_agent(Ok(agent));
        Ok(())
    }

    /// Re-read every provider's API key from the environment.
    ///
    /// Returns how many providers ended up with an agent.
    pub fn reload_credentials(&self) -> usize {
        self.ensure_initialized();
        self.load_credentials()
    }

    fn load_credentials(&self) -> usize {
        self.providers
            .iter()
            .filter(|entry| {
                let entry = entry.value();
                match resolve_api_key(entry.api_key_env()) {
                    Ok(key) => self.build_agent(entry, Some(key)).is_ok(),
                    // A key supplied at runtime survives an unset variable.
                    Err(_) if entry.agent().is_ok() => true,
                    Err(e) => {
                        entry.set_agent(Err(e));
                        false
                    }
                }
            })
            .count()
    }

    /// Health-check providers whose breaker has waited out its reset
    /// timeout; reset the breakers of those that answer healthy.
    ///
    /// Breakers still inside their reset timeout are left open and only
    /// counted as cooling.
    pub async fn probe_tripped(&self) -> ProbeReport {
        let mut report = ProbeReport::default();
        let mut due = Vec::new();
        for entry in self.all() {
            match self.breaker(entry.id()).state() {
                CircuitState::Closed => {}
                CircuitState::Open => report.cooling += 1,
                CircuitState::HalfOpen => due.push(entry),
            }
        }

        for entry in &due {
            let Ok(agent) = entry.agent() else {
                continue;
            };
            report.probed += 1;
            match agent.health_check().await {
                Ok(HealthStatus::Healthy) => {
                    self.breaker(entry.id()).reset();
                    report.recovered += 1;
                }
                Ok(HealthStatus::Unhealthy) => {
                    tracing::debug!(provider_id = %entry.id(), "Probe answered unhealthy");
                }
                Err(e) => {
                    tracing::debug!(provider_id = %entry.id(), error = %e, "Probe failed");
                }
            }
        }
        report
    }

    /// Status of one provider.
    pub fn status(&self, id: &str) -> Option<ProviderStatus> {
        let entry = self.get(id)?;
        let breaker = self.breaker(id);
        Some(ProviderStatus::new(
            &entry,
            breaker.state(),
            breaker.failure_count(),
        ))
    }

    /// Status of every provider keyed by id.
    pub fn statuses(&self) -> BTreeMap<String, ProviderStatus> {
        self.all()
            .iter()
            .map(|entry| {
                let breaker = self.breaker(entry.id());
                (
                    entry.id().to_string(),
                    ProviderStatus::new(entry, breaker.state(), breaker.failure_count()),
                )
            })
            .collect()
    }
}
