//! Built-in recovery strategies.

use super::{CacheRegistry, CacheScope, ErrorCategory, RecoveryError};
use crate::registry::ProviderRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// An action that tries to restore service after a category of failure.
#[async_trait]
pub trait RecoveryStrategy: Send + Sync + 'static {
    /// Short stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Run one recovery attempt for `category`.
    async fn recover(&self, category: ErrorCategory) -> Result<(), RecoveryError>;
}

/// Health-check providers whose breaker reset timeout has elapsed and
/// reset the breakers of those that answer.
///
/// Fails when no provider recovered while some breaker is still open.
/// Breakers inside their reset timeout are never touched.
pub struct ProbeProviders {
    registry: Arc<ProviderRegistry>,
}

impl ProbeProviders {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RecoveryStrategy for ProbeProviders {
    fn name(&self) -> &'static str {
        "probe-providers"
    }

    async fn recover(&self, _category: ErrorCategory) -> Result<(), RecoveryError> {
        let report = self.registry.probe_tripped().await;
        tracing::debug!(
            probed = report.probed,
            recovered = report.recovered,
            cooling = report.cooling,
            "Provider probe finished"
        );

        if report.recovered == 0 && report.cooling > 0 {
            return Err(RecoveryError::StrategyFailed {
                strategy: self.name(),
                reason: format!("{} providers still inside their reset timeout", report.cooling),
            });
        }
        if report.probed > 0 && report.recovered == 0 {
            return Err(RecoveryError::StrategyFailed {
                strategy: self.name(),
                reason: format!("none of {} tripped providers answered", report.probed),
            });
        }
        Ok(())
    }
}

/// Re-read API keys from the environment and rebuild provider agents.
pub struct ReloadCredentials {
    registry: Arc<ProviderRegistry>,
}

impl ReloadCredentials {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RecoveryStrategy for ReloadCredentials {
    fn name(&self) -> &'static str {
        "reload-credentials"
    }

    async fn recover(&self, _category: ErrorCategory) -> Result<(), RecoveryError> {
        let ready = self.registry.reload_credentials();
        if ready == 0 {
            return Err(RecoveryError::StrategyFailed {
                strategy: self.name(),
                reason: "no provider has usable credentials".to_string(),
            });
        }
        tracing::debug!(providers = ready, "Credentials reloaded");
        Ok(())
    }
}

/// Purge registered caches.
pub struct PurgeCaches {
    caches: Arc<CacheRegistry>,
    scope: PurgeScope,
}

/// Which caches a [`PurgeCaches`] strategy clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeScope {
    /// Caches registered under the failing category
    FailingCategory,
    NonEssential,
    All,
}

impl PurgeCaches {
    pub fn new(caches: Arc<CacheRegistry>, scope: PurgeScope) -> Self {
        Self { caches, scope }
    }
}

#[async_trait]
impl RecoveryStrategy for PurgeCaches {
    fn name(&self) -> &'static str {
        "purge-caches"
    }

    async fn recover(&self, category: ErrorCategory) -> Result<(), RecoveryError> {
        let scope = match self.scope {
            PurgeScope::FailingCategory => CacheScope::Category(category),
            PurgeScope::NonEssential => CacheScope::NonEssential,
            PurgeScope::All => CacheScope::All,
        };
        let released = self.caches.purge(scope);
        tracing::debug!(?scope, released, "Caches purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitBreakerConfig;
    use crate::config::ProviderConfig;
    use crate::provider::ProviderKind;
    use crate::recovery::Purgeable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Items(AtomicUsize);

    impl Purgeable for Items {
        fn name(&self) -> &str {
            "items"
        }

        fn purge(&self) -> usize {
            self.0.swap(0, Ordering::SeqCst)
        }
    }

    fn registry_with_env(env: &str) -> Arc<ProviderRegistry> {
        Arc::new(ProviderRegistry::new(
            vec![ProviderConfig {
                id: "p".to_string(),
                name: "P".to_string(),
                kind: ProviderKind::OpenAI,
                endpoint: "http://localhost:1".to_string(),
                models: vec!["m".to_string()],
                capabilities: vec![],
                cost_per_token: 0.0,
                max_tokens: 100,
                active: true,
                priority: 1,
                temperature: 0.7,
                streaming: true,
                api_key_env: Some(env.to_string()),
                performance: 0.5,
                reliability: 0.5,
            }],
            CircuitBreakerConfig::default(),
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_purge_failing_category_only() {
        let caches = Arc::new(CacheRegistry::new());
        let chat = Arc::new(Items(AtomicUsize::new(4)));
        let render = Arc::new(Items(AtomicUsize::new(2)));
        caches.register(ErrorCategory::Chat, chat.clone());
        caches.register(ErrorCategory::Render, render.clone());

        let strategy = PurgeCaches::new(caches, PurgeScope::FailingCategory);
        strategy.recover(ErrorCategory::Render).await.unwrap();

        assert_eq!(chat.0.load(Ordering::SeqCst), 4);
        assert_eq!(render.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reload_credentials_fails_without_keys() {
        let strategy = ReloadCredentials::new(registry_with_env("GENESIS_STRATEGY_TEST_UNSET"));
        let result = strategy.recover(ErrorCategory::Auth).await;
        assert!(matches!(
            result,
            Err(RecoveryError::StrategyFailed { strategy: "reload-credentials", .. })
        ));
    }

    #[tokio::test]
    async fn test_reload_credentials_picks_up_new_key() {
        let registry = registry_with_env("GENESIS_STRATEGY_TEST_LATE_KEY");
        assert!(registry.get("p").unwrap().agent().is_err());

        std::env::set_var("GENESIS_STRATEGY_TEST_LATE_KEY", "sk-late");
        let strategy = ReloadCredentials::new(Arc::clone(&registry));
        strategy.recover(ErrorCategory::Auth).await.unwrap();
        std::env::remove_var("GENESIS_STRATEGY_TEST_LATE_KEY");

        assert!(registry.get("p").unwrap().agent().is_ok());
    }

    #[tokio::test]
    async fn test_probe_with_nothing_tripped_succeeds() {
        let strategy = ProbeProviders::new(registry_with_env("GENESIS_STRATEGY_TEST_UNSET"));
        assert!(strategy.recover(ErrorCategory::Provider).await.is_ok());
    }
}
