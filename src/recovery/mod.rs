//! Error recovery.
//!
//! Every failure the router (or a client) observes is reported here as an
//! [`ErrorContext`]. The system files it in a bounded log, then runs the
//! recovery strategy registered for its [`ErrorCategory`] with exponential
//! backoff. When the strategy keeps failing the generic strategy gets one
//! try. Only one recovery runs at a time; errors arriving meanwhile are
//! logged and reported as [`RecoveryOutcome::Deferred`].

mod cache;
mod category;
mod config;
mod context;
mod error;
mod log;
mod notify;
mod strategy;


pub use cache::{CacheRegistry, CacheScope, Purgeable};
pub use category::{Categorized, ErrorCategory};
pub use config::RecoveryConfig;
pub use context::ErrorContext;
pub use error::RecoveryError;
pub use log::ErrorLog;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use strategy::{ProbeProviders, PurgeCaches, PurgeScope, RecoveryStrategy, ReloadCredentials};

use crate::registry::ProviderRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Result of handling one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// The category's own strategy succeeded
    Recovered,
    /// The category's strategy was exhausted; the generic strategy succeeded
    FellBack,
    /// Nothing worked
    Failed,
    /// Another recovery was in progress; the error was only logged
    Deferred,
}

impl RecoveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryOutcome::Recovered => "recovered",
            RecoveryOutcome::FellBack => "fell_back",
            RecoveryOutcome::Failed => "failed",
            RecoveryOutcome::Deferred => "deferred",
        }
    }
}

/// Counter snapshot for the operator surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryStats {
    pub errors_handled: u64,
    pub recovered: u64,
    pub fell_back: u64,
    pub failed: u64,
    pub deferred: u64,
    pub in_progress: bool,
    pub error_log_len: usize,
}

#[derive(Debug, Default)]
struct Counters {
    errors_handled: AtomicU64,
    recovered: AtomicU64,
    fell_back: AtomicU64,
    failed: AtomicU64,
    deferred: AtomicU64,
}

impl Counters {
    fn count(&self, outcome: RecoveryOutcome) {
        let counter = match outcome {
            RecoveryOutcome::Recovered => &self.recovered,
            RecoveryOutcome::FellBack => &self.fell_back,
            RecoveryOutcome::Failed => &self.failed,
            RecoveryOutcome::Deferred => &self.deferred,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clears the in-progress flag when a recovery ends, however it ends.
struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Classifies failures and runs keyed recovery strategies.
pub struct ErrorRecoverySystem {
    config: RecoveryConfig,
    strategies: RwLock<HashMap<ErrorCategory, Arc<dyn RecoveryStrategy>>>,
    log: Arc<ErrorLog>,
    caches: Arc<CacheRegistry>,
    in_progress: AtomicBool,
    notifier: Notifier,
    counters: Counters,
}

impl ErrorRecoverySystem {
    /// A system with no strategies registered. The error log registers
    /// itself as a memory-scoped cache.
    pub fn new(config: RecoveryConfig) -> Self {
        let log = Arc::new(ErrorLog::new(config.error_log_capacity));
        let caches = Arc::new(CacheRegistry::new());
        caches.register(ErrorCategory::Memory, log.clone());

        Self {
            config,
            strategies: RwLock::new(HashMap::new()),
            log,
            caches,
            in_progress: AtomicBool::new(false),
            notifier: Notifier::new(),
            counters: Counters::default(),
        }
    }

    /// A system with the built-in strategy table.
    ///
    /// | Category        | Strategy                          |
    /// |-----------------|-----------------------------------|
    /// | provider, network | probe-providers                 |
    /// | auth            | reload-credentials                |
    /// | chat, render    | purge-caches (failing category)   |
    /// | memory          | purge-caches (all)                |
    /// | generic         | purge-caches (non-essential)      |
    pub fn with_builtin_strategies(config: RecoveryConfig, registry: Arc<ProviderRegistry>) -> Self {
        let system = Self::new(config);
        let caches = system.caches();

        let probe: Arc<dyn RecoveryStrategy> = Arc::new(ProbeProviders::new(Arc::clone(&registry)));
        let purge_scoped: Arc<dyn RecoveryStrategy> =
            Arc::new(PurgeCaches::new(Arc::clone(&caches), PurgeScope::FailingCategory));

        system.register_strategy(ErrorCategory::Provider, Arc::clone(&probe));
        system.register_strategy(ErrorCategory::Network, probe);
        system.register_strategy(ErrorCategory::Auth, Arc::new(ReloadCredentials::new(registry)));
        system.register_strategy(ErrorCategory::Chat, Arc::clone(&purge_scoped));
        system.register_strategy(ErrorCategory::Render, purge_scoped);
        system.register_strategy(
            ErrorCategory::Memory,
            Arc::new(PurgeCaches::new(Arc::clone(&caches), PurgeScope::All)),
        );
        system.register_strategy(
            ErrorCategory::Generic,
            Arc::new(PurgeCaches::new(caches, PurgeScope::NonEssential)),
        );
        system
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Register (or replace) the strategy for `category`.
    pub fn register_strategy(&self, category: ErrorCategory, strategy: Arc<dyn RecoveryStrategy>) {
        tracing::debug!(%category, strategy = strategy.name(), "Registered recovery strategy");
        self.strategies
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(category, strategy);
    }

    fn strategy(&self, category: ErrorCategory) -> Option<Arc<dyn RecoveryStrategy>> {
        self.strategies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&category)
            .cloned()
    }

    /// Caches participating in purge strategies.
    pub fn caches(&self) -> Arc<CacheRegistry> {
        Arc::clone(&self.caches)
    }

    /// Log `context` and, unless a recovery is already running, try to
    /// recover from it.
    pub async fn handle_error(&self, context: ErrorContext) -> RecoveryOutcome {
        let category = context.category;
        self.counters.errors_handled.fetch_add(1, Ordering::SeqCst);
        tracing::warn!(
            error_id = %context.id,
            component = %context.component,
            %category,
            user_id = context.user_id.as_deref().unwrap_or("-"),
            message = %context.message,
            "Error reported"
        );
        self.log.push(context);

        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(%category, "Recovery already in progress, deferring");
            self.counters.count(RecoveryOutcome::Deferred);
            return RecoveryOutcome::Deferred;
        }
        let _guard = InProgress(&self.in_progress);

        let outcome = self.recover(category).await;
        self.counters.count(outcome);

        match outcome {
            RecoveryOutcome::Recovered | RecoveryOutcome::FellBack => {
                self.notifier.publish(Notification::recovered(category));
            }
            _ => self.notifier.publish(Notification::failed(category)),
        }
        tracing::info!(%category, outcome = outcome.as_str(), "Recovery finished");
        outcome
    }

    async fn recover(&self, category: ErrorCategory) -> RecoveryOutcome {
        if let Some(strategy) = self.strategy(category) {
            let attempts = self.config.max_retries.max(1);
            for attempt in 0..attempts {
                match self.attempt(strategy.as_ref(), category, attempt).await {
                    Ok(()) => return RecoveryOutcome::Recovered,
                    Err(_) if attempt + 1 < attempts => {
                        tokio::time::sleep(self.config.backoff_delay(attempt)).await;
                    }
                    Err(_) => {}
                }
            }
        } else {
            tracing::debug!(%category, "No strategy registered");
        }

        if category == ErrorCategory::Generic {
            return RecoveryOutcome::Failed;
        }
        match self.strategy(ErrorCategory::Generic) {
            Some(generic) => match self.attempt(generic.as_ref(), category, 0).await {
                Ok(()) => RecoveryOutcome::FellBack,
                Err(_) => RecoveryOutcome::Failed,
            },
            None => RecoveryOutcome::Failed,
        }
    }

    async fn attempt(
        &self,
        strategy: &dyn RecoveryStrategy,
        category: ErrorCategory,
        attempt: u32,
    ) -> Result<(), RecoveryError> {
        let result = strategy.recover(category).await;
        let outcome = if result.is_ok() { "success" } else { "failure" };

        tracing::info!(
            %category,
            strategy = strategy.name(),
            attempt = attempt + 1,
            outcome,
            error = result.as_ref().err().map(|e| e.to_string()).unwrap_or_default(),
            "Recovery attempt"
        );
        metrics::counter!("genesis_recovery_attempts_total",
            "category" => category.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        result
    }

    /// Run the strategy for `category` once, regardless of any automatic
    /// recovery in progress.
    ///
    /// # Errors
    ///
    /// `RecoveryError::NoStrategy` when nothing is registered for `category`,
    /// or the strategy's own error.
    pub async fn force_recovery(&self, category: ErrorCategory) -> Result<(), RecoveryError> {
        let strategy = self
            .strategy(category)
            .ok_or(RecoveryError::NoStrategy(category))?;

        tracing::info!(%category, strategy = strategy.name(), "Forced recovery");
        let result = self.attempt(strategy.as_ref(), category, 0).await;
        match &result {
            Ok(()) => self.notifier.publish(Notification::recovered(category)),
            Err(_) => self.notifier.publish(Notification::failed(category)),
        }
        result
    }

    pub fn stats(&self) -> RecoveryStats {
        RecoveryStats {
            errors_handled: self.counters.errors_handled.load(Ordering::SeqCst),
            recovered: self.counters.recovered.load(Ordering::SeqCst),
            fell_back: self.counters.fell_back.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            deferred: self.counters.deferred.load(Ordering::SeqCst),
            in_progress: self.in_progress.load(Ordering::SeqCst),
            error_log_len: self.log.len(),
        }
    }

    /// Up to `n` logged errors, newest first.
    pub fn recent_errors(&self, n: usize) -> Vec<ErrorContext> {
        self.log.recent(n)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }
}
