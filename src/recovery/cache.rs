//! Purgeable in-memory state.
//!
//! Components that hold caches register them here so recovery strategies
//! can release memory without knowing what the caches are.

use super::ErrorCategory;
use std::sync::{Arc, Mutex};

/// State that can be dropped and rebuilt on demand.
pub trait Purgeable: Send + Sync {
    fn name(&self) -> &str;

    /// Drop cached state. Returns how many items were released.
    fn purge(&self) -> usize;

    /// Essential caches are skipped by conservative purges.
    fn essential(&self) -> bool {
        false
    }
}

/// Which registered caches a purge touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Caches registered under one category
    Category(ErrorCategory),
    /// Every cache that is not essential
    NonEssential,
    /// Everything
    All,
}

impl CacheScope {
    fn includes(&self, category: ErrorCategory, cache: &dyn Purgeable) -> bool {
        match self {
            CacheScope::Category(scope) => *scope == category,
            CacheScope::NonEssential => !cache.essential(),
            CacheScope::All => true,
        }
    }
}

/// Registry of purgeable caches keyed by category.
#[derive(Default)]
pub struct CacheRegistry {
    caches: Mutex<Vec<(ErrorCategory, Arc<dyn Purgeable>)>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, category: ErrorCategory, cache: Arc<dyn Purgeable>) {
        tracing::debug!(cache = cache.name(), %category, "Registered purgeable cache");
        self.caches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((category, cache));
    }

    pub fn len(&self) -> usize {
        self.caches.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Purge every cache in `scope`. Returns the total items released.
    pub fn purge(&self, scope: CacheScope) -> usize {
        let targets: Vec<_> = self
            .caches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(category, cache)| scope.includes(*category, cache.as_ref()))
            .map(|(_, cache)| Arc::clone(cache))
            .collect();

        targets
            .iter()
            .map(|cache| {
                let released = cache.purge();
                tracing::debug!(cache = cache.name(), released, "Purged cache");
                released
            })
            .sum()
    }
}
