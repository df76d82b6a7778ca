//! Bounded in-memory error log.

use super::{ErrorContext, Purgeable};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Entries kept when the log is compacted under memory pressure.
const COMPACTED_LEN: usize = 10;

/// Ring buffer of the most recent error contexts.
///
/// Once `capacity` is reached the oldest entry is evicted.
#[derive(Debug)]
pub struct ErrorLog {
    capacity: usize,
    entries: Mutex<VecDeque<ErrorContext>>,
}

impl ErrorLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, context: ErrorContext) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(context);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<ErrorContext> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .take(n)
            .cloned()
            .collect()
    }
}

impl Purgeable for ErrorLog {
    fn name(&self) -> &str {
        "error-log"
    }

    /// Keep only the newest entries and release the spare allocation.
    fn purge(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let excess = entries.len().saturating_sub(COMPACTED_LEN);
        entries.drain(..excess);
        entries.shrink_to_fit();
        excess
    }

    fn essential(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::ErrorCategory;

    fn context(message: &str) -> ErrorContext {
        ErrorContext::with_category("test", ErrorCategory::Generic, message)
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let log = ErrorLog::new(3);
        for i in 0..5 {
            log.push(context(&format!("error {}", i)));
        }
        assert_eq!(log.len(), 3);

        let messages: Vec<_> = log.recent(10).into_iter().map(|c| c.message).collect();
        assert_eq!(messages, vec!["error 4", "error 3", "error 2"]);
    }

    #[test]
    fn test_recent_limits_count() {
        let log = ErrorLog::new(100);
        for i in 0..20 {
            log.push(context(&i.to_string()));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "19");
    }

    #[test]
    fn test_purge_compacts_to_newest() {
        let log = ErrorLog::new(100);
        for i in 0..25 {
            log.push(context(&i.to_string()));
        }
        assert_eq!(log.purge(), 15);
        assert_eq!(log.len(), 10);
        assert_eq!(log.recent(1)[0].message, "24");
        assert_eq!(log.purge(), 0);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let log = ErrorLog::new(0);
        log.push(context("a"));
        log.push(context("b"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.capacity(), 1);
    }
}
