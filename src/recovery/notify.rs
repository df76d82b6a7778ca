//! User-visible recovery notifications.

use super::ErrorCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Failure,
}

/// A message meant for the end user, published after each recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: ErrorCategory,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn recovered(category: ErrorCategory) -> Self {
        Self {
            level: NotificationLevel::Success,
            category,
            title: "Recovered".to_string(),
            message: format!("The {} issue was resolved automatically.", category),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(category: ErrorCategory) -> Self {
        Self {
            level: NotificationLevel::Failure,
            category,
            title: "Something went wrong".to_string(),
            message: "We could not recover automatically. Please retry in a moment.".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast fan-out of notifications. Publishing never blocks and never
/// fails when nobody is listening.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, notification: Notification) {
        // Err only means there are no subscribers right now.
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}
