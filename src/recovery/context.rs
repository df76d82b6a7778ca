//! Error context captured for every handled failure.

use super::{Categorized, ErrorCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// A failure reported to the recovery system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    pub id: Uuid,
    /// Component that observed the error (e.g. "router", "chat-ui")
    pub component: String,
    pub category: ErrorCategory,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Stack trace or other detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorContext {
    /// Context for an error that carries its own category.
    pub fn from_error<E>(component: impl Into<String>, error: &E) -> Self
    where
        E: Categorized + Display,
    {
        Self::with_category(component, error.category(), error.to_string())
    }

    /// Context for an error reported without a category; the category is
    /// derived from the message and stack.
    pub fn untagged(
        component: impl Into<String>,
        message: impl Into<String>,
        stack: Option<String>,
    ) -> Self {
        let message = message.into();
        let category = ErrorCategory::classify_message(&message, stack.as_deref());
        let mut context = Self::with_category(component, category, message);
        context.stack = stack;
        context
    }

    pub fn with_category(
        component: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            component: component.into(),
            category,
            message: message.into(),
            timestamp: Utc::now(),
            user_id: None,
            stack: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}
