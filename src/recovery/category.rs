//! Error categories and classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category an error is filed under; selects the recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Chat surface failures
    Chat,
    /// Edge function / network reachability
    Network,
    /// AI router or upstream provider failures
    Provider,
    /// Storage, credentials and session
    Auth,
    /// Rendering failures reported by a UI
    Render,
    /// Memory pressure
    Memory,
    /// Anything else
    Generic,
}

/// Keyword table for untagged errors. Order matters: first match wins.
/// Keywords of up to three letters only match whole words.
const KEYWORDS: &[(ErrorCategory, &[&str])] = &[
    (ErrorCategory::Memory, &["out of memory", "heap", "allocation", "memory"]),
    (
        ErrorCategory::Auth,
        &["unauthorized", "forbidden", "session", "auth", "token expired", "storage", "api key", "credential"],
    ),
    (
        ErrorCategory::Provider,
        &["ai-router", "provider", "circuit", "openai", "anthropic", "gemini", "model", "rate limit"],
    ),
    (
        ErrorCategory::Network,
        &["edge function", "edge-function", "network", "fetch", "timeout", "timed out", "connection", "dns", "enotfound", "getaddrinfo"],
    ),
    (ErrorCategory::Chat, &["chat", "message", "conversation"]),
    (ErrorCategory::Render, &["render", "component", "hydration", "dom"]),
];

impl ErrorCategory {
    /// All categories, in a stable order.
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::Chat,
        ErrorCategory::Network,
        ErrorCategory::Provider,
        ErrorCategory::Auth,
        ErrorCategory::Render,
        ErrorCategory::Memory,
        ErrorCategory::Generic,
    ];

    /// Classify an error that arrived without a category tag.
    ///
    /// Matches the lowercased message and stack against a fixed keyword
    /// table. The same input always yields the same category.
    pub fn classify_message(message: &str, stack: Option<&str>) -> Self {
        let mut haystack = message.to_lowercase();
        if let Some(stack) = stack {
            haystack.push('\n');
            haystack.push_str(&stack.to_lowercase());
        }

        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| mentions(&haystack, w)))
            .map(|(category, _)| *category)
            .unwrap_or(ErrorCategory::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Chat => "chat",
            ErrorCategory::Network => "network",
            ErrorCategory::Provider => "provider",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Render => "render",
            ErrorCategory::Memory => "memory",
            ErrorCategory::Generic => "generic",
        }
    }
}

fn mentions(haystack: &str, keyword: &str) -> bool {
    if keyword.len() > 3 {
        return haystack.contains(keyword);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == keyword)
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(ErrorCategory::Chat),
            "network" | "edge-function" | "edge_function" => Ok(ErrorCategory::Network),
            "provider" | "ai-router" | "ai_router" => Ok(ErrorCategory::Provider),
            "auth" | "storage" | "session" => Ok(ErrorCategory::Auth),
            "render" => Ok(ErrorCategory::Render),
            "memory" => Ok(ErrorCategory::Memory),
            "generic" => Ok(ErrorCategory::Generic),
            _ => Err(format!("Unknown error category: {}", s)),
        }
    }
}

/// Errors that know their own category.
pub trait Categorized {
    fn category(&self) -> ErrorCategory;
}
