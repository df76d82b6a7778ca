//! Request and response bodies of the HTTP API.

use crate::recovery::{ErrorCategory, ErrorContext, RecoveryOutcome, RecoveryStats};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/providers/:id/enable`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnableProviderRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Acknowledgement for provider administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderActionResponse {
    pub id: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub request_id: String,
    pub cancelled: bool,
}

/// Body of `POST /api/errors`.
///
/// Without a `category` the error is classified from its message and stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportErrorRequest {
    pub component: String,
    pub message: String,
    #[serde(default)]
    pub category: Option<ErrorCategory>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportErrorResponse {
    pub error_id: Uuid,
    pub category: ErrorCategory,
    pub outcome: RecoveryOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceRecoveryResponse {
    pub category: ErrorCategory,
    pub recovered: bool,
}

/// Body of `GET /api/recovery`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySummary {
    pub stats: RecoveryStats,
    /// Newest first
    pub recent_errors: Vec<ErrorContext>,
}
