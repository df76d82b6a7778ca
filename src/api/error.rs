//! API error envelope

use crate::recovery::RecoveryError;
use crate::routing::RoutingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error response returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn new(message: impl Into<String>, r#type: &str, param: Option<String>, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.into(),
                r#type: r#type.to_string(),
                param,
                code: Some(code.to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::new(message, "invalid_request_error", None, "invalid_request_error")
    }

    /// Create a provider not found error (404).
    pub fn provider_not_found(id: &str) -> Self {
        Self::new(
            format!("unknown provider '{}'", id),
            "invalid_request_error",
            Some("id".to_string()),
            "provider_not_found",
        )
    }

    /// Create a not found error (404) for anything else.
    pub fn not_found(message: &str) -> Self {
        Self::new(message, "invalid_request_error", None, "not_found")
    }

    /// Create a recovery failure error (502).
    pub fn recovery_failed(message: &str) -> Self {
        Self::new(message, "server_error", None, "recovery_failed")
    }

    /// Get the HTTP status code for this error.
    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("provider_not_found") | Some("not_found") => StatusCode::NOT_FOUND,
            Some("recovery_failed") => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(e: RoutingError) -> Self {
        match &e {
            RoutingError::EmptyPrompt => Self::new(
                e.to_string(),
                "invalid_request_error",
                Some("prompt".to_string()),
                "invalid_request_error",
            ),
            RoutingError::InvalidParameter { param, .. } => Self::new(
                e.to_string(),
                "invalid_request_error",
                Some(param.clone()),
                "invalid_request_error",
            ),
            RoutingError::UnknownProvider(id) => Self::provider_not_found(id),
        }
    }
}

impl From<RecoveryError> for ApiError {
    fn from(e: RecoveryError) -> Self {
        match &e {
            RecoveryError::NoStrategy(_) => Self::not_found(&e.to_string()),
            RecoveryError::StrategyFailed { .. } => Self::recovery_failed(&e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
