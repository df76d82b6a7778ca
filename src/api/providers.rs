//! Provider status and administration endpoints.

use super::{ApiError, AppState, EnableProviderRequest, ProviderActionResponse};
use crate::registry::ProviderStatus;
use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// GET /api/providers
pub async fn list(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, ProviderStatus>> {
    Json(state.router.provider_status())
}

/// POST /api/providers/:id/enable
///
/// The body is optional; without an `api_key` the provider keeps its
/// current agent or reads its key from the environment.
pub async fn enable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<EnableProviderRequest>>,
) -> Result<Json<ProviderActionResponse>, ApiError> {
    let api_key = body.and_then(|Json(b)| b.api_key);
    state.router.enable_provider(&id, api_key)?;
    Ok(action(id, "enabled"))
}

/// POST /api/providers/:id/disable
pub async fn disable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProviderActionResponse>, ApiError> {
    state.router.disable_provider(&id)?;
    Ok(action(id, "disabled"))
}

/// POST /api/providers/:id/reset
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProviderActionResponse>, ApiError> {
    state.router.reset_provider(&id)?;
    Ok(action(id, "reset"))
}

fn action(id: String, action: &str) -> Json<ProviderActionResponse> {
    Json(ProviderActionResponse {
        id,
        action: action.to_string(),
    })
}
