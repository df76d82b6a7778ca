//! Static routing table.
//!
//! A request type either names a fixed provider and model or defers to
//! `auto`, the active provider with the lowest priority rank. Every other
//! active provider follows in priority order as a failover candidate.
//! Performance and reliability scores play no part in selection.

use super::RequestType;
use crate::provider::ProviderDescriptor;

/// A row of the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Fixed {
        provider_id: &'static str,
        model: &'static str,
    },
    Auto,
}

/// The routing table.
pub fn route_for(request_type: RequestType) -> Route {
    match request_type {
        RequestType::Business => Route::Fixed {
            provider_id: "openai-gpt4",
            model: "gpt-4",
        },
        RequestType::Cultural => Route::Fixed {
            provider_id: "anthropic-claude",
            model: "claude-3-sonnet",
        },
        _ => Route::Auto,
    }
}

/// One provider/model pair to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub provider_id: String,
    pub model: String,
}

/// Ordered candidates for `request_type`.
///
/// `active` must already be sorted by priority and contain only active
/// providers. A fixed route whose provider is not active falls back to
/// `auto`. Providers without any model are never candidates.
pub fn plan(request_type: RequestType, active: &[ProviderDescriptor]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(active.len());

    if let Route::Fixed { provider_id, model } = route_for(request_type) {
        if active.iter().any(|p| p.id == provider_id) {
            candidates.push(Candidate {
                provider_id: provider_id.to_string(),
                model: model.to_string(),
            });
        }
    }

    for provider in active {
        if candidates.iter().any(|c| c.provider_id == provider.id) {
            continue;
        }
        if let Some(model) = provider.default_model() {
            candidates.push(Candidate {
                provider_id: provider.id.clone(),
                model: model.to_string(),
            });
        }
    }

    candidates
}
