//! # HTTP API
//!
//! Axum surface over the [`AIRouter`] and the recovery system.
//!
//! ## Endpoints
//!
//! - `POST /api/route` - Route a request; SSE stream of chunks, then `[DONE]`
//! - `GET /api/providers` - Provider status keyed by id
//! - `POST /api/providers/:id/enable` - Activate (optional `{"api_key": ...}`)
//! - `POST /api/providers/:id/disable` - Deactivate
//! - `POST /api/providers/:id/reset` - Close the provider's breaker
//! - `POST /api/requests/:id/cancel` - Cancel a live response stream
//! - `POST /api/errors` - Report an error observed by a client
//! - `POST /api/recovery/:category` - Force a recovery strategy
//! - `GET /api/recovery` - Recovery counters and recent errors
//! - `GET /api/notifications` - SSE stream of recovery notifications
//! - `GET /api/stats` - JSON statistics
//! - `GET /health` - Service health
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use genesis::api::{create_router, AppState};
//! use genesis::config::GenesisConfig;
//! use genesis::routing::AIRouter;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(GenesisConfig::default());
//! let router = Arc::new(AIRouter::from_config(&config));
//! let app = create_router(Arc::new(AppState::new(config, router)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors use one JSON envelope:
//! ```json
//! {
//!   "error": {
//!     "message": "unknown provider 'mistral'",
//!     "type": "invalid_request_error",
//!     "code": "provider_not_found"
//!   }
//! }
//! ```

mod error;
mod health;
mod providers;
mod recovery;
mod route;
pub mod types;

pub use error::{ApiError, ApiErrorBody};
pub use types::*;

use crate::config::GenesisConfig;
use crate::metrics::MetricsCollector;
use crate::routing::AIRouter;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Header carrying the id of a routed request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<GenesisConfig>,
    pub router: Arc<AIRouter>,
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(config: Arc<GenesisConfig>, router: Arc<AIRouter>) -> Self {
        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(router.registry()),
            start_time,
            crate::metrics::metrics_handle(),
        ));

        Self {
            config,
            router,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/route", post(route::handle))
        .route("/api/providers", get(providers::list))
        .route("/api/providers/:id/enable", post(providers::enable))
        .route("/api/providers/:id/disable", post(providers::disable))
        .route("/api/providers/:id/reset", post(providers::reset))
        .route("/api/requests/:id/cancel", post(route::cancel))
        .route("/api/errors", post(recovery::report))
        .route("/api/recovery", get(recovery::summary))
        .route("/api/recovery/:category", post(recovery::force))
        .route("/api/notifications", get(recovery::notifications))
        .route("/api/stats", get(crate::metrics::handler::stats_handler))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
