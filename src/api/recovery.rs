//! Error reporting and recovery endpoints.

use super::{
    ApiError, AppState, ForceRecoveryResponse, RecoverySummary, ReportErrorRequest,
    ReportErrorResponse,
};
use crate::recovery::{ErrorCategory, ErrorContext};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Errors listed by `GET /api/recovery`.
const RECENT_ERRORS: usize = 20;

/// POST /api/errors
///
/// Logs the error and waits for the recovery attempt it triggers.
pub async fn report(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ReportErrorRequest>, JsonRejection>,
) -> Result<Json<ReportErrorResponse>, ApiError> {
    let Json(report) = body.map_err(|e| ApiError::bad_request(&e.body_text()))?;
    if report.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let mut context = match report.category {
        Some(category) => {
            let mut context = ErrorContext::with_category(report.component, category, report.message);
            context.stack = report.stack;
            context
        }
        None => ErrorContext::untagged(report.component, report.message, report.stack),
    };
    context = context.with_user(report.user_id);

    let error_id = context.id;
    let category = context.category;
    let outcome = state.router.recovery().handle_error(context).await;

    Ok(Json(ReportErrorResponse {
        error_id,
        category,
        outcome,
    }))
}

/// POST /api/recovery/:category
pub async fn force(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<ForceRecoveryResponse>, ApiError> {
    let category: ErrorCategory = category
        .parse()
        .map_err(|e: String| ApiError::bad_request(&e))?;
    state.router.recovery().force_recovery(category).await?;
    Ok(Json(ForceRecoveryResponse {
        category,
        recovered: true,
    }))
}

/// GET /api/recovery
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<RecoverySummary> {
    let recovery = state.router.recovery();
    Json(RecoverySummary {
        stats: recovery.stats(),
        recent_errors: recovery.recent_errors(RECENT_ERRORS),
    })
}

/// GET /api/notifications
///
/// One `notification` event per recovery outcome. Slow clients skip
/// notifications they fell behind on.
pub async fn notifications(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.router.recovery().subscribe();

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    yield Ok(Event::default()
                        .event("notification")
                        .data(serde_json::to_string(&notification).unwrap_or_default()));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Notification subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
