//! Request routing endpoints.

use super::{ApiError, AppState, CancelResponse, REQUEST_ID_HEADER};
use crate::routing::{RequestEnvelope, ResponseChunk};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderName, HeaderValue},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;

/// POST /api/route
///
/// Streams `chunk` events carrying [`ResponseChunk`] JSON, then a final
/// `[DONE]` data line. The request id is returned in `x-request-id` and is
/// the handle for `POST /api/requests/:id/cancel`. A client disconnect
/// drops the stream and stops the provider call.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RequestEnvelope>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(&e.body_text()))?;
    let stream = state.router.route_request(request)?;
    let request_id = stream.request_id().to_string();

    let events = stream
        .map(|chunk: ResponseChunk| {
            Ok::<_, Infallible>(
                Event::default()
                    .event("chunk")
                    .data(serde_json::to_string(&chunk).unwrap_or_default()),
            )
        })
        .chain(futures_util::stream::once(async {
            Ok(Event::default().data("[DONE]"))
        }));

    let mut response = Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    Ok(response)
}

/// POST /api/requests/:id/cancel
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    if !state.router.cancel_request(&request_id) {
        return Err(ApiError::not_found(&format!(
            "no live request with id '{}'",
            request_id
        )));
    }
    Ok(Json(CancelResponse {
        request_id,
        cancelled: true,
    }))
}
