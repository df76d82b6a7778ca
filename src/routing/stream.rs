//! Response stream handed to callers of the router.

use dashmap::DashMap;
use futures_util::stream::{BoxStream, Stream};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;

/// Where a chunk of text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ChunkOrigin {
    Provider { provider_id: String, model: String },
    Fallback,
}

/// One piece of streamed answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseChunk {
    pub text: String,
    #[serde(flatten)]
    pub origin: ChunkOrigin,
}

impl ResponseChunk {
    pub fn is_fallback(&self) -> bool {
        self.origin == ChunkOrigin::Fallback
    }
}

/// Removes the request from the in-flight table when the stream goes away.
struct InFlight {
    request_id: String,
    table: Arc<DashMap<String, CancellationToken>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.table.remove(&self.request_id);
    }
}

/// Lazy stream of [`ResponseChunk`]s for one routed request.
///
/// Nothing is sent to any provider until the stream is first polled.
/// Cancelling ends the stream at the next chunk boundary.
pub struct ResponseStream {
    request_id: String,
    cancel: CancellationToken,
    inner: BoxStream<'static, ResponseChunk>,
    _in_flight: InFlight,
}

impl ResponseStream {
    pub(crate) fn new(
        request_id: String,
        cancel: CancellationToken,
        inner: BoxStream<'static, ResponseChunk>,
        table: Arc<DashMap<String, CancellationToken>>,
    ) -> Self {
        table.insert(request_id.clone(), cancel.clone());
        Self {
            _in_flight: InFlight {
                request_id: request_id.clone(),
                table,
            },
            request_id,
            cancel,
            inner,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Stop the stream at the next chunk boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for ResponseStream {
    type Item = ResponseChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("request_id", &self.request_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
