//! Incremental server-sent-events decoding shared by all providers.

use super::ProviderError;
use bytes::{Bytes, BytesMut};
use futures_util::stream::{BoxStream, Stream, StreamExt};

/// Splits a byte stream into SSE `data:` payloads.
///
/// Raw bytes are buffered until a full line is available and only complete
/// lines are decoded, so payloads and multi-byte characters split across
/// network chunks are reassembled.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every complete `data:` payload.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            if let Some(data) = data_field(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buffer.split();
        data_field(&rest)
    }
}

fn data_field(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    line.trim_end_matches(['\r', '\n'])
        .strip_prefix("data:")
        .map(|data| data.trim_start().to_string())
}

/// Turn an HTTP body stream into a stream of text deltas.
///
/// `extract` maps one `data:` payload to the text it carries (if any). The
/// OpenAI-style `[DONE]` sentinel ends the stream.
pub fn text_stream<S, F>(body: S, extract: F) -> BoxStream<'static, Result<String, ProviderError>>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    F: Fn(&str) -> Result<Option<String>, ProviderError> + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        let mut decoder = SseDecoder::new();
        futures_util::pin_mut!(body);

        'outer: while let Some(chunk) = body.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(ProviderError::Network(e.to_string()));
                    return;
                }
            };
            for payload in decoder.push(&bytes) {
                if payload == "[DONE]" {
                    break 'outer;
                }
                match extract(&payload) {
                    Ok(Some(text)) if !text.is_empty() => yield Ok(text),
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        if let Some(payload) = decoder.finish() {
            if payload != "[DONE]" {
                if let Ok(Some(text)) = extract(&payload) {
                    if !text.is_empty() {
                        yield Ok(text);
                    }
                }
            }
        }
    };

    Box::pin(stream)
}
