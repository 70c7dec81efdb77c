//! Streamed response decoding
//!
//! This module turns the body of a chat-completions response into text
//! increments:
//!
//! - [`StreamDecoder`] -- synchronous chunk-to-increment state machine
//! - [`decode_stream`] -- drives the decoder over an async byte stream,
//!   observing a cancellation token at every chunk boundary
//! - [`decode_response`] -- status check plus body dispatch
//! - [`fetch_stream`] -- sends a request through an
//!   [`InferenceTransport`] and decodes the reply
//!
//! # Errors
//!
//! - Non-2xx responses yield [`GuideChatError::Transport`] before any
//!   increment is emitted.
//! - Triggering the cancellation token yields [`GuideChatError::Cancelled`].
//! - Body read failures are propagated unchanged.
//! - Malformed event payloads never surface as errors.

pub mod decoder;
pub mod payload;

pub use decoder::{DecodeStatus, StreamDecoder, DONE_SENTINEL};
pub use payload::{Delta, StreamChoice, StreamChunk};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{GuideChatError, Result};
use crate::transport::{ChatRequest, InferenceTransport, ResponseBody, TransportResponse};

/// Decode a byte stream into increments
///
/// Returns once the stream ends or the `[DONE]` sentinel is seen. The body
/// stream is dropped on every exit path.
///
/// # Arguments
///
/// * `body` - Response body chunks in arrival order
/// * `cancel` - Token checked before every chunk read
/// * `on_increment` - Callback receiving each text increment
///
/// # Errors
///
/// Returns [`GuideChatError::Cancelled`] if `cancel` fires, or the body's own
/// error if a chunk read fails.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use tokio_util::sync::CancellationToken;
/// use guidechat::stream::decode_stream;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let chunks = vec![Ok::<_, anyhow::Error>(Bytes::from_static(b"plain text"))];
/// let mut out = String::new();
/// decode_stream(futures::stream::iter(chunks), &CancellationToken::new(), |t| out.push_str(t)).await?;
/// assert_eq!(out, "plain text");
/// # Ok(())
/// # }
/// ```
pub async fn decode_stream<S, F>(body: S, cancel: &CancellationToken, mut on_increment: F) -> Result<()>
where
    S: Stream<Item = Result<Bytes>>,
    F: FnMut(&str),
{
    tokio::pin!(body);
    let mut decoder = StreamDecoder::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Stream cancelled");
                return Err(GuideChatError::Cancelled.into());
            }
            next = body.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                if decoder.feed(&chunk, &mut on_increment) == DecodeStatus::Done {
                    tracing::debug!("Received {} sentinel", DONE_SENTINEL);
                    return Ok(());
                }
            }
            Some(Err(err)) => return Err(err),
            None => break,
        }
    }

    decoder.finish(&mut on_increment);
    Ok(())
}

/// Check the status of `response` and decode its body
///
/// # Errors
///
/// Returns [`GuideChatError::Transport`] carrying the status and body text
/// for non-2xx responses, otherwise the errors of [`decode_stream`].
pub async fn decode_response<F>(
    response: TransportResponse,
    cancel: &CancellationToken,
    mut on_increment: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    if !response.is_success() {
        let status = response.status;
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GuideChatError::Cancelled.into()),
            body = response.body.into_text() => body?,
        };
        tracing::error!("Endpoint returned error {}: {}", status, body);
        return Err(GuideChatError::Transport { status, body }.into());
    }

    match response.body {
        ResponseBody::Streaming(stream) => decode_stream(stream, cancel, on_increment).await,
        ResponseBody::Complete(text) => {
            if !text.is_empty() {
                on_increment(&text);
            }
            Ok(())
        }
    }
}

/// Send `request` and stream the decoded reply into `on_increment`
///
/// Cancellation is honoured while the request is in flight as well as
/// between body chunks.
pub async fn fetch_stream<F>(
    transport: &dyn InferenceTransport,
    request: &ChatRequest,
    cancel: &CancellationToken,
    on_increment: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(GuideChatError::Cancelled.into()),
        response = transport.send(request) => response?,
    };

    decode_response(response, cancel, on_increment).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_cancellation;
    use crate::test_utils::{sse_delta, sse_done};
    use crate::transport::fake::FakeTransport;

    fn ok_chunks(chunks: Vec<String>) -> impl Stream<Item = Result<Bytes>> {
        futures::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
    }

    #[tokio::test]
    async fn test_decode_stream_concatenates_deltas() {
        let body = ok_chunks(vec![sse_delta("Hel"), sse_delta("lo"), sse_done()]);
        let mut out = Vec::new();
        decode_stream(body, &CancellationToken::new(), |t| out.push(t.to_string()))
            .await
            .unwrap();
        assert_eq!(out, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_decode_stream_stops_reading_after_done() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from(sse_delta("a"))),
            Ok(Bytes::from(sse_done())),
            Err(anyhow::anyhow!("must not be polled")),
        ];
        let mut out = String::new();
        decode_stream(futures::stream::iter(chunks), &CancellationToken::new(), |t| {
            out.push_str(t)
        })
        .await
        .unwrap();
        assert_eq!(out, "a");
    }

    #[tokio::test]
    async fn test_decode_stream_propagates_read_error() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(GuideChatError::Stream("connection reset".into()).into()),
        ];
        let mut out = String::new();
        let err = decode_stream(futures::stream::iter(chunks), &CancellationToken::new(), |t| {
            out.push_str(t)
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(out, "partial");
    }

    #[tokio::test]
    async fn test_decode_stream_already_cancelled_emits_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let mut out = Vec::<String>::new();
        let err = decode_stream(ok_chunks(vec!["text".into()]), &token, |t| {
            out.push(t.to_string())
        })
        .await
        .unwrap_err();
        assert!(is_cancellation(&err));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_decode_response_non_success_is_transport_error() {
        let transport = FakeTransport::new();
        transport.push_chunks(500, vec![Bytes::from_static(b"upstream exploded")]);
        let response = transport
            .send(&ChatRequest::streaming("m", Vec::new(), 0.2))
            .await
            .unwrap();

        let mut called = false;
        let err = decode_response(response, &CancellationToken::new(), |_| called = true)
            .await
            .unwrap_err();

        assert!(!called);
        match err.downcast_ref::<GuideChatError>() {
            Some(GuideChatError::Transport { status, body }) => {
                assert_eq!(*status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "HTTP 500: upstream exploded");
    }

    #[tokio::test]
    async fn test_decode_response_complete_body_single_increment() {
        let response = TransportResponse {
            status: 200,
            body: ResponseBody::Complete("whole answer".into()),
        };
        let mut out = Vec::new();
        decode_response(response, &CancellationToken::new(), |t| out.push(t.to_string()))
            .await
            .unwrap();
        assert_eq!(out, vec!["whole answer"]);
    }

    #[tokio::test]
    async fn test_decode_response_empty_complete_body_emits_nothing() {
        let response = TransportResponse {
            status: 200,
            body: ResponseBody::Complete(String::new()),
        };
        let mut calls = 0;
        decode_response(response, &CancellationToken::new(), |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_fetch_stream_cancel_mid_stream() {
        let transport = FakeTransport::new();
        let tx = transport.push_channel(200);
        let token = CancellationToken::new();
        let request = ChatRequest::streaming("m", Vec::new(), 0.2);

        tx.send(Ok(Bytes::from(sse_delta("first")))).unwrap();

        let mut out = Vec::new();
        let cancel = token.clone();
        let result = fetch_stream(&transport, &request, &token, |t| {
            out.push(t.to_string());
            // Cancel as soon as the first increment lands; the next chunk
            // is already queued but must never be decoded.
            cancel.cancel();
            let _ = tx.send(Ok(Bytes::from(sse_delta("second"))));
        })
        .await;

        assert!(is_cancellation(&result.unwrap_err()));
        assert_eq!(out, vec!["first"]);
    }

    #[tokio::test]
    async fn test_fetch_stream_dispatch_failure() {
        let transport = FakeTransport::new();
        transport.push_failure("dns lookup failed");
        let err = fetch_stream(
            &transport,
            &ChatRequest::streaming("m", Vec::new(), 0.2),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "dns lookup failed");
    }
}
