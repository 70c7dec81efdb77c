//! In-process scripted transport for unit tests
//!
//! [`FakeTransport`] answers each `send()` with the next scripted reply and
//! records every request it receives. Replies are either fixed chunk lists or
//! channel-fed bodies, so a test can push chunks one at a time and interleave
//! cancellation with the stream.
//!
//! ```text
//! test pushes reply --> replies queue --> send() pops --> dispatcher
//! dispatcher request --> requests log --> test inspects
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::{GuideChatError, Result};
use crate::transport::{ChatRequest, InferenceTransport, ResponseBody, TransportResponse};

/// A scripted reply
#[derive(Debug)]
enum Reply {
    Chunks { status: u16, chunks: Vec<Bytes> },
    Channel { status: u16, rx: mpsc::UnboundedReceiver<Result<Bytes>> },
    Complete { status: u16, text: String },
    Fail(String),
}

/// In-process fake transport
#[derive(Debug, Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeTransport {
    /// Creates a transport with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply that streams `chunks` and then ends
    pub fn push_chunks<I, B>(&self, status: u16, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks = chunks.into_iter().map(Into::into).collect();
        self.push(Reply::Chunks { status, chunks });
    }

    /// Queue a reply whose body is fed through the returned sender
    ///
    /// The body ends when the sender is dropped.
    pub fn push_channel(&self, status: u16) -> mpsc::UnboundedSender<Result<Bytes>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(Reply::Channel { status, rx });
        tx
    }

    /// Queue a reply without a streaming body
    pub fn push_complete(&self, status: u16, text: impl Into<String>) {
        self.push(Reply::Complete {
            status,
            text: text.into(),
        });
    }

    /// Queue a dispatch failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(Reply::Fail(message.into()));
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(reply);
    }
}

#[async_trait::async_trait]
impl InferenceTransport for FakeTransport {
    async fn send(&self, request: &ChatRequest) -> Result<TransportResponse> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request.clone());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| GuideChatError::Stream("no scripted reply".to_string()))?;

        let response = match reply {
            Reply::Chunks { status, chunks } => TransportResponse {
                status,
                body: ResponseBody::Streaming(Box::pin(futures::stream::iter(
                    chunks.into_iter().map(Ok),
                ))),
            },
            Reply::Channel { status, rx } => {
                let stream = futures::stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                });
                TransportResponse {
                    status,
                    body: ResponseBody::Streaming(Box::pin(stream)),
                }
            }
            Reply::Complete { status, text } => TransportResponse {
                status,
                body: ResponseBody::Complete(text),
            },
            Reply::Fail(message) => return Err(GuideChatError::Stream(message).into()),
        };

        Ok(response)
    }
}
