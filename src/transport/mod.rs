//! Inference endpoint abstraction and implementations
//!
//! This module defines the [`InferenceTransport`] trait through which the
//! dispatcher reaches the remote chat-completions endpoint. Concrete
//! implementations live in submodules:
//!
//! - [`http::HttpTransport`] -- POSTs the request with `reqwest` and exposes
//!   the response body as a byte stream.
//! - `fake::FakeTransport` -- in-process scripted transport used in unit
//!   tests (cfg(test) only).
//!
//! # Design
//!
//! A transport only dispatches the request and hands back the raw status and
//! body. Status checking, body decoding and cancellation are the stream
//! decoder's job (see [`crate::stream::fetch_stream`]), so every transport
//! gets the same edge-case behaviour for free.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod http;

#[cfg(test)]
pub mod fake;

/// A single `{role, content}` entry of the outbound `messages` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamMessage {
    /// One of `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl UpstreamMessage {
    /// Creates a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// JSON body POSTed to the chat-completions endpoint
///
/// # Examples
///
/// ```
/// use guidechat::transport::{ChatRequest, UpstreamMessage};
///
/// let request = ChatRequest::streaming("openai/gpt-4.1-nano", vec![UpstreamMessage::user("hi")], 0.2);
/// let json = serde_json::to_string(&request).unwrap();
/// assert!(json.contains("\"stream\":true"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier understood by the endpoint
    pub model: String,
    /// System preamble followed by the conversation
    pub messages: Vec<UpstreamMessage>,
    /// Always true for this client
    pub stream: bool,
    /// Sampling temperature
    pub temperature: f32,
}

impl ChatRequest {
    /// Builds a streaming request
    pub fn streaming(
        model: impl Into<String>,
        messages: Vec<UpstreamMessage>,
        temperature: f32,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            temperature,
        }
    }
}

/// Boxed stream of body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Response body as handed over by a transport
pub enum ResponseBody {
    /// Incrementally readable body
    Streaming(ByteStream),
    /// Body that was only available as a whole
    Complete(String),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streaming(_) => f.write_str("ResponseBody::Streaming(..)"),
            Self::Complete(text) => f.debug_tuple("ResponseBody::Complete").field(text).finish(),
        }
    }
}

impl ResponseBody {
    /// Read the whole body as (lossy) UTF-8 text
    pub async fn into_text(self) -> Result<String> {
        match self {
            Self::Complete(text) => Ok(text),
            Self::Streaming(mut stream) => {
                let mut bytes = Vec::new();
                while let Some(chunk) = stream.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

/// Status and body of a dispatched request
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: ResponseBody,
}

impl TransportResponse {
    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over the chat-completions endpoint
///
/// Implementations are used polymorphically through
/// `Arc<dyn InferenceTransport>`.
#[async_trait::async_trait]
pub trait InferenceTransport: Send + Sync + std::fmt::Debug {
    /// Dispatch `request` and return the raw response
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GuideChatError::Stream`] when the request
    /// cannot be delivered. A non-2xx status is NOT an error at this level.
    async fn send(&self, request: &ChatRequest) -> Result<TransportResponse>;
}
