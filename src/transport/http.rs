//! HTTP transport for OpenAI-compatible chat-completions endpoints
//!
//! [`HttpTransport`] POSTs a [`ChatRequest`] as JSON with a static bearer
//! token and returns the response body as a stream of byte chunks, exactly
//! as `reqwest` delivers them.

use std::time::Duration;

use futures::TryStreamExt;

use crate::error::{GuideChatError, Result};
use crate::transport::{ChatRequest, InferenceTransport, ResponseBody, TransportResponse};

/// `reqwest`-backed [`InferenceTransport`]
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use guidechat::transport::http::HttpTransport;
///
/// let transport = HttpTransport::new(
///     url::Url::parse("https://models.github.ai/inference/chat/completions").unwrap(),
///     "token",
///     Duration::from_secs(120),
/// )
/// .unwrap();
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    /// Underlying reqwest HTTP client
    client: reqwest::Client,
    /// Chat-completions URL (POST target)
    endpoint: url::Url,
    /// Static bearer token
    api_key: String,
}

impl HttpTransport {
    /// Construct a new [`HttpTransport`] targeting `endpoint`
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full chat-completions URL
    /// * `api_key` - Bearer token sent on every request
    /// * `timeout` - Overall per-request timeout, body streaming included
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(endpoint: url::Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("guidechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GuideChatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized HTTP transport: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Returns the configured endpoint
    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl InferenceTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<TransportResponse> {
        tracing::debug!(
            "Sending chat request: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                GuideChatError::Stream(format!("Chat request failed: {}", e))
            })?;

        let status = response.status().as_u16();
        let stream = response
            .bytes_stream()
            .map_err(|e| anyhow::Error::from(GuideChatError::Stream(format!(
                "Failed to read response body: {}",
                e
            ))));

        Ok(TransportResponse {
            status,
            body: ResponseBody::Streaming(Box::pin(stream)),
        })
    }
}
