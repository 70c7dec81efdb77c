//! Conversation dispatcher
//!
//! [`ChatWidget`] owns the conversation history and the render sink, builds
//! outbound requests from the history, drives the stream decoder and feeds
//! every increment back into both the history and the sink.
//!
//! # Send protocol
//!
//! 1. Empty prompts, and any prompt while a stream is active, are ignored.
//! 2. The user message and an empty bot placeholder are recorded and
//!    rendered.
//! 3. A stream session with a fresh cancellation token is opened.
//! 4. The request carries the system preamble followed by every eligible
//!    history message.
//! 5. Each increment is appended to the placeholder, in the history and in
//!    the sink, in arrival order.
//! 6. Cancellation appends [`CANCEL_MARKER`] to the placeholder; any other
//!    failure is recorded as a separate error message.
//! 7. The session is closed on every path.
//!
//! # Locking
//!
//! State and sink sit behind separate mutexes, always taken in that order
//! and never held across an await point. [`ChatWidget::stop`] can therefore
//! be called from any task while a send is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::conversation::{ChatMessage, ConversationHistory};
use crate::error::{is_cancellation, Result};
use crate::prompts::{
    build_greeting, build_system_prompt, ContextInfo, PromptIdentity, CANCEL_MARKER,
    STREAM_FAILURE_FALLBACK,
};
use crate::render::{NodeId, RenderSink};
use crate::stream::fetch_stream;
use crate::transport::{ChatRequest, InferenceTransport, UpstreamMessage};

/// Settings the dispatcher needs from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSettings {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Assistant persona name and bot sender label
    pub assistant_name: String,
    /// User sender label
    pub user_label: String,
    /// Error sender label
    pub system_label: String,
    /// Short school name
    pub school_name: String,
    /// District prefix of the school
    pub school_location: String,
    /// Delay between bootstrap attempts
    pub init_retry: Duration,
}

impl From<&Config> for WidgetSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.endpoint.model.clone(),
            temperature: config.endpoint.temperature,
            assistant_name: config.chat.assistant_name.clone(),
            user_label: config.chat.user_label.clone(),
            system_label: config.chat.system_label.clone(),
            school_name: config.chat.school_name.clone(),
            school_location: config.chat.school_location.clone(),
            init_retry: Duration::from_millis(config.chat.init_retry_ms),
        }
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Result of a [`ChatWidget::send`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty prompt or a stream was already active; nothing happened
    Ignored,
    /// The answer streamed to completion
    Completed,
    /// The user stopped the stream
    Cancelled,
    /// The request failed; carries the text of the recorded error message
    Failed(String),
}

/// Where the increments of the active stream are written
#[derive(Debug, Clone, Copy)]
struct StreamTarget {
    /// Placeholder element in the sink
    node: NodeId,
    /// Placeholder message in the history
    index: usize,
}

/// State of the request currently streaming
#[derive(Debug)]
struct StreamSession {
    cancel: CancellationToken,
    /// `None` once the history was cleared under the stream
    target: Option<StreamTarget>,
}

#[derive(Debug, Default)]
struct WidgetState {
    history: ConversationHistory,
    context: ContextInfo,
    session: Option<StreamSession>,
}

struct Inner {
    transport: Arc<dyn InferenceTransport>,
    sink: Mutex<Box<dyn RenderSink>>,
    state: Mutex<WidgetState>,
    settings: WidgetSettings,
}

/// Handle to a chat session
///
/// Cloning is cheap and every clone drives the same session.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use guidechat::dispatcher::{ChatWidget, WidgetSettings};
/// use guidechat::prompts::ContextInfo;
/// use guidechat::render::RecordingSink;
/// use guidechat::transport::http::HttpTransport;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let transport = HttpTransport::new(
///     url::Url::parse("https://models.github.ai/inference/chat/completions")?,
///     "token",
///     Duration::from_secs(120),
/// )?;
/// let widget = ChatWidget::new(WidgetSettings::default(), Arc::new(transport), RecordingSink::new());
/// widget.initialize(ContextInfo::default()).await;
/// widget.send("图书馆在哪里？").await;
/// println!("{:?}", widget.history());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatWidget {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("transport", &self.inner.transport)
            .field("settings", &self.inner.settings)
            .field("streaming", &self.is_streaming())
            .finish()
    }
}

impl ChatWidget {
    /// Creates a widget with an empty history
    pub fn new(
        settings: WidgetSettings,
        transport: Arc<dyn InferenceTransport>,
        sink: impl RenderSink + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                sink: Mutex::new(Box::new(sink)),
                state: Mutex::new(WidgetState::default()),
                settings,
            }),
        }
    }

    /// Settings this widget was created with
    pub fn settings(&self) -> &WidgetSettings {
        &self.inner.settings
    }

    /// Bootstrap the session for `info`
    ///
    /// Waits for the sink to become ready, retrying after the configured
    /// delay. Then stores the context, records the greeting (never sent
    /// upstream) and re-renders the whole history.
    pub async fn initialize(&self, info: ContextInfo) {
        let mut attempts = 0u32;
        loop {
            let ready = self.lock_sink().is_ready();
            if ready {
                break;
            }
            attempts += 1;
            tracing::debug!(attempts, "Render sink not ready, retrying bootstrap");
            tokio::time::sleep(self.inner.settings.init_retry).await;
        }

        let settings = &self.inner.settings;
        let mut state = self.lock_state();
        let greeting = build_greeting(&settings.school_name, &info);
        state.context = info;
        state.history.push(
            ChatMessage::bot(&settings.assistant_name, greeting).excluded_from_upstream(),
        );

        let mut sink = self.lock_sink();
        sink.clear();
        let nodes: Vec<NodeId> = state
            .history
            .messages()
            .iter()
            .map(|m| sink.append_message(m.kind, &m.sender, &m.text))
            .collect();
        sink.scroll_to_bottom();

        // Rebuilt nodes get fresh ids; keep an attached stream on its placeholder.
        if let Some(target) = state.session.as_mut().and_then(|s| s.target.as_mut()) {
            if let Some(node) = nodes.get(target.index) {
                target.node = *node;
            }
        }

        tracing::info!(
            place = state.context.name.as_deref().unwrap_or("-"),
            "Chat session initialized"
        );
    }

    /// Cloned snapshot of the history
    pub fn history(&self) -> Vec<ChatMessage> {
        self.lock_state().history.snapshot()
    }

    /// Context info stored by the last [`ChatWidget::initialize`]
    pub fn context(&self) -> ContextInfo {
        self.lock_state().context.clone()
    }

    /// Returns true while a send is in flight
    pub fn is_streaming(&self) -> bool {
        self.lock_state().session.is_some()
    }

    /// Clear the history and the sink
    ///
    /// An active stream keeps running but is detached from its placeholder:
    /// its remaining increments, cancel marker or failure land nowhere, even
    /// after a new greeting has been seeded.
    pub fn clear_history(&self) {
        let mut state = self.lock_state();
        if let Some(session) = state.session.as_mut() {
            tracing::debug!("Detaching active stream from cleared history");
            session.target = None;
        }
        state.history.clear();
        self.lock_sink().clear();
    }

    /// Stop the active stream, if any
    pub fn stop(&self) {
        if let Some(session) = &self.lock_state().session {
            tracing::info!("Stopping active stream");
            session.cancel.cancel();
        }
    }

    /// Cancel any active stream and start over with an empty history
    pub fn new_conversation(&self) {
        self.stop();
        self.clear_history();
    }

    /// Submit a prompt and stream the answer
    ///
    /// See the module documentation for the full protocol. Failures never
    /// escape: they are recorded in the history and reported through the
    /// returned [`SendOutcome`].
    pub async fn send(&self, prompt: &str) -> SendOutcome {
        let Some((request, cancel)) = self.begin_send(prompt) else {
            return SendOutcome::Ignored;
        };

        tracing::debug!(
            "Dispatching request with {} messages",
            request.messages.len()
        );

        let result = fetch_stream(
            self.inner.transport.as_ref(),
            &request,
            &cancel,
            |chunk| self.apply_increment(chunk),
        )
        .await;

        let outcome = match result {
            Ok(()) => SendOutcome::Completed,
            Err(err) if is_cancellation(&err) => {
                self.apply_increment(CANCEL_MARKER);
                SendOutcome::Cancelled
            }
            Err(err) => SendOutcome::Failed(self.record_failure(&err)),
        };

        self.end_send();
        outcome
    }

    /// Steps 1 to 4 of the send protocol
    fn begin_send(&self, prompt: &str) -> Option<(ChatRequest, CancellationToken)> {
        let settings = &self.inner.settings;
        let mut state = self.lock_state();
        if prompt.trim().is_empty() || state.session.is_some() {
            return None;
        }

        let user = ChatMessage::user(&settings.user_label, prompt);
        let placeholder = ChatMessage::bot(&settings.assistant_name, "");

        let node = {
            let mut sink = self.lock_sink();
            sink.append_message(user.kind, &user.sender, &user.text);
            sink.scroll_to_bottom();
            let node = sink.append_message(placeholder.kind, &placeholder.sender, "");
            sink.scroll_to_bottom();
            node
        };
        state.history.push(user);
        let index = state.history.push(placeholder);

        let cancel = CancellationToken::new();
        state.session = Some(StreamSession {
            cancel: cancel.clone(),
            target: Some(StreamTarget { node, index }),
        });

        let request = self.build_request(&state);
        Some((request, cancel))
    }

    fn build_request(&self, state: &WidgetState) -> ChatRequest {
        let settings = &self.inner.settings;
        let identity = PromptIdentity {
            assistant_name: &settings.assistant_name,
            school_name: &settings.school_name,
            school_location: &settings.school_location,
        };

        let mut messages = vec![UpstreamMessage::system(build_system_prompt(
            &identity,
            &state.context,
        ))];
        messages.extend(state.history.upstream_messages());

        ChatRequest::streaming(settings.model.clone(), messages, settings.temperature)
    }

    /// Placeholder of the active stream, unless detached
    fn stream_target(state: &WidgetState) -> Option<StreamTarget> {
        state.session.as_ref().and_then(|s| s.target)
    }

    /// Append `text` to the placeholder message and its node
    fn apply_increment(&self, text: &str) {
        let mut state = self.lock_state();
        let Some(target) = Self::stream_target(&state) else {
            return;
        };
        state.history.append_to(target.index, text);

        let mut sink = self.lock_sink();
        sink.append_text(target.node, text);
        sink.scroll_to_bottom();
    }

    /// Record `err` as an error message and return its text
    fn record_failure(&self, err: &anyhow::Error) -> String {
        tracing::error!("Chat request failed: {:#}", err);

        let mut text = err.to_string();
        if text.trim().is_empty() {
            text = STREAM_FAILURE_FALLBACK.to_string();
        }

        let mut state = self.lock_state();
        if Self::stream_target(&state).is_none() {
            return text;
        }

        let message = ChatMessage::error(&self.inner.settings.system_label, text.clone());
        let mut sink = self.lock_sink();
        sink.append_message(message.kind, &message.sender, &message.text);
        sink.scroll_to_bottom();
        state.history.push(message);
        text
    }

    /// Step 7: close the session
    fn end_send(&self) {
        self.lock_state().session = None;
        self.lock_sink().scroll_to_bottom();
    }

    fn lock_state(&self) -> MutexGuard<'_, WidgetState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_sink(&self) -> MutexGuard<'_, Box<dyn RenderSink>> {
        self.inner.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
