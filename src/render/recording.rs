//! Headless render sink
//!
//! [`RecordingSink`] keeps rendered nodes in memory. Clones share the same
//! state, so a caller can hand one clone to the dispatcher and inspect the
//! other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::conversation::MessageKind;
use crate::render::{NodeId, RenderSink};

/// One rendered message element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    /// Handle returned when the node was appended
    pub id: NodeId,
    /// Message kind
    pub kind: MessageKind,
    /// Sender label
    pub sender: String,
    /// Current content text
    pub content: String,
}

#[derive(Debug, Default)]
struct RecordingState {
    nodes: Vec<RenderedNode>,
    next_id: NodeId,
    scrolls: usize,
    clears: usize,
}

/// In-memory [`RenderSink`]
///
/// # Examples
///
/// ```
/// use guidechat::conversation::MessageKind;
/// use guidechat::render::{RecordingSink, RenderSink};
///
/// let sink = RecordingSink::new();
/// let mut writer = sink.clone();
/// let node = writer.append_message(MessageKind::Bot, "guide", "");
/// writer.append_text(node, "Hello");
///
/// assert_eq!(sink.nodes()[0].content, "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<RecordingState>>,
    /// Remaining `is_ready` calls that report "not ready"
    not_ready_polls: Arc<AtomicUsize>,
}

impl RecordingSink {
    /// Creates a sink that is ready immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that reports "not ready" for the first `polls` checks
    pub fn ready_after(polls: usize) -> Self {
        let sink = Self::default();
        sink.not_ready_polls.store(polls, Ordering::SeqCst);
        sink
    }

    /// Snapshot of the current nodes
    pub fn nodes(&self) -> Vec<RenderedNode> {
        self.lock().nodes.clone()
    }

    /// Content of the most recent node, if any
    pub fn last_content(&self) -> Option<String> {
        self.lock().nodes.last().map(|n| n.content.clone())
    }

    /// Number of `scroll_to_bottom` calls
    pub fn scroll_count(&self) -> usize {
        self.lock().scrolls
    }

    /// Number of `clear` calls
    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderSink for RecordingSink {
    fn is_ready(&self) -> bool {
        self.not_ready_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }

    fn append_message(&mut self, kind: MessageKind, sender: &str, text: &str) -> NodeId {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.push(RenderedNode {
            id,
            kind,
            sender: sender.to_string(),
            content: text.to_string(),
        });
        id
    }

    fn append_text(&mut self, node: NodeId, text: &str) {
        let mut state = self.lock();
        if let Some(target) = state.nodes.iter_mut().find(|n| n.id == node) {
            target.content.push_str(text);
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.lock().scrolls += 1;
    }

    fn clear(&mut self) {
        let mut state = self.lock();
        state.nodes.clear();
        state.clears += 1;
    }
}
