//! In-memory conversation history
//!
//! [`ConversationHistory`] is an append-only list of [`ChatMessage`]s with a
//! full-clear operation. It is owned by the dispatcher; everything outside
//! the core only ever sees cloned snapshots.

use serde::{Deserialize, Serialize};

use crate::transport::UpstreamMessage;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Typed by the visitor
    User,
    /// Produced by the assistant (greetings and streamed answers)
    Bot,
    /// Failure notice; never sent upstream
    Error,
}

impl MessageKind {
    /// Role used when the message is sent upstream, if it is sent at all
    ///
    /// # Examples
    ///
    /// ```
    /// use guidechat::conversation::MessageKind;
    ///
    /// assert_eq!(MessageKind::Bot.upstream_role(), Some("assistant"));
    /// assert_eq!(MessageKind::Error.upstream_role(), None);
    /// ```
    pub fn upstream_role(self) -> Option<&'static str> {
        match self {
            Self::User => Some("user"),
            Self::Bot => Some("assistant"),
            Self::Error => None,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single exchanged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message kind
    pub kind: MessageKind,
    /// Display name of the sender
    pub sender: String,
    /// Message text; grows while a bot answer is streaming
    pub text: String,
    /// Keep this message out of outbound requests
    #[serde(default)]
    pub exclude_from_upstream: bool,
}

impl ChatMessage {
    /// Creates a message of the given kind
    pub fn new(kind: MessageKind, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            sender: sender.into(),
            text: text.into(),
            exclude_from_upstream: false,
        }
    }

    /// Creates a user message
    pub fn user(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, sender, text)
    }

    /// Creates a bot message
    pub fn bot(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageKind::Bot, sender, text)
    }

    /// Creates an error message
    pub fn error(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, sender, text)
    }

    /// Marks the message as local-only
    ///
    /// # Examples
    ///
    /// ```
    /// use guidechat::conversation::ChatMessage;
    ///
    /// let greeting = ChatMessage::bot("guide", "welcome").excluded_from_upstream();
    /// assert!(greeting.exclude_from_upstream);
    /// ```
    pub fn excluded_from_upstream(mut self) -> Self {
        self.exclude_from_upstream = true;
        self
    }

    /// Converts to the outbound representation
    ///
    /// Returns `None` for excluded messages, empty messages and errors.
    pub fn to_upstream(&self) -> Option<UpstreamMessage> {
        if self.exclude_from_upstream || self.text.is_empty() {
            return None;
        }
        let role = self.kind.upstream_role()?;
        Some(UpstreamMessage {
            role: role.to_string(),
            content: self.text.clone(),
        })
    }
}

/// Ordered list of exchanged messages
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    /// Creates an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its index
    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when no message has been recorded
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Read-only view of the messages
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Cloned copy for callers outside the core
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// Removes every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Appends `text` to the bot message at `index`
    ///
    /// Returns false, leaving the history untouched, when `index` is out of
    /// range or does not hold a bot message.
    ///
    /// # Examples
    ///
    /// ```
    /// use guidechat::conversation::{ChatMessage, ConversationHistory};
    ///
    /// let mut history = ConversationHistory::new();
    /// let placeholder = history.push(ChatMessage::bot("guide", ""));
    /// assert!(history.append_to(placeholder, "Hel"));
    /// assert!(history.append_to(placeholder, "lo"));
    /// assert_eq!(history.messages()[0].text, "Hello");
    /// ```
    pub fn append_to(&mut self, index: usize, text: &str) -> bool {
        match self.messages.get_mut(index) {
            Some(message) if message.kind == MessageKind::Bot => {
                message.text.push_str(text);
                true
            }
            _ => false,
        }
    }

    /// Messages eligible for the outbound request, in order
    pub fn upstream_messages(&self) -> Vec<UpstreamMessage> {
        self.messages
            .iter()
            .filter_map(ChatMessage::to_upstream)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_mapping_filters_and_orders() {
        let mut history = ConversationHistory::new();
        history.push(ChatMessage::bot("guide", "greeting").excluded_from_upstream());
        history.push(ChatMessage::user("me", "where is the library?"));
        history.push(ChatMessage::bot("guide", "second floor"));
        history.push(ChatMessage::error("system", "HTTP 500: oops"));
        history.push(ChatMessage::user("me", "thanks"));
        history.push(ChatMessage::bot("guide", ""));

        let upstream = history.upstream_messages();
        assert_eq!(
            upstream,
            vec![
                UpstreamMessage::user("where is the library?"),
                UpstreamMessage::assistant("second floor"),
                UpstreamMessage::user("thanks"),
            ]
        );
    }

    #[test]
    fn test_append_to_targets_bot_at_index() {
        let mut history = ConversationHistory::new();
        assert!(!history.append_to(0, "x"));

        let user = history.push(ChatMessage::user("me", "hi"));
        assert!(!history.append_to(user, "x"));
        assert_eq!(history.messages()[0].text, "hi");

        let placeholder = history.push(ChatMessage::bot("guide", ""));
        history.push(ChatMessage::bot("guide", "later"));
        assert!(history.append_to(placeholder, "x"));
        assert_eq!(history.messages()[1].text, "x");
        assert_eq!(history.messages()[2].text, "later");
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut history = ConversationHistory::new();
        history.push(ChatMessage::user("me", "hi"));

        let mut copy = history.snapshot();
        copy[0].text.push_str(" mutated");
        copy.push(ChatMessage::user("me", "extra"));

        assert_eq!(history.len(), 1);
        assert_eq!(history.messages()[0].text, "hi");
    }

    #[test]
    fn test_clear() {
        let mut history = ConversationHistory::new();
        history.push(ChatMessage::user("me", "hi"));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_message_kind_serialization() {
        let json = serde_json::to_string(&MessageKind::Error).unwrap();
        assert_eq!(json, "\"error\"");
        assert_eq!(MessageKind::User.to_string(), "user");
    }
}
