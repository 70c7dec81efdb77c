//! Typed view of a single `data:` event payload
//!
//! OpenAI-compatible endpoints stream JSON objects shaped like
//! `{"choices":[{"delta":{"content":"..."}}]}`. Legacy completion endpoints
//! put the text directly on the choice as `{"choices":[{"text":"..."}]}`.
//! Every level is optional so that role-only deltas, usage trailers and
//! empty keep-alive objects deserialize cleanly and simply carry no text.

use serde::Deserialize;

/// One streamed chunk object
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StreamChunk {
    /// Candidate choices; only the first one is rendered
    #[serde(default)]
    pub choices: Option<Vec<StreamChoice>>,
}

/// A single choice inside a [`StreamChunk`]
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StreamChoice {
    /// Chat-style incremental delta
    #[serde(default)]
    pub delta: Option<Delta>,
    /// Completion-style text
    #[serde(default)]
    pub text: Option<String>,
}

/// Incremental delta of a chat completion choice
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Delta {
    /// Text appended by this delta
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// Resolve the text carried by this chunk
    ///
    /// Looks at the first choice only, preferring `delta.content` over
    /// `text`. Empty strings count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use guidechat::stream::StreamChunk;
    ///
    /// let chunk: StreamChunk =
    ///     serde_json::from_str(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#).unwrap();
    /// assert_eq!(chunk.content(), Some("Hel"));
    ///
    /// let chunk: StreamChunk = serde_json::from_str(r#"{"choices":[{"text":"lo"}]}"#).unwrap();
    /// assert_eq!(chunk.content(), Some("lo"));
    /// ```
    pub fn content(&self) -> Option<&str> {
        let choice = self.choices.as_ref()?.first()?;
        let delta = choice
            .delta
            .as_ref()
            .and_then(|d| d.content.as_deref())
            .filter(|s| !s.is_empty());
        delta.or_else(|| choice.text.as_deref().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> StreamChunk {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_delta_content_preferred_over_text() {
        let chunk = parse(r#"{"choices":[{"delta":{"content":"a"},"text":"b"}]}"#);
        assert_eq!(chunk.content(), Some("a"));
    }

    #[test]
    fn test_empty_delta_falls_back_to_text() {
        let chunk = parse(r#"{"choices":[{"delta":{"content":""},"text":"b"}]}"#);
        assert_eq!(chunk.content(), Some("b"));
    }

    #[test]
    fn test_null_content_falls_back_to_text() {
        let chunk = parse(r#"{"choices":[{"delta":{"content":null},"text":"b"}]}"#);
        assert_eq!(chunk.content(), Some("b"));
    }

    #[test]
    fn test_role_only_delta_has_no_content() {
        let chunk = parse(r#"{"choices":[{"delta":{"role":"assistant"},"index":0}]}"#);
        assert_eq!(chunk.content(), None);
    }

    #[test]
    fn test_only_first_choice_is_considered() {
        let chunk = parse(r#"{"choices":[{"delta":{}},{"delta":{"content":"second"}}]}"#);
        assert_eq!(chunk.content(), None);
    }

    #[test]
    fn test_missing_or_empty_choices() {
        assert_eq!(parse(r#"{}"#).content(), None);
        assert_eq!(parse(r#"{"choices":[]}"#).content(), None);
        assert_eq!(parse(r#"{"choices":null}"#).content(), None);
    }
}
