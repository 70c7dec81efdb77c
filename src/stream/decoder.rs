//! Incremental decoder for streamed completion bodies
//!
//! [`StreamDecoder`] is a synchronous state machine: feed it raw byte chunks
//! in arrival order and it calls back with every text increment it can
//! extract. Two wire formats are understood:
//!
//! - **Event stream**: as soon as the buffered text contains `data:`, the
//!   buffer is framed on blank lines (`\n\n`). Each `data:` line is either
//!   the `[DONE]` sentinel, a JSON chunk (see [`StreamChunk`]) or opaque text
//!   that is forwarded verbatim.
//! - **Plain chunked text**: without a `data:` marker, whatever has been
//!   decoded so far is forwarded immediately and the buffer is cleared.
//!
//! At end of stream, leftover plain text is flushed. A trailing event that
//! never received its blank-line terminator is dropped so that a truncated
//! upstream response is not rendered as if it were complete.

use crate::stream::payload::StreamChunk;

/// Marker whose presence switches the buffer into event-stream framing
const DATA_MARKER: &str = "data:";

/// Delimiter between two events
const EVENT_DELIMITER: &str = "\n\n";

/// Payload that ends the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Whether the decoder expects more input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Keep reading chunks
    Continue,
    /// The `[DONE]` sentinel was seen; nothing further will be emitted
    Done,
}

/// Stateful decoder turning byte chunks into text increments
///
/// # Examples
///
/// ```
/// use guidechat::stream::{DecodeStatus, StreamDecoder};
///
/// let mut decoder = StreamDecoder::new();
/// let mut out = Vec::new();
///
/// let status = decoder.feed(
///     b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n",
///     |text| out.push(text.to_string()),
/// );
///
/// assert_eq!(status, DecodeStatus::Done);
/// assert_eq!(out, vec!["Hi"]);
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Decoded text not yet consumed
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
    /// Set once `[DONE]` has been seen
    done: bool,
}

impl StreamDecoder {
    /// Creates an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the `[DONE]` sentinel has been consumed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk of the response body
    ///
    /// Every increment extracted from the chunk is passed to `on_increment`
    /// in order. Once [`DecodeStatus::Done`] is returned, later calls are
    /// ignored.
    ///
    /// # Arguments
    ///
    /// * `chunk` - Raw bytes exactly as received from the transport
    /// * `on_increment` - Callback receiving each text increment
    pub fn feed(&mut self, chunk: &[u8], mut on_increment: impl FnMut(&str)) -> DecodeStatus {
        if self.done {
            return DecodeStatus::Done;
        }

        self.decode_utf8(chunk);

        if self.buffer.contains(DATA_MARKER) {
            return self.drain_events(&mut on_increment);
        }

        if !self.buffer.is_empty() {
            on_increment(&self.buffer);
            self.buffer.clear();
        }

        DecodeStatus::Continue
    }

    /// Signal end of stream and flush leftover plain text
    pub fn finish(self, mut on_increment: impl FnMut(&str)) {
        if self.done {
            return;
        }
        if !self.pending.is_empty() {
            tracing::debug!(
                bytes = self.pending.len(),
                "Dropping incomplete UTF-8 sequence at end of stream"
            );
        }
        if self.buffer.is_empty() {
            return;
        }
        if self.buffer.contains(DATA_MARKER) {
            tracing::debug!(
                bytes = self.buffer.len(),
                "Dropping unterminated event at end of stream"
            );
            return;
        }
        on_increment(&self.buffer);
    }

    /// Append `chunk` to the text buffer, holding back a split code point
    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(prefix) = std::str::from_utf8(&self.pending[..valid]) {
                        self.buffer.push_str(prefix);
                    }
                    match err.error_len() {
                        Some(invalid) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Consume every complete event currently buffered
    fn drain_events(&mut self, on_increment: &mut impl FnMut(&str)) -> DecodeStatus {
        while let Some(idx) = self.buffer.find(EVENT_DELIMITER) {
            let event = self.buffer[..idx].trim().to_string();
            self.buffer.drain(..idx + EVENT_DELIMITER.len());

            for line in event.split('\n') {
                let line = line.strip_suffix('\r').unwrap_or(line);
                let Some(rest) = line.strip_prefix(DATA_MARKER) else {
                    continue;
                };
                let data = rest.trim();

                if data == DONE_SENTINEL {
                    self.done = true;
                    self.buffer.clear();
                    return DecodeStatus::Done;
                }

                emit_payload(data, on_increment);
            }
        }

        DecodeStatus::Continue
    }
}

/// Forward the text carried by one `data:` payload
fn emit_payload(data: &str, on_increment: &mut impl FnMut(&str)) {
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            if let Some(text) = chunk.content() {
                on_increment(text);
            }
        }
        // Valid JSON of an unexpected shape carries no text.
        Err(err) if err.is_data() => {
            tracing::debug!("Ignoring event payload with unexpected shape: {}", err);
        }
        Err(err) => {
            tracing::debug!("Event payload is not JSON ({}), forwarding raw text", err);
            if !data.is_empty() {
                on_increment(data);
            }
        }
    }
}
