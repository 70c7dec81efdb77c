//! Terminal render sink
//!
//! A terminal cannot edit lines that have already scrolled by, so
//! [`TerminalSink`] only extends the most recently printed message. Text
//! aimed at an older node is dropped.

use std::io::Write;

use colored::Colorize;

use crate::conversation::MessageKind;
use crate::render::{NodeId, RenderSink};

/// ANSI sequence that clears the screen and homes the cursor
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// [`RenderSink`] writing colored output to a terminal
#[derive(Debug)]
pub struct TerminalSink<W: Write + Send = std::io::Stdout> {
    out: W,
    next_id: NodeId,
    /// Node whose content is at the end of the output
    open: Option<NodeId>,
    /// Emit the ANSI clear sequence on `clear`
    clear_screen: bool,
}

impl TerminalSink<std::io::Stdout> {
    /// Creates a sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    /// Creates a sink writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            next_id: 0,
            open: None,
            clear_screen: true,
        }
    }

    /// Whether `clear` wipes the screen
    ///
    /// When disabled, `clear` only ends the current message so one-shot
    /// output stays a plain transcript.
    pub fn with_clear_screen(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    /// Consumes the sink and returns the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn close_open_node(&mut self) {
        if self.open.take().is_some() {
            self.write("\n\n");
        }
    }
}

fn header(kind: MessageKind, sender: &str) -> String {
    let label = format!("{}:", sender);
    match kind {
        MessageKind::User => label.green().bold().to_string(),
        MessageKind::Bot => label.cyan().bold().to_string(),
        MessageKind::Error => label.red().bold().to_string(),
    }
}

impl<W: Write + Send> RenderSink for TerminalSink<W> {
    fn append_message(&mut self, kind: MessageKind, sender: &str, text: &str) -> NodeId {
        self.close_open_node();

        let id = self.next_id;
        self.next_id += 1;

        let head = header(kind, sender);
        self.write(&head);
        self.write("\n");
        match kind {
            MessageKind::Error => self.write(&text.red().to_string()),
            _ => self.write(text),
        }
        self.open = Some(id);
        id
    }

    fn append_text(&mut self, node: NodeId, text: &str) {
        if self.open == Some(node) {
            self.write(text);
        } else {
            tracing::debug!(node, "Ignoring text for a node that is no longer at the bottom");
        }
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!("Failed to flush terminal: {}", e);
        }
    }

    fn clear(&mut self) {
        if self.clear_screen {
            self.open = None;
            self.write(CLEAR_SCREEN);
        } else {
            self.close_open_node();
        }
        self.scroll_to_bottom();
    }
}
