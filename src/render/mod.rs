//! Render sinks
//!
//! The dispatcher never draws anything itself. It talks to a [`RenderSink`],
//! which only has to append a message element, append text to an element it
//! created earlier, and keep the view scrolled to the newest content.
//!
//! - [`terminal::TerminalSink`] -- colored output on a terminal
//! - [`recording::RecordingSink`] -- headless sink that keeps every node in
//!   memory, for tests and embedding

use crate::conversation::MessageKind;

pub mod recording;
pub mod terminal;

pub use recording::{RecordingSink, RenderedNode};
pub use terminal::TerminalSink;

/// Handle to an element created by [`RenderSink::append_message`]
///
/// Ids are never reused, so a handle kept across [`RenderSink::clear`]
/// simply stops matching anything.
pub type NodeId = u64;

/// Display surface driven by the dispatcher
pub trait RenderSink: Send {
    /// Whether the surface can accept output yet
    ///
    /// Bootstrap keeps retrying until this returns true.
    fn is_ready(&self) -> bool {
        true
    }

    /// Append a message element and return its handle
    fn append_message(&mut self, kind: MessageKind, sender: &str, text: &str) -> NodeId;

    /// Append text to the content of an existing element
    ///
    /// Unknown handles are ignored.
    fn append_text(&mut self, node: NodeId, text: &str);

    /// Bring the newest content into view
    fn scroll_to_bottom(&mut self);

    /// Remove every element
    fn clear(&mut self);
}
