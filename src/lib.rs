//! GuideChat - streaming campus guide chat library
//!
//! This library provides the core of a campus guide chat: a conversation
//! dispatcher that sends the history to an OpenAI-compatible
//! chat-completions endpoint and renders the streamed answer as it arrives.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `dispatcher`: `ChatWidget`, the send/stop/reset protocol
//! - `conversation`: message records and the ordered history
//! - `stream`: incremental SSE/plain-text decoding with cancellation
//! - `transport`: request types and the HTTP transport
//! - `render`: render sinks (terminal and in-memory)
//! - `prompts`: system preamble and greeting templates
//! - `places`: built-in catalog of campus places
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use guidechat::{ChatWidget, Config};
//! use guidechat::dispatcher::WidgetSettings;
//! use guidechat::places::current_place;
//! use guidechat::render::TerminalSink;
//! use guidechat::transport::http::HttpTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/guidechat.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let transport = HttpTransport::new(
//!         config.endpoint_url()?,
//!         config.require_api_key()?,
//!         config.endpoint.timeout(),
//!     )?;
//!     let widget = ChatWidget::new(
//!         WidgetSettings::from(&config),
//!         Arc::new(transport),
//!         TerminalSink::stdout(),
//!     );
//!     widget.initialize(current_place()?.context()).await;
//!     widget.send("图书馆几点开门？").await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod places;
pub mod prompts;
pub mod render;
pub mod stream;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ChatMessage, ConversationHistory, MessageKind};
pub use dispatcher::{ChatWidget, SendOutcome};
pub use error::{GuideChatError, Result};
pub use prompts::ContextInfo;

#[cfg(test)]
pub mod test_utils;
