//! Error types for GuideChat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for GuideChat operations
///
/// This enum covers failures from the inference endpoint, the stream decoder,
/// configuration loading, and the interactive front end.
#[derive(Error, Debug)]
pub enum GuideChatError {
    /// The inference endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Transport {
        /// Numeric HTTP status code
        status: u16,
        /// Diagnostic body text returned by the endpoint
        body: String,
    },

    /// The active stream was cancelled by the user
    #[error("stream cancelled")]
    Cancelled,

    /// Any other failure while dispatching the request or reading the body
    #[error("{0}")]
    Stream(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lookup of a place id that the catalog cannot resolve
    #[error("Unknown place id: {0}")]
    UnknownPlace(u32),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors in interactive mode
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl GuideChatError {
    /// Returns true when the error represents a user-triggered cancellation
    ///
    /// # Examples
    ///
    /// ```
    /// use guidechat::error::GuideChatError;
    ///
    /// assert!(GuideChatError::Cancelled.is_cancelled());
    /// assert!(!GuideChatError::Stream("boom".into()).is_cancelled());
    /// ```
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for GuideChat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Returns true when an `anyhow::Error` wraps [`GuideChatError::Cancelled`]
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<GuideChatError>()
        .map(GuideChatError::is_cancelled)
        .unwrap_or(false)
}
