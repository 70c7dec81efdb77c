//! Test utilities for GuideChat
//!
//! This module provides SSE frame builders, temporary config files and
//! assertion helpers shared by the unit tests.

use crate::error::GuideChatError;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build one SSE event carrying a chat-completions delta
///
/// # Arguments
///
/// * `content` - Text placed in `choices[0].delta.content`
///
/// # Returns
///
/// Returns the event including its trailing blank line
pub fn sse_delta(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({ "choices": [{ "delta": { "content": content } }] })
    )
}

/// Build one SSE event in the legacy completions shape (`choices[0].text`)
pub fn sse_text(content: &str) -> String {
    format!("data: {}\n\n", json!({ "choices": [{ "text": content }] }))
}

/// The terminating SSE event
pub fn sse_done() -> String {
    "data: [DONE]\n\n".to_string()
}

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Write `content` as `config.yaml` inside `dir`
///
/// # Panics
///
/// Panics if writing fails
pub fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, content).expect("Failed to write test config");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!(
            "Expected error containing '{}' but got Ok({:?})",
            expected, value
        ),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Downcast an `anyhow` error to [`GuideChatError`]
///
/// # Panics
///
/// Panics if the error is of another type
pub fn guidechat_error(err: &anyhow::Error) -> &GuideChatError {
    err.downcast_ref::<GuideChatError>()
        .unwrap_or_else(|| panic!("not a GuideChatError: {:#}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_delta_shape() {
        let frame = sse_delta("Hi \"there\"");
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("}\n\n"));
        let payload: serde_json::Value =
            serde_json::from_str(frame.trim_start_matches("data: ").trim()).unwrap();
        assert_eq!(payload["choices"][0]["delta"]["content"], "Hi \"there\"");
    }

    #[test]
    fn test_sse_done() {
        assert_eq!(sse_done(), "data: [DONE]\n\n");
    }

    #[test]
    fn test_write_config() {
        let dir = temp_dir();
        let path = write_config(&dir, "endpoint: {}\n");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "endpoint: {}\n");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(GuideChatError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_guidechat_error_downcast() {
        let err: anyhow::Error = GuideChatError::Cancelled.into();
        assert!(guidechat_error(&err).is_cancelled());
    }
}
