use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// One SSE event carrying a chat-completions delta
#[allow(dead_code)]
pub fn sse_delta(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
    )
}

/// An SSE body made of `parts` followed by the `[DONE]` sentinel
#[allow(dead_code)]
pub fn sse_body(parts: &[&str]) -> Vec<u8> {
    let mut body: String = parts.iter().map(|p| sse_delta(p)).collect();
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}
