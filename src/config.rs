//! Configuration management for GuideChat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{GuideChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for GuideChat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inference endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Chat presentation settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Inference endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Chat-completions URL
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Static bearer token
    ///
    /// Usually supplied through `GUIDECHAT_API_KEY` rather than the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout including body streaming (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_endpoint_url() -> String {
    "https://models.github.ai/inference/chat/completions".to_string()
}

fn default_model() -> String {
    "openai/gpt-4.1-nano".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl EndpointConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Chat presentation configuration
///
/// Labels and names shown to the visitor and used in prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Assistant persona name, also the sender label of bot messages
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Sender label of user messages
    #[serde(default = "default_user_label")]
    pub user_label: String,

    /// Sender label of error messages
    #[serde(default = "default_system_label")]
    pub system_label: String,

    /// Short school name
    #[serde(default = "default_school_name")]
    pub school_name: String,

    /// District prefix used when introducing the school
    #[serde(default = "default_school_location")]
    pub school_location: String,

    /// Delay between bootstrap attempts while the display is not ready (ms)
    #[serde(default = "default_init_retry_ms")]
    pub init_retry_ms: u64,
}

fn default_assistant_name() -> String {
    "小嘉".to_string()
}

fn default_user_label() -> String {
    "我".to_string()
}

fn default_system_label() -> String {
    "系统".to_string()
}

fn default_school_name() -> String {
    "嘉祥外国语学校".to_string()
}

fn default_school_location() -> String {
    "成都市锦江区".to_string()
}

fn default_init_retry_ms() -> u64 {
    200
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            user_label: default_user_label(),
            system_label: default_system_label(),
            school_name: default_school_name(),
            school_location: default_school_location(),
            init_retry_ms: default_init_retry_ms(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GuideChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| GuideChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("GUIDECHAT_ENDPOINT_URL") {
            tracing::debug!(url = %url, "Env override: GUIDECHAT_ENDPOINT_URL");
            self.endpoint.url = url;
        }

        if let Ok(model) = std::env::var("GUIDECHAT_MODEL") {
            tracing::debug!(model = %model, "Env override: GUIDECHAT_MODEL");
            self.endpoint.model = model;
        }

        if let Ok(api_key) = std::env::var("GUIDECHAT_API_KEY") {
            tracing::debug!("Env override: GUIDECHAT_API_KEY");
            self.endpoint.api_key = Some(api_key);
        }

        if let Ok(temperature) = std::env::var("GUIDECHAT_TEMPERATURE") {
            if let Ok(value) = temperature.parse::<f32>() {
                self.endpoint.temperature = value;
            } else {
                tracing::warn!("Invalid GUIDECHAT_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(timeout) = std::env::var("GUIDECHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.endpoint.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid GUIDECHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(model) = &cli.model {
            tracing::debug!(model = %model, "CLI override: --model");
            self.endpoint.model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges.
    /// The API key is not checked here; see [`Config::require_api_key`].
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint.url).map_err(|e| {
            GuideChatError::Config(format!("endpoint.url is not a valid URL: {}", e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(GuideChatError::Config(format!(
                "endpoint.url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.endpoint.model.trim().is_empty() {
            return Err(
                GuideChatError::Config("endpoint.model cannot be empty".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&self.endpoint.temperature) {
            return Err(GuideChatError::Config(
                "endpoint.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.endpoint.timeout_seconds == 0 {
            return Err(GuideChatError::Config(
                "endpoint.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.assistant_name.trim().is_empty() {
            return Err(
                GuideChatError::Config("chat.assistant_name cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Parsed endpoint URL
    ///
    /// # Errors
    ///
    /// Returns error if `endpoint.url` does not parse
    pub fn endpoint_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.endpoint.url).map_err(|e| {
            GuideChatError::Config(format!("endpoint.url is not a valid URL: {}", e)).into()
        })
    }

    /// Bearer token needed to talk to the endpoint
    ///
    /// # Errors
    ///
    /// Returns error if no non-empty key is configured
    pub fn require_api_key(&self) -> Result<&str> {
        self.endpoint
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GuideChatError::Config(
                    "No API key configured; set GUIDECHAT_API_KEY or endpoint.api_key".to_string(),
                )
                .into()
            })
    }
}
