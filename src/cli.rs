//! Command-line interface definition for GuideChat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, and
//! listing the campus places the guide knows about.

use clap::{Parser, Subcommand};

/// GuideChat - streaming campus guide chat
///
/// Ask the campus guide about the place you are standing at. Answers are
/// streamed from an OpenAI-compatible chat-completions endpoint.
#[derive(Parser, Debug, Clone)]
#[command(name = "guidechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/guidechat.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the model from config
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for GuideChat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat with the guide
    Chat {
        /// Place id the visitor is at (defaults to the current place)
        #[arg(short, long)]
        place: Option<u32>,
    },

    /// Ask a single question and print the streamed answer
    Ask {
        /// The question
        prompt: String,

        /// Place id the visitor is at (defaults to the current place)
        #[arg(short, long)]
        place: Option<u32>,
    },

    /// List the campus places known to the guide
    Places {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/guidechat.yaml".to_string()),
            verbose: false,
            model: None,
            command: Commands::Places { json: false },
        }
    }
}
