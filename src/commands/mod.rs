/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`   -- Interactive chat with the campus guide
- `ask`    -- One-shot question, answer streamed to stdout
- `places` -- Catalog listing

Both chat handlers build a [`ChatWidget`] over the HTTP transport and a
terminal sink; everything else lives in the library components.
*/

use crate::config::Config;
use crate::dispatcher::{ChatWidget, SendOutcome, WidgetSettings};
use crate::error::Result;
use crate::places::{find_place, Place, CURRENT_PLACE_ID};
use crate::render::RenderSink;
use crate::transport::http::HttpTransport;
use std::sync::Arc;

// `/history` table
pub mod history;

// Catalog listing
pub mod places;

// Special commands parser for interactive chat
pub mod special_commands;

/// Build a widget talking to the configured endpoint
///
/// # Errors
///
/// Returns error if no API key is configured or the HTTP client cannot be built
fn build_widget(config: &Config, sink: impl RenderSink + 'static) -> Result<ChatWidget> {
    let transport = HttpTransport::new(
        config.endpoint_url()?,
        config.require_api_key()?,
        config.endpoint.timeout(),
    )?;
    tracing::debug!("Using endpoint {}", transport.endpoint());

    Ok(ChatWidget::new(
        WidgetSettings::from(config),
        Arc::new(transport),
        sink,
    ))
}

/// Send `prompt` and stop the stream if Ctrl-C arrives meanwhile
async fn send_with_interrupt(widget: &ChatWidget, prompt: &str) -> SendOutcome {
    let watcher = tokio::spawn({
        let widget = widget.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                widget.stop();
            }
        }
    });

    let outcome = widget.send(prompt).await;
    watcher.abort();
    outcome
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop; plain lines are sent to the guide and `/`
    //! commands control the session.

    use super::*;
    use crate::commands::history::print_history;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::render::TerminalSink;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// What the loop should do after handling a line
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Flow {
        Continue,
        Exit,
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `place` - Optional place id; defaults to the current place
    pub async fn run_chat(config: Config, place: Option<u32>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let mut place = find_place(place.unwrap_or(CURRENT_PLACE_ID))?;
        let widget = build_widget(&config, TerminalSink::stdout())?;
        let mut rl = DefaultEditor::new()?;

        // Bootstrap clears the screen, so the banner goes below the greeting.
        widget.initialize(place.context()).await;
        print_welcome_banner(&config, &place);

        loop {
            let prompt = format!("[{}] {}> ", place.name, config.chat.user_label);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match handle_line(&widget, &mut place, trimmed).await {
                        Ok(Flow::Exit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        widget.stop();
        println!("Goodbye!");
        Ok(())
    }

    /// Handle one non-empty input line
    ///
    /// # Errors
    ///
    /// Returns error for malformed special commands or unknown place ids;
    /// the session stays usable.
    pub async fn handle_line(widget: &ChatWidget, place: &mut Place, input: &str) -> Result<Flow> {
        match parse_special_command(input)? {
            SpecialCommand::None => {
                let outcome = send_with_interrupt(widget, input).await;
                tracing::debug!(?outcome, "Send finished");
                println!();
            }
            SpecialCommand::NewConversation => {
                widget.new_conversation();
                widget.initialize(place.context()).await;
            }
            SpecialCommand::Clear => widget.clear_history(),
            SpecialCommand::SwitchPlace(id) => {
                let next = find_place(id)?;
                tracing::info!("Switching place from {} to {}", place.name, next.name);
                widget.new_conversation();
                widget.initialize(next.context()).await;
                *place = next;
            }
            SpecialCommand::ShowHistory => print_history(&widget.history()),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn print_welcome_banner(config: &Config, place: &Place) {
        println!("\n\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                GuideChat Campus Guide - Welcome!             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Guide:  {}", config.chat.assistant_name.cyan());
        println!("School: {}{}", config.chat.school_location, config.chat.school_name);
        println!("Place:  {} ({})", place.name.green(), place.building);
        println!("Model:  {}\n", config.endpoint.model);
        println!("Type '/help' for available commands, 'exit' to quit");
        println!("Press Ctrl-C while an answer is streaming to stop it\n");
    }

}

// One-shot question handler
pub mod ask {
    //! Ask a single question and stream the answer to stdout.

    use super::*;
    use crate::error::GuideChatError;
    use crate::render::TerminalSink;

    /// Ask `prompt` at `place` and print the streamed answer
    ///
    /// # Errors
    ///
    /// Returns error if the widget cannot be built, the place id is invalid,
    /// or the request fails.
    pub async fn run_ask(config: Config, prompt: String, place: Option<u32>) -> Result<()> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GuideChatError::Stream("Prompt cannot be empty".to_string()).into());
        }

        let place = find_place(place.unwrap_or(CURRENT_PLACE_ID))?;
        let widget = build_widget(
            &config,
            TerminalSink::stdout().with_clear_screen(false),
        )?;
        widget.initialize(place.context()).await;

        let outcome = send_with_interrupt(&widget, prompt).await;
        println!();

        match outcome {
            SendOutcome::Completed | SendOutcome::Cancelled | SendOutcome::Ignored => Ok(()),
            SendOutcome::Failed(message) => Err(GuideChatError::Stream(message).into()),
        }
    }
}
