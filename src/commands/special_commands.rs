//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` control the session instead of being sent to the
//! guide. Commands are case-insensitive; `exit` and `quit` also work without
//! the slash.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start over and greet again for the current place
    NewConversation,

    /// Drop the history and clear the screen
    Clear,

    /// Move to another place by catalog id
    SwitchPlace(u32),

    /// Print the conversation so far
    ShowHistory,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the guide.
    None,
}

/// Parse a user input string into a special command
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for non-commands.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::MissingArgument or CommandError::UnsupportedArgument when
/// `/place` has no valid id.
///
/// # Examples
///
/// ```
/// use guidechat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/NEW").unwrap(), SpecialCommand::NewConversation);
/// assert_eq!(parse_special_command("/place 2").unwrap(), SpecialCommand::SwitchPlace(2));
/// assert_eq!(parse_special_command("图书馆在哪？").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (command, arg) {
        ("/new" | "/reset", None) => Ok(SpecialCommand::NewConversation),
        ("/clear", None) => Ok(SpecialCommand::Clear),
        ("/history", None) => Ok(SpecialCommand::ShowHistory),
        ("/help" | "/?", None) => Ok(SpecialCommand::Help),
        ("exit" | "quit" | "/exit" | "/quit", None) => Ok(SpecialCommand::Exit),

        ("/place", None) => Err(CommandError::MissingArgument {
            command: "/place".to_string(),
            usage: "/place <id>".to_string(),
        }),
        ("/place", Some(id)) => id
            .parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .map(SpecialCommand::SwitchPlace)
            .ok_or_else(|| CommandError::UnsupportedArgument {
                command: "/place".to_string(),
                arg: id.to_string(),
            }),

        (
            cmd @ ("/new" | "/reset" | "/clear" | "/history" | "/help" | "/?" | "/exit" | "/quit"),
            Some(arg),
        ) => Err(CommandError::UnsupportedArgument {
            command: cmd.to_string(),
            arg: arg.to_string(),
        }),

        (cmd, _) if cmd.starts_with('/') => Err(CommandError::UnknownCommand(cmd.to_string())),

        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands
================

  /new            - Start a new conversation at the current place
  /reset          - Same as /new
  /clear          - Clear the conversation history
  /place <id>     - Move to another place (see `guidechat places`)
  /history        - Show the conversation so far
  /help           - Show this help message
  /?              - Same as /help
  /exit           - Exit interactive mode (also: exit, quit, Ctrl-D)

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to the guide
  - Press Ctrl-C while an answer is streaming to stop it
"#
    );
}
