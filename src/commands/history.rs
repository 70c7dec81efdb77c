//! `/history` rendering for interactive chat

use crate::conversation::{ChatMessage, MessageKind};
use colored::Colorize;
use prettytable::{format, Table};

/// Longest text shown per row before truncation (in chars)
const MAX_TEXT_CHARS: usize = 60;

/// Build the history table
pub fn history_table(messages: &[ChatMessage]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Kind".bold(),
        "Sender".bold(),
        "Upstream".bold(),
        "Text".bold()
    ]);

    for (index, message) in messages.iter().enumerate() {
        let kind = match message.kind {
            MessageKind::User => message.kind.to_string().green(),
            MessageKind::Bot => message.kind.to_string().cyan(),
            MessageKind::Error => message.kind.to_string().red(),
        };
        let upstream = if message.to_upstream().is_some() {
            "yes"
        } else {
            "no"
        };

        table.add_row(prettytable::row![
            index + 1,
            kind,
            message.sender,
            upstream,
            truncate(&message.text)
        ]);
    }

    table
}

/// Print the conversation to stdout
pub fn print_history(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return;
    }

    println!("\nConversation History:");
    history_table(messages).printstd();
    println!();
}

fn truncate(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > MAX_TEXT_CHARS {
        let head: String = flat.chars().take(MAX_TEXT_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        flat
    }
}
