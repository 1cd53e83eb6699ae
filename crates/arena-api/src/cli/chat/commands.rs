//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and control the conversation: model and
//! provider selection, clearing, and history display.

use console::style;

/// Models offered in the model picker.
pub const SUGGESTED_MODELS: [&str; 4] = ["gpt-3.5-turbo", "gpt-4", "claude-3", "mistral-7b"];

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the screen and the conversation.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show the conversation so far.
    History,
    /// Show (`None`) or change the model. `default` resets to the relay default.
    Model(Option<String>),
    /// Show (`None`) or change the provider. `auto` resets to inference.
    Provider(Option<String>),
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (trimmed.to_lowercase(), None),
    };

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/model" | "/m" => Some(ChatCommand::Model(arg)),
        "/provider" | "/p" => Some(ChatCommand::Provider(arg)),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Map a `/model` or `/provider` argument to the stored selection.
///
/// `default` and `auto` clear the selection so the relay decides.
pub fn selection(arg: &str) -> Option<String> {
    match arg.to_lowercase().as_str() {
        "default" | "auto" | "none" => None,
        _ => Some(arg.to_string()),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}             {}", style("/help").cyan(), "Show this help message");
    println!("  {}            {}", style("/clear").cyan(), "Clear the screen and conversation");
    println!("  {}             {}", style("/exit").cyan(), "End the chat session");
    println!("  {}          {}", style("/history").cyan(), "Show the conversation so far");
    println!("  {}     {}", style("/model [name]").cyan(), "Show or switch model (default: relay picks)");
    println!("  {}  {}", style("/provider [name]").cyan(), "Show or switch provider (auto: inferred)");
    println!();
    println!("  {} {}", style("Models:").dim(), style(SUGGESTED_MODELS.join(", ")).dim());
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
