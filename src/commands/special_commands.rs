//! Special commands parser for interactive chat mode
//!
//! Special commands manage the session instead of being sent as queries:
//! - Start a new chat
//! - List, open and delete stored conversations
//! - View session status and help
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it cannot use
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Leave the current conversation and start an empty one
    NewChat,

    /// Show the stored conversation list
    ShowHistory,

    /// Open a stored conversation by id
    Open(i64),

    /// Delete a stored conversation; `None` means the one displayed
    Delete(Option<i64>),

    /// Delete every stored conversation
    ClearHistory,

    /// Display current session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a regular query.
    None,
}

fn parse_id(command: &str, arg: &str) -> Result<i64, CommandError> {
    arg.parse().map_err(|_| CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    })
}

/// Parse user input into a special command
///
/// # Examples
///
/// ```
/// use askdesk::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/open 42").unwrap(), SpecialCommand::Open(42));
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/new" => Ok(SpecialCommand::NewChat),
        "/history" | "/list" => Ok(SpecialCommand::ShowHistory),

        "/open" => Err(CommandError::MissingArgument {
            command: "/open".to_string(),
            usage: "/open <id>".to_string(),
        }),
        input if input.starts_with("/open ") => {
            parse_id("/open", input[6..].trim()).map(SpecialCommand::Open)
        }

        "/delete" => Ok(SpecialCommand::Delete(None)),
        input if input.starts_with("/delete ") => parse_id("/delete", input[8..].trim())
            .map(|id| SpecialCommand::Delete(Some(id))),

        "/clear" => Ok(SpecialCommand::ClearHistory),
        input if input.starts_with("/clear ") => Err(CommandError::UnsupportedArgument {
            command: "/clear".to_string(),
            arg: input[7..].trim().to_string(),
        }),

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the special command reference
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CONVERSATIONS:
  /new            - Start a new, empty chat
  /history        - List stored conversations
  /list           - Same as /history
  /open <id>      - Open a stored conversation
  /delete [id]    - Delete a conversation (default: the current one)
  /clear          - Delete ALL stored conversations

SESSION INFORMATION:
  /status         - Show the current conversation id and size
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit interactive mode
  quit            - Same as exit

Anything else is sent to the query endpoint.
"#
    );
}
