//! Command-line interface definition for Askdesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot queries and
//! conversation history management.

use clap::{Parser, Subcommand};

/// Askdesk - chat with a remote answer endpoint
///
/// Conversations are kept locally so they can be resumed, listed and
/// deleted later.
#[derive(Parser, Debug, Clone)]
#[command(name = "askdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the conversation history database location
    #[arg(long, global = true)]
    pub storage_path: Option<String>,

    /// Override the query endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Askdesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Reopen a stored conversation by id
        #[arg(short, long)]
        resume: Option<i64>,

        /// Keep history in memory only for this session
        #[arg(long)]
        ephemeral: bool,
    },

    /// Send a single query and print the reply
    Ask {
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Manage stored conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// List stored conversations, newest first
    List,

    /// Print the messages of a stored conversation
    Show {
        /// Conversation id
        id: i64,
    },

    /// Delete a stored conversation
    Delete {
        /// Conversation id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every stored conversation
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Report history entries whose messages are missing or unreadable
    Check,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["askdesk", "chat"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("config/config.yaml"));
        assert!(matches!(
            cli.command,
            Commands::Chat {
                resume: None,
                ephemeral: false
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_resume() {
        let cli = Cli::try_parse_from(["askdesk", "chat", "--resume", "1700000000000"]).unwrap();
        if let Commands::Chat { resume, .. } = cli.command {
            assert_eq!(resume, Some(1700000000000));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["askdesk", "ask", "what", "is", "rag"]).unwrap();
        if let Commands::Ask { query } = cli.command {
            assert_eq!(query.join(" "), "what is rag");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_query() {
        assert!(Cli::try_parse_from(["askdesk", "ask"]).is_err());
    }

    #[test]
    fn test_cli_parse_history_delete() {
        let cli = Cli::try_parse_from(["askdesk", "history", "delete", "42", "--yes"]).unwrap();
        if let Commands::History { command } = cli.command {
            assert_eq!(command, HistoryCommand::Delete { id: 42, yes: true });
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "askdesk",
            "history",
            "list",
            "--storage-path",
            "/tmp/h.sled",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.storage_path.as_deref(), Some("/tmp/h.sled"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["askdesk", "history", "show", "abc"]).is_err());
    }
}
