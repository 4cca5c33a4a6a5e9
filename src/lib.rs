//! Askdesk - chat client library
//!
//! This library provides a chat session against a remote answer endpoint
//! with locally persisted, resumable conversation history.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: History index and conversation records over a key-value backend
//! - `session`: Session state and the controller driving submissions and history
//! - `client`: HTTP client for the query endpoint
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind the CLI
//!
//! # Example
//!
//! ```no_run
//! use askdesk::cli::Cli;
//! use askdesk::Config;
//! use clap::Parser;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["askdesk", "history", "list"]);
//!     let config = Config::load("config/config.yaml", &cli)?;
//!     config.validate()?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use client::{HttpQueryClient, QueryBackend};
pub use config::Config;
pub use error::{AskdeskError, Result};
pub use session::{ChatController, ChatSurface, SessionState};
pub use storage::{ConversationStore, KeyValueStore, MemoryStore, Message, Role, SledStore};

#[cfg(test)]
pub mod test_utils;
