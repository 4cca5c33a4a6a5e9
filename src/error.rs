//! Error types for Askdesk
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Askdesk operations
///
/// None of these are fatal to an interactive session: network failures are
/// folded into the conversation, storage failures during write-through are
/// logged, and malformed stored data is treated as absent.
#[derive(Error, Debug)]
pub enum AskdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Conversation storage errors (backend operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A write was attempted before the session had a conversation id
    #[error("Cannot save conversation: no active conversation id")]
    NoActiveConversation,

    /// The requested conversation has no stored record
    #[error("Conversation not found: {0}")]
    RecordNotFound(i64),

    /// A stored value did not match the expected schema
    #[error("Malformed stored data: {0}")]
    MalformedStoredData(String),

    /// Transport error, timeout, non-success status or unreadable response
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedded database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
}

/// Result type alias for Askdesk operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
