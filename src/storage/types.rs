use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker appended to titles that were cut short
pub const TITLE_ELLIPSIS: &str = "...";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person using the widget
    User,
    /// Text returned by the answer endpoint (or the fixed apology)
    Bot,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// A single entry in a conversation thread
///
/// # Examples
///
/// ```
/// use askdesk::storage::{Message, Role};
///
/// let msg = Message::user("Hello");
/// assert_eq!(msg.role, Role::User);
/// assert_eq!(msg.content, "Hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Opaque text, never interpreted as markup
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
        }
    }
}

/// Entry in the history index shown in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Creation time in Unix milliseconds; unique key of the conversation
    pub id: i64,
    /// First user message, truncated
    pub title: String,
    /// When the conversation was created
    #[serde(rename = "timestamp", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ConversationSummary {
    /// Build a summary whose title is the first `max_chars` characters of
    /// `first_message`, followed by [`TITLE_ELLIPSIS`] when it was longer.
    ///
    /// # Examples
    ///
    /// ```
    /// use askdesk::storage::ConversationSummary;
    ///
    /// let summary = ConversationSummary::from_first_message(1, "Hello", 50);
    /// assert_eq!(summary.title, "Hello");
    ///
    /// let summary = ConversationSummary::from_first_message(2, "abcdef", 3);
    /// assert_eq!(summary.title, "abc...");
    /// ```
    pub fn from_first_message(id: i64, first_message: &str, max_chars: usize) -> Self {
        Self {
            id,
            title: truncate_title(first_message, max_chars),
            created_at: Utc::now(),
        }
    }
}

/// Full message list for one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub messages: Vec<Message>,
}

/// Truncate on character boundaries, never inside a multi-byte character.
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut title: String = text.chars().take(max_chars).collect();
    title.push_str(TITLE_ELLIPSIS);
    title
}
