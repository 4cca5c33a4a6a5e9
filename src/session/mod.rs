//! Chat session controller
//!
//! Mediates between user input, the remote query call and the conversation
//! store. All session state lives in an explicit [`SessionState`] value that
//! the caller owns and passes to each operation.
//!
//! A submission is split in two halves around the network call:
//! [`ChatController::begin_submit`] records the user message and returns a
//! [`PendingQuery`]; [`ChatController::finish_submit`] applies the reply only
//! if the session still shows the conversation the query was issued for.
//! [`ChatController::submit`] runs both halves back to back.

use crate::client::QueryBackend;
use crate::error::AskdeskError;
use crate::storage::{
    ConversationStore, ConversationSummary, KeyValueStore, Message, RecordLookup,
};

use chrono::Utc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

pub mod state;
pub mod surface;

pub use state::{Phase, SessionState};
pub use surface::ChatSurface;

/// Bot message recorded when the endpoint cannot be reached
pub const APOLOGY_MESSAGE: &str =
    "❗ Sorry, I encountered an error connecting to the server. Please try again.";

/// Alert shown when a selected conversation has no stored record
pub const NOT_FOUND_ALERT: &str = "Could not load this conversation. It may have been deleted.";

/// Confirmation asked before deleting one conversation
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this chat?";

/// Confirmation asked before deleting every conversation
pub const CLEAR_PROMPT: &str =
    "Are you sure you want to delete ALL chat history? This cannot be undone.";

/// Default title length used by [`ChatController::new`]
pub const DEFAULT_TITLE_MAX_CHARS: usize = 50;

/// A query that has been recorded locally and is waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// Conversation the reply belongs to
    pub conversation_id: i64,
    /// Trimmed text sent to the endpoint
    pub query: String,
    /// Identifies this submission among all issued by the controller
    pub ticket: u64,
}

/// Result of the local half of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Input was blank; nothing happened
    Ignored,
    /// A reply is still outstanding for this session
    Busy,
    /// User message recorded; the query should be sent
    Sent(PendingQuery),
}

/// Result of applying a reply to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The bot message was appended and persisted
    Appended(Message),
    /// The session moved on while waiting; the reply was dropped
    Stale,
}

/// Result of a full submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored,
    Busy,
    Replied(Message),
    Stale,
}

/// Result of selecting a conversation from the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Messages replaced with the stored record
    Loaded,
    /// The stored record has no messages; show the welcome view
    LoadedEmpty,
    /// No usable record; the session is unchanged
    NotFound,
    /// The backend failed; the session is unchanged
    Failed(String),
}

/// Result of deleting one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted {
        /// The deleted conversation was the one displayed
        was_active: bool,
    },
}

/// Result of clearing the whole history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Declined,
    Cleared(usize),
}

/// Orchestrates the send flow and history operations for one widget
pub struct ChatController<S, B> {
    store: ConversationStore<S>,
    backend: B,
    surface: Arc<dyn ChatSurface>,
    title_max_chars: usize,
    last_id: AtomicI64,
    next_ticket: AtomicU64,
}

impl<S: KeyValueStore, B: QueryBackend> ChatController<S, B> {
    /// Create a controller over `store`, sending queries through `backend`
    pub fn new(store: ConversationStore<S>, backend: B, surface: Arc<dyn ChatSurface>) -> Self {
        // Seed from stored ids so new ids stay above them even if the clock
        // went backwards between runs.
        let newest = store
            .list_summaries()
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap_or(0);

        Self {
            store,
            backend,
            surface,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            last_id: AtomicI64::new(newest),
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn with_title_max_chars(mut self, max_chars: usize) -> Self {
        self.title_max_chars = max_chars.max(1);
        self
    }

    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    /// Current history index, newest first
    pub fn history(&self) -> Vec<ConversationSummary> {
        self.store.list_summaries()
    }

    /// Send `text` and record the reply
    ///
    /// Network failures never escape: they become the [`APOLOGY_MESSAGE`]
    /// bot message.
    pub async fn submit(&self, state: &mut SessionState, text: &str) -> SubmitOutcome {
        let pending = match self.begin_submit(state, text) {
            Submission::Ignored => return SubmitOutcome::Ignored,
            Submission::Busy => return SubmitOutcome::Busy,
            Submission::Sent(pending) => pending,
        };

        let reply = self.backend.ask(&pending.query).await;

        match self.finish_submit(state, &pending, reply) {
            ReplyOutcome::Appended(message) => SubmitOutcome::Replied(message),
            ReplyOutcome::Stale => SubmitOutcome::Stale,
        }
    }

    /// Record the user message locally and prepare the query
    pub fn begin_submit(&self, state: &mut SessionState, text: &str) -> Submission {
        let text = text.trim();
        if text.is_empty() {
            return Submission::Ignored;
        }
        if state.in_flight.is_some() {
            tracing::debug!("Submission rejected: reply still outstanding");
            return Submission::Busy;
        }

        let conversation_id = match state.active_id {
            Some(id) => id,
            None => {
                let id = self.next_id();
                tracing::info!("Created new chat with id {}", id);
                let summary =
                    ConversationSummary::from_first_message(id, text, self.title_max_chars);
                if let Err(e) = self.store.upsert_summary(summary) {
                    tracing::error!("Failed to index conversation {}: {:#}", id, e);
                }
                state.active_id = Some(id);
                self.render(state);
                id
            }
        };

        state.messages.push(Message::user(text));
        self.write_through(state);
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        state.in_flight = Some(ticket);

        Submission::Sent(PendingQuery {
            conversation_id,
            query: text.to_string(),
            ticket,
        })
    }

    /// Apply the outcome of the remote call for `pending`
    ///
    /// The reply is dropped when the session no longer shows the
    /// conversation it was issued for, or when a later submission in that
    /// conversation is now the outstanding one.
    pub fn finish_submit(
        &self,
        state: &mut SessionState,
        pending: &PendingQuery,
        reply: Result<String, AskdeskError>,
    ) -> ReplyOutcome {
        let owns_slot = state.in_flight == Some(pending.ticket);
        if owns_slot {
            state.in_flight = None;
        }
        let superseded = !owns_slot && state.in_flight.is_some();

        if state.active_id != Some(pending.conversation_id) || superseded {
            tracing::debug!(
                "Discarding stale reply for conversation {}",
                pending.conversation_id
            );
            return ReplyOutcome::Stale;
        }

        let message = match reply {
            Ok(text) => Message::bot(text),
            Err(e) => {
                tracing::error!("Query failed: {}", e);
                Message::bot(APOLOGY_MESSAGE)
            }
        };

        state.messages.push(message.clone());
        self.write_through(state);

        ReplyOutcome::Appended(message)
    }

    /// Replace the session with stored conversation `id`
    pub fn select_conversation(&self, state: &mut SessionState, id: i64) -> SelectOutcome {
        tracing::debug!("Loading conversation {}", id);

        match self.store.lookup_record(id) {
            Ok(RecordLookup::Found(record)) => {
                state.active_id = Some(record.id);
                state.messages = record.messages;

                if state.messages.is_empty() {
                    tracing::warn!("Conversation {} has no messages", id);
                    SelectOutcome::LoadedEmpty
                } else {
                    tracing::info!(
                        "Loaded conversation {} with {} messages",
                        id,
                        state.messages.len()
                    );
                    SelectOutcome::Loaded
                }
            }
            Ok(RecordLookup::NotFound) => {
                tracing::error!("Conversation not found for id {}", id);
                self.surface.alert(NOT_FOUND_ALERT);
                SelectOutcome::NotFound
            }
            Ok(RecordLookup::Malformed(reason)) => {
                tracing::warn!(
                    "{}",
                    AskdeskError::MalformedStoredData(format!("conversation {}: {}", id, reason))
                );
                self.surface.alert(NOT_FOUND_ALERT);
                SelectOutcome::NotFound
            }
            Err(e) => {
                tracing::error!("Error loading conversation {}: {:#}", id, e);
                self.surface
                    .alert(&format!("Error loading conversation: {}", e));
                SelectOutcome::Failed(e.to_string())
            }
        }
    }

    /// Reset to an empty session; stored data is untouched
    pub fn new_chat(&self, state: &mut SessionState) {
        state.reset();
        tracing::debug!("Started new chat");
    }

    /// Delete conversation `id` after confirmation
    pub fn delete_conversation(
        &self,
        state: &mut SessionState,
        id: i64,
    ) -> crate::error::Result<DeleteOutcome> {
        if !self.surface.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Declined);
        }

        if let Err(e) = self.store.delete_record(id) {
            self.render(state);
            return Err(e);
        }

        let was_active = state.active_id == Some(id);
        if was_active {
            self.new_chat(state);
        }

        self.render(state);
        Ok(DeleteOutcome::Deleted { was_active })
    }

    /// Delete every conversation after confirmation
    pub fn clear_all_history(
        &self,
        state: &mut SessionState,
    ) -> crate::error::Result<ClearOutcome> {
        if !self.surface.confirm(CLEAR_PROMPT) {
            return Ok(ClearOutcome::Declined);
        }

        let cleared = self.store.clear_all()?;
        self.new_chat(state);

        self.render(state);
        Ok(ClearOutcome::Cleared(cleared))
    }

    /// Redraw the history list on the surface
    pub fn render(&self, state: &SessionState) {
        self.surface
            .render_history(&self.store.list_summaries(), state.active_id);
    }

    fn write_through(&self, state: &SessionState) {
        if let Err(e) = self.store.save_record(state.active_id, &state.messages) {
            tracing::error!("Write-through failed: {:#}", e);
        }
    }

    /// Current time in milliseconds, bumped past the last id handed out
    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_id.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last_id
                .compare_exchange(prev, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
