//! Conversation history persistence
//!
//! Two kinds of values live in the key-value backend: the history index
//! (key [`HISTORY_KEY`], a JSON array of [`ConversationSummary`], newest
//! first) and one [`ConversationRecord`] per conversation under
//! `conversation_{id}`. The two are written independently, so an index entry
//! may outlive its record; readers tolerate that and [`ConversationStore::audit`]
//! reports it.

use crate::error::{AskdeskError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub mod backend;
pub mod types;

pub use backend::{KeyValueStore, MemoryStore, SledStore};
pub use types::{truncate_title, ConversationRecord, ConversationSummary, Message, Role};

/// Key holding the serialized history index
pub const HISTORY_KEY: &str = "chatHistory";

/// Default cap on the number of indexed conversations
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Key holding the record of conversation `id`
///
/// # Examples
///
/// ```
/// assert_eq!(askdesk::storage::record_key(42), "conversation_42");
/// ```
pub fn record_key(id: i64) -> String {
    format!("conversation_{}", id)
}

/// Default on-disk location of the history database
pub fn default_storage_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "askdesk", "askdesk")
        .ok_or_else(|| AskdeskError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("history.sled"))
}

/// Outcome of looking up a stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLookup {
    Found(ConversationRecord),
    NotFound,
    /// A value exists but does not match the record schema
    Malformed(String),
}

/// Persistence layer for summaries and full conversation records
pub struct ConversationStore<S> {
    backend: S,
    max_entries: usize,
    cascade_evictions: bool,
}

impl<S: KeyValueStore> ConversationStore<S> {
    /// Wrap `backend` with the default cap and cascading evictions
    ///
    /// # Examples
    ///
    /// ```
    /// use askdesk::storage::{ConversationStore, MemoryStore};
    ///
    /// let store = ConversationStore::new(MemoryStore::new());
    /// assert!(store.list_summaries().is_empty());
    /// ```
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            max_entries: DEFAULT_MAX_ENTRIES,
            cascade_evictions: true,
        }
    }

    /// Set the history index cap (values below 1 are raised to 1)
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Choose whether records of summaries pushed out of the index are
    /// deleted along with them
    pub fn with_cascade_evictions(mut self, cascade: bool) -> Self {
        self.cascade_evictions = cascade;
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// History index, newest first
    ///
    /// Never fails: a missing, unreadable or malformed index reads as empty.
    pub fn list_summaries(&self) -> Vec<ConversationSummary> {
        match self.read_index() {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Treating history index as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Insert `summary` at the front, or overwrite it in place if its id is
    /// already indexed, then cap the index.
    ///
    /// # Errors
    ///
    /// A backend read failure is returned and the stored index is left alone.
    pub fn upsert_summary(&self, summary: ConversationSummary) -> Result<()> {
        let mut index = self.index_for_update()?;

        match index.iter().position(|s| s.id == summary.id) {
            Some(pos) => index[pos] = summary,
            None => index.insert(0, summary),
        }

        let evicted = if index.len() > self.max_entries {
            index.split_off(self.max_entries)
        } else {
            Vec::new()
        };

        self.write_index(&index)?;

        if !evicted.is_empty() {
            if self.cascade_evictions {
                for old in &evicted {
                    self.backend.remove(&record_key(old.id))?;
                }
                tracing::debug!("Evicted {} conversations with their records", evicted.len());
            } else {
                tracing::debug!(
                    "Evicted {} conversations from the index; records left in place",
                    evicted.len()
                );
            }
        }

        Ok(())
    }

    /// Write the full message list of conversation `id`
    ///
    /// # Errors
    ///
    /// Returns `AskdeskError::NoActiveConversation` when `id` is `None`
    pub fn save_record(&self, id: Option<i64>, messages: &[Message]) -> Result<()> {
        let Some(id) = id else {
            tracing::error!("Cannot save conversation: no active conversation id");
            return Err(AskdeskError::NoActiveConversation.into());
        };

        let record = ConversationRecord {
            id,
            messages: messages.to_vec(),
        };
        let value = serde_json::to_string(&record)?;
        self.backend.set(&record_key(id), &value)?;

        tracing::debug!("Saved conversation {} with {} messages", id, messages.len());
        Ok(())
    }

    /// Look up a record, distinguishing missing from malformed values
    pub fn lookup_record(&self, id: i64) -> Result<RecordLookup> {
        let Some(raw) = self.backend.get(&record_key(id))? else {
            return Ok(RecordLookup::NotFound);
        };

        match serde_json::from_str::<ConversationRecord>(&raw) {
            Ok(record) if record.id == id => Ok(RecordLookup::Found(record)),
            Ok(record) => Ok(RecordLookup::Malformed(format!(
                "record stored under {} carries id {}",
                record_key(id),
                record.id
            ))),
            Err(e) => Ok(RecordLookup::Malformed(e.to_string())),
        }
    }

    /// Stored record of `id`, or `None` when missing or malformed
    pub fn load_record(&self, id: i64) -> Result<Option<ConversationRecord>> {
        match self.lookup_record(id)? {
            RecordLookup::Found(record) => Ok(Some(record)),
            RecordLookup::NotFound => Ok(None),
            RecordLookup::Malformed(reason) => {
                tracing::warn!(
                    "{}",
                    AskdeskError::MalformedStoredData(format!("{}: {}", record_key(id), reason))
                );
                Ok(None)
            }
        }
    }

    /// Remove the record and index entry of `id`; idempotent
    pub fn delete_record(&self, id: i64) -> Result<()> {
        self.backend.remove(&record_key(id))?;

        let mut index = self.index_for_update()?;
        let before = index.len();
        index.retain(|s| s.id != id);
        if index.len() != before {
            self.write_index(&index)?;
        }

        tracing::info!("Deleted conversation {}", id);
        Ok(())
    }

    /// Remove every indexed record and then the index itself
    ///
    /// Returns the number of index entries that were cleared.
    pub fn clear_all(&self) -> Result<usize> {
        let index = self.index_for_update()?;
        for summary in &index {
            self.backend.remove(&record_key(summary.id))?;
        }
        self.backend.remove(HISTORY_KEY)?;

        tracing::info!("Cleared {} conversations", index.len());
        Ok(index.len())
    }

    /// Index entries whose record is missing or malformed
    pub fn audit(&self) -> Result<Vec<ConversationSummary>> {
        let mut orphans = Vec::new();
        for summary in self.list_summaries() {
            match self.lookup_record(summary.id)? {
                RecordLookup::Found(_) => {}
                RecordLookup::NotFound => {
                    tracing::warn!("Conversation {} has no stored record", summary.id);
                    orphans.push(summary);
                }
                RecordLookup::Malformed(reason) => {
                    tracing::warn!("Conversation {} record is malformed: {}", summary.id, reason);
                    orphans.push(summary);
                }
            }
        }
        Ok(orphans)
    }

    fn read_index(&self) -> Result<Vec<ConversationSummary>> {
        let Some(raw) = self.backend.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        let index = serde_json::from_str(&raw)
            .map_err(|e| AskdeskError::MalformedStoredData(format!("{}: {}", HISTORY_KEY, e)))?;
        Ok(index)
    }

    /// Index to rewrite: malformed reads as empty, backend errors propagate
    fn index_for_update(&self) -> Result<Vec<ConversationSummary>> {
        match self.read_index() {
            Ok(index) => Ok(index),
            Err(e) => match e.downcast_ref::<AskdeskError>() {
                Some(AskdeskError::MalformedStoredData(reason)) => {
                    tracing::warn!("Replacing malformed history index: {}", reason);
                    Ok(Vec::new())
                }
                _ => Err(e),
            },
        }
    }

    fn write_index(&self, index: &[ConversationSummary]) -> Result<()> {
        let value = serde_json::to_string(index)?;
        self.backend.set(HISTORY_KEY, &value)
    }
}
