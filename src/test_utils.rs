//! Test utilities for Askdesk
//!
//! Fakes for the controller's collaborators: a surface that records what it
//! was asked to show, a backend that replays scripted replies and a
//! key-value store whose operations can be made to fail.

use crate::client::QueryBackend;
use crate::error::{AskdeskError, Result as AskdeskResult};
use crate::session::ChatSurface;
use crate::storage::{ConversationStore, ConversationSummary, KeyValueStore, MemoryStore};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Surface that answers confirmations from a script and records calls
#[derive(Default)]
pub struct RecordingSurface {
    answers: Mutex<VecDeque<bool>>,
    pub questions: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
    pub renders: Mutex<Vec<Vec<i64>>>,
}

impl RecordingSurface {
    /// Surface that answers the next confirmations with `answers`, then "no"
    pub fn answering(answers: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            ..Default::default()
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }
}

impl ChatSurface for RecordingSurface {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn render_history(&self, summaries: &[ConversationSummary], _active_id: Option<i64>) {
        self.renders
            .lock()
            .unwrap()
            .push(summaries.iter().map(|s| s.id).collect());
    }
}

/// Backend that returns scripted replies in order
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, AskdeskError>>>,
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, AskdeskError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose every call succeeds with `reply`
    pub fn replying(reply: &str) -> Self {
        Self::new((0..8).map(|_| Ok(reply.to_string())).collect())
    }
}

#[async_trait]
impl QueryBackend for ScriptedBackend {
    async fn ask(&self, query: &str) -> Result<String, AskdeskError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AskdeskError::NetworkFailure("script exhausted".to_string())))
    }
}

/// Store over a shared in-memory backend, returned alongside the backend
pub fn memory_store() -> (ConversationStore<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    (ConversationStore::new(Arc::clone(&backend)), backend)
}

/// In-memory store whose reads or removals fail on demand
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_removes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> AskdeskResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AskdeskError::Storage(format!("Get failed: {}", key)).into());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AskdeskResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> AskdeskResult<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(AskdeskError::Storage(format!("Remove failed: {}", key)).into());
        }
        self.inner.remove(key)
    }
}
