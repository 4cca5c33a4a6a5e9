use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

use askdesk::session::ChatSurface;
use askdesk::storage::{ConversationStore, ConversationSummary, SledStore};

#[allow(dead_code)]
pub fn create_temp_store() -> (ConversationStore<SledStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("history.sled"))
        .expect("failed to open sled store with path");
    (ConversationStore::new(store), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Surface that confirms everything and keeps the alerts it was shown
#[allow(dead_code)]
#[derive(Default)]
pub struct AgreeingSurface {
    pub alerts: Mutex<Vec<String>>,
}

impl ChatSurface for AgreeingSurface {
    fn confirm(&self, _question: &str) -> bool {
        true
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn render_history(&self, _summaries: &[ConversationSummary], _active_id: Option<i64>) {}
}
