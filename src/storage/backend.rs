//! Key-value backends for the conversation store
//!
//! The store only ever needs string get/set/remove, the same surface a
//! browser's local storage offers. `SledStore` keeps the data on disk;
//! `MemoryStore` keeps it in process.

use crate::error::{AskdeskError, Result};
use sled::Db;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Durable backend using an embedded `sled` database
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns `AskdeskError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use askdesk::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> askdesk::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("history.sled"))?;
    /// store.set("theme", "dark")?;
    /// assert_eq!(store.get("theme")?.as_deref(), Some("dark"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AskdeskError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| AskdeskError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened history database at {}", path.display());
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| AskdeskError::Storage(format!("Get failed: {}", e)))?;
        // Invalid UTF-8 surfaces later as a JSON parse failure.
        Ok(value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| AskdeskError::Storage(format!("Insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| AskdeskError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| AskdeskError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| AskdeskError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

/// In-process backend; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AskdeskError::Storage("Failed to acquire read lock".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AskdeskError::Storage("Failed to acquire write lock".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AskdeskError::Storage("Failed to acquire write lock".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert!(store.is_empty());
        // Removing again is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_sled_store_persists_across_reopen() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("history.sled");

        {
            let store = SledStore::open(&db_path).expect("Failed to open store");
            store.set("chatHistory", "[]").expect("set failed");
        }

        let store = SledStore::open(&db_path).expect("Failed to reopen store");
        assert_eq!(store.get("chatHistory").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_sled_store_creates_nested_parent() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("history.sled");

        let store = SledStore::open(&db_path);
        assert!(store.is_ok());
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_sled_store_remove_missing_key() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store = SledStore::open(temp_dir.path().join("db")).expect("open failed");
        assert!(store.remove("nope").is_ok());
    }

    #[test]
    fn test_arc_forwards_to_inner() {
        let inner = Arc::new(MemoryStore::new());
        let shared: Arc<MemoryStore> = Arc::clone(&inner);
        shared.set("a", "1").unwrap();
        assert!(inner.contains_key("a"));
    }
}
