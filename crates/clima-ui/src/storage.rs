//! Key/value persistence for user preferences.
//!
//! Values are opaque strings; callers decide how to encode them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clima_core::StorageError;
use parking_lot::Mutex;

/// A small string store that survives restarts
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Store backed by a single JSON object on disk.
/// Every `set` rewrites the whole file.
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Discarding stored preferences: {}", e);
                HashMap::new()
            }
        };
        tracing::debug!("Opened preference store at {:?} ({} keys)", path, values.len());
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> Result<HashMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let json = fs::read_to_string(path).map_err(|e| StorageError::ReadFailed {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            key: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn flush(&self, key: &str) -> Result<(), StorageError> {
        let write_failed = |message: String| StorageError::WriteFailed {
            key: key.to_string(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(&self.values).map_err(|e| write_failed(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| write_failed(e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush(key)
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.values.lock();
            for (k, v) in values {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.lock().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("storage.json");

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("unit").unwrap(), None);
        store.set("unit", "F").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("unit").unwrap().as_deref(), Some("F"));
    }

    #[test]
    fn test_file_store_discards_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json at all").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("unit").unwrap(), None);

        store.set("unit", "C").unwrap();
        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("unit").unwrap().as_deref(), Some("C"));
    }

    #[test]
    fn test_memory_store_clones_share_values() {
        let store = MemoryStore::with_values([("unit", "C")]);
        let mut handle = store.clone();
        handle.set("weatherHistory", "[]").unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("unit").map(String::as_str), Some("C"));
        assert_eq!(snapshot.get("weatherHistory").map(String::as_str), Some("[]"));
    }
}
