//! Text key-value stores that back the favorites list.
//!
//! A store is a process-wide map from string keys to string values that can
//! enumerate its keys. It is the durable side of the favorites list; callers
//! go through [`crate::PersistenceAdapter`] rather than talking to it directly.

use crate::error::StoreError;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait KeyValueStore: Send + Sync {
    /// Lists every key in store order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Returns `false` when the key was not present.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// A store that keeps its values in a single JSON document on disk.
///
/// The document is re-read on every call and rewritten through a sibling
/// temporary file, so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<IndexMap<String, String>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(IndexMap::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::Corrupt(format!("{}: {err}", self.path.display())))
    }

    fn write_map(&self, map: &IndexMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| unavailable(&self.path, err))?;
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(|err| unavailable(&self.path, err))?;
        file.write_all(&bytes)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = map.len(), "store written");
        Ok(())
    }
}

fn unavailable(path: &Path, err: io::Error) -> StoreError {
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::NotFound | ErrorKind::ReadOnlyFilesystem => {
            StoreError::Unavailable(format!("{}: {err}", path.display()))
        }
        _ => StoreError::Io(err),
    }
}

impl KeyValueStore for FileStore {
    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_map()?.into_keys().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.shift_remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut map = self.read_map()?;
        if map.shift_remove(key).is_none() {
            return Ok(false);
        }
        self.write_map(&map)?;
        Ok(true)
    }
}

/// A process-local store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<IndexMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with raw text values.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.values.lock().keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.values.lock().shift_remove(key).is_some())
    }
}

/// Stands in for a store that cannot be reached; every call fails.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

impl KeyValueStore for UnavailableStore {
    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Err(self.error())
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(self.error())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("favorites.json"));
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(store.get("dog").unwrap(), None);
        assert!(!store.delete("dog").unwrap());
    }

    #[test]
    fn file_store_keeps_insertion_order_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("favorites.json");
        let store = FileStore::new(&path);
        store.set("zebra", "1").unwrap();
        store.set("apple", "2").unwrap();
        store.set("mango", "3").unwrap();
        store.set("zebra", "4").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.keys().unwrap(), vec!["zebra", "apple", "mango"]);
        assert_eq!(reopened.get("zebra").unwrap().as_deref(), Some("4"));

        assert!(reopened.delete("apple").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["zebra", "mango"]);
    }

    #[test]
    fn file_store_reports_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.keys(), Err(StoreError::Corrupt(_))));
        assert!(matches!(store.set("dog", "{}"), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn file_store_treats_blank_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, "\n").unwrap();
        assert!(FileStore::new(&path).keys().unwrap().is_empty());
    }

    #[test]
    fn memory_store_overwrites_in_place() {
        let store = MemoryStore::with_values([("dog", "a"), ("cat", "b")]);
        store.set("dog", "c").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["dog", "cat"]);
        assert_eq!(store.get("dog").unwrap().as_deref(), Some("c"));
        assert!(store.delete("cat").unwrap());
        assert!(!store.delete("cat").unwrap());
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = UnavailableStore::new("no data directory");
        assert!(matches!(store.keys(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.set("a", "b"), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.delete("a"), Err(StoreError::Unavailable(_))));
    }
}
