use crate::entry::Entry;
use crate::error::StoreError;
use crate::store::KeyValueStore;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::warn;

/// Translates favorites to and from a [`KeyValueStore`], one key per word.
///
/// The adapter holds no state of its own; every call goes to the store.
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceAdapter {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads every persisted favorite in store order.
    ///
    /// Values that do not parse as an [`Entry`], or whose word does not match
    /// their key, are logged and skipped. An unreachable store yields an empty
    /// map.
    pub fn load_all(&self) -> IndexMap<String, Entry> {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "favorites store unavailable; starting empty");
                return IndexMap::new();
            }
        };
        let mut entries = IndexMap::with_capacity(keys.len());
        for key in keys {
            let raw = match self.store.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    warn!(key = %key, error = %err, "failed to read stored favorite");
                    continue;
                }
            };
            let entry: Entry = match serde_json::from_str(&raw) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(key = %key, error = %err, "skipping unreadable stored favorite");
                    continue;
                }
            };
            if entry.word != key {
                warn!(key = %key, word = %entry.word, "skipping stored favorite filed under another word");
                continue;
            }
            entries.insert(key, entry);
        }
        entries
    }

    /// Serializes `entry` and writes it under `word`, replacing any previous value.
    pub fn save(&self, word: &str, entry: &Entry) -> Result<(), StoreError> {
        let value = serde_json::to_string(entry)?;
        self.store.set(word, &value)
    }

    /// Deletes `word`. A missing key counts as success.
    pub fn remove(&self, word: &str) -> Result<(), StoreError> {
        self.store.delete(word).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UnavailableStore};

    fn adapter_over(store: Arc<MemoryStore>) -> PersistenceAdapter {
        PersistenceAdapter::from_shared(store)
    }

    #[test]
    fn load_all_skips_malformed_values() {
        let store = Arc::new(MemoryStore::with_values([
            ("dog", r#"{"word":"dog","meanings":[]}"#),
            ("broken", "{not json"),
            ("cat", r#"{"word":"cat"}"#),
        ]));
        let loaded = adapter_over(store).load_all();
        assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["dog", "cat"]);
    }

    #[test]
    fn load_all_skips_entries_filed_under_another_key() {
        let store = Arc::new(MemoryStore::with_values([("Dog", r#"{"word":"dog"}"#)]));
        assert!(adapter_over(store).load_all().is_empty());
    }

    #[test]
    fn load_all_on_unavailable_store_is_empty() {
        let adapter = PersistenceAdapter::new(UnavailableStore::new("outside any profile"));
        assert!(adapter.load_all().is_empty());
    }

    #[test]
    fn save_overwrites_and_remove_tolerates_absence() {
        let store = Arc::new(MemoryStore::new());
        let adapter = adapter_over(store.clone());
        adapter.save("dog", &Entry::new("dog")).unwrap();
        let mut updated = Entry::new("dog");
        updated.origin = Some("Old English docga".to_string());
        adapter.save("dog", &updated).unwrap();

        let raw = store.get("dog").unwrap().unwrap();
        let stored: Entry = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, updated);
        assert_eq!(store.keys().unwrap().len(), 1);

        adapter.remove("dog").unwrap();
        adapter.remove("dog").unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn save_reports_store_failure() {
        let adapter = PersistenceAdapter::new(UnavailableStore::new("quota exceeded"));
        let err = adapter.save("dog", &Entry::new("dog")).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
