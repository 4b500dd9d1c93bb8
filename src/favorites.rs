//! The favorites list and its synchronization with persistent storage.
//!
//! [`Favorites`] owns the authoritative in-memory set. Every mutation is
//! applied to the store first and to memory second, so a favorite shown to the
//! user always has a persisted copy. The set lock is held across the store
//! call, which serializes overlapping `add`/`remove` calls for the same word.

use crate::entry::Entry;
use crate::error::{Error, Result, StoreError};
use crate::persistence::PersistenceAdapter;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

pub struct Favorites {
    adapter: PersistenceAdapter,
    inner: Mutex<FavoritesState>,
}

#[derive(Default)]
struct FavoritesState {
    entries: IndexMap<String, Entry>,
    hydrated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The entry was persisted and is now a favorite.
    Added,
    /// A favorite with the same word already existed; nothing changed.
    AlreadySaved,
}

/// Result of [`Favorites::remove`].
///
/// The in-memory favorite is dropped even when the store delete fails; the
/// failure is reported in `store_error`.
#[derive(Debug)]
pub struct Removal {
    pub was_favorite: bool,
    pub store_error: Option<StoreError>,
}

impl Removal {
    pub fn is_clean(&self) -> bool {
        self.store_error.is_none()
    }
}

impl Favorites {
    /// Creates an empty, not yet hydrated favorites list.
    pub fn new(adapter: PersistenceAdapter) -> Self {
        Self {
            adapter,
            inner: Mutex::new(FavoritesState::default()),
        }
    }

    /// Creates the list and hydrates it from the store in one step.
    pub fn hydrated(adapter: PersistenceAdapter) -> Self {
        let favorites = Self::new(adapter);
        let mut guard = favorites.inner.lock();
        favorites.load_into(&mut guard);
        drop(guard);
        favorites
    }

    /// Loads the persisted favorites into memory. Only the first call does
    /// anything; later calls return [`Error::AlreadyHydrated`].
    pub fn hydrate(&self) -> Result<usize> {
        let mut guard = self.inner.lock();
        if guard.hydrated {
            return Err(Error::AlreadyHydrated);
        }
        Ok(self.load_into(&mut guard))
    }

    fn load_into(&self, state: &mut FavoritesState) -> usize {
        state.entries = self.adapter.load_all();
        state.hydrated = true;
        info!(count = state.entries.len(), "favorites hydrated");
        state.entries.len()
    }

    /// Saves `entry` as a favorite unless its word is already saved.
    ///
    /// Memory is only updated once the store acknowledged the write; a store
    /// failure leaves the set unchanged and is returned as
    /// [`Error::Persistence`].
    pub fn add(&self, entry: Entry) -> Result<AddOutcome> {
        if entry.word.is_empty() {
            return Err(Error::Validation(
                "cannot save a favorite without a word".to_string(),
            ));
        }
        let mut guard = self.inner.lock();
        if guard.entries.contains_key(&entry.word) {
            debug!(word = %entry.word, "already a favorite");
            return Ok(AddOutcome::AlreadySaved);
        }
        if let Err(err) = self.adapter.save(&entry.word, &entry) {
            warn!(word = %entry.word, error = %err, "favorite not saved");
            return Err(err.into());
        }
        debug!(word = %entry.word, "favorite saved");
        guard.entries.insert(entry.word.clone(), entry);
        Ok(AddOutcome::Added)
    }

    /// Removes `word` from the store and then from memory.
    pub fn remove(&self, word: &str) -> Removal {
        let mut guard = self.inner.lock();
        let store_error = match self.adapter.remove(word) {
            Ok(()) => None,
            Err(err) => {
                warn!(word = %word, error = %err, "favorite removed from memory only");
                Some(err)
            }
        };
        let was_favorite = guard.entries.shift_remove(word).is_some();
        debug!(word = %word, was_favorite, "favorite removed");
        Removal {
            was_favorite,
            store_error,
        }
    }

    /// Returns the favorites in insertion order.
    pub fn list(&self) -> Vec<Entry> {
        self.inner.lock().entries.values().cloned().collect()
    }

    pub fn words(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Exact, case-sensitive membership test.
    pub fn is_favorite(&self, word: &str) -> bool {
        self.inner.lock().entries.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<Entry> {
        self.inner.lock().entries.get(word).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_hydrated(&self) -> bool {
        self.inner.lock().hydrated
    }
}
