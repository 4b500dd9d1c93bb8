//! Dictionary lookups with a locally persisted list of favorite words.
//!
//! The pieces, leaf first:
//!
//! * [`store`]: text key-value stores ([`FileStore`], [`MemoryStore`]).
//! * [`PersistenceAdapter`]: reads and writes [`Entry`] values keyed by word.
//! * [`LookupClient`]: fetches and normalizes entries from a
//!   dictionaryapi.dev-compatible service.
//! * [`Favorites`]: the in-memory favorites set, kept consistent with the store.
//! * [`Controller`]: search state for a front end.

pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod favorites;
pub mod lookup;
pub mod persistence;
pub mod store;

pub use config::{Config, Theme};
pub use controller::{Controller, SearchState};
pub use entry::{Definition, Entry, Meaning, Phonetic};
pub use error::{Error, Result, StoreError};
pub use favorites::{AddOutcome, Favorites, Removal};
pub use lookup::{CandidatePolicy, DEFAULT_API_BASE, Dictionary, LookupClient};
pub use persistence::PersistenceAdapter;
pub use store::{FileStore, KeyValueStore, MemoryStore, UnavailableStore};
