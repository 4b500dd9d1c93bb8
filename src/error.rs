//! Error types shared by the library and the command-line front end.

use thiserror::Error;

/// Failures raised by a [`crate::store::KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all (no data directory, read-only media).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document exists but is not a map of text values.
    #[error("store is corrupt: {0}")]
    Corrupt(String),

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before it reached a lookup or the store.
    #[error("{0}")]
    Validation(String),

    /// The dictionary service has no entry for the term.
    #[error("no definitions found for {term:?}")]
    NotFound { term: String },

    /// Transport, status or payload failure while talking to the dictionary service.
    #[error("dictionary request failed: {0}")]
    Network(String),

    /// A favorites write or delete was not acknowledged by the store.
    #[error("could not update favorites: {0}")]
    Persistence(#[from] StoreError),

    #[error("favorites were already hydrated")]
    AlreadyHydrated,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Network(value.to_string())
    }
}

/// A convenience `Result` alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
