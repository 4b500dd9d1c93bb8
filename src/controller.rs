//! Search and display state for a front end.
//!
//! The controller owns the transient search state (term, displayed entries,
//! error text) and forwards favorite operations to the shared [`Favorites`].

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::favorites::{AddOutcome, Favorites, Removal};
use crate::lookup::{CandidatePolicy, Dictionary};
use std::sync::Arc;
use tracing::debug;

pub const EMPTY_TERM_MESSAGE: &str = "Please enter a word";

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    term: String,
    results: Vec<Entry>,
    error: Option<String>,
}

impl SearchState {
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The entry currently on display.
    pub fn entry(&self) -> Option<&Entry> {
        self.results.first()
    }

    pub fn results(&self) -> &[Entry] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

pub struct Controller<D> {
    dictionary: D,
    favorites: Arc<Favorites>,
    policy: CandidatePolicy,
    state: SearchState,
}

impl<D: Dictionary> Controller<D> {
    pub fn new(dictionary: D, favorites: Arc<Favorites>) -> Self {
        Self {
            dictionary,
            favorites,
            policy: CandidatePolicy::default(),
            state: SearchState::default(),
        }
    }

    pub fn with_policy(mut self, policy: CandidatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.state.term = term.into();
    }

    /// Runs a lookup for the current term.
    ///
    /// Previous results and errors are cleared first. Failures are recorded as
    /// user-facing text in the state and also returned.
    pub async fn search(&mut self) -> Result<&[Entry]> {
        self.state.results.clear();
        self.state.error = None;

        let term = self.state.term.trim().to_string();
        if term.is_empty() {
            self.state.error = Some(EMPTY_TERM_MESSAGE.to_string());
            return Err(Error::Validation(EMPTY_TERM_MESSAGE.to_string()));
        }

        match self.dictionary.entries(&term).await {
            Ok(entries) => {
                self.state.results = self.policy.apply(entries);
                debug!(term = %term, shown = self.state.results.len(), "search finished");
                Ok(self.state.results.as_slice())
            }
            Err(err) => {
                self.state.error = Some(user_message(&err));
                Err(err)
            }
        }
    }

    /// Adds the displayed entry to favorites.
    pub fn save_current(&self) -> Result<AddOutcome> {
        let entry = self
            .state
            .entry()
            .cloned()
            .ok_or_else(|| Error::Validation("no word is displayed".to_string()))?;
        self.favorites.add(entry)
    }

    pub fn remove_favorite(&self, word: &str) -> Removal {
        self.favorites.remove(word)
    }

    pub fn is_favorite(&self, word: &str) -> bool {
        self.favorites.is_favorite(word)
    }

    /// Read-only snapshot of the favorites for rendering.
    pub fn favorites(&self) -> Vec<Entry> {
        self.favorites.list()
    }
}

/// Text shown to the user for a failed search.
pub fn user_message(err: &Error) -> String {
    match err {
        Error::NotFound { term } => format!("No definitions found for \"{term}\""),
        Error::Network(_) => "Could not reach the dictionary. Please try again.".to_string(),
        other => other.to_string(),
    }
}
