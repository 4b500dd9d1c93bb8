use crate::entry::{Definition, Entry, Meaning, Phonetic};
use crate::error::{Error, Result};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// Which of the candidates returned for a term are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidatePolicy {
    /// Only the first returned entry.
    #[default]
    First,
    All,
}

impl CandidatePolicy {
    pub fn apply(self, mut entries: Vec<Entry>) -> Vec<Entry> {
        if self == CandidatePolicy::First {
            entries.truncate(1);
        }
        entries
    }
}

/// A source of dictionary entries for a search term.
pub trait Dictionary {
    /// Returns every normalized candidate for `term`, or
    /// [`Error::NotFound`] / [`Error::Network`].
    fn entries(&self, term: &str) -> impl Future<Output = Result<Vec<Entry>>> + Send;
}

/// HTTP client for a dictionaryapi.dev-compatible service.
#[derive(Debug, Clone)]
pub struct LookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, term: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            utf8_percent_encode(term, NON_ALPHANUMERIC)
        )
    }

    /// Looks `term` up and returns the first candidate.
    pub async fn lookup(&self, term: &str) -> Result<Entry> {
        let mut entries = self.lookup_all(term).await?;
        Ok(entries.swap_remove(0))
    }

    /// Looks `term` up and returns every candidate in service order.
    ///
    /// The result is never empty: no candidates is [`Error::NotFound`].
    pub async fn lookup_all(&self, term: &str) -> Result<Vec<Entry>> {
        let url = self.endpoint(term);
        debug!(%url, "dictionary request");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_entries(term, status, &body)
    }
}

impl Dictionary for LookupClient {
    fn entries(&self, term: &str) -> impl Future<Output = Result<Vec<Entry>>> + Send {
        self.lookup_all(term)
    }
}

/// Turns a raw service response into normalized entries.
pub fn parse_entries(term: &str, status: StatusCode, body: &[u8]) -> Result<Vec<Entry>> {
    if status == StatusCode::NOT_FOUND {
        return Err(not_found(term));
    }
    if !status.is_success() {
        return Err(Error::Network(format!(
            "dictionary service answered {status}"
        )));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(not_found(term));
    }
    let payload: RawPayload = serde_json::from_slice(body)
        .map_err(|err| Error::Network(format!("unreadable dictionary response: {err}")))?;
    let raw = match payload {
        RawPayload::Entries(raw) => raw,
        RawPayload::Notice(notice) => {
            debug!(title = %notice.title, message = ?notice.message, "service has no entry");
            return Err(not_found(term));
        }
        RawPayload::Single(raw) => vec![raw],
    };
    if raw.is_empty() {
        return Err(not_found(term));
    }
    let total = raw.len();
    let entries: Vec<Entry> = raw
        .into_iter()
        .filter_map(|raw| match raw.normalize() {
            Ok(entry) => Some(entry),
            Err(reason) => {
                warn!(term = %term, reason, "dropping malformed dictionary entry");
                None
            }
        })
        .collect();
    if entries.is_empty() {
        return Err(Error::Network(format!(
            "malformed dictionary response: none of {total} entries usable"
        )));
    }
    Ok(entries)
}

fn not_found(term: &str) -> Error {
    Error::NotFound {
        term: term.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Entries(Vec<RawEntry>),
    Notice(RawNotice),
    Single(RawEntry),
}

#[derive(Deserialize)]
struct RawNotice {
    title: String,
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawEntry {
    word: Option<String>,
    phonetic: Option<String>,
    phonetics: Option<Vec<RawPhonetic>>,
    origin: Option<String>,
    meanings: Option<Vec<RawMeaning>>,
}

#[derive(Deserialize)]
struct RawPhonetic {
    text: Option<String>,
    audio: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeaning {
    part_of_speech: Option<String>,
    definitions: Option<Vec<RawDefinition>>,
    synonyms: Option<Vec<String>>,
    antonyms: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawDefinition {
    definition: Option<String>,
    example: Option<String>,
    synonyms: Option<Vec<String>>,
    antonyms: Option<Vec<String>>,
}

impl RawEntry {
    fn normalize(self) -> std::result::Result<Entry, &'static str> {
        let word = non_empty(self.word).ok_or("entry has no word")?;
        let mut phonetics: Vec<Phonetic> = self
            .phonetics
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawPhonetic::normalize)
            .collect();
        if phonetics.iter().all(|phonetic| phonetic.text.is_empty()) {
            if let Some(text) = non_empty(self.phonetic) {
                phonetics.insert(
                    0,
                    Phonetic {
                        text,
                        audio_url: None,
                    },
                );
            }
        }
        let meanings = self
            .meanings
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawMeaning::normalize)
            .collect();
        Ok(Entry {
            word,
            phonetics,
            origin: non_empty(self.origin),
            meanings,
        })
    }
}

impl RawPhonetic {
    fn normalize(self) -> Option<Phonetic> {
        let text = non_empty(self.text);
        let audio_url = non_empty(self.audio);
        if text.is_none() && audio_url.is_none() {
            return None;
        }
        Some(Phonetic {
            text: text.unwrap_or_default(),
            audio_url,
        })
    }
}

impl RawMeaning {
    fn normalize(self) -> Option<Meaning> {
        let part_of_speech = non_empty(self.part_of_speech)?;
        let definitions: Vec<Definition> = self
            .definitions
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawDefinition::normalize)
            .collect();
        if definitions.is_empty() {
            return None;
        }
        Some(Meaning {
            part_of_speech,
            definitions,
            synonyms: words(self.synonyms),
            antonyms: words(self.antonyms),
        })
    }
}

impl RawDefinition {
    fn normalize(self) -> Option<Definition> {
        Some(Definition {
            definition: non_empty(self.definition)?,
            example: non_empty(self.example),
            synonyms: words(self.synonyms),
            antonyms: words(self.antonyms),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn words(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .collect()
}
