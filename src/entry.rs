use serde::{Deserialize, Serialize};

/// A normalized dictionary result for one word.
///
/// `word` is the favorites key: two entries with the same `word` are the same
/// favorite even when their other fields differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub word: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phonetics: Vec<Phonetic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phonetic {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antonyms: Vec<String>,
}

impl Entry {
    /// Creates an entry with only a headword.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phonetics: Vec::new(),
            origin: None,
            meanings: Vec::new(),
        }
    }

    /// Returns the first pronunciation that carries an audio clip.
    pub fn audio_url(&self) -> Option<&str> {
        self.phonetics
            .iter()
            .find_map(|phonetic| phonetic.audio_url.as_deref())
    }

    /// Returns the first definition, for one-line summaries.
    pub fn summary(&self) -> Option<&str> {
        self.meanings
            .iter()
            .flat_map(|meaning| meaning.definitions.iter())
            .map(|definition| definition.definition.as_str())
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pumpkin() -> Entry {
        Entry {
            word: "pumpkin".to_string(),
            phonetics: vec![
                Phonetic {
                    text: "/ˈpʌmpkɪn/".to_string(),
                    audio_url: None,
                },
                Phonetic {
                    text: "/ˈpʌmpkɪn/".to_string(),
                    audio_url: Some("https://example.com/pumpkin-us.mp3".to_string()),
                },
            ],
            origin: None,
            meanings: vec![Meaning {
                part_of_speech: "noun".to_string(),
                definitions: vec![
                    Definition {
                        definition: "A domesticated plant of the gourd family.".to_string(),
                        example: None,
                        synonyms: Vec::new(),
                        antonyms: Vec::new(),
                    },
                    Definition {
                        definition: "A term of endearment.".to_string(),
                        example: Some("Come here, pumpkin.".to_string()),
                        synonyms: vec!["sweetheart".to_string()],
                        antonyms: Vec::new(),
                    },
                ],
                synonyms: Vec::new(),
                antonyms: Vec::new(),
            }],
        }
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_fields() {
        let value = serde_json::to_value(pumpkin()).unwrap();
        assert_eq!(
            value["phonetics"][1]["audioUrl"],
            "https://example.com/pumpkin-us.mp3"
        );
        assert!(value["phonetics"][0].get("audioUrl").is_none());
        assert_eq!(value["meanings"][0]["partOfSpeech"], "noun");
        assert!(value.get("origin").is_none());
        assert!(value["meanings"][0]["definitions"][0].get("example").is_none());
    }

    #[test]
    fn deserializes_minimal_stored_entry() {
        let entry: Entry = serde_json::from_value(json!({ "word": "dog" })).unwrap();
        assert_eq!(entry, Entry::new("dog"));
    }

    #[test]
    fn accessors_walk_nested_records() {
        let entry = pumpkin();
        assert_eq!(entry.audio_url(), Some("https://example.com/pumpkin-us.mp3"));
        assert_eq!(
            entry.summary(),
            Some("A domesticated plant of the gourd family.")
        );
        assert_eq!(Entry::new("cat").summary(), None);
    }
}
