//! A reviewable item is a card with a stable id, front and back text.
//! Items are immutable content; scheduling state lives in `ProgressRecord`.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewableItem {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ReviewableItem {
    pub fn new(id: impl Into<String>, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            front: front.into(),
            back: back.into(),
            example: None,
            tags: Vec::new(),
        }
    }

    /// Vocabulary card for a single word: id `word-<word>`, tagged `vocabulary`.
    pub fn vocabulary(word: &str, translation: &str, example: Option<&str>) -> Self {
        Self {
            id: format!("word-{}", word),
            front: word.to_string(),
            back: translation.to_string(),
            example: example.map(str::to_string),
            tags: vec!["vocabulary".to_string()],
        }
    }
}
