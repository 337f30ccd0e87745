//! Deck is a named set of reviewable items
use super::ReviewableItem;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub items: Vec<ReviewableItem>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new("My Deck")
    }
}
