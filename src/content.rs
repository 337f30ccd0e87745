//! Built-in Danish vocabulary used to seed an empty database.
use crate::database::db;
use crate::error::Result;
use crate::models::{Deck, ReviewableItem};
use log::info;
use rusqlite::Connection;

pub const SAMPLE_DECK_NAME: &str = "Danish Vocabulary";

// (word, translation, example)
const WORDS: &[(&str, &str, Option<&str>)] = &[
    ("hej", "hola", Some("Hej, hvordan går det?")),
    ("tak", "gracias", Some("Mange tak for hjælpen")),
    ("ja", "sí", Some("Ja, det er rigtigt")),
    ("nej", "no", Some("Nej tak")),
    ("god", "bueno", None),
    ("dag", "día", None),
    ("morgen", "mañana", None),
    ("aften", "tarde/noche", None),
    ("mad", "comida", None),
    ("vand", "agua", None),
    ("hus", "casa", None),
    ("bil", "coche", None),
    ("rød", "rojo", None),
    ("blå", "azul", None),
    ("stor", "grande", None),
    ("lille", "pequeño", None),
    ("ven", "amigo", None),
    ("familie", "familia", None),
    ("brød", "pan", None),
    ("kaffe", "café", None),
];

pub fn sample_deck() -> Deck {
    Deck {
        name: SAMPLE_DECK_NAME.to_string(),
        items: WORDS
            .iter()
            .map(|&(word, translation, example)| {
                ReviewableItem::vocabulary(word, translation, example)
            })
            .collect(),
    }
}

/// Stores the sample deck if the database has no decks yet.
/// Returns true when the deck was created.
pub fn seed_if_empty(conn: &Connection) -> Result<bool> {
    if !db::get_all_decks(conn)?.is_empty() {
        return Ok(false);
    }
    db::import_deck(&sample_deck(), conn)?;
    info!("Sample deck '{}' created", SAMPLE_DECK_NAME);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_ids_are_unique() {
        let deck = sample_deck();
        let ids: HashSet<_> = deck.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), deck.items.len());
    }

    #[test]
    fn test_seed_only_once() {
        let conn = db::open_in_memory().unwrap();

        assert!(seed_if_empty(&conn).unwrap());
        assert!(!seed_if_empty(&conn).unwrap());

        let deck = db::load_deck(SAMPLE_DECK_NAME, &conn).unwrap();
        assert_eq!(deck.items.len(), WORDS.len());
        assert_eq!(deck.items[0].id, "word-hej");
    }
}
