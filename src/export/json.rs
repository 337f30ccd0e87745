//! JSON import/export for decks and progress snapshots.
//! Decks are stored as `{"name": ..., "items": [...]}`; progress snapshots as a
//! flat object mapping card id to its progress record.

use crate::error::{Error, Result};
use crate::models::{Deck, ProgressMap};
use log::info;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!("Deck '{}' exported to '{}'", deck.name, path.display());
    Ok(())
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: &Path) -> Result<Deck> {
    let file = File::open(path)?;
    let deck: Deck = serde_json::from_reader(BufReader::new(file))?;
    info!("Deck '{}' imported from '{}'", deck.name, path.display());
    Ok(deck)
}

pub fn export_progress_to_path(progress: &ProgressMap, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(progress)?;
    std::fs::write(path, json_string)?;
    info!("Exported {} progress records to '{}'", progress.len(), path.display());
    Ok(())
}

/// Reads a progress snapshot. Every entry's key must equal its record's `id`,
/// otherwise the whole snapshot is rejected.
pub fn import_progress(path: &Path) -> Result<ProgressMap> {
    let file = File::open(path)?;
    let progress: ProgressMap = serde_json::from_reader(BufReader::new(file))?;
    if let Some((key, record)) = progress.iter().find(|(key, record)| **key != record.id) {
        return Err(Error::ProgressKeyMismatch {
            key: key.clone(),
            id: record.id.clone(),
        });
    }
    info!("Read {} progress records from '{}'", progress.len(), path.display());
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewableItem, sm2};
    use std::fs;

    fn create_test_deck() -> Deck {
        Deck {
            name: "Test Deck".to_string(),
            items: vec![
                ReviewableItem::vocabulary("hej", "hola", Some("Hej, hvordan går det?")),
                ReviewableItem::vocabulary("tak", "gracias", None),
            ],
        }
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");

        export_json_to_path(&create_test_deck(), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["name"], "Test Deck");
        assert_eq!(written["items"][0]["id"], "word-hej");
        assert!(written["items"][1].get("example").is_none());
    }

    #[test]
    fn test_import_json() {
        let json_content = r#"{
  "name": "Import Test Deck",
  "items": [
    {
      "id": "c1",
      "front": "test term",
      "back": "test definition"
    }
  ]
}"#;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        fs::write(&path, json_content).unwrap();

        let deck = import_json(&path).unwrap();
        assert_eq!(deck.name, "Import Test Deck");
        assert_eq!(deck.items.len(), 1);
        assert_eq!(deck.items[0].front, "test term");
        assert_eq!(deck.items[0].back, "test definition");
        assert!(deck.items[0].tags.is_empty());
    }

    #[test]
    fn test_export_and_import_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        let original = create_test_deck();

        export_json_to_path(&original, &path).unwrap();
        let imported = import_json(&path).unwrap();

        assert_eq!(original.name, imported.name);
        assert_eq!(original.items, imported.items);
    }

    #[test]
    fn test_import_nonexistent_file() {
        assert!(import_json(Path::new("nonexistent_file_xyz123.json")).is_err());
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(import_json(&path).is_err());
    }

    #[test]
    fn test_progress_snapshot_is_keyed_by_card_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let mut progress = ProgressMap::new();
        let record = sm2::review_at(&sm2::initialize_at("word-hej", 0), 5, 0);
        progress.insert(record.id.clone(), record.clone());

        export_progress_to_path(&progress, &path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["word-hej"]["interval"], 1);
        assert_eq!(raw["word-hej"]["nextReview"], sm2::MS_PER_DAY);

        assert_eq!(import_progress(&path).unwrap(), progress);
    }

    #[test]
    fn test_progress_key_must_match_record_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(
            &path,
            r#"{"word-hej": {"id": "word-tak", "interval": 1, "repetition": 1, "easeFactor": 2.6, "nextReview": 0}}"#,
        )
        .unwrap();

        match import_progress(&path) {
            Err(Error::ProgressKeyMismatch { key, id }) => {
                assert_eq!(key, "word-hej");
                assert_eq!(id, "word-tak");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
