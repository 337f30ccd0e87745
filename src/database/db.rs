//! Database operations for the flashcard application
//!
//! Handles SQLite database initialization, CRUD operations for decks and cards,
//! the simulated review clock and the reviews-today counter. Scheduling state
//! is accessed through `progress_store`.

use crate::error::{Error, Result};
use crate::models::daily_counter::{DailyReviewCounter, day_of};
use crate::models::sm2::{MS_PER_DAY, now_millis};
use crate::models::{Deck, ReviewableItem, Timestamp};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Opens (or creates) the database file and makes sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!("Opened database at {}", path.display());
    Ok(conn)
}

/// In-memory database with the full schema, used by tests and dry runs.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates tables for decks, cards, progress records and app state.
/// Sets the simulated clock to now if not already initialized.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS decks (
            name TEXT PRIMARY KEY
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id TEXT NOT NULL,
            deck_name TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            example TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            PRIMARY KEY (deck_name, id),
            FOREIGN KEY (deck_name) REFERENCES decks(name)
        )",
        (),
    )?;

    // No foreign key to items: a record for an unknown id is allowed
    conn.execute(
        "CREATE TABLE IF NOT EXISTS progress (
            card_id TEXT PRIMARY KEY,
            interval INTEGER NOT NULL DEFAULT 0,
            repetition INTEGER NOT NULL DEFAULT 0,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            next_review INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_time', ?1)",
        params![now_millis().to_string()],
    )?;

    Ok(())
}

fn get_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn set_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Retrieves the simulated current time from the database
pub fn current_time(conn: &Connection) -> Result<Timestamp> {
    match get_state(conn, "current_time")? {
        Some(value) => match value.parse::<Timestamp>() {
            Ok(at) => Ok(at),
            Err(_) => {
                warn!("Corrupt current_time '{}', falling back to wall clock", value);
                Ok(now_millis())
            }
        },
        None => Ok(now_millis()),
    }
}

/// Advances the simulated clock by 24 hours and returns the new time
pub fn advance_day(conn: &Connection) -> Result<Timestamp> {
    let next_day = current_time(conn)?.saturating_add(MS_PER_DAY);
    set_state(conn, "current_time", &next_day.to_string())?;
    info!("Advanced clock to {}", next_day);
    Ok(next_day)
}

/// Creates a new empty deck
pub fn new_deck(name: &str, conn: &Connection) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO decks (name) VALUES (?1)",
        params![name],
    )?;
    if inserted == 0 {
        return Err(Error::DeckExists(name.to_string()));
    }
    info!("Deck '{}' created", name);
    Ok(())
}

/// Adds a card to a deck. Card ids are unique per deck; the same id in two
/// decks shares one progress record.
/// Progress is not created here; a card without progress is due immediately.
pub fn add_item(deck_name: &str, item: &ReviewableItem, conn: &Connection) -> Result<()> {
    if !deck_exists(deck_name, conn)? {
        return Err(Error::DeckNotFound(deck_name.to_string()));
    }
    let tags = serde_json::to_string(&item.tags)?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO items (id, deck_name, front, back, example, tags)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![item.id, deck_name, item.front, item.back, item.example, tags],
    )?;
    if inserted == 0 {
        return Err(Error::CardExists {
            deck: deck_name.to_string(),
            id: item.id.clone(),
        });
    }
    Ok(())
}

pub fn deck_exists(name: &str, conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM decks WHERE name = ?1",
            params![name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Retrieves all cards of a deck in insertion order
pub fn get_items_for_deck(deck_name: &str, conn: &Connection) -> Result<Vec<ReviewableItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, front, back, example, tags FROM items WHERE deck_name = ?1 ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map(params![deck_name], |row| {
            Ok((
                ReviewableItem {
                    id: row.get(0)?,
                    front: row.get(1)?,
                    back: row.get(2)?,
                    example: row.get(3)?,
                    tags: Vec::new(),
                },
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(mut item, tags)| -> Result<ReviewableItem> {
            item.tags = serde_json::from_str(&tags)?;
            Ok(item)
        })
        .collect()
}

/// Retrieves all deck names
pub fn get_all_decks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY rowid")?;
    let decks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(decks)
}

pub fn load_deck(name: &str, conn: &Connection) -> Result<Deck> {
    if !deck_exists(name, conn)? {
        return Err(Error::DeckNotFound(name.to_string()));
    }
    Ok(Deck {
        name: name.to_string(),
        items: get_items_for_deck(name, conn)?,
    })
}

/// Loads all decks with their cards into memory
pub fn load_all_decks(conn: &Connection) -> Result<Vec<Deck>> {
    get_all_decks(conn)?
        .iter()
        .map(|name| load_deck(name, conn))
        .collect()
}

/// Stores a whole deck in one transaction. Fails without storing anything if
/// the deck name is taken or the deck repeats a card id.
pub fn import_deck(deck: &Deck, conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    new_deck(&deck.name, &tx)?;
    for item in &deck.items {
        add_item(&deck.name, item, &tx)?;
    }
    tx.commit()?;
    info!("Imported deck '{}' with {} cards", deck.name, deck.items.len());
    Ok(())
}

pub fn load_review_counter(conn: &Connection) -> Result<DailyReviewCounter> {
    let day = get_state(conn, "last_review_day")?
        .and_then(|value| NaiveDate::parse_from_str(&value, DAY_FORMAT).ok());
    let count = get_state(conn, "reviews_today")?
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    Ok(DailyReviewCounter { day, count })
}

fn save_review_counter(counter: &DailyReviewCounter, conn: &Connection) -> Result<()> {
    if let Some(day) = counter.day {
        set_state(conn, "last_review_day", &day.format(DAY_FORMAT).to_string())?;
    }
    set_state(conn, "reviews_today", &counter.count.to_string())
}

/// Counts one review at `now` and returns the number of reviews done that day
pub fn record_review_today(now: Timestamp, conn: &Connection) -> Result<u32> {
    let mut counter = load_review_counter(conn)?;
    counter.record(now);
    save_review_counter(&counter, conn)?;
    Ok(counter.count)
}

/// Reviews done on the day containing `now`
pub fn reviews_today(now: Timestamp, conn: &Connection) -> Result<u32> {
    Ok(load_review_counter(conn)?.count_on(now))
}

/// Calendar day label for a timestamp, e.g. `2024-03-01`
pub fn format_day(at: Timestamp) -> String {
    day_of(at)
        .map(|day| day.format(DAY_FORMAT).to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deck() -> Deck {
        Deck {
            name: "Danish".to_string(),
            items: vec![
                ReviewableItem::vocabulary("hej", "hola", Some("Hej med dig!")),
                ReviewableItem::vocabulary("tak", "gracias", None),
            ],
        }
    }

    #[test]
    fn test_import_and_load_deck() {
        let conn = open_in_memory().unwrap();
        import_deck(&sample_deck(), &conn).unwrap();

        let decks = load_all_decks(&conn).unwrap();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].name, "Danish");
        assert_eq!(decks[0].items, sample_deck().items);
    }

    #[test]
    fn test_duplicate_deck_rejected() {
        let conn = open_in_memory().unwrap();
        new_deck("Danish", &conn).unwrap();

        assert!(matches!(new_deck("Danish", &conn), Err(Error::DeckExists(_))));
        assert!(matches!(
            import_deck(&sample_deck(), &conn),
            Err(Error::DeckExists(_))
        ));
        assert!(get_items_for_deck("Danish", &conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_item_to_missing_deck() {
        let conn = open_in_memory().unwrap();
        let item = ReviewableItem::new("x", "front", "back");
        assert!(matches!(
            add_item("Nope", &item, &conn),
            Err(Error::DeckNotFound(_))
        ));
        assert!(matches!(load_deck("Nope", &conn), Err(Error::DeckNotFound(_))));
    }

    #[test]
    fn test_duplicate_item_in_deck_rejected() {
        let conn = open_in_memory().unwrap();
        new_deck("Danish", &conn).unwrap();
        let item = ReviewableItem::new("word-hej", "hej", "hola");
        add_item("Danish", &item, &conn).unwrap();

        let again = add_item("Danish", &ReviewableItem::new("word-hej", "hej", "changed"), &conn);
        assert!(matches!(again, Err(Error::CardExists { ref id, .. }) if id == "word-hej"));

        let items = get_items_for_deck("Danish", &conn).unwrap();
        assert_eq!(items, vec![item]);
    }

    #[test]
    fn test_same_card_in_two_decks() {
        let conn = open_in_memory().unwrap();
        import_deck(&sample_deck(), &conn).unwrap();
        new_deck("Mine", &conn).unwrap();

        let hej = ReviewableItem::vocabulary("hej", "hello", None);
        add_item("Mine", &hej, &conn).unwrap();

        assert_eq!(get_items_for_deck("Mine", &conn).unwrap(), vec![hej]);
        assert_eq!(get_items_for_deck("Danish", &conn).unwrap(), sample_deck().items);
    }

    #[test]
    fn test_import_copy_of_existing_deck() {
        let conn = open_in_memory().unwrap();
        import_deck(&sample_deck(), &conn).unwrap();

        let copy = Deck {
            name: "Copy".to_string(),
            items: sample_deck().items,
        };
        import_deck(&copy, &conn).unwrap();

        assert_eq!(load_deck("Copy", &conn).unwrap().items, copy.items);
    }

    #[test]
    fn test_import_with_repeated_id_stores_nothing() {
        let conn = open_in_memory().unwrap();
        let hej = ReviewableItem::vocabulary("hej", "hola", None);
        let deck = Deck {
            name: "Twice".to_string(),
            items: vec![hej.clone(), hej],
        };

        assert!(matches!(import_deck(&deck, &conn), Err(Error::CardExists { .. })));
        assert!(!deck_exists("Twice", &conn).unwrap());
    }

    #[test]
    fn test_advance_day() {
        let conn = open_in_memory().unwrap();
        let before = current_time(&conn).unwrap();
        let after = advance_day(&conn).unwrap();

        assert_eq!(after - before, MS_PER_DAY);
        assert_eq!(current_time(&conn).unwrap(), after);
    }

    #[test]
    fn test_reviews_today_counter() {
        let conn = open_in_memory().unwrap();
        let now = current_time(&conn).unwrap();

        assert_eq!(reviews_today(now, &conn).unwrap(), 0);
        assert_eq!(record_review_today(now, &conn).unwrap(), 1);
        assert_eq!(record_review_today(now, &conn).unwrap(), 2);
        assert_eq!(reviews_today(now, &conn).unwrap(), 2);

        let tomorrow = advance_day(&conn).unwrap();
        assert_eq!(reviews_today(tomorrow, &conn).unwrap(), 0);
        assert_eq!(record_review_today(tomorrow, &conn).unwrap(), 1);
    }

    #[test]
    fn test_open_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.sqlite3");

        {
            let conn = open_database(&path).unwrap();
            new_deck("Danish", &conn).unwrap();
        }

        let conn = open_database(&path).unwrap();
        assert_eq!(get_all_decks(&conn).unwrap(), vec!["Danish".to_string()]);
    }

    #[test]
    fn test_format_day() {
        assert_eq!(format_day(1_700_000_000_000), "2023-11-14");
    }
}
