//! Keyed storage for progress records.
//!
//! The scheduler itself never touches storage. Callers read a record, run the
//! transition and write the result back; `ProgressStore::update` makes that
//! cycle atomic per card so concurrent sessions cannot lose a review.

use crate::error::{Error, Result};
use crate::models::progress_record::{ProgressMap, ProgressRecord, Timestamp};
use crate::models::quality::Quality;
use crate::models::sm2;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::sync::{Arc, Mutex};

pub trait ProgressStore {
    fn get(&self, card_id: &str) -> Result<Option<ProgressRecord>>;

    /// Inserts or replaces the record stored under `record.id`.
    fn put(&self, record: &ProgressRecord) -> Result<()>;

    fn load_all(&self) -> Result<ProgressMap>;

    /// Reads the record for `card_id`, passes it to `apply` and stores the
    /// result, with no other writer interleaving for that card.
    fn update(
        &self,
        card_id: &str,
        apply: &mut dyn FnMut(Option<ProgressRecord>) -> ProgressRecord,
    ) -> Result<ProgressRecord>;
}

/// Grades one card and persists the result. A card seen for the first time
/// starts from a fresh record due at `now`.
pub fn record_review<S: ProgressStore + ?Sized>(
    store: &S,
    card_id: &str,
    quality: impl Into<Quality>,
    now: Timestamp,
) -> Result<ProgressRecord> {
    let quality = quality.into();
    store.update(card_id, &mut |existing| {
        let current = existing.unwrap_or_else(|| sm2::initialize_at(card_id, now));
        sm2::review_at(&current, quality, now)
    })
}

/// Progress kept in the `progress` table of the application database.
#[derive(Clone)]
pub struct SqliteProgressStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProgressStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

fn read_record(conn: &Connection, card_id: &str) -> rusqlite::Result<Option<ProgressRecord>> {
    conn.query_row(
        "SELECT card_id, interval, repetition, ease_factor, next_review
         FROM progress WHERE card_id = ?1",
        params![card_id],
        |row| {
            Ok(ProgressRecord {
                id: row.get(0)?,
                interval: row.get(1)?,
                repetition: row.get(2)?,
                ease_factor: row.get(3)?,
                next_review: row.get(4)?,
            })
        },
    )
    .optional()
}

fn write_record(conn: &Connection, record: &ProgressRecord) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO progress (card_id, interval, repetition, ease_factor, next_review)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(card_id) DO UPDATE SET
            interval = excluded.interval,
            repetition = excluded.repetition,
            ease_factor = excluded.ease_factor,
            next_review = excluded.next_review",
        params![
            record.id,
            record.interval,
            record.repetition,
            record.ease_factor,
            record.next_review
        ],
    )?;
    Ok(())
}

impl ProgressStore for SqliteProgressStore {
    fn get(&self, card_id: &str) -> Result<Option<ProgressRecord>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(read_record(&conn, card_id)?)
    }

    fn put(&self, record: &ProgressRecord) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(write_record(&conn, record)?)
    }

    fn load_all(&self) -> Result<ProgressMap> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT card_id, interval, repetition, ease_factor, next_review FROM progress",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(ProgressRecord {
                    id: row.get(0)?,
                    interval: row.get(1)?,
                    repetition: row.get(2)?,
                    ease_factor: row.get(3)?,
                    next_review: row.get(4)?,
                })
            })?
            .map(|record| record.map(|r| (r.id.clone(), r)))
            .collect::<rusqlite::Result<ProgressMap>>()?;
        Ok(records)
    }

    fn update(
        &self,
        card_id: &str,
        apply: &mut dyn FnMut(Option<ProgressRecord>) -> ProgressRecord,
    ) -> Result<ProgressRecord> {
        let mut conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        // IMMEDIATE takes the write lock up front, so other processes on the
        // same file wait instead of reading a stale record.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = apply(read_record(&tx, card_id)?);
        write_record(&tx, &updated)?;
        tx.commit()?;
        Ok(updated)
    }
}

/// Progress held in memory only.
#[derive(Default)]
pub struct MemoryProgressStore {
    records: Mutex<ProgressMap>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(records: ProgressMap) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, card_id: &str) -> Result<Option<ProgressRecord>> {
        let records = self.records.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(records.get(card_id).cloned())
    }

    fn put(&self, record: &ProgressRecord) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| Error::LockPoisoned)?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<ProgressMap> {
        let records = self.records.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(records.clone())
    }

    fn update(
        &self,
        card_id: &str,
        apply: &mut dyn FnMut(Option<ProgressRecord>) -> ProgressRecord,
    ) -> Result<ProgressRecord> {
        let mut records = self.records.lock().map_err(|_| Error::LockPoisoned)?;
        let updated = apply(records.get(card_id).cloned());
        records.insert(card_id.to_string(), updated.clone());
        Ok(updated)
    }
}
