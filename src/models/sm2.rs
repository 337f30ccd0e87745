//! SM-2 (SuperMemo 2) spaced repetition scheduler.
//!
//! The scheduler is a pure state transition over a card's `ProgressRecord`:
//! - Each card has an ease factor (EF) that adjusts after every review
//! - Quality grades 0-2 are lapses: interval and repetitions reset to 0
//! - Quality grades 3-5 grow the interval: 1 day, then 6 days, then interval × EF
//! - EF never falls below 1.3 and has no upper bound
//!
//! Ordering helpers (`select_due`, `sort_by_due_at`) only read the progress map.
//! A card without a record is treated as new and due at the moment of the query.

use super::progress_record::{ProgressMap, ProgressRecord, Timestamp};
use super::quality::{Quality, Rating};
use super::ReviewableItem;
use chrono::Utc;
use log::debug;

/// Ease factor floor
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Ease factor of a fresh card
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const FIRST_INTERVAL: u32 = 1;
const SECOND_INTERVAL: u32 = 6;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Fresh record for a card, due right now.
pub fn initialize(card_id: &str) -> ProgressRecord {
    initialize_at(card_id, now_millis())
}

/// Fresh record for a card, due at `now`.
pub fn initialize_at(card_id: &str, now: Timestamp) -> ProgressRecord {
    ProgressRecord {
        id: card_id.to_string(),
        interval: 0,
        repetition: 0,
        ease_factor: DEFAULT_EASE_FACTOR,
        next_review: now,
    }
}

/// Applies one review at the current wall-clock time.
pub fn review(record: &ProgressRecord, quality: impl Into<Quality>) -> ProgressRecord {
    review_at(record, quality, now_millis())
}

/// Applies one review graded `quality` at time `now` and returns the new record.
/// The input record is left untouched.
pub fn review_at(
    record: &ProgressRecord,
    quality: impl Into<Quality>,
    now: Timestamp,
) -> ProgressRecord {
    let quality = quality.into();
    let ease_factor = next_ease_factor(record.ease_factor, quality);

    let (interval, repetition) = if quality.is_lapse() {
        (0, 0)
    } else {
        let repetition = record.repetition.saturating_add(1);
        let interval = match repetition {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            _ => grow_interval(record.interval, ease_factor),
        };
        (interval, repetition)
    };

    let next_review = now.saturating_add(interval as i64 * MS_PER_DAY);

    debug!(
        "review {}: quality={} interval={}d repetition={} ease={:.2}",
        record.id,
        quality.value(),
        interval,
        repetition,
        ease_factor
    );

    ProgressRecord {
        id: record.id.clone(),
        interval,
        repetition,
        ease_factor,
        next_review,
    }
}

/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3.
/// A NaN ease factor also lands on the floor.
fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = 5.0 - quality.value() as f64;
    let adjusted = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    adjusted.max(MIN_EASE_FACTOR)
}

/// round(interval × EF), half away from zero. The cast saturates at `u32::MAX`.
fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    (interval as f64 * ease_factor).round() as u32
}

/// Items whose record is due at `now`. Items without a record are due.
pub fn select_due<'a>(
    items: &'a [ReviewableItem],
    progress: &ProgressMap,
    now: Timestamp,
) -> Vec<&'a ReviewableItem> {
    items
        .iter()
        .filter(|item| progress.get(&item.id).is_none_or(|record| record.is_due(now)))
        .collect()
}

/// All items ordered by `next_review`, earliest first, with unrecorded items
/// keyed at the current wall-clock time.
pub fn sort_by_due<'a>(
    items: &'a [ReviewableItem],
    progress: &ProgressMap,
) -> Vec<&'a ReviewableItem> {
    sort_by_due_at(items, progress, now_millis())
}

/// All items ordered by `next_review`, earliest first. An item without a record
/// sorts as if due at `now`, so overdue cards still come before new ones.
/// The sort is stable, so ties keep input order.
pub fn sort_by_due_at<'a>(
    items: &'a [ReviewableItem],
    progress: &ProgressMap,
    now: Timestamp,
) -> Vec<&'a ReviewableItem> {
    let mut sorted: Vec<&ReviewableItem> = items.iter().collect();
    sorted.sort_by_key(|item| progress.get(&item.id).map_or(now, |record| record.next_review));
    sorted
}

/// Interval in days that grading `record` with `quality` would produce.
pub fn preview_interval(record: &ProgressRecord, quality: impl Into<Quality>) -> u32 {
    review_at(record, quality, 0).interval
}

/// Intervals for each three-button rating: Hard, Medium, Easy.
pub fn preview_intervals(record: &ProgressRecord) -> [u32; 3] {
    Rating::ALL.map(|rating| preview_interval(record, rating.quality()))
}

/// Format an interval in days to a short human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..7 => format!("{}d", days),
        7..30 => format!("{}w", days / 7),
        30..365 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
