//! Per-card scheduling state.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Progress records keyed by card id.
pub type ProgressMap = HashMap<String, ProgressRecord>;

/// Scheduling state for one card. Serializes as a flat record:
/// `{"id", "interval", "repetition", "easeFactor", "nextReview"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: String,
    /// Whole days between the review that produced this record and the next one.
    pub interval: u32,
    /// Consecutive successful reviews since the last lapse.
    pub repetition: u32,
    pub ease_factor: f64,
    pub next_review: Timestamp,
}

impl ProgressRecord {
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_review <= now
    }
}
