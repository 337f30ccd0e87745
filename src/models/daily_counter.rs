//! Reviews-done-today counter. The count restarts on the first review of a new day.
use super::progress_record::Timestamp;
use chrono::{DateTime, NaiveDate};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyReviewCounter {
    pub day: Option<NaiveDate>,
    pub count: u32,
}

/// UTC calendar day containing `at`.
pub fn day_of(at: Timestamp) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(at).map(|dt| dt.date_naive())
}

impl DailyReviewCounter {
    /// Reviews counted on the day containing `now`.
    pub fn count_on(&self, now: Timestamp) -> u32 {
        if self.day.is_some() && self.day == day_of(now) {
            self.count
        } else {
            0
        }
    }

    pub fn record(&mut self, now: Timestamp) {
        let today = day_of(now);
        if self.day != today {
            self.day = today;
            self.count = 0;
        }
        self.count += 1;
    }
}
