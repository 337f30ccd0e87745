//! Recall quality grades.
//!
//! Grades run from 0 (complete blackout) to 5 (perfect, effortless recall).
//! Anything below 3 is a lapse. Out-of-range input is clamped rather than
//! rejected so a bad grade never interrupts a review.

pub const MAX_QUALITY: u8 = 5;

/// Lowest grade that still counts as a successful recall.
pub const PASSING_QUALITY: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    /// Clamps any integer into 0..=5.
    pub fn new(raw: i32) -> Self {
        Self(raw.clamp(0, MAX_QUALITY as i32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_lapse(self) -> bool {
        self.0 < PASSING_QUALITY
    }
}

impl From<i32> for Quality {
    fn from(raw: i32) -> Self {
        Self::new(raw)
    }
}

/// Three-button grading used by the quick review mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rating {
    Hard,
    Medium,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Hard, Rating::Medium, Rating::Easy];

    pub fn quality(self) -> Quality {
        match self {
            Rating::Hard => Quality(1),
            Rating::Medium => Quality(3),
            Rating::Easy => Quality(5),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Hard => "Hard",
            Rating::Medium => "Medium",
            Rating::Easy => "Easy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(Quality::new(-10).value(), 0);
        assert_eq!(Quality::new(-1).value(), 0);
        assert_eq!(Quality::new(6).value(), 5);
        assert_eq!(Quality::new(i32::MAX).value(), 5);
        assert_eq!(Quality::new(i32::MIN).value(), 0);
    }

    #[test]
    fn test_in_range_unchanged() {
        for q in 0..=5 {
            assert_eq!(Quality::new(q).value() as i32, q);
        }
    }

    #[test]
    fn test_lapse_threshold() {
        assert!(Quality::new(0).is_lapse());
        assert!(Quality::new(2).is_lapse());
        assert!(!Quality::new(3).is_lapse());
        assert!(!Quality::new(5).is_lapse());
    }

    #[test]
    fn test_rating_maps_to_quality() {
        assert_eq!(Rating::Hard.quality().value(), 1);
        assert_eq!(Rating::Medium.quality().value(), 3);
        assert_eq!(Rating::Easy.quality().value(), 5);
        assert!(Rating::Hard.quality().is_lapse());
    }
}
