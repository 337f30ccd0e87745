//! Review session management for spaced repetition practice.
//! Presents due cards most-overdue first and grades them through the SM-2 scheduler.

use super::progress_record::{ProgressRecord, Timestamp};
use super::quality::Quality;
use super::{Deck, ReviewableItem, sm2};
use crate::database::progress_store::{ProgressStore, record_review};
use crate::error::Result;
use log::debug;

/// Manages a review session with multiple rounds.
/// Cards that lapse (grade < 3) are repeated in subsequent rounds.
pub struct ReviewSession<S: ProgressStore> {
    pub deck_name: String,
    cards: Vec<ReviewableItem>,
    current_round: Vec<usize>,
    lapsed: Vec<usize>,
    current_index: usize,
    pub show_answer: bool,
    pub round_number: usize,
    reviewed: usize,
    store: S,
}

impl<S: ProgressStore> ReviewSession<S> {
    /// Creates a session over the cards of `deck` that are due at `now`,
    /// ordered by due date.
    pub fn new(deck: &Deck, store: S, now: Timestamp) -> Result<Self> {
        let progress = store.load_all()?;
        let due: Vec<ReviewableItem> = sm2::select_due(&deck.items, &progress, now)
            .into_iter()
            .cloned()
            .collect();
        let cards: Vec<ReviewableItem> = sm2::sort_by_due_at(&due, &progress, now)
            .into_iter()
            .cloned()
            .collect();

        debug!("Review session for '{}': {} due cards", deck.name, cards.len());

        Ok(Self {
            deck_name: deck.name.clone(),
            current_round: (0..cards.len()).collect(),
            cards,
            lapsed: Vec::new(),
            current_index: 0,
            show_answer: false,
            round_number: 1,
            reviewed: 0,
            store,
        })
    }

    pub fn current_card(&self) -> Option<&ReviewableItem> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
    }

    /// Stored progress of the current card, or a fresh record if it was never reviewed.
    pub fn current_progress(&self, now: Timestamp) -> Result<Option<ProgressRecord>> {
        match self.current_card() {
            Some(card) => Ok(Some(
                self.store
                    .get(&card.id)?
                    .unwrap_or_else(|| sm2::initialize_at(&card.id, now)),
            )),
            None => Ok(None),
        }
    }

    pub fn reveal_answer(&mut self) {
        self.show_answer = true;
    }

    /// Grades the current card, stores its new progress and moves on.
    /// Returns `None` once the session is completed.
    pub fn grade_current_card(
        &mut self,
        quality: impl Into<Quality>,
        now: Timestamp,
    ) -> Result<Option<ProgressRecord>> {
        let quality = quality.into();
        let Some(&idx) = self.current_round.get(self.current_index) else {
            return Ok(None);
        };

        let updated = record_review(&self.store, &self.cards[idx].id, quality, now)?;
        self.reviewed += 1;
        if quality.is_lapse() {
            self.lapsed.push(idx);
        }

        self.next_card();
        Ok(Some(updated))
    }

    fn next_card(&mut self) {
        self.show_answer = false;
        self.current_index += 1;
        if self.current_index >= self.current_round.len() {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards that lapsed in this one.
    /// If none lapsed, the session is complete.
    fn start_next_round(&mut self) {
        if !self.lapsed.is_empty() {
            self.current_round = std::mem::take(&mut self.lapsed);
            self.current_index = 0;
            self.round_number += 1;
        }
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.current_round.len()
    }

    /// 1-based position of the current card within the round.
    pub fn position(&self) -> usize {
        (self.current_index + 1).min(self.current_round.len())
    }

    pub fn round_len(&self) -> usize {
        self.current_round.len()
    }

    /// Reviews graded in this session, repeats included.
    pub fn reviewed_count(&self) -> usize {
        self.reviewed
    }

    pub fn remaining_count(&self) -> usize {
        self.current_round.len().saturating_sub(self.current_index) + self.lapsed.len()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.round_len())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.round_len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::progress_store::MemoryProgressStore;
    use crate::models::ProgressMap;
    use crate::models::sm2::MS_PER_DAY;

    const T0: Timestamp = 1_700_000_000_000;

    fn deck() -> Deck {
        Deck {
            name: "Danish".to_string(),
            items: vec![
                ReviewableItem::vocabulary("hej", "hola", None),
                ReviewableItem::vocabulary("tak", "gracias", None),
                ReviewableItem::vocabulary("ja", "sí", None),
            ],
        }
    }

    fn front<S: ProgressStore>(session: &ReviewSession<S>) -> String {
        session.current_card().unwrap().front.clone()
    }

    #[test]
    fn test_new_cards_are_all_due() {
        let session = ReviewSession::new(&deck(), MemoryProgressStore::new(), T0).unwrap();

        assert_eq!(session.round_len(), 3);
        assert_eq!(front(&session), "hej");
        assert!(!session.is_completed());
    }

    #[test]
    fn test_orders_most_overdue_first_and_skips_future() {
        let mut progress = ProgressMap::new();
        let mut tak = sm2::initialize_at("word-tak", T0 - 5 * MS_PER_DAY);
        tak.interval = 1;
        let mut ja = sm2::initialize_at("word-ja", T0 + MS_PER_DAY);
        ja.interval = 1;
        progress.insert(tak.id.clone(), tak);
        progress.insert(ja.id.clone(), ja);
        let store = MemoryProgressStore::from_map(progress);

        let session = ReviewSession::new(&deck(), store, T0).unwrap();

        // tak is five days overdue, hej is new and due now, ja is not due yet
        assert_eq!(session.round_len(), 2);
        assert_eq!(front(&session), "tak");
    }

    #[test]
    fn test_grading_persists_and_advances() {
        let mut session = ReviewSession::new(&deck(), MemoryProgressStore::new(), T0).unwrap();
        session.reveal_answer();

        let record = session.grade_current_card(5, T0).unwrap().unwrap();
        assert_eq!(record.id, "word-hej");
        assert_eq!(record.interval, 1);
        assert!(!session.show_answer);
        assert_eq!(front(&session), "tak");
        assert_eq!(session.position(), 2);
        assert_eq!(session.store.get("word-hej").unwrap(), Some(record));
    }

    #[test]
    fn test_lapsed_cards_repeat_in_next_round() {
        let mut session = ReviewSession::new(&deck(), MemoryProgressStore::new(), T0).unwrap();

        session.grade_current_card(5, T0).unwrap();
        session.grade_current_card(1, T0).unwrap();
        session.grade_current_card(4, T0).unwrap();

        assert!(!session.is_completed());
        assert_eq!(session.round_number, 2);
        assert_eq!(session.round_len(), 1);
        assert_eq!(front(&session), "tak");
        assert!(session.phase_message().contains("Review"));

        let retry = session.grade_current_card(3, T0).unwrap().unwrap();
        assert_eq!(retry.repetition, 1);
        assert!(session.is_completed());
        assert_eq!(session.reviewed_count(), 4);
        assert_eq!(session.grade_current_card(5, T0).unwrap(), None);
    }

    #[test]
    fn test_current_progress_defaults_to_fresh_record() {
        let session = ReviewSession::new(&deck(), MemoryProgressStore::new(), T0).unwrap();
        let progress = session.current_progress(T0).unwrap().unwrap();

        assert_eq!(progress, sm2::initialize_at("word-hej", T0));
    }

    #[test]
    fn test_empty_session_is_completed() {
        let session = ReviewSession::new(&Deck::new("Empty"), MemoryProgressStore::new(), T0).unwrap();

        assert!(session.is_completed());
        assert_eq!(session.current_card(), None);
        assert_eq!(session.remaining_count(), 0);
    }
}
