pub mod daily_counter;
pub mod deck;
pub mod progress_record;
pub mod quality;
pub mod review_session;
pub mod reviewable_item;
pub mod sm2;

pub use daily_counter::DailyReviewCounter;
pub use deck::Deck;
pub use progress_record::{ProgressMap, ProgressRecord, Timestamp};
pub use quality::{Quality, Rating};
pub use review_session::ReviewSession;
pub use reviewable_item::ReviewableItem;
