pub mod db;
pub mod progress_store;

pub use progress_store::{MemoryProgressStore, ProgressStore, SqliteProgressStore, record_review};
