pub mod cli;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{Error, Result};
pub use models::{Deck, ProgressRecord, Quality, ReviewSession, ReviewableItem};
