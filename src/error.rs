use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Progress store lock poisoned")]
    LockPoisoned,

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Deck already exists: {0}")]
    DeckExists(String),

    #[error("Card already in deck '{deck}': {id}")]
    CardExists { deck: String, id: String },

    #[error("Progress entry '{key}' holds the record of '{id}'")]
    ProgressKeyMismatch { key: String, id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
