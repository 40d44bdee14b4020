//! Core error types for the level codec

#[derive(thiserror::Error, Debug)]
pub enum Sma4Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Too many ace coins: max of 5, but given {count}")]
    TooManyAceCoins { count: usize },

    #[error("Truncated data: needed {needed} bytes at offset {offset:#x}")]
    Truncated { offset: usize, needed: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Sma4Error>;
