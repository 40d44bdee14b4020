//! Error types for the levels crate

use crate::entity::EntityType;
use sma4_core::{EntityId, Sma4Error};

/// Level-specific error types
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// File I/O error
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    /// Invalid level document
    #[error("Invalid level format: {0}")]
    InvalidFormat(String),

    /// Parse error
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Adding or removing a room would leave the 1..=4 range
    #[error("Room limit: {0}")]
    RoomLimit(String),

    /// Room index does not name an existing room
    #[error("Room {0} does not exist")]
    RoomIndexOutOfRange(usize),

    /// No entity with this id exists in the level
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Entity may not be removed from the level
    #[error("Entity {0} cannot be deleted")]
    NotDeletable(EntityId),

    /// A sixth ace coin was placed
    #[error("A level can hold at most 5 ace coins")]
    AceCoinLimit,

    /// Placement overlaps another entity or leaves the room
    #[error("Cannot place {entity_type:?} at ({x}, {y})")]
    CannotDrop { entity_type: EntityType, x: i32, y: i32 },

    /// Entity type was placed with the wrong editor kind
    #[error("{0:?} cannot be placed this way")]
    WrongPlacement(EntityType),
}

impl From<LevelError> for Sma4Error {
    fn from(err: LevelError) -> Self {
        match err {
            LevelError::FileError(e) => Sma4Error::Io(e),
            LevelError::EntityNotFound(id) => Sma4Error::NotFound(id.to_string()),
            other => Sma4Error::InvalidData(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::ParseError {
            line: err.line(),
            message: err.to_string(),
        }
    }
}

/// Result type for level operations
pub type Result<T> = std::result::Result<T, LevelError>;
