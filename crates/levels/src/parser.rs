//! Level document loader
//!
//! Levels are saved as JSON documents wrapping the editor model with a
//! format version.

use crate::level::Level;
use crate::{LevelError, Result};
use serde::{Deserialize, Serialize};
use sma4_core::EntityIdSequence;
use std::fs;
use std::path::Path;

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

/// On-disk wrapper around a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDocument {
    pub version: u32,
    pub level: Level,
}

/// Level document loader
pub struct LevelLoader;

impl LevelLoader {
    /// Load a level from a file and continue `ids` after its highest id
    pub fn load_file<P: AsRef<Path>>(path: P, ids: &EntityIdSequence) -> Result<Level> {
        let path = path.as_ref();

        let data = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LevelError::InvalidFormat(format!("{} does not exist", path.display())),
            _ => LevelError::FileError(e),
        })?;

        let level = Self::parse(&data)?;
        level.sync_id_sequence(ids);

        tracing::debug!(
            "loaded level '{}' from {} ({} rooms)",
            level.name,
            path.display(),
            level.rooms.len()
        );
        Ok(level)
    }

    /// Parse a level document from a string
    pub fn parse(data: &str) -> Result<Level> {
        if data.trim().is_empty() {
            return Err(LevelError::InvalidFormat("Empty file".into()));
        }

        let document: LevelDocument = serde_json::from_str(data)?;
        if document.version != DOCUMENT_VERSION {
            return Err(LevelError::InvalidFormat(format!(
                "unsupported document version {}",
                document.version
            )));
        }

        let mut level = document.level;
        if !level.has_valid_room_count() {
            return Err(LevelError::InvalidFormat(format!(
                "level has {} rooms, expected 1 to 4",
                level.rooms.len()
            )));
        }

        level.assign_ace_coin_indices();
        Ok(level)
    }

    /// Serialize a level to a document string
    pub fn to_json(level: &Level, pretty: bool) -> Result<String> {
        let document = LevelDocument {
            version: DOCUMENT_VERSION,
            level: level.clone(),
        };
        let json = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(json)
    }

    /// Write a level document to a file
    pub fn save_file<P: AsRef<Path>>(level: &Level, path: P, pretty: bool) -> Result<()> {
        fs::write(path, Self::to_json(level, pretty)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use sma4_core::{EntityId, PixelPoint, TilePoint};

    #[test]
    fn test_save_and_load_file() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("round trip");
        level.draw_cell(0, EntityType::MusicBlock, TilePoint::new(3, 20), None, &ids).unwrap();
        level.place_entity(0, EntityType::Water, PixelPoint::new(160, 320), None, &ids).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        LevelLoader::save_file(&level, &path, true).unwrap();

        let fresh = EntityIdSequence::new();
        let loaded = LevelLoader::load_file(&path, &fresh).unwrap();
        assert_eq!(loaded, level);
        assert!(fresh.peek() > level.max_entity_id().unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_documents() {
        assert!(matches!(LevelLoader::parse("  "), Err(LevelError::InvalidFormat(_))));
        assert!(matches!(LevelLoader::parse("{not json"), Err(LevelError::ParseError { .. })));

        let level = Level::new("no rooms");
        let json = LevelLoader::to_json(&level, false).unwrap();
        assert!(matches!(LevelLoader::parse(&json), Err(LevelError::InvalidFormat(_))));

        let future = r#"{"version": 9, "level": {"name": "x", "rooms": []}}"#;
        assert!(matches!(LevelLoader::parse(future), Err(LevelError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let ids = EntityIdSequence::new();
        let result = LevelLoader::load_file("/definitely/not/here.json", &ids);
        assert!(result.is_err());
        assert_eq!(ids.peek(), EntityId(sma4_core::FIRST_ENTITY_ID));
    }
}
