//! Core type definitions

use serde::{Deserialize, Serialize};

/// Number of room slots every level declares
pub const ROOMS_PER_LEVEL: usize = 4;

/// Entity id (32-bit unsigned, never reused within a session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Room slot index (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomIndex(u8);

impl RoomIndex {
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < ROOMS_PER_LEVEL {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// All four slots in order
    pub fn all() -> impl Iterator<Item = RoomIndex> {
        (0..ROOMS_PER_LEVEL as u8).map(RoomIndex)
    }
}

impl TryFrom<usize> for RoomIndex {
    type Error = crate::Sma4Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(RoomIndex::new)
            .ok_or_else(|| crate::Sma4Error::InvalidData(format!("room index {} out of range", value)))
    }
}

/// How the player leaves a transport at its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitType {
    Door,
    UpFromPipe,
    DownFromPipe,
    HorizontalTravelLeftPipe,
    HorizontalTravelRightPipe,
}

impl ExitType {
    /// First byte of the exit-type pair in a transport record
    pub fn category_byte(&self) -> u8 {
        match self {
            Self::Door => 0,
            Self::HorizontalTravelRightPipe => 1,
            Self::HorizontalTravelLeftPipe => 1,
            Self::UpFromPipe => 1,
            Self::DownFromPipe => 2,
        }
    }

    /// Second byte of the exit-type pair in a transport record
    pub fn subtype_byte(&self) -> u8 {
        match self {
            Self::Door => 0,
            Self::UpFromPipe => 1,
            Self::DownFromPipe => 0,
            Self::HorizontalTravelRightPipe => 3,
            Self::HorizontalTravelLeftPipe => 4,
        }
    }

    /// Inverse of the (category, subtype) pair
    pub fn from_bytes(category: u8, subtype: u8) -> Option<Self> {
        match (category, subtype) {
            (0, 0) => Some(Self::Door),
            (1, 1) => Some(Self::UpFromPipe),
            (2, 0) => Some(Self::DownFromPipe),
            (1, 3) => Some(Self::HorizontalTravelRightPipe),
            (1, 4) => Some(Self::HorizontalTravelLeftPipe),
            _ => None,
        }
    }

    pub fn category(&self) -> ExitCategory {
        match self {
            Self::Door => ExitCategory::Door,
            _ => ExitCategory::Pipe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Door => "door",
            Self::UpFromPipe => "up-from-pipe",
            Self::DownFromPipe => "down-from-pipe",
            Self::HorizontalTravelLeftPipe => "horizontal-travel-left-pipe",
            Self::HorizontalTravelRightPipe => "horizontal-travel-right-pipe",
        }
    }
}

/// Kind of transport source an entity offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitCategory {
    Door,
    Pipe,
}

impl ExitCategory {
    /// Exit type used when a destination does not name one
    pub fn default_exit(&self) -> ExitType {
        match self {
            Self::Door => ExitType::Door,
            Self::Pipe => ExitType::UpFromPipe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_index_range() {
        assert!(RoomIndex::new(3).is_some());
        assert!(RoomIndex::new(4).is_none());
        assert!(RoomIndex::try_from(7usize).is_err());
        assert_eq!(RoomIndex::all().count(), ROOMS_PER_LEVEL);
    }

    #[test]
    fn test_exit_type_bytes() {
        let all = [
            ExitType::Door,
            ExitType::UpFromPipe,
            ExitType::DownFromPipe,
            ExitType::HorizontalTravelLeftPipe,
            ExitType::HorizontalTravelRightPipe,
        ];
        for exit in all {
            assert_eq!(
                ExitType::from_bytes(exit.category_byte(), exit.subtype_byte()),
                Some(exit)
            );
        }
        assert_eq!(ExitType::DownFromPipe.category_byte(), 2);
        assert_eq!(ExitType::HorizontalTravelLeftPipe.subtype_byte(), 4);
    }

    #[test]
    fn test_exit_type_serde_names() {
        let json = serde_json::to_string(&ExitType::HorizontalTravelRightPipe).unwrap();
        assert_eq!(json, "\"horizontal-travel-right-pipe\"");
        let exit: ExitType = serde_json::from_str("\"up-from-pipe\"").unwrap();
        assert_eq!(exit, ExitType::UpFromPipe);
        assert_eq!(exit.as_str(), "up-from-pipe");
    }
}
