//! Placed entities and their typed settings

use serde::{Deserialize, Serialize};
use sma4_core::{EntityId, ExitType, PixelPoint, TilePoint};

/// Every entity type the editor can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Player,
    AceCoin,
    Bubble,
    WoodFloor,
    MusicBlock,
    MusicBlockThreeWay,
    BuriedVegetable,
    Cactus,
    MetalMushroom,
    Water,
    GrassStaircaseUpLeft,
    GrassUpperRightCorner,
    BackgroundHillsTexturedLarge,
    UndergroundFlatTerrainUpperLeftCorner,
    PipeAirshipVertical,
    ColorfulMetalBox,
    CloudPlatformThin,
    CloudPlatformThick,
    CeilingBuzzyBeetle,
    Flurry,
    BeachedCheepCheep,
    RedKoopaTroopa,
    FortressSpike,
}

impl EntityType {
    pub const ALL: [EntityType; 23] = [
        Self::Player,
        Self::AceCoin,
        Self::Bubble,
        Self::WoodFloor,
        Self::MusicBlock,
        Self::MusicBlockThreeWay,
        Self::BuriedVegetable,
        Self::Cactus,
        Self::MetalMushroom,
        Self::Water,
        Self::GrassStaircaseUpLeft,
        Self::GrassUpperRightCorner,
        Self::BackgroundHillsTexturedLarge,
        Self::UndergroundFlatTerrainUpperLeftCorner,
        Self::PipeAirshipVertical,
        Self::ColorfulMetalBox,
        Self::CloudPlatformThin,
        Self::CloudPlatformThick,
        Self::CeilingBuzzyBeetle,
        Self::Flurry,
        Self::BeachedCheepCheep,
        Self::RedKoopaTroopa,
        Self::FortressSpike,
    ];
}

/// Item hidden inside a block, bubble or buried vegetable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    FireFlower,
    Leaf,
    StarMan,
    Coin,
    CoinCache,
    GiantVegetable,
    KoopaShell,
    OneUpMushroom,
    PoisonMushroom,
    RegularVegetable,
    SmallVegetable,
    AceCoin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxColor {
    White,
    Orange,
    Green,
    Blue,
}

impl BoxColor {
    pub fn object_id(&self) -> u8 {
        match self {
            Self::White => 0x4,
            Self::Orange => 0x5,
            Self::Green => 0x6,
            Self::Blue => 0x7,
        }
    }

    pub fn from_object_id(id: u8) -> Option<Self> {
        match id {
            0x4 => Some(Self::White),
            0x5 => Some(Self::Orange),
            0x6 => Some(Self::Green),
            0x7 => Some(Self::Blue),
            _ => None,
        }
    }
}

/// Where a transport leads. Negative fields mean it is not wired up yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransportDestination {
    pub room: i32,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_type: Option<ExitType>,
}

impl TransportDestination {
    pub fn new(room: i32, x: i32, y: i32, exit_type: ExitType) -> Self {
        Self {
            room,
            x,
            y,
            exit_type: Some(exit_type),
        }
    }

    /// A destination the user has started but not finished choosing
    pub fn unset() -> Self {
        Self {
            room: -1,
            x: -1,
            y: -1,
            exit_type: None,
        }
    }
}

/// One directed warp from a source tile to a destination tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    /// Room holding the source entity
    pub room: usize,
    /// Source tile
    pub x: i32,
    pub y: i32,
    pub dest_room: i32,
    pub dest_x: i32,
    pub dest_y: i32,
    pub exit_type: ExitType,
}

impl Transport {
    /// True once every destination field has been chosen
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.dest_room >= 0 && self.dest_x >= 0 && self.dest_y >= 0
    }
}

/// Per-entity settings
///
/// Equality is structural, and the run merger only folds neighbouring cells
/// together when their settings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EntitySettings {
    #[default]
    None,
    Payload {
        payload: Payload,
    },
    Size {
        width: u8,
        height: u8,
    },
    MetalBox {
        width: u8,
        height: u8,
        color: BoxColor,
    },
    Transport {
        height: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<TransportDestination>,
    },
    AceCoin {
        ace_coin_index: u8,
    },
}

impl EntitySettings {
    pub fn payload(&self) -> Option<Payload> {
        match self {
            Self::Payload { payload } => Some(*payload),
            _ => None,
        }
    }

    /// Width and height override in tiles, when the settings carry one
    pub fn size(&self) -> Option<(u8, u8)> {
        match self {
            Self::Size { width, height } | Self::MetalBox { width, height, .. } => Some((*width, *height)),
            Self::Transport { height, .. } => Some((2, *height)),
            _ => None,
        }
    }

    pub fn destination(&self) -> Option<&TransportDestination> {
        match self {
            Self::Transport { destination, .. } => destination.as_ref(),
            _ => None,
        }
    }

    pub fn ace_coin_index(&self) -> Option<u8> {
        match self {
            Self::AceCoin { ace_coin_index } => Some(*ace_coin_index),
            _ => None,
        }
    }
}

/// Where an entity sits in its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Placement {
    /// Grid cell, participates in run merging
    Cell { x: i32, y: i32 },
    /// Absolute pixel position
    Free { x: i32, y: i32 },
}

impl Placement {
    pub fn cell(point: TilePoint) -> Self {
        Self::Cell { x: point.x, y: point.y }
    }

    pub fn free(point: PixelPoint) -> Self {
        Self::Free { x: point.x, y: point.y }
    }

    /// Tile holding the entity's upper left corner
    pub fn tile(&self) -> TilePoint {
        match *self {
            Self::Cell { x, y } => TilePoint::new(x, y),
            Self::Free { x, y } => PixelPoint::new(x, y).to_tiles(),
        }
    }

    /// Pixel position of the entity's upper left corner
    pub fn pixels(&self) -> PixelPoint {
        match *self {
            Self::Cell { x, y } => TilePoint::new(x, y).to_pixels(),
            Self::Free { x, y } => PixelPoint::new(x, y),
        }
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Self::Cell { .. })
    }
}

/// One entity instance in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub placement: Placement,
    #[serde(default)]
    pub settings: EntitySettings,
}

impl PlacedEntity {
    pub fn new(id: EntityId, entity_type: EntityType, placement: Placement, settings: EntitySettings) -> Self {
        Self {
            id,
            entity_type,
            placement,
            settings,
        }
    }

    /// Same type and same settings, the condition for merging into one run
    #[inline]
    pub fn merges_with(&self, other: &PlacedEntity) -> bool {
        self.entity_type == other.entity_type && self.settings == other.settings
    }

    /// An ace coin, or a bubble with an ace coin inside
    pub fn holds_ace_coin(&self) -> bool {
        match self.entity_type {
            EntityType::AceCoin => true,
            EntityType::Bubble => self.settings.payload() == Some(Payload::AceCoin),
            _ => false,
        }
    }
}
