//! Level structure
//!
//! A level owns one to four rooms. Each room has two independent layers,
//! `actors` and `stage`, because the binary format stores two object streams
//! per room. A layer holds a sparse grid of cell entities plus a list of free
//! entities positioned in pixels.

use crate::entity::{EntitySettings, EntityType, PlacedEntity, Placement};
use crate::registry::LayerKind;
use serde::{Deserialize, Serialize};
use sma4_core::{EntityId, TilePoint, ROOMS_PER_LEVEL};
use std::collections::BTreeMap;

/// Narrowest a room may be, in tiles
pub const MIN_ROOM_TILE_WIDTH: i32 = 15;
/// Widest a room may be, in tiles
pub const MAX_ROOM_TILE_WIDTH: i32 = 240;
/// Shortest a room may be, in tiles
pub const MIN_ROOM_TILE_HEIGHT: i32 = 10;
/// Tallest a room may be. Matches the 28-row window the format encodes Y in.
pub const MAX_ROOM_TILE_HEIGHT: i32 = 28;

pub const INITIAL_ROOM_TILE_WIDTH: i32 = 60;
pub const INITIAL_ROOM_TILE_HEIGHT: i32 = MAX_ROOM_TILE_HEIGHT;

/// Timer a new level starts with
pub const DEFAULT_TIMER: u16 = 300;
pub const MAX_TIMER: i32 = 999;

/// Most ace coins a level may hold
pub const MAX_ACE_COINS: usize = 5;

/// Id every new level gives its player
pub const PLAYER_ID: EntityId = EntityId(1);

/// Level-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSettings {
    /// Seconds on the clock (0-999)
    pub timer: u16,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self { timer: DEFAULT_TIMER }
    }
}

/// Room-level presentation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Background graphic id
    pub bg_graphic: u8,
    /// Background colour
    pub bg_color: u8,
    /// Extra background colour and effect byte
    #[serde(default)]
    pub bg_extra_color_and_effect: u8,
    /// Music id
    pub music: u8,
}

/// Sparse grid of cell entities keyed in row-major order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PlacedEntity>", into = "Vec<PlacedEntity>")]
pub struct CellGrid {
    cells: BTreeMap<(i32, i32), PlacedEntity>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&PlacedEntity> {
        self.cells.get(&(y, x))
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut PlacedEntity> {
        self.cells.get_mut(&(y, x))
    }

    /// Put `entity` into the cell named by its placement, returning what was there
    pub fn insert(&mut self, mut entity: PlacedEntity) -> Option<PlacedEntity> {
        let tile = entity.placement.tile();
        entity.placement = Placement::cell(tile);
        self.cells.insert((tile.y, tile.x), entity)
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<PlacedEntity> {
        self.cells.remove(&(y, x))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells top to bottom, left to right
    pub fn iter(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.cells.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlacedEntity> {
        self.cells.values_mut()
    }

    /// Drop every cell for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&PlacedEntity) -> bool) {
        self.cells.retain(|_, e| keep(e));
    }

    pub fn remove_id(&mut self, id: EntityId) -> Option<PlacedEntity> {
        let key = self.cells.iter().find(|(_, e)| e.id == id).map(|(k, _)| *k)?;
        self.cells.remove(&key)
    }
}

impl From<Vec<PlacedEntity>> for CellGrid {
    fn from(entities: Vec<PlacedEntity>) -> Self {
        let mut grid = CellGrid::new();
        for entity in entities {
            grid.insert(entity);
        }
        grid
    }
}

impl From<CellGrid> for Vec<PlacedEntity> {
    fn from(grid: CellGrid) -> Self {
        grid.cells.into_values().collect()
    }
}

/// One of the two layers of a room
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayer {
    /// Grid-aligned entities that take part in run merging
    #[serde(default)]
    pub cells: CellGrid,
    /// Pixel-positioned entities, in placement order
    #[serde(default)]
    pub entities: Vec<PlacedEntity>,
}

impl RoomLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .or_else(|| self.cells.iter().find(|e| e.id == id))
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut PlacedEntity> {
        if let Some(pos) = self.entities.iter().position(|e| e.id == id) {
            return self.entities.get_mut(pos);
        }
        self.cells.iter_mut().find(|e| e.id == id)
    }
}

/// A single room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub settings: RoomSettings,
    pub tile_width: i32,
    pub tile_height: i32,
    pub actors: RoomLayer,
    pub stage: RoomLayer,
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}

impl Room {
    /// Create an empty room with the initial size
    pub fn new() -> Self {
        Self {
            settings: RoomSettings::default(),
            tile_width: INITIAL_ROOM_TILE_WIDTH,
            tile_height: INITIAL_ROOM_TILE_HEIGHT,
            actors: RoomLayer::new(),
            stage: RoomLayer::new(),
        }
    }

    pub fn layer(&self, kind: LayerKind) -> &RoomLayer {
        match kind {
            LayerKind::Actors => &self.actors,
            LayerKind::Stage => &self.stage,
        }
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut RoomLayer {
        match kind {
            LayerKind::Actors => &mut self.actors,
            LayerKind::Stage => &mut self.stage,
        }
    }

    /// True when `tile` lies inside the room
    pub fn contains(&self, tile: TilePoint) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.tile_width && tile.y < self.tile_height
    }

    /// Free entities of both layers, actors first
    pub fn free_entities(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.actors.entities.iter().chain(self.stage.entities.iter())
    }

    /// Every entity in the room: actor free entities, stage free entities,
    /// actor cells, stage cells
    pub fn all_entities(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.free_entities()
            .chain(self.actors.cells.iter())
            .chain(self.stage.cells.iter())
    }

    pub fn find(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.actors.find(id).or_else(|| self.stage.find(id))
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut PlacedEntity> {
        if self.actors.find(id).is_some() {
            return self.actors.find_mut(id);
        }
        self.stage.find_mut(id)
    }
}

/// A complete level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Level name shown in the e-Reader menu
    pub name: String,
    #[serde(default)]
    pub settings: LevelSettings,
    /// One to four rooms, in slot order
    pub rooms: Vec<Room>,
}

impl Level {
    /// Create a level with no rooms; callers add them
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: LevelSettings::default(),
            rooms: Vec::new(),
        }
    }

    /// Create the level a fresh editing session starts with: one room and a player
    pub fn create_default(name: impl Into<String>) -> Self {
        let mut room = Room::new();
        room.actors.entities.push(PlacedEntity::new(
            PLAYER_ID,
            EntityType::Player,
            Placement::free(TilePoint::new(2, room.tile_height - 3).to_pixels()),
            EntitySettings::None,
        ));

        let mut level = Self::new(name);
        level.rooms.push(room);
        level
    }

    /// Highest entity id anywhere in the level
    pub fn max_entity_id(&self) -> Option<EntityId> {
        self.rooms.iter().flat_map(|r| r.all_entities()).map(|e| e.id).max()
    }

    /// Number of ace coins across all rooms, counting those held by bubbles
    pub fn ace_coin_count(&self) -> usize {
        self.rooms
            .iter()
            .flat_map(|r| r.free_entities())
            .filter(|e| e.holds_ace_coin())
            .count()
    }

    /// Room index holding entity `id`
    pub fn room_of(&self, id: EntityId) -> Option<usize> {
        self.rooms.iter().position(|r| r.find(id).is_some())
    }

    pub fn find(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.rooms.iter().find_map(|r| r.find(id))
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut PlacedEntity> {
        let index = self.room_of(id)?;
        self.rooms[index].find_mut(id)
    }

    /// True when the room count is inside the 1..=4 range
    pub fn has_valid_room_count(&self) -> bool {
        (1..=ROOMS_PER_LEVEL).contains(&self.rooms.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: u32, t: EntityType, x: i32, y: i32) -> PlacedEntity {
        PlacedEntity::new(EntityId(id), t, Placement::Cell { x, y }, EntitySettings::None)
    }

    #[test]
    fn test_create_default_level() {
        let level = Level::create_default("test");
        assert_eq!(level.rooms.len(), 1);
        assert_eq!(level.settings.timer, DEFAULT_TIMER);
        assert_eq!(level.max_entity_id(), Some(PLAYER_ID));
        let player = level.find(PLAYER_ID).unwrap();
        assert_eq!(player.entity_type, EntityType::Player);
        assert!(level.has_valid_room_count());
    }

    #[test]
    fn test_cell_grid_row_major_order() {
        let mut grid = CellGrid::new();
        grid.insert(cell(1, EntityType::Cactus, 5, 2));
        grid.insert(cell(2, EntityType::Cactus, 1, 3));
        grid.insert(cell(3, EntityType::Cactus, 9, 0));
        grid.insert(cell(4, EntityType::Cactus, 0, 2));

        let order: Vec<u32> = grid.iter().map(|e| e.id.get()).collect();
        assert_eq!(order, vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_cell_grid_replace_and_remove() {
        let mut grid = CellGrid::new();
        assert!(grid.insert(cell(1, EntityType::Cactus, 2, 2)).is_none());
        let old = grid.insert(cell(2, EntityType::MusicBlock, 2, 2)).unwrap();
        assert_eq!(old.id, EntityId(1));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.remove_id(EntityId(2)).unwrap().entity_type, EntityType::MusicBlock);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_cell_grid_serde_as_list() {
        let mut grid = CellGrid::new();
        grid.insert(cell(7, EntityType::MetalMushroom, 3, 4));
        let json = serde_json::to_value(&grid).unwrap();
        assert!(json.is_array());
        let back: CellGrid = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_room_entity_order() {
        let mut room = Room::new();
        room.stage.cells.insert(cell(1, EntityType::Cactus, 0, 0));
        room.actors.cells.insert(cell(2, EntityType::MusicBlock, 0, 0));
        room.stage.entities.push(PlacedEntity::new(
            EntityId(3),
            EntityType::Water,
            Placement::Free { x: 0, y: 0 },
            EntitySettings::None,
        ));
        room.actors.entities.push(PlacedEntity::new(
            EntityId(4),
            EntityType::Flurry,
            Placement::Free { x: 0, y: 0 },
            EntitySettings::None,
        ));

        let ids: Vec<u32> = room.all_entities().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }
}
