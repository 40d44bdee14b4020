//! Editing operations on a level
//!
//! Every operation that creates entities takes the id sequence explicitly.
//! Operations that add or remove entities re-number the ace coins before
//! returning, so `aceCoinIndex` values are always dense and ordered.

use crate::entity::{EntitySettings, EntityType, Payload, PlacedEntity, Placement, TransportDestination};
use crate::error::{LevelError, Result};
use crate::geometry::{can_drop, entity_tile_bounds, flood_fill};
use crate::level::{
    Level, Room, RoomSettings, MAX_ACE_COINS, MAX_ROOM_TILE_HEIGHT, MAX_ROOM_TILE_WIDTH, MAX_TIMER,
    MIN_ROOM_TILE_HEIGHT, MIN_ROOM_TILE_WIDTH,
};
use crate::registry::EditorKind;
use sma4_core::{EntityId, EntityIdSequence, PixelPoint, TileBounds, TilePoint, TILE_SIZE, ROOMS_PER_LEVEL};

impl Level {
    fn room_checked(&self, index: usize) -> Result<&Room> {
        self.rooms.get(index).ok_or(LevelError::RoomIndexOutOfRange(index))
    }

    fn room_checked_mut(&mut self, index: usize) -> Result<&mut Room> {
        self.rooms.get_mut(index).ok_or(LevelError::RoomIndexOutOfRange(index))
    }

    /// Continue the id sequence after every id already in this level
    ///
    /// Call once after loading a level from disk or from a binary.
    pub fn sync_id_sequence(&self, ids: &EntityIdSequence) {
        if let Some(max) = self.max_entity_id() {
            if max >= ids.peek() {
                ids.reset_after(max);
            }
        }
    }

    /// Append an empty room
    ///
    /// # Returns
    /// Index of the new room
    pub fn add_room(&mut self) -> Result<usize> {
        if self.rooms.len() >= ROOMS_PER_LEVEL {
            return Err(LevelError::RoomLimit(format!(
                "a level holds at most {} rooms",
                ROOMS_PER_LEVEL
            )));
        }
        self.rooms.push(Room::new());
        Ok(self.rooms.len() - 1)
    }

    /// Remove a room and repair transports that pointed at or past it
    ///
    /// Free entities whose destination is the deleted room are removed with
    /// it. Destinations in later rooms shift down by one.
    pub fn delete_room(&mut self, index: usize) -> Result<Room> {
        if self.rooms.len() <= 1 {
            return Err(LevelError::RoomLimit("a level needs at least one room".into()));
        }
        self.room_checked(index)?;

        let removed = self.rooms.remove(index);
        let deleted = index as i32;

        for room in &mut self.rooms {
            for layer in [&mut room.actors, &mut room.stage] {
                layer.entities.retain(|e| e.settings.destination().map_or(true, |d| d.room != deleted));
                for entity in &mut layer.entities {
                    if let EntitySettings::Transport {
                        destination: Some(dest),
                        ..
                    } = &mut entity.settings
                    {
                        if dest.room > deleted {
                            dest.room -= 1;
                        }
                    }
                }
            }
        }

        self.assign_ace_coin_indices();
        tracing::debug!("deleted room {}, {} rooms remain", index, self.rooms.len());
        Ok(removed)
    }

    /// Resize a room, clamping to the allowed range
    ///
    /// Cells and free entities left outside the room are removed. The player
    /// is moved back inside instead.
    ///
    /// # Returns
    /// The clamped `(width, height)`
    pub fn resize_room(&mut self, index: usize, width: i32, height: i32) -> Result<(i32, i32)> {
        let room = self.room_checked_mut(index)?;
        room.tile_width = width.clamp(MIN_ROOM_TILE_WIDTH, MAX_ROOM_TILE_WIDTH);
        room.tile_height = height.clamp(MIN_ROOM_TILE_HEIGHT, MAX_ROOM_TILE_HEIGHT);

        let (w, h) = (room.tile_width, room.tile_height);
        let inside = |tile: TilePoint| tile.x < w && tile.y < h;

        for layer in [&mut room.actors, &mut room.stage] {
            layer.cells.retain(|e| inside(e.placement.tile()));
            for entity in layer.entities.iter_mut().filter(|e| !e.entity_type.descriptor().deletable) {
                let pixels = entity.placement.pixels();
                entity.placement = Placement::free(PixelPoint::new(
                    pixels.x.min((w - 1) * TILE_SIZE),
                    pixels.y.min((h - 1) * TILE_SIZE),
                ));
            }
            layer.entities.retain(|e| inside(e.placement.tile()));
        }

        self.assign_ace_coin_indices();
        Ok((w, h))
    }

    /// Set the level timer, clamped to 0..=999
    pub fn set_timer(&mut self, timer: i32) -> u16 {
        self.settings.timer = timer.clamp(0, MAX_TIMER) as u16;
        self.settings.timer
    }

    pub fn set_room_settings(&mut self, index: usize, settings: RoomSettings) -> Result<()> {
        self.room_checked_mut(index)?.settings = settings;
        Ok(())
    }

    /// Paint a cell entity, replacing whatever occupied the cell
    pub fn draw_cell(
        &mut self,
        room_index: usize,
        entity_type: EntityType,
        tile: TilePoint,
        settings: Option<EntitySettings>,
        ids: &EntityIdSequence,
    ) -> Result<EntityId> {
        let desc = entity_type.descriptor();
        if desc.editor_kind != EditorKind::Cell {
            return Err(LevelError::WrongPlacement(entity_type));
        }

        let room = self.room_checked_mut(room_index)?;
        if !room.contains(tile) {
            return Err(LevelError::CannotDrop {
                entity_type,
                x: tile.x,
                y: tile.y,
            });
        }

        let id = ids.next_id();
        let settings = settings.unwrap_or_else(|| desc.default_settings.clone());
        room.layer_mut(desc.layer)
            .cells
            .insert(PlacedEntity::new(id, entity_type, Placement::cell(tile), settings));
        Ok(id)
    }

    /// Place a free entity, snapped to the tile grid
    ///
    /// Refused when it would overlap another free entity in the room, leave
    /// the room, or add a sixth ace coin.
    pub fn place_entity(
        &mut self,
        room_index: usize,
        entity_type: EntityType,
        position: PixelPoint,
        settings: Option<EntitySettings>,
        ids: &EntityIdSequence,
    ) -> Result<EntityId> {
        let desc = entity_type.descriptor();
        if desc.editor_kind != EditorKind::Free {
            return Err(LevelError::WrongPlacement(entity_type));
        }

        let snapped = position.snapped();
        let candidate = PlacedEntity::new(
            EntityId(0),
            entity_type,
            Placement::free(snapped),
            settings.unwrap_or_else(|| desc.default_settings.clone()),
        );
        if candidate.holds_ace_coin() && self.ace_coin_count() >= MAX_ACE_COINS {
            return Err(LevelError::AceCoinLimit);
        }

        let room = self.room_checked_mut(room_index)?;
        let tile = snapped.to_tiles();
        if !room.contains(tile) || !can_drop(&candidate, room.free_entities()) {
            return Err(LevelError::CannotDrop {
                entity_type,
                x: tile.x,
                y: tile.y,
            });
        }

        let id = ids.next_id();
        room.layer_mut(desc.layer)
            .entities
            .push(PlacedEntity { id, ..candidate });

        self.assign_ace_coin_indices();
        Ok(id)
    }

    /// Move a free entity, keeping its id
    pub fn move_entity(&mut self, id: EntityId, position: PixelPoint) -> Result<()> {
        let room_index = self.room_of(id).ok_or(LevelError::EntityNotFound(id))?;
        let room = &mut self.rooms[room_index];
        let mut moved = room.find(id).cloned().ok_or(LevelError::EntityNotFound(id))?;
        if moved.placement.is_cell() {
            return Err(LevelError::WrongPlacement(moved.entity_type));
        }

        let snapped = position.snapped();
        moved.placement = Placement::free(snapped);
        let tile = snapped.to_tiles();
        if !room.contains(tile) || !can_drop(&moved, room.free_entities()) {
            return Err(LevelError::CannotDrop {
                entity_type: moved.entity_type,
                x: tile.x,
                y: tile.y,
            });
        }

        if let Some(entity) = room.find_mut(id) {
            entity.placement = moved.placement;
        }
        Ok(())
    }

    /// Erase what sits at `tile`: cells in both layers and every deletable
    /// free entity covering the tile
    ///
    /// # Returns
    /// Ids of the erased entities
    pub fn erase_at(&mut self, room_index: usize, tile: TilePoint) -> Result<Vec<EntityId>> {
        let room = self.room_checked_mut(room_index)?;
        let mut erased = Vec::new();

        for layer in [&mut room.actors, &mut room.stage] {
            if let Some(cell) = layer.cells.remove(tile.x, tile.y) {
                erased.push(cell.id);
            }
            layer.entities.retain(|e| {
                let hit = e.entity_type.descriptor().deletable && entity_tile_bounds(e).contains(tile);
                if hit {
                    erased.push(e.id);
                }
                !hit
            });
        }

        if !erased.is_empty() {
            self.assign_ace_coin_indices();
        }
        Ok(erased)
    }

    /// Delete one entity by id
    pub fn delete_entity(&mut self, id: EntityId) -> Result<PlacedEntity> {
        let room_index = self.room_of(id).ok_or(LevelError::EntityNotFound(id))?;
        let room = &mut self.rooms[room_index];

        let entity_type = room.find(id).map(|e| e.entity_type).ok_or(LevelError::EntityNotFound(id))?;
        if !entity_type.descriptor().deletable {
            return Err(LevelError::NotDeletable(id));
        }

        let mut removed = None;
        for layer in [&mut room.actors, &mut room.stage] {
            if let Some(pos) = layer.entities.iter().position(|e| e.id == id) {
                removed = Some(layer.entities.remove(pos));
            } else if let Some(cell) = layer.cells.remove_id(id) {
                removed = Some(cell);
            }
            if removed.is_some() {
                break;
            }
        }

        self.assign_ace_coin_indices();
        removed.ok_or(LevelError::EntityNotFound(id))
    }

    /// Delete several entities, skipping ones that cannot be deleted
    ///
    /// # Returns
    /// Number of entities removed
    pub fn delete_entities(&mut self, ids: &[EntityId]) -> usize {
        ids.iter().filter(|id| self.delete_entity(**id).is_ok()).count()
    }

    /// Flood fill a layer with a cell entity type
    pub fn fill_at(
        &mut self,
        room_index: usize,
        entity_type: EntityType,
        tile: TilePoint,
        ids: &EntityIdSequence,
    ) -> Result<Option<TileBounds>> {
        let desc = entity_type.descriptor();
        if desc.editor_kind != EditorKind::Cell {
            return Err(LevelError::WrongPlacement(entity_type));
        }

        let room = self.room_checked_mut(room_index)?;
        let (width, height) = (room.tile_width, room.tile_height);
        Ok(flood_fill(
            &mut room.layer_mut(desc.layer).cells,
            entity_type,
            &desc.default_settings,
            tile,
            width,
            height,
            ids,
        ))
    }

    /// Replace an entity's settings
    ///
    /// Refused with `AceCoinLimit` when it would put a sixth ace coin into
    /// the level, such as a bubble given an ace coin payload.
    pub fn set_entity_settings(&mut self, id: EntityId, settings: EntitySettings) -> Result<()> {
        let entity = self.find(id).ok_or(LevelError::EntityNotFound(id))?;
        let updated = PlacedEntity {
            settings: settings.clone(),
            ..entity.clone()
        };
        if updated.holds_ace_coin() && !entity.holds_ace_coin() && self.ace_coin_count() >= MAX_ACE_COINS {
            return Err(LevelError::AceCoinLimit);
        }

        let entity = self.find_mut(id).ok_or(LevelError::EntityNotFound(id))?;
        entity.settings = settings;
        self.assign_ace_coin_indices();
        Ok(())
    }

    /// Point a transport-capable entity at a destination
    pub fn set_transport_destination(&mut self, id: EntityId, destination: TransportDestination) -> Result<()> {
        let entity = self.find_mut(id).ok_or(LevelError::EntityNotFound(id))?;
        let desc = entity.entity_type.descriptor();
        if desc.transports.is_none() {
            return Err(LevelError::EntityNotFound(id));
        }

        let height = entity
            .settings
            .size()
            .or_else(|| desc.default_settings.size())
            .map_or(desc.height, |(_, h)| h);
        entity.settings = EntitySettings::Transport {
            height,
            destination: Some(destination),
        };
        Ok(())
    }

    /// Give every ace coin a dense index in room order, actors before stage
    ///
    /// When a bubble carries an ace coin, that coin takes index 0 and the
    /// free ace coins start at 1.
    pub fn assign_ace_coin_indices(&mut self) {
        let bubble_has_ace_coin = self
            .rooms
            .iter()
            .flat_map(|r| r.free_entities())
            .any(|e| e.entity_type == EntityType::Bubble && e.settings.payload() == Some(Payload::AceCoin));

        let mut next_index: u8 = if bubble_has_ace_coin { 1 } else { 0 };
        for room in &mut self.rooms {
            for layer in [&mut room.actors, &mut room.stage] {
                for entity in layer.entities.iter_mut().filter(|e| e.entity_type == EntityType::AceCoin) {
                    entity.settings = EntitySettings::AceCoin {
                        ace_coin_index: next_index,
                    };
                    next_index = next_index.saturating_add(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::PLAYER_ID;
    use sma4_core::ExitType;

    fn level_with_rooms(count: usize) -> Level {
        let mut level = Level::create_default("editor");
        for _ in 1..count {
            level.add_room().unwrap();
        }
        level
    }

    fn pipe_to(room: i32) -> EntitySettings {
        EntitySettings::Transport {
            height: 2,
            destination: Some(TransportDestination::new(room, 1, 1, ExitType::UpFromPipe)),
        }
    }

    #[test]
    fn test_room_count_limits() {
        let mut level = level_with_rooms(4);
        assert!(matches!(level.add_room(), Err(LevelError::RoomLimit(_))));

        let mut single = Level::create_default("single");
        assert!(matches!(single.delete_room(0), Err(LevelError::RoomLimit(_))));
        assert!(matches!(level.delete_room(9), Err(LevelError::RoomIndexOutOfRange(9))));
    }

    #[test]
    fn test_delete_room_fixes_transports() {
        let ids = EntityIdSequence::new();
        let mut level = level_with_rooms(3);

        let to_deleted = level
            .place_entity(0, EntityType::PipeAirshipVertical, PixelPoint::new(160, 160), Some(pipe_to(1)), &ids)
            .unwrap();
        let to_last = level
            .place_entity(0, EntityType::PipeAirshipVertical, PixelPoint::new(320, 160), Some(pipe_to(2)), &ids)
            .unwrap();

        level.delete_room(1).unwrap();

        assert_eq!(level.rooms.len(), 2);
        assert!(level.find(to_deleted).is_none());
        let dest = level.find(to_last).unwrap().settings.destination().copied().unwrap();
        assert_eq!(dest.room, 1);
    }

    #[test]
    fn test_resize_clamps_and_drops_outside() {
        let ids = EntityIdSequence::new();
        let mut level = level_with_rooms(1);
        level.draw_cell(0, EntityType::Cactus, TilePoint::new(40, 5), None, &ids).unwrap();
        level.draw_cell(0, EntityType::Cactus, TilePoint::new(3, 5), None, &ids).unwrap();

        let (w, h) = level.resize_room(0, 2, 500).unwrap();
        assert_eq!((w, h), (MIN_ROOM_TILE_WIDTH, MAX_ROOM_TILE_HEIGHT));
        assert_eq!(level.rooms[0].stage.cells.len(), 1);

        level.resize_room(0, 20, 10).unwrap();
        let player = level.find(PLAYER_ID).unwrap();
        assert!(level.rooms[0].contains(player.placement.tile()));
    }

    #[test]
    fn test_set_timer_clamps() {
        let mut level = Level::create_default("timer");
        assert_eq!(level.set_timer(1500), 999);
        assert_eq!(level.set_timer(-3), 0);
        assert_eq!(level.set_timer(250), 250);
    }

    #[test]
    fn test_draw_cell_replaces_and_checks_kind() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("draw");
        let first = level.draw_cell(0, EntityType::MusicBlock, TilePoint::new(1, 1), None, &ids).unwrap();
        let second = level.draw_cell(0, EntityType::Cactus, TilePoint::new(1, 1), None, &ids).unwrap();

        assert!(level.find(first).is_none());
        assert_eq!(level.find(second).unwrap().entity_type, EntityType::Cactus);
        assert!(matches!(
            level.draw_cell(0, EntityType::Water, TilePoint::new(2, 2), None, &ids),
            Err(LevelError::WrongPlacement(EntityType::Water))
        ));
        assert!(level.draw_cell(0, EntityType::Cactus, TilePoint::new(-1, 2), None, &ids).is_err());
    }

    #[test]
    fn test_place_entity_refuses_overlap() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("place");
        level.place_entity(0, EntityType::ColorfulMetalBox, PixelPoint::new(160, 160), None, &ids).unwrap();
        let result = level.place_entity(0, EntityType::ColorfulMetalBox, PixelPoint::new(175, 175), None, &ids);
        assert!(matches!(result, Err(LevelError::CannotDrop { .. })));
    }

    #[test]
    fn test_move_entity_snaps_and_checks_overlap() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("move");
        let a = level.place_entity(0, EntityType::ColorfulMetalBox, PixelPoint::new(160, 160), None, &ids).unwrap();
        let b = level.place_entity(0, EntityType::ColorfulMetalBox, PixelPoint::new(480, 160), None, &ids).unwrap();

        level.move_entity(b, PixelPoint::new(330, 170)).unwrap();
        assert_eq!(level.find(b).unwrap().placement.pixels(), PixelPoint::new(320, 160));

        assert!(matches!(level.move_entity(b, PixelPoint::new(160, 160)), Err(LevelError::CannotDrop { .. })));
        assert_eq!(level.find(a).unwrap().placement.pixels(), PixelPoint::new(160, 160));

        let cell = level.draw_cell(0, EntityType::Cactus, TilePoint::new(1, 1), None, &ids).unwrap();
        assert!(matches!(level.move_entity(cell, PixelPoint::new(0, 0)), Err(LevelError::WrongPlacement(_))));
    }

    #[test]
    fn test_set_room_settings() {
        let mut level = Level::create_default("settings");
        let settings = RoomSettings {
            bg_graphic: 2,
            bg_color: 9,
            bg_extra_color_and_effect: 0,
            music: 4,
        };
        level.set_room_settings(0, settings).unwrap();
        assert_eq!(level.rooms[0].settings, settings);
        assert!(matches!(level.set_room_settings(3, settings), Err(LevelError::RoomIndexOutOfRange(3))));
    }

    #[test]
    fn test_sixth_ace_coin_rejected() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("coins");
        for i in 0..5 {
            level
                .place_entity(0, EntityType::AceCoin, PixelPoint::new(160 + i * 48, 64), None, &ids)
                .unwrap();
        }
        let sixth = level.place_entity(0, EntityType::AceCoin, PixelPoint::new(600, 64), None, &ids);
        assert!(matches!(sixth, Err(LevelError::AceCoinLimit)));
        assert_eq!(level.ace_coin_count(), 5);
    }

    #[test]
    fn test_bubble_coin_counts_towards_limit() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("bubble");
        let bubble_coin = EntitySettings::Payload { payload: Payload::AceCoin };
        level
            .place_entity(0, EntityType::Bubble, PixelPoint::new(64, 64), Some(bubble_coin.clone()), &ids)
            .unwrap();
        for i in 0..4 {
            level
                .place_entity(0, EntityType::AceCoin, PixelPoint::new(160 + i * 48, 64), None, &ids)
                .unwrap();
        }
        assert_eq!(level.ace_coin_count(), 5);
        let fifth = level.place_entity(0, EntityType::AceCoin, PixelPoint::new(600, 64), None, &ids);
        assert!(matches!(fifth, Err(LevelError::AceCoinLimit)));

        let indices: Vec<u8> = level.rooms[0]
            .actors
            .entities
            .iter()
            .filter_map(|e| e.settings.ace_coin_index())
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(indices.iter().all(|i| (*i as usize) < MAX_ACE_COINS));

        let plain = level.place_entity(0, EntityType::Bubble, PixelPoint::new(64, 160), None, &ids).unwrap();
        assert!(matches!(
            level.set_entity_settings(plain, bubble_coin),
            Err(LevelError::AceCoinLimit)
        ));
    }

    #[test]
    fn test_ace_coin_indices_across_rooms() {
        let ids = EntityIdSequence::new();
        let mut level = level_with_rooms(2);
        let a = level.place_entity(1, EntityType::AceCoin, PixelPoint::new(64, 64), None, &ids).unwrap();
        let b = level.place_entity(0, EntityType::AceCoin, PixelPoint::new(64, 64), None, &ids).unwrap();

        assert_eq!(level.find(b).unwrap().settings.ace_coin_index(), Some(0));
        assert_eq!(level.find(a).unwrap().settings.ace_coin_index(), Some(1));

        level
            .place_entity(
                1,
                EntityType::Bubble,
                PixelPoint::new(256, 64),
                Some(EntitySettings::Payload { payload: Payload::AceCoin }),
                &ids,
            )
            .unwrap();
        assert_eq!(level.find(b).unwrap().settings.ace_coin_index(), Some(1));
        assert_eq!(level.find(a).unwrap().settings.ace_coin_index(), Some(2));

        level.delete_entity(b).unwrap();
        assert_eq!(level.find(a).unwrap().settings.ace_coin_index(), Some(1));
    }

    #[test]
    fn test_player_not_deletable() {
        let mut level = Level::create_default("player");
        assert!(matches!(level.delete_entity(PLAYER_ID), Err(LevelError::NotDeletable(_))));
        let tile = level.find(PLAYER_ID).unwrap().placement.tile();
        assert!(level.erase_at(0, tile).unwrap().is_empty());
        assert_eq!(level.delete_entities(&[PLAYER_ID, EntityId(999)]), 0);
    }

    #[test]
    fn test_erase_at_hits_cells_and_free_entities() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("erase");
        let cell = level.draw_cell(0, EntityType::MusicBlock, TilePoint::new(5, 5), None, &ids).unwrap();
        let stairs = level
            .place_entity(0, EntityType::GrassStaircaseUpLeft, PixelPoint::new(64, 64), None, &ids)
            .unwrap();

        let erased = level.erase_at(0, TilePoint::new(5, 5)).unwrap();
        assert!(erased.contains(&cell));
        assert!(erased.contains(&stairs));
    }

    #[test]
    fn test_set_transport_destination() {
        let ids = EntityIdSequence::new();
        let mut level = level_with_rooms(2);
        let pipe = level
            .place_entity(0, EntityType::PipeAirshipVertical, PixelPoint::new(64, 64), None, &ids)
            .unwrap();
        let dest = TransportDestination::new(1, 4, 6, ExitType::DownFromPipe);
        level.set_transport_destination(pipe, dest).unwrap();
        assert_eq!(level.find(pipe).unwrap().settings.destination(), Some(&dest));

        let block = level.draw_cell(0, EntityType::MusicBlock, TilePoint::new(0, 0), None, &ids).unwrap();
        assert!(matches!(
            level.set_transport_destination(block, dest),
            Err(LevelError::EntityNotFound(_))
        ));
        assert!(level.set_transport_destination(EntityId(4242), dest).is_err());
    }

    #[test]
    fn test_sync_id_sequence() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("sync");
        level.rooms[0].stage.cells.insert(PlacedEntity::new(
            EntityId(77),
            EntityType::Cactus,
            Placement::Cell { x: 0, y: 0 },
            EntitySettings::None,
        ));
        level.sync_id_sequence(&ids);
        assert_eq!(ids.next_id(), EntityId(78));
    }

    #[test]
    fn test_fill_at_uses_layer() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("fill");
        level.resize_room(0, 15, 10).unwrap();
        let bounds = level.fill_at(0, EntityType::MetalMushroom, TilePoint::new(0, 0), &ids).unwrap().unwrap();
        assert_eq!(bounds.width(), 15);
        assert_eq!(bounds.height(), 10);
        assert_eq!(level.rooms[0].stage.cells.len(), 150);
    }
}
