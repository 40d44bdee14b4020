//! Import a decoded level back into the editor model
//!
//! The format does not store room sizes, so every room is given the same
//! height (the caller's choice, usually the 28-row maximum) and a width wide
//! enough for its contents. Records the registry does not know are skipped.

use crate::parser::{LevelTree, LevelTreeRoom};
use crate::primitives::decode_y;
use crate::transports::decode_transports;
use sma4_core::{EntityIdSequence, Result, TilePoint};
use sma4_levels::geometry::entity_tile_bounds;
use sma4_levels::level::{
    Level, Room, RoomSettings, MAX_ROOM_TILE_HEIGHT, MAX_ROOM_TILE_WIDTH, MIN_ROOM_TILE_HEIGHT,
    MIN_ROOM_TILE_WIDTH, PLAYER_ID,
};
use sma4_levels::{EntitySettings, EntityType, PlacedEntity, Placement, TransportDestination};
use tracing::{debug, info, warn};

/// Level settings bytes holding the player's start position
const PLAYER_Y_BYTE: usize = 8;
const PLAYER_X_BYTE: usize = 9;
/// Level settings byte holding the music id
const MUSIC_BYTE: usize = 14;
/// Sprite byte holding an ace coin's index
const ACE_COIN_INDEX_BYTE: usize = 4;

/// Rebuild an editor level from a decoded tree
///
/// New entities take ids from `ids`, which is moved past every id in the
/// level before returning.
pub fn import_level(tree: &LevelTree, room_height: i32, ids: &EntityIdSequence) -> Result<Level> {
    let room_height = room_height.clamp(MIN_ROOM_TILE_HEIGHT, MAX_ROOM_TILE_HEIGHT);
    let mut level = Level::new(tree.header.level_name.clone());

    let present: Vec<&LevelTreeRoom> = tree.rooms.iter().map_while(|r| r.as_ref()).collect();
    if present.len() < tree.present_rooms().count() {
        warn!("level has a gap between rooms, importing the first {} only", present.len());
    }

    if let Some(first) = present.first() {
        level.settings.timer = first.object_header.timer;
    }

    for (index, tree_room) in present.iter().enumerate() {
        let room = import_room(index, tree_room, room_height, ids);
        level.rooms.push(room);
    }

    for (index, tree_room) in present.iter().enumerate() {
        attach_transports(&mut level, index, tree_room, room_height)?;
    }

    level.sync_id_sequence(ids);
    level.assign_ace_coin_indices();

    info!("imported level '{}': {} rooms", level.name, level.rooms.len());
    Ok(level)
}

fn import_room(index: usize, tree_room: &LevelTreeRoom, room_height: i32, ids: &EntityIdSequence) -> Room {
    let mut room = Room::new();
    room.tile_height = room_height;
    room.settings = RoomSettings {
        bg_graphic: tree_room.object_header.bg_graphic(),
        bg_color: tree_room.object_header.bg_color(),
        bg_extra_color_and_effect: tree_room.object_header.bg_extra_color_and_effect(),
        music: tree_room.level_settings.get(MUSIC_BYTE).copied().unwrap_or(0),
    };

    let mut cells = Vec::new();
    let mut free = Vec::new();

    if index == 0 {
        let x = tree_room.level_settings.get(PLAYER_X_BYTE).map_or(2, |b| *b as i32);
        let y = tree_room
            .level_settings
            .get(PLAYER_Y_BYTE)
            .map_or(room_height - 3, |b| decode_y(*b as i32, room_height));
        free.push(PlacedEntity::new(
            PLAYER_ID,
            EntityType::Player,
            Placement::free(TilePoint::new(x, y).to_pixels()),
            EntitySettings::None,
        ));
    }

    for record in &tree_room.objects {
        let Some(entity_type) = record.entity_type else {
            debug!("room {}: skipping unknown object {:#04x} (bank {})", index, record.id, record.bank);
            continue;
        };
        let descriptor = entity_type.descriptor();
        let origin = TilePoint::new(record.x as i32, decode_y(record.y as i32, room_height));

        if descriptor.is_cell() {
            for dy in 0..record.height as i32 {
                for dx in 0..record.width as i32 {
                    cells.push(PlacedEntity::new(
                        ids.next_id(),
                        entity_type,
                        Placement::cell(TilePoint::new(origin.x + dx, origin.y + dy)),
                        record.settings.clone(),
                    ));
                }
            }
        } else {
            free.push(PlacedEntity::new(
                ids.next_id(),
                entity_type,
                Placement::free(origin.to_pixels()),
                record.settings.clone(),
            ));
        }
    }

    for sprite in &tree_room.sprites {
        let Some(entity_type) = sprite.entity_type else {
            debug!("room {}: skipping unknown sprite {:#04x} (bank {})", index, sprite.id, sprite.bank);
            continue;
        };
        let descriptor = entity_type.descriptor();
        let settings = match entity_type {
            EntityType::AceCoin => EntitySettings::AceCoin {
                ace_coin_index: sprite.raw_bytes.get(ACE_COIN_INDEX_BYTE).copied().unwrap_or(0),
            },
            _ => descriptor.default_settings.clone(),
        };
        let tile = TilePoint::new(sprite.x as i32, decode_y(sprite.y as i32, room_height));
        free.push(PlacedEntity::new(
            ids.next_id(),
            entity_type,
            Placement::free(tile.to_pixels()),
            settings,
        ));
    }

    let extent = cells
        .iter()
        .chain(free.iter())
        .map(|e| entity_tile_bounds(e).lower_right.x + 1)
        .max()
        .unwrap_or(0);
    room.tile_width = extent.clamp(MIN_ROOM_TILE_WIDTH, MAX_ROOM_TILE_WIDTH);

    for entity in cells {
        let tile = entity.placement.tile();
        if !room.contains(tile) {
            debug!("room {}: dropping cell outside the room at ({}, {})", index, tile.x, tile.y);
            continue;
        }
        room.layer_mut(entity.entity_type.descriptor().layer).cells.insert(entity);
    }
    for entity in free {
        room.layer_mut(entity.entity_type.descriptor().layer).entities.push(entity);
    }

    room
}

/// Wire the room's transport records onto the entities at their source tiles
fn attach_transports(level: &mut Level, index: usize, tree_room: &LevelTreeRoom, room_height: i32) -> Result<()> {
    let transports = decode_transports(&tree_room.transports, room_height, |_| room_height)?;
    let room = &mut level.rooms[index];

    for transport in transports {
        let source = TilePoint::new(transport.x, transport.y);
        let entity = room
            .actors
            .entities
            .iter_mut()
            .chain(room.stage.entities.iter_mut())
            .find(|e| e.entity_type.descriptor().transports.is_some() && e.placement.tile() == source);

        let Some(entity) = entity else {
            debug!("room {}: no transport entity at ({}, {})", index, source.x, source.y);
            continue;
        };

        let descriptor = entity.entity_type.descriptor();
        let height = entity
            .settings
            .size()
            .or_else(|| descriptor.default_settings.size())
            .map_or(descriptor.height, |(_, h)| h);
        entity.settings = EntitySettings::Transport {
            height,
            destination: Some(TransportDestination {
                room: transport.dest_room as i32,
                x: transport.dest_x,
                y: transport.dest_y,
                exit_type: transport.exit_type,
            }),
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::build_level_binary;
    use crate::parser::parse_level_tree;
    use sma4_core::{ExitType, PixelPoint};
    use sma4_levels::Payload;

    fn import(level: &Level) -> Level {
        let bytes = build_level_binary(level).unwrap();
        let tree = parse_level_tree(&bytes).unwrap();
        import_level(&tree, 28, &EntityIdSequence::new()).unwrap()
    }

    #[test]
    fn test_import_default_level() {
        let level = Level::create_default("Fresh");
        let imported = import(&level);
        assert_eq!(imported.name, "Fresh");
        assert_eq!(imported.rooms.len(), 1);
        assert_eq!(imported.settings.timer, level.settings.timer);
        let player = imported.find(PLAYER_ID).unwrap();
        assert_eq!(player.placement, level.find(PLAYER_ID).unwrap().placement);
    }

    #[test]
    fn test_import_expands_runs_into_cells() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("Cells");
        for x in 4..9 {
            for y in 20..22 {
                level.draw_cell(0, EntityType::MetalMushroom, TilePoint::new(x, y), None, &ids).unwrap();
            }
        }
        let imported = import(&level);
        let stage = &imported.rooms[0].stage.cells;
        assert_eq!(stage.len(), 10);
        assert!(stage.iter().all(|e| e.entity_type == EntityType::MetalMushroom));
        assert!(stage.get(8, 21).is_some());
    }

    #[test]
    fn test_import_keeps_settings_and_sprites() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("Settings");
        level.rooms[0].settings = RoomSettings {
            bg_graphic: 3,
            bg_color: 0x10,
            bg_extra_color_and_effect: 1,
            music: 7,
        };
        level
            .draw_cell(0, EntityType::BuriedVegetable, TilePoint::new(6, 24), Some(EntitySettings::Payload { payload: Payload::Coin }), &ids)
            .unwrap();
        level.place_entity(0, EntityType::RedKoopaTroopa, PixelPoint::new(320, 128), None, &ids).unwrap();
        level.place_entity(0, EntityType::AceCoin, PixelPoint::new(160, 64), None, &ids).unwrap();

        let imported = import(&level);
        let room = &imported.rooms[0];
        assert_eq!(room.settings, level.rooms[0].settings);
        assert_eq!(room.stage.cells.get(6, 24).unwrap().settings.payload(), Some(Payload::Coin));

        let koopa = room.actors.entities.iter().find(|e| e.entity_type == EntityType::RedKoopaTroopa).unwrap();
        assert_eq!(koopa.placement.pixels(), PixelPoint::new(320, 128));
        assert_eq!(imported.ace_coin_count(), 1);
    }

    #[test]
    fn test_import_wires_transports() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("Pipes");
        level.add_room().unwrap();
        let destination = TransportDestination::new(1, 5, 20, ExitType::DownFromPipe);
        let pipe = level
            .place_entity(0, EntityType::PipeAirshipVertical, PixelPoint::new(160, 320), None, &ids)
            .unwrap();
        level.set_transport_destination(pipe, destination).unwrap();

        let imported = import(&level);
        let pipe = imported.rooms[0]
            .stage
            .entities
            .iter()
            .find(|e| e.entity_type == EntityType::PipeAirshipVertical)
            .unwrap();
        assert_eq!(pipe.settings.destination(), Some(&destination));
    }

    #[test]
    fn test_import_moves_id_sequence() {
        let ids_for_build = EntityIdSequence::new();
        let mut level = Level::create_default("Ids");
        level.draw_cell(0, EntityType::Cactus, TilePoint::new(1, 1), None, &ids_for_build).unwrap();
        let bytes = build_level_binary(&level).unwrap();
        let tree = parse_level_tree(&bytes).unwrap();

        let ids = EntityIdSequence::new();
        let imported = import_level(&tree, 28, &ids).unwrap();
        assert!(ids.peek() > imported.max_entity_id().unwrap());
    }
}
