//! Binary layout builder
//!
//! # Level layout
//! ```text
//! [5 byte header][24 little-endian u16 pointers][11 zero bytes][name]
//! [room 0 streams][room 1 streams]...
//! ```
//!
//! Every room has six streams, in pointer order: objects, level settings,
//! transports, sprites, block path and auto scroll. Pointers are absolute
//! offsets into the blob. Room slots the level does not use point at the end
//! of the blob.

use crate::constraints::RoomConstraints;
use crate::merge::layer_runs;
use crate::name::encode_level_name;
use crate::primitives::{encode_y, pointer_value, timer_bytes, to_byte, write_pointer, TERMINATOR};
use crate::transports::resolve_transports;
use bytes::{BufMut, BytesMut};
use sma4_core::{Result, Sma4Error, ROOMS_PER_LEVEL};
use sma4_levels::level::{Level, Room, MAX_ACE_COINS};
use tracing::{debug, info};

pub const LEVEL_HEADER_LEN: usize = 5;
pub const STREAMS_PER_ROOM: usize = 6;
pub const POINTER_TABLE_LEN: usize = ROOMS_PER_LEVEL * STREAMS_PER_ROOM * 2;
pub const POINTER_PADDING_LEN: usize = 11;
/// Offset of the level name
pub const LEVEL_NAME_OFFSET: usize = LEVEL_HEADER_LEN + POINTER_TABLE_LEN + POINTER_PADDING_LEN;

pub const OBJECT_HEADER_LEN: usize = 11;
pub const LEVEL_SETTINGS_LEN: usize = 32;

/// Options that change the produced bytes without touching the level
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Name written instead of the level's own
    pub name_override: Option<String>,
}

/// The six encoded streams of one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStreams {
    pub objects: Vec<u8>,
    pub level_settings: Vec<u8>,
    pub transports: Vec<u8>,
    pub sprites: Vec<u8>,
    pub block_path: Vec<u8>,
    pub auto_scroll: Vec<u8>,
}

impl RoomStreams {
    /// Streams in pointer order
    pub fn streams(&self) -> [&[u8]; STREAMS_PER_ROOM] {
        [
            self.objects.as_slice(),
            self.level_settings.as_slice(),
            self.transports.as_slice(),
            self.sprites.as_slice(),
            self.block_path.as_slice(),
            self.auto_scroll.as_slice(),
        ]
    }

    /// Total length of all six streams
    pub fn len(&self) -> usize {
        self.streams().iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Object stream header
///
/// # Format
/// `[timer hi, timer lo, 0x00, 0x02, 0x0c, bg color, 0xa1, object graphic set,
///   0x08, bg extra color and effect, bg graphic]`
pub fn object_header(timer: u16, room: &Room, constraints: &RoomConstraints) -> [u8; OBJECT_HEADER_LEN] {
    let [timer_hi, timer_lo] = timer_bytes(timer as i32);
    [
        timer_hi,
        timer_lo,
        0x00,
        0x02,
        0x0c,
        room.settings.bg_color,
        0xa1,
        constraints.object_graphic_set,
        0x08,
        room.settings.bg_extra_color_and_effect,
        room.settings.bg_graphic,
    ]
}

/// Object stream: header, actor-layer runs, stage-layer runs, terminator
pub fn build_object_stream(timer: u16, room: &Room, constraints: &RoomConstraints) -> Result<Vec<u8>> {
    let mut bytes = object_header(timer, room, constraints).to_vec();

    for layer in [&room.actors, &room.stage] {
        for run in layer_runs(layer, room.tile_height) {
            bytes.extend(run.encode(room.tile_height)?);
        }
    }

    bytes.push(TERMINATOR);
    Ok(bytes)
}

/// Level settings stream
///
/// Apart from the object set, music, sprite graphic sets and rotation, the
/// bytes are fixed values taken from the game's own levels.
pub fn build_level_settings(room: &Room, constraints: &RoomConstraints) -> [u8; LEVEL_SETTINGS_LEN] {
    let [s0, s1, s2, s3, s4, s5] = constraints.sprite_graphic_sets;
    [
        0xbf,
        1,
        0,
        0,
        0x18,
        0,
        0x38,
        0,
        0x19,
        0x02,
        0x12,
        0,
        constraints.object_set,
        0,
        room.settings.music,
        0,
        s0,
        s1,
        s2,
        s3,
        s4,
        s5,
        0,
        0,
        0,
        0,
        constraints.rotation,
        0,
        0,
        0,
        0,
        0,
    ]
}

/// Sprite stream: lead byte, sprite records ordered by x, terminator
pub fn build_sprite_stream(room: &Room) -> Result<Vec<u8>> {
    let mut entities: Vec<_> = room.all_entities().collect();
    entities.sort_by_key(|e| e.placement.pixels().x);

    let mut bytes = vec![0x00];
    for entity in entities {
        let descriptor = entity.entity_type.descriptor();
        let Some(encode) = descriptor.to_sprite_binary else {
            continue;
        };
        let tile = entity.placement.tile();
        let x = to_byte(tile.x, "sprite x")?;
        let y = to_byte(encode_y(tile.y, room.tile_height), "sprite y")?;
        bytes.extend(encode(descriptor, x, y, &entity.settings));
    }
    bytes.push(TERMINATOR);
    Ok(bytes)
}

/// Build the six streams of room `room_index`
pub fn build_room(level: &Level, room_index: usize) -> Result<RoomStreams> {
    let room = level
        .rooms
        .get(room_index)
        .ok_or_else(|| Sma4Error::NotFound(format!("room {}", room_index)))?;

    let constraints = RoomConstraints::for_room(room);

    let streams = RoomStreams {
        objects: build_object_stream(level.settings.timer, room, &constraints)?,
        level_settings: build_level_settings(room, &constraints).to_vec(),
        transports: resolve_transports(room_index, &level.rooms)?,
        sprites: build_sprite_stream(room)?,
        block_path: vec![TERMINATOR],
        auto_scroll: vec![TERMINATOR],
    };

    debug!(
        "room {}: objects {} settings {} transports {} sprites {} bytes",
        room_index,
        streams.objects.len(),
        streams.level_settings.len(),
        streams.transports.len(),
        streams.sprites.len()
    );
    Ok(streams)
}

/// Encode `level` with default options
pub fn build_level_binary(level: &Level) -> Result<Vec<u8>> {
    build_level_binary_with(level, &EncodeOptions::default())
}

/// Encode `level` into the e-Reader level format
pub fn build_level_binary_with(level: &Level, options: &EncodeOptions) -> Result<Vec<u8>> {
    if !level.has_valid_room_count() {
        return Err(Sma4Error::InvalidData(format!(
            "level has {} rooms, expected 1 to {}",
            level.rooms.len(),
            ROOMS_PER_LEVEL
        )));
    }

    let ace_coins = level.ace_coin_count();
    if ace_coins > MAX_ACE_COINS {
        return Err(Sma4Error::TooManyAceCoins { count: ace_coins });
    }
    let stray_index = level
        .rooms
        .iter()
        .flat_map(|r| r.free_entities())
        .filter_map(|e| e.settings.ace_coin_index())
        .find(|index| *index as usize >= MAX_ACE_COINS);
    if let Some(index) = stray_index {
        return Err(Sma4Error::InvalidData(format!("ace coin index {} out of range", index)));
    }

    let name = encode_level_name(options.name_override.as_deref().unwrap_or(&level.name));
    let rooms = (0..level.rooms.len())
        .map(|index| build_room(level, index))
        .collect::<Result<Vec<_>>>()?;

    let payload_start = LEVEL_NAME_OFFSET + name.len();
    let total_len = payload_start + rooms.iter().map(RoomStreams::len).sum::<usize>();

    let mut pointers = Vec::with_capacity(ROOMS_PER_LEVEL * STREAMS_PER_ROOM);
    let mut offset = payload_start;
    for room in &rooms {
        for stream in room.streams() {
            pointers.push(pointer_value(offset)?);
            offset += stream.len();
        }
    }
    let end = pointer_value(total_len)?;
    pointers.resize(ROOMS_PER_LEVEL * STREAMS_PER_ROOM, end);

    let mut buf = BytesMut::with_capacity(total_len);
    buf.put_slice(&[0, ace_coins as u8, 0, 0, 0]);
    for pointer in pointers {
        write_pointer(&mut buf, pointer);
    }
    buf.put_bytes(0, POINTER_PADDING_LEN);
    buf.put_slice(&name);
    for room in &rooms {
        for stream in room.streams() {
            buf.put_slice(stream);
        }
    }

    info!("encoded level '{}': {} rooms, {} bytes", level.name, rooms.len(), buf.len());
    Ok(buf.to_vec())
}
