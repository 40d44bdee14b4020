//! Binary parser
//!
//! Walks the pointer table of an encoded level and decodes it back into a
//! [`LevelTree`]. Object records are decoded one at a time through the entity
//! registry; ids the registry does not know fall back to the generic bank 0 /
//! bank 1 layout so data from other levels still parses.
//!
//! Pointer and header reads are bounds checked and fail with
//! [`Sma4Error::Truncated`]. A partial object record at the end of a stream
//! stops the object loop and is kept in `pending_raw_bytes`.

use crate::layout::{LEVEL_HEADER_LEN, LEVEL_NAME_OFFSET, OBJECT_HEADER_LEN, POINTER_PADDING_LEN, STREAMS_PER_ROOM};
use crate::name::{decode_level_name, encoded_name_len};
use crate::primitives::{decode_timer, pointer_at, TERMINATOR};
use nom::bytes::complete::take;
use nom::combinator::peek;
use nom::multi::count;
use nom::number::complete::{le_u16, u8 as byte};
use nom::sequence::tuple;
use nom::IResult;
use serde::{Deserialize, Serialize};
use sma4_core::{Result, Sma4Error, ROOMS_PER_LEVEL};
use sma4_levels::{EntityType, ObjectRecord, Registry};
use tracing::{debug, info};

type ParseError<'a> = nom::error::Error<&'a [u8]>;

/// Offset of each room's object-stream pointer
pub const ROOM_OBJECT_POINTERS: [usize; ROOMS_PER_LEVEL] = [
    LEVEL_HEADER_LEN,
    LEVEL_HEADER_LEN + STREAMS_PER_ROOM * 2,
    LEVEL_HEADER_LEN + STREAMS_PER_ROOM * 4,
    LEVEL_HEADER_LEN + STREAMS_PER_ROOM * 6,
];

/// Decoded object-stream header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectHeader {
    pub timer: u16,
    pub raw_bytes: Vec<u8>,
}

impl ObjectHeader {
    fn field(&self, index: usize) -> u8 {
        self.raw_bytes.get(index).copied().unwrap_or(0)
    }

    pub fn bg_color(&self) -> u8 {
        self.field(5)
    }

    pub fn object_graphic_set(&self) -> u8 {
        self.field(7)
    }

    pub fn bg_extra_color_and_effect(&self) -> u8 {
        self.field(9)
    }

    pub fn bg_graphic(&self) -> u8 {
        self.field(10)
    }
}

/// Decode the fixed-length object-stream header at the start of `bytes`
pub fn parse_object_header(bytes: &[u8]) -> Result<ObjectHeader> {
    let raw = bytes.get(..OBJECT_HEADER_LEN).ok_or(Sma4Error::Truncated {
        offset: 0,
        needed: OBJECT_HEADER_LEN,
    })?;
    Ok(ObjectHeader {
        timer: decode_timer([raw[0], raw[1]]),
        raw_bytes: raw.to_vec(),
    })
}

/// Decode object records until a terminator or the end of `bytes`
///
/// # Returns
/// The decoded records and any trailing bytes too short for a record
pub fn parse_object_records(bytes: &[u8]) -> (Vec<ObjectRecord>, Vec<u8>) {
    let registry = Registry::global();
    let mut objects = Vec::new();
    let mut i = 0;

    while i < bytes.len() && bytes[i] != TERMINATOR {
        let rest = &bytes[i..];
        let bank = rest[0] >> 6;

        let decoded = match rest.get(3).and_then(|id| registry.object_type_for(bank, *id)) {
            Some(entity_type) => {
                let descriptor = entity_type.descriptor();
                match descriptor.parse_object_binary {
                    Some(parse) => parse(descriptor, rest),
                    None => ObjectRecord::generic(rest).map(|mut record| {
                        record.entity_type = Some(entity_type);
                        record
                    }),
                }
            }
            None => ObjectRecord::generic(rest),
        };

        let Some(record) = decoded else {
            debug!("partial object record at {:#x}: {} bytes left", i, rest.len());
            return (objects, rest.to_vec());
        };
        i += record.raw_bytes.len();
        objects.push(record);
    }

    (objects, Vec::new())
}

/// Objects of one room read straight from a level blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomObjects {
    pub header: ObjectHeader,
    pub objects: Vec<ObjectRecord>,
    pub pending_raw_bytes: Vec<u8>,
}

/// Decode the object stream of `room_index` from a whole level blob
///
/// Records are read until a terminator or the end of the blob.
pub fn parse_room(level_bytes: &[u8], room_index: usize) -> Result<RoomObjects> {
    let pointer_offset = *ROOM_OBJECT_POINTERS
        .get(room_index)
        .ok_or_else(|| Sma4Error::NotFound(format!("room {}", room_index)))?;
    let start = pointer_at(level_bytes, pointer_offset)? as usize;

    let stream = level_bytes.get(start..).ok_or(Sma4Error::Truncated {
        offset: start,
        needed: OBJECT_HEADER_LEN,
    })?;
    let header = parse_object_header(stream).map_err(|_| Sma4Error::Truncated {
        offset: start,
        needed: OBJECT_HEADER_LEN,
    })?;
    let (objects, pending_raw_bytes) = parse_object_records(&stream[OBJECT_HEADER_LEN..]);

    Ok(RoomObjects {
        header,
        objects,
        pending_raw_bytes,
    })
}

/// One sprite record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRecord {
    pub bank: u8,
    pub id: u8,
    pub x: u8,
    pub y: u8,
    pub raw_bytes: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
}

/// Decoded five byte level header plus the name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelHeader {
    pub e_coin: u8,
    pub ace_coins: u8,
    pub level_class: u8,
    pub level_number: u8,
    pub level_icon: u8,
    pub level_name: String,
    pub raw_bytes: Vec<u8>,
}

/// Every stream of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTreeRoom {
    pub object_header: ObjectHeader,
    pub objects: Vec<ObjectRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_raw_bytes: Vec<u8>,
    pub level_settings: Vec<u8>,
    pub transports: Vec<u8>,
    pub sprites: Vec<SpriteRecord>,
    pub block_path: Vec<u8>,
    pub auto_scroll: Vec<u8>,
}

/// A whole decoded level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTree {
    pub header: LevelHeader,
    /// One entry per room slot, `None` for absent rooms
    pub rooms: Vec<Option<LevelTreeRoom>>,
}

impl LevelTree {
    /// Present rooms in slot order
    pub fn present_rooms(&self) -> impl Iterator<Item = &LevelTreeRoom> {
        self.rooms.iter().flatten()
    }
}

fn truncated(base: &[u8], err: nom::Err<ParseError>) -> Sma4Error {
    match err {
        nom::Err::Incomplete(needed) => Sma4Error::Truncated {
            offset: base.len(),
            needed: match needed {
                nom::Needed::Size(n) => n.get(),
                nom::Needed::Unknown => 1,
            },
        },
        nom::Err::Error(e) | nom::Err::Failure(e) => Sma4Error::Truncated {
            offset: base.len() - e.input.len(),
            needed: 1,
        },
    }
}

fn level_header(input: &[u8]) -> IResult<&[u8], (u8, u8, u8, u8, u8)> {
    tuple((byte, byte, byte, byte, byte))(input)
}

fn pointer_table(input: &[u8]) -> IResult<&[u8], Vec<u16>> {
    count(le_u16, ROOMS_PER_LEVEL * STREAMS_PER_ROOM)(input)
}

fn bank_and_id(input: &[u8]) -> IResult<&[u8], (u8, u8)> {
    peek(tuple((byte, byte)))(input)
}

fn sprite_record(input: &[u8]) -> IResult<&[u8], SpriteRecord> {
    let (_, (bank, id)) = bank_and_id(input)?;
    let entity_type = Registry::global().sprite_type_for(bank, id);
    let len = match entity_type {
        Some(t) => t.descriptor().sprite_record_len,
        None if bank == 0 => 4,
        None => 6,
    };
    let (rest, raw) = take::<_, _, ParseError>(len)(input)?;
    Ok((
        rest,
        SpriteRecord {
            bank,
            id,
            x: raw[2],
            y: raw[3],
            raw_bytes: raw.to_vec(),
            entity_type,
        },
    ))
}

/// Sprite stream: lead byte, records until the terminator
fn parse_sprites(stream: &[u8]) -> std::result::Result<Vec<SpriteRecord>, nom::Err<ParseError>> {
    let (mut input, _lead) = byte::<_, ParseError>(stream)?;
    let mut sprites = Vec::new();
    while let Some(first) = input.first() {
        if *first == TERMINATOR {
            break;
        }
        let (rest, sprite) = sprite_record(input)?;
        sprites.push(sprite);
        input = rest;
    }
    Ok(sprites)
}

fn stream_range(pointers: &[u16], index: usize, len: usize) -> Result<(usize, usize)> {
    let start = pointers[index] as usize;
    let end = pointers.get(index + 1).map_or(len, |p| *p as usize);
    if start > end || end > len {
        return Err(Sma4Error::Truncated {
            offset: start,
            needed: end.saturating_sub(start).max(1),
        });
    }
    Ok((start, end))
}

fn parse_tree_room(bytes: &[u8], pointers: &[u16], room: usize) -> Result<LevelTreeRoom> {
    let mut streams: Vec<&[u8]> = Vec::with_capacity(STREAMS_PER_ROOM);
    for s in 0..STREAMS_PER_ROOM {
        let (start, end) = stream_range(pointers, room * STREAMS_PER_ROOM + s, bytes.len())?;
        streams.push(&bytes[start..end]);
    }

    let objects_start = pointers[room * STREAMS_PER_ROOM] as usize;
    let object_header = parse_object_header(streams[0]).map_err(|_| Sma4Error::Truncated {
        offset: objects_start,
        needed: OBJECT_HEADER_LEN,
    })?;
    let (objects, pending_raw_bytes) = parse_object_records(&streams[0][OBJECT_HEADER_LEN..]);

    let sprites_start = pointers[room * STREAMS_PER_ROOM + 3] as usize;
    let sprites = parse_sprites(streams[3]).map_err(|e| match truncated(streams[3], e) {
        Sma4Error::Truncated { offset, needed } => Sma4Error::Truncated {
            offset: sprites_start + offset,
            needed,
        },
        other => other,
    })?;

    Ok(LevelTreeRoom {
        object_header,
        objects,
        pending_raw_bytes,
        level_settings: streams[1].to_vec(),
        transports: streams[2].to_vec(),
        sprites,
        block_path: streams[4].to_vec(),
        auto_scroll: streams[5].to_vec(),
    })
}

/// Decode a whole level blob
pub fn parse_level_tree(bytes: &[u8]) -> Result<LevelTree> {
    let (rest, (e_coin, ace_coins, level_class, level_number, level_icon)) =
        level_header(bytes).map_err(|e| truncated(bytes, e))?;
    let (rest, pointers) = pointer_table(rest).map_err(|e| truncated(bytes, e))?;
    let (_, _padding) = take::<_, _, ParseError>(POINTER_PADDING_LEN)(rest).map_err(|e| truncated(bytes, e))?;

    let name_bytes = &bytes[LEVEL_NAME_OFFSET..];
    let name_len = encoded_name_len(name_bytes);
    let header = LevelHeader {
        e_coin,
        ace_coins,
        level_class,
        level_number,
        level_icon,
        level_name: decode_level_name(&name_bytes[..name_len]),
        raw_bytes: bytes[..LEVEL_HEADER_LEN].to_vec(),
    };

    let mut rooms = Vec::with_capacity(ROOMS_PER_LEVEL);
    for room in 0..ROOMS_PER_LEVEL {
        if pointers[room * STREAMS_PER_ROOM] as usize >= bytes.len() {
            rooms.push(None);
            continue;
        }
        rooms.push(Some(parse_tree_room(bytes, &pointers, room)?));
    }

    info!(
        "decoded level '{}': {} rooms, {} bytes",
        header.level_name,
        rooms.iter().flatten().count(),
        bytes.len()
    );
    Ok(LevelTree { header, rooms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::build_level_binary;
    use sma4_core::{EntityIdSequence, PixelPoint, TilePoint};
    use sma4_levels::{EntitySettings, Level, Payload};

    #[test]
    fn test_room_object_pointer_offsets() {
        assert_eq!(ROOM_OBJECT_POINTERS, [5, 17, 29, 41]);
    }

    #[test]
    fn test_parse_object_records_stops_at_terminator() {
        let bytes = [0x00, 0x1a, 0x03, 0x01, 0x42, 0x1a, 0x05, 0x14, TERMINATOR, 0x00, 0x00];
        let (objects, pending) = parse_object_records(&bytes);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].entity_type, Some(EntityType::UndergroundFlatTerrainUpperLeftCorner));
        assert_eq!(objects[1].entity_type, Some(EntityType::MusicBlock));
        assert_eq!((objects[1].x, objects[1].width), (5, 3));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_unknown_object_decodes_generically() {
        let bytes = [0x43, 0x10, 0x07, 0xfe, 0x01, 0x02, 0x11, 0x08, 0xfd];
        let (objects, pending) = parse_object_records(&bytes);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].entity_type, None);
        assert_eq!((objects[0].bank, objects[0].width, objects[0].height), (1, 4, 2));
        assert_eq!(objects[1].raw_bytes, vec![0x02, 0x11, 0x08, 0xfd]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_partial_record_is_pending() {
        let bytes = [0x00, 0x1a, 0x03, 0x01, 0x42, 0x1a];
        let (objects, pending) = parse_object_records(&bytes);
        assert_eq!(objects.len(), 1);
        assert_eq!(pending, vec![0x42, 0x1a]);
    }

    #[test]
    fn test_parse_room_from_level() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("Parse");
        level.settings.timer = 200;
        let leaf = EntitySettings::Payload { payload: Payload::Leaf };
        level.draw_cell(0, EntityType::MusicBlock, TilePoint::new(3, 26), Some(leaf), &ids).unwrap();
        level.draw_cell(0, EntityType::Cactus, TilePoint::new(8, 24), None, &ids).unwrap();
        level.draw_cell(0, EntityType::Cactus, TilePoint::new(8, 25), None, &ids).unwrap();

        let bytes = build_level_binary(&level).unwrap();
        let room = parse_room(&bytes, 0).unwrap();
        assert_eq!(room.header.timer, 200);
        assert_eq!(room.objects.len(), 2);

        // row 24 comes before row 26
        let music = &room.objects[1];
        assert_eq!(music.entity_type, Some(EntityType::MusicBlock));
        assert_eq!(music.settings.payload(), Some(Payload::Leaf));
        assert_eq!((music.bank, music.x, music.y), (0, 3, 26));

        let cactus = &room.objects[0];
        assert_eq!(cactus.entity_type, Some(EntityType::Cactus));
        assert_eq!((cactus.x, cactus.y, cactus.width, cactus.height), (8, 24, 1, 2));
    }

    #[test]
    fn test_parse_level_tree() {
        let ids = EntityIdSequence::new();
        let mut level = Level::create_default("Tree");
        level.add_room().unwrap();
        level.place_entity(0, EntityType::AceCoin, PixelPoint::new(96, 96), None, &ids).unwrap();
        level.place_entity(1, EntityType::BeachedCheepCheep, PixelPoint::new(64, 96), None, &ids).unwrap();

        let bytes = build_level_binary(&level).unwrap();
        let tree = parse_level_tree(&bytes).unwrap();

        assert_eq!(tree.header.level_name, "Tree");
        assert_eq!(tree.header.ace_coins, 1);
        assert_eq!(tree.rooms.len(), ROOMS_PER_LEVEL);
        assert!(tree.rooms[2].is_none() && tree.rooms[3].is_none());
        assert_eq!(tree.present_rooms().count(), 2);

        let first = tree.rooms[0].as_ref().unwrap();
        assert_eq!(first.sprites.len(), 1);
        assert_eq!(first.sprites[0].entity_type, Some(EntityType::AceCoin));
        assert_eq!(first.sprites[0].raw_bytes.len(), 5);
        assert_eq!(first.level_settings.len(), 32);
        assert_eq!(first.block_path, vec![TERMINATOR]);

        let second = tree.rooms[1].as_ref().unwrap();
        assert_eq!(second.sprites[0].entity_type, Some(EntityType::BeachedCheepCheep));
        assert_eq!((second.sprites[0].bank, second.sprites[0].x), (1, 4));
    }

    #[test]
    fn test_truncated_level() {
        assert!(matches!(parse_level_tree(&[0, 0, 0]), Err(Sma4Error::Truncated { .. })));

        let bytes = build_level_binary(&Level::create_default("Cut")).unwrap();
        assert!(matches!(
            parse_level_tree(&bytes[..LEVEL_HEADER_LEN + 10]),
            Err(Sma4Error::Truncated { .. })
        ));
        assert!(parse_room(&bytes[..3], 0).is_err());
    }

    #[test]
    fn test_unknown_sprite_lengths() {
        let stream = [0x00, 0x00, 0x99, 1, 2, 0x01, 0x98, 3, 4, 5, 6, TERMINATOR];
        let sprites = parse_sprites(&stream).unwrap();
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].raw_bytes.len(), 4);
        assert_eq!(sprites[1].raw_bytes, vec![0x01, 0x98, 3, 4, 5, 6]);
        assert!(sprites.iter().all(|s| s.entity_type.is_none()));
    }
}
