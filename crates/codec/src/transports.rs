//! Transport resolver
//!
//! # Stream layout
//! - `[count, 0]`
//! - `count` records of 10 bytes:
//!   `[src y, src x, dest room, 0, dest y, dest x, 16, 7, category, subtype]`
//!
//! Both Y values use the Y encoding of their own room. Destinations entered
//! with [`ExitType::DownFromPipe`] are stored one row higher, wrapping to
//! `0xff` when the destination is the top row of a full-height room.

use crate::primitives::{decode_y, encode_y, to_byte};
use serde::{Deserialize, Serialize};
use sma4_core::{ExitType, Result, Sma4Error};
use sma4_levels::level::Room;
use sma4_levels::Transport;
use tracing::{debug, warn};

/// Bytes per transport record
pub const TRANSPORT_RECORD_LEN: usize = 10;
/// Bytes before the first record
pub const TRANSPORT_HEADER_LEN: usize = 2;

/// Camera-centering constants copied from the game's own levels
const CAMERA_Y: u8 = 16;
const CAMERA_X: u8 = 7;

/// Every transport declared by entities of `room`, in entity order
pub fn collect_transports(room_index: usize, room: &Room) -> Vec<Transport> {
    room.all_entities()
        .flat_map(|entity| {
            let descriptor = entity.entity_type.descriptor();
            match descriptor.transports {
                Some(source) => source(descriptor, room_index, entity.placement.tile(), &entity.settings),
                None => Vec::new(),
            }
        })
        .collect()
}

fn encode_transport(transport: &Transport, source_height: i32, dest_height: i32) -> Result<[u8; TRANSPORT_RECORD_LEN]> {
    let mut dest_y = to_byte(encode_y(transport.dest_y, dest_height), "destination y")?;
    if transport.exit_type == ExitType::DownFromPipe {
        dest_y = dest_y.wrapping_sub(1);
    }

    Ok([
        to_byte(encode_y(transport.y, source_height), "transport y")?,
        to_byte(transport.x, "transport x")?,
        to_byte(transport.dest_room, "destination room")?,
        0,
        dest_y,
        to_byte(transport.dest_x, "destination x")?,
        CAMERA_Y,
        CAMERA_X,
        transport.exit_type.category_byte(),
        transport.exit_type.subtype_byte(),
    ])
}

/// Transport stream for room `room_index` of `rooms`
///
/// Incomplete transports are skipped and do not count towards the header.
pub fn resolve_transports(room_index: usize, rooms: &[Room]) -> Result<Vec<u8>> {
    let room = rooms
        .get(room_index)
        .ok_or_else(|| Sma4Error::NotFound(format!("room {}", room_index)))?;

    let mut records = Vec::new();
    for transport in collect_transports(room_index, room) {
        if !transport.is_complete() {
            debug!("room {}: skipping incomplete transport at ({}, {})", room_index, transport.x, transport.y);
            continue;
        }
        let Some(dest) = rooms.get(transport.dest_room as usize) else {
            warn!(
                "room {}: transport at ({}, {}) leads to missing room {}",
                room_index, transport.x, transport.y, transport.dest_room
            );
            continue;
        };
        records.push(encode_transport(&transport, room.tile_height, dest.tile_height)?);
    }

    let mut bytes = Vec::with_capacity(TRANSPORT_HEADER_LEN + records.len() * TRANSPORT_RECORD_LEN);
    bytes.push(to_byte(records.len() as i32, "transport count")?);
    bytes.push(0);
    for record in &records {
        bytes.extend_from_slice(record);
    }
    Ok(bytes)
}

/// One transport read back from a stream, in editor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTransport {
    pub x: i32,
    pub y: i32,
    pub dest_room: u8,
    pub dest_x: i32,
    pub dest_y: i32,
    /// `None` when the exit bytes name no known exit type
    pub exit_type: Option<ExitType>,
}

/// Decode a transport stream
///
/// `source_height` is the height of the room owning the stream and
/// `dest_height` maps a destination room index to that room's height.
/// A count larger than the records present yields `Truncated`.
pub fn decode_transports<F>(raw: &[u8], source_height: i32, dest_height: F) -> Result<Vec<ResolvedTransport>>
where
    F: Fn(u8) -> i32,
{
    let count = *raw.first().ok_or(Sma4Error::Truncated { offset: 0, needed: 1 })? as usize;

    let mut transports = Vec::with_capacity(count);
    for i in 0..count {
        let offset = TRANSPORT_HEADER_LEN + i * TRANSPORT_RECORD_LEN;
        let record = raw
            .get(offset..offset + TRANSPORT_RECORD_LEN)
            .ok_or(Sma4Error::Truncated {
                offset,
                needed: TRANSPORT_RECORD_LEN,
            })?;

        let exit_type = ExitType::from_bytes(record[8], record[9]);
        let mut dest_y = record[4];
        if exit_type == Some(ExitType::DownFromPipe) {
            dest_y = dest_y.wrapping_add(1);
        }

        transports.push(ResolvedTransport {
            x: record[1] as i32,
            y: decode_y(record[0] as i32, source_height),
            dest_room: record[2],
            dest_x: record[5] as i32,
            dest_y: decode_y(dest_y as i32, dest_height(record[2])),
            exit_type,
        });
    }
    Ok(transports)
}
