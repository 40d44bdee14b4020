//! Byte-level primitives of the level format
//!
//! Y coordinates are stored relative to a fixed 28-row window anchored at
//! the bottom of the room, so the same tile row encodes differently in rooms
//! of different heights. Pointers are little-endian `u16` offsets from the
//! start of the level blob.

use bytes::{Buf, BufMut, BytesMut};
use sma4_core::{Result, Sma4Error};

/// Highest encoded Y value (28 rows, 0x00-0x1b)
pub const MAX_Y: i32 = 0x1b;

/// Stream terminator
pub const TERMINATOR: u8 = 0xff;

/// Encode an editor tile row for a room `room_height` tiles tall
///
/// # Format
/// `MAX_Y - (room_height - 1 - y)`
#[inline]
pub const fn encode_y(y: i32, room_height: i32) -> i32 {
    MAX_Y - (room_height - 1 - y)
}

/// Inverse of [`encode_y`]
#[inline]
pub const fn decode_y(encoded: i32, room_height: i32) -> i32 {
    encoded + room_height - 1 - MAX_Y
}

/// Narrow a computed coordinate or count to one byte
#[inline]
pub fn to_byte(value: i32, what: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| Sma4Error::InvalidData(format!("{} {} does not fit in a byte", what, value)))
}

/// Timer as two nibble-packed decimal bytes
///
/// # Format
/// - Clamped to 1..=999
/// - Byte 0: hundreds digit
/// - Byte 1: tens digit in the high nibble, ones digit in the low nibble
#[inline]
pub fn timer_bytes(timer: i32) -> [u8; 2] {
    let clamped = timer.clamp(1, 999) as u32;
    let hundreds = (clamped / 100) as u8 & 0xf;
    let tens = ((clamped / 10) % 10) as u8 & 0xf;
    let ones = (clamped % 10) as u8 & 0xf;
    [hundreds, (tens << 4) | ones]
}

/// Inverse of [`timer_bytes`]
#[inline]
pub fn decode_timer(bytes: [u8; 2]) -> u16 {
    let hundreds = (bytes[0] & 0xf) as u16;
    let tens = (bytes[1] >> 4) as u16;
    let ones = (bytes[1] & 0xf) as u16;
    hundreds * 100 + tens * 10 + ones
}

/// Write a little-endian pointer
#[inline]
pub fn write_pointer(buf: &mut BytesMut, value: u16) {
    buf.put_u16_le(value);
}

/// Read a little-endian pointer
#[inline]
pub fn read_pointer(buf: &mut &[u8]) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(Sma4Error::InvalidData("Not enough bytes for pointer".into()));
    }
    Ok(buf.get_u16_le())
}

/// Read the little-endian pointer stored at `offset` of `data`
pub fn pointer_at(data: &[u8], offset: usize) -> Result<u16> {
    let mut slice = data.get(offset..).ok_or(Sma4Error::Truncated { offset, needed: 2 })?;
    read_pointer(&mut slice).map_err(|_| Sma4Error::Truncated { offset, needed: 2 })
}

/// Convert a running offset into a pointer value
#[inline]
pub fn pointer_value(offset: usize) -> Result<u16> {
    u16::try_from(offset).map_err(|_| Sma4Error::InvalidData(format!("level data too large: offset {:#x}", offset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_encoding_full_height_room() {
        // a 28 row room maps rows straight through
        assert_eq!(encode_y(0, 28), 0);
        assert_eq!(encode_y(27, 28), MAX_Y);
    }

    #[test]
    fn test_y_encoding_short_room() {
        // bottom row is always MAX_Y
        assert_eq!(encode_y(9, 10), MAX_Y);
        assert_eq!(encode_y(0, 10), MAX_Y - 9);
    }

    #[test]
    fn test_y_encoding_invertible() {
        for height in 10..=28 {
            for y in 0..height {
                assert_eq!(decode_y(encode_y(y, height), height), y, "height {} y {}", height, y);
            }
        }
    }

    #[test]
    fn test_timer_bytes() {
        assert_eq!(timer_bytes(300), [3, 0x00]);
        assert_eq!(timer_bytes(259), [2, 0x59]);
        assert_eq!(timer_bytes(7), [0, 0x07]);
        assert_eq!(timer_bytes(0), [0, 0x01]);
        assert_eq!(timer_bytes(5000), [9, 0x99]);
        assert_eq!(decode_timer(timer_bytes(481)), 481);
    }

    #[test]
    fn test_pointer_read_write() {
        let mut buf = BytesMut::new();
        write_pointer(&mut buf, 0x1234);
        assert_eq!(&buf[..], &[0x34, 0x12]);
        assert_eq!(pointer_at(&buf, 0).unwrap(), 0x1234);
        assert!(matches!(pointer_at(&buf, 1), Err(Sma4Error::Truncated { .. })));
        assert!(matches!(pointer_at(&buf, 5), Err(Sma4Error::Truncated { .. })));
    }

    #[test]
    fn test_to_byte_bounds() {
        assert_eq!(to_byte(255, "x").unwrap(), 255);
        assert!(to_byte(256, "x").is_err());
        assert!(to_byte(-1, "y").is_err());
    }
}
