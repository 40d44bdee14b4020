//! Level name codec
//!
//! The e-Reader menu shows level names in the game's own character set.
//! Names occupy at most 21 bytes; shorter names end with a `0xFF` byte.

use crate::primitives::TERMINATOR;

/// Longest name the format stores, in characters
pub const LEVEL_NAME_MAX_LEN: usize = 21;

/// Character set in byte order: the byte value is the index into this table
const CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz .,!?-'&:";

/// Byte written for characters outside the character set (a space)
const FALLBACK: u8 = 0x3e;

/// Game byte for one character
pub fn encode_char(c: char) -> Option<u8> {
    CHARSET.chars().position(|candidate| candidate == c).map(|i| i as u8)
}

/// Character for one game byte
pub fn decode_char(byte: u8) -> Option<char> {
    CHARSET.chars().nth(byte as usize)
}

/// True when every character of `name` has a game encoding
pub fn is_representable(name: &str) -> bool {
    name.chars().all(|c| encode_char(c).is_some())
}

/// Encode a name, truncating to 21 characters and terminating shorter names
pub fn encode_level_name(name: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = name
        .chars()
        .take(LEVEL_NAME_MAX_LEN)
        .map(|c| encode_char(c).unwrap_or(FALLBACK))
        .collect();

    if bytes.len() < LEVEL_NAME_MAX_LEN {
        bytes.push(TERMINATOR);
    }
    bytes
}

/// Decode a name, stopping at the terminator or after 21 bytes
pub fn decode_level_name(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(LEVEL_NAME_MAX_LEN)
        .take_while(|b| **b != TERMINATOR)
        .map(|b| decode_char(*b).unwrap_or(' '))
        .collect()
}

/// Number of bytes the encoded name occupies at the start of `bytes`
pub fn encoded_name_len(bytes: &[u8]) -> usize {
    match bytes.iter().take(LEVEL_NAME_MAX_LEN).position(|b| *b == TERMINATOR) {
        Some(pos) => pos + 1,
        None => bytes.len().min(LEVEL_NAME_MAX_LEN),
    }
}
