//! # SMA4 Level Codec
//!
//! Converts editor levels to and from the packed e-Reader level format used
//! by Super Mario Advance 4. Output is bit-exact: the game rejects or
//! misreads anything else.
//!
//! ## Architecture
//!
//! ### 1. Primitives ([`primitives`])
//! - Y re-encoding onto the fixed 28-row window (`MAX_Y = 0x1b`)
//! - Nibble-packed timer, little-endian pointers
//!
//! ### 2. Encoding
//! - [`merge`]: collapses painted cells into rectangular runs
//! - [`constraints`]: resolves the object set, sprite graphic sets and rotation a room shares
//! - [`transports`]: pipe and door records between rooms
//! - [`layout`]: per-room streams, pointer table, header and name
//!
//! ### 3. Decoding
//! - [`parser`]: pointer table walk, object and sprite records
//! - [`import`]: rebuilds an editor level from a decoded tree
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sma4_codec::{build_level_binary, parse_level_tree};
//! use sma4_levels::Level;
//!
//! let level = Level::create_default("Level 1");
//! let bytes = build_level_binary(&level).unwrap();
//! let tree = parse_level_tree(&bytes).unwrap();
//! assert_eq!(tree.header.level_name, "Level 1");
//! ```

pub mod primitives;
pub mod name;
pub mod merge;
pub mod constraints;
pub mod transports;
pub mod layout;
pub mod parser;
pub mod import;

// Re-export commonly used items
pub use constraints::{resolve_room_constraints, RoomConstraints};
pub use import::import_level;
pub use layout::{build_level_binary, build_level_binary_with, build_room, EncodeOptions, RoomStreams};
pub use merge::{layer_runs, merge_runs, Run};
pub use name::{decode_level_name, encode_level_name};
pub use parser::{parse_level_tree, parse_room, LevelHeader, LevelTree, LevelTreeRoom, ObjectHeader, SpriteRecord};
pub use primitives::{decode_y, encode_y, MAX_Y};
pub use transports::{decode_transports, resolve_transports, ResolvedTransport};
