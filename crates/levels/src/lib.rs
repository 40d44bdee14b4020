//! # SMA4 Levels
//!
//! Editor-side model of an e-Reader level for Super Mario Advance 4.
//!
//! ## Features
//! - Level, room, layer and placed-entity model with typed settings
//! - Entity registry: ids, banks, compatibility sets and binary callbacks
//! - Geometry helpers: bounds, overlap, flood fill
//! - Editing operations that keep ace coin indices and transports valid
//! - JSON level documents
//!
//! ## Level Structure
//!
//! - **Level**: name, timer, one to four rooms
//! - **Room**: size in tiles, presentation settings, `actors` and `stage` layers
//! - **Layer**: sparse cell grid plus free entities in pixel space

pub mod error;
pub mod entity;
pub mod registry;
pub mod level;
pub mod geometry;
pub mod editor;
pub mod parser;

pub use error::{LevelError, Result};
pub use entity::{BoxColor, EntitySettings, EntityType, Payload, PlacedEntity, Placement, Transport, TransportDestination};
pub use registry::{EntityDescriptor, LayerKind, MergeAxes, ObjectRecord, Registry};
pub use level::{CellGrid, Level, LevelSettings, Room, RoomLayer, RoomSettings};
pub use parser::LevelLoader;
