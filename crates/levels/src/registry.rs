//! Entity registry
//!
//! One immutable [`EntityDescriptor`] per [`EntityType`], built once on first
//! use. Descriptors are plain data plus function pointers: the ids and
//! compatibility sets the binary format needs, and the callbacks that turn a
//! placed entity into object, sprite and transport records.
//!
//! # Object record layout
//! - Bank 0: `[width-1, y, x, id]`
//! - Bank 1: `[(1 << 6) | param1, y, x, id]` optionally followed by `param2`
//!
//! # Sprite record layout
//! - `[bank, id, x, y]` optionally followed by extra parameter bytes

use crate::entity::{BoxColor, EntitySettings, EntityType, Payload, Transport};
use serde::{Deserialize, Serialize};
use sma4_core::{ExitCategory, TilePoint};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Object-set code packing `(objectSet, graphicSet)` into one value
#[inline]
pub const fn encode_object_set(object_set: u8, graphic_set: u8) -> u16 {
    ((object_set as u16) << 8) | graphic_set as u16
}

/// Split an object-set code into `(objectSet, graphicSet)`
#[inline]
pub const fn decode_object_set(code: u16) -> (u8, u8) {
    ((code >> 8) as u8, (code & 0xff) as u8)
}

/// First byte of a bank-tagged object record
#[inline]
pub const fn bank_param1(bank: u8, param: u8) -> u8 {
    (bank << 6) | (param & 0x3f)
}

/// The plain four byte sprite record most sprites use
pub fn simple_sprite_binary(bank: u8, id: u8, x: u8, y: u8) -> Vec<u8> {
    vec![bank, id, x, y]
}

/// Which layer of a room an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Actors,
    Stage,
}

/// Grid cell or free pixel placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    Cell,
    Free,
}

/// Axes along which neighbouring cells may be folded into one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeAxes {
    None,
    X,
    Y,
    XY,
}

impl MergeAxes {
    #[inline]
    pub fn allows_x(&self) -> bool {
        matches!(self, Self::X | Self::XY)
    }

    #[inline]
    pub fn allows_y(&self) -> bool {
        matches!(self, Self::Y | Self::XY)
    }
}

/// Object sets an entity can be rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSets {
    Any,
    Codes(&'static [u16]),
}

/// Acceptable values for one of the six sprite graphic-set slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicSetSlot {
    Any,
    Values(&'static [u8]),
}

pub const ANY_SPRITE_GRAPHIC_SETS: [GraphicSetSlot; 6] = [GraphicSetSlot::Any; 6];

/// Position and extent of one run handed to an object encoder
///
/// `width` and `height` are stored one less than the real size, the way the
/// format stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlacement {
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
}

/// One decoded object record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub bank: u8,
    pub id: u8,
    pub x: u8,
    pub y: u8,
    pub width: u16,
    pub height: u16,
    pub raw_bytes: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub settings: EntitySettings,
}

impl ObjectRecord {
    /// Decode without any entity-specific knowledge
    ///
    /// Bank 0 records are four bytes, bank 1 records are five with the last
    /// byte holding `height-1`. Returns `None` when `bytes` is too short.
    pub fn generic(bytes: &[u8]) -> Option<Self> {
        let bank = bytes.first()? >> 6;
        let len = if bank == 0 { 4 } else { 5 };
        let raw = bytes.get(..len)?;
        let height = if bank == 0 { 1 } else { raw[4] as u16 + 1 };
        Some(Self {
            bank,
            id: raw[3],
            x: raw[2],
            y: raw[1],
            width: (raw[0] & 0x3f) as u16 + 1,
            height,
            raw_bytes: raw.to_vec(),
            entity_type: None,
            settings: EntitySettings::None,
        })
    }
}

pub type ObjectEncoder = fn(&EntityDescriptor, RunPlacement, &EntitySettings) -> Vec<u8>;
pub type SpriteEncoder = fn(&EntityDescriptor, u8, u8, &EntitySettings) -> Vec<u8>;
pub type ObjectDecoder = fn(&EntityDescriptor, &[u8]) -> Option<ObjectRecord>;
pub type TransportSource = fn(&EntityDescriptor, usize, TilePoint, &EntitySettings) -> Vec<Transport>;

/// Static description of one entity type
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub entity_type: EntityType,
    pub layer: LayerKind,
    pub editor_kind: EditorKind,
    pub axes: MergeAxes,

    /// Bank of the record emitted when the entity carries no payload
    pub object_bank: u8,
    pub object_id: u8,
    /// Other ids the same entity is written with (colours, pipe variants)
    pub alternate_object_ids: &'static [u8],
    /// Bank of the records emitted for payload variants
    pub payload_bank: u8,
    pub payload_to_object_id: &'static [(Payload, u8)],

    pub object_sets: ObjectSets,
    pub sprite_graphic_sets: [GraphicSetSlot; 6],
    pub rotation_graphic_set: Option<u8>,

    /// Default footprint in tiles
    pub width: u8,
    pub height: u8,
    pub default_settings: EntitySettings,
    pub deletable: bool,

    pub to_object_binary: Option<ObjectEncoder>,
    pub to_sprite_binary: Option<SpriteEncoder>,
    pub sprite_record_len: usize,
    pub parse_object_binary: Option<ObjectDecoder>,
    pub transports: Option<TransportSource>,
    pub transport_category: Option<ExitCategory>,
    /// Whether parsed records with this entity's ids resolve to it. Off for
    /// entities whose object id another type already claims.
    pub decodable: bool,
}

impl EntityDescriptor {
    const fn base(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            layer: LayerKind::Stage,
            editor_kind: EditorKind::Cell,
            axes: MergeAxes::None,
            object_bank: 0,
            object_id: 0,
            alternate_object_ids: &[],
            payload_bank: 0,
            payload_to_object_id: &[],
            object_sets: ObjectSets::Any,
            sprite_graphic_sets: ANY_SPRITE_GRAPHIC_SETS,
            rotation_graphic_set: None,
            width: 1,
            height: 1,
            default_settings: EntitySettings::None,
            deletable: true,
            to_object_binary: None,
            to_sprite_binary: None,
            sprite_record_len: 4,
            parse_object_binary: None,
            transports: None,
            transport_category: None,
            decodable: true,
        }
    }

    /// Object id written for `payload`, if this entity supports it
    pub fn payload_object_id(&self, payload: Payload) -> Option<u8> {
        self.payload_to_object_id
            .iter()
            .find(|(p, _)| *p == payload)
            .map(|(_, id)| *id)
    }

    /// Payload written with `object_id`, if any
    pub fn payload_for_object_id(&self, object_id: u8) -> Option<Payload> {
        self.payload_to_object_id
            .iter()
            .find(|(_, id)| *id == object_id)
            .map(|(p, _)| *p)
    }

    pub fn is_cell(&self) -> bool {
        self.editor_kind == EditorKind::Cell
    }
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

fn bank0_object(desc: &EntityDescriptor, run: RunPlacement, _settings: &EntitySettings) -> Vec<u8> {
    vec![0, run.y, run.x, desc.object_id]
}

/// Bank 1, four bytes, run width in param1
fn bank1_width_object(desc: &EntityDescriptor, run: RunPlacement, _settings: &EntitySettings) -> Vec<u8> {
    vec![bank_param1(1, run.width), run.y, run.x, desc.object_id]
}

/// Bank 1, four bytes, run height in param1 (vertical-only objects)
fn bank1_height_object(desc: &EntityDescriptor, run: RunPlacement, _settings: &EntitySettings) -> Vec<u8> {
    vec![bank_param1(1, run.height), run.y, run.x, desc.object_id]
}

/// Bank 1, five bytes, run width then run height
fn bank1_width_height_object(desc: &EntityDescriptor, run: RunPlacement, _settings: &EntitySettings) -> Vec<u8> {
    vec![bank_param1(1, run.width), run.y, run.x, desc.object_id, run.height]
}

fn settings_size(desc: &EntityDescriptor, settings: &EntitySettings) -> (u8, u8) {
    settings
        .size()
        .or_else(|| desc.default_settings.size())
        .unwrap_or((desc.width, desc.height))
}

fn wood_floor_object(desc: &EntityDescriptor, run: RunPlacement, settings: &EntitySettings) -> Vec<u8> {
    let (w, h) = settings_size(desc, settings);
    vec![
        bank_param1(1, h.saturating_sub(1)),
        run.y,
        run.x,
        desc.object_id,
        w.saturating_sub(1),
    ]
}

fn cloud_platform_thick_object(desc: &EntityDescriptor, run: RunPlacement, settings: &EntitySettings) -> Vec<u8> {
    let (w, h) = settings_size(desc, settings);
    vec![bank_param1(1, h), run.y, run.x, desc.object_id, w]
}

fn metal_box_object(desc: &EntityDescriptor, run: RunPlacement, settings: &EntitySettings) -> Vec<u8> {
    let (w, h) = settings_size(desc, settings);
    let color = match settings {
        EntitySettings::MetalBox { color, .. } => *color,
        _ => BoxColor::White,
    };
    vec![bank_param1(1, w), run.y, run.x, color.object_id(), h]
}

/// Without a payload a whole run is one bank 1 record. A payload splits the
/// run into one bank 0 record per cell.
fn music_block_object(desc: &EntityDescriptor, run: RunPlacement, settings: &EntitySettings) -> Vec<u8> {
    match settings.payload().and_then(|p| desc.payload_object_id(p)) {
        Some(object_id) => {
            let mut bytes = Vec::with_capacity((run.width as usize + 1) * (run.height as usize + 1) * 4);
            for by in 0..=run.height {
                for bx in 0..=run.width {
                    bytes.extend_from_slice(&[
                        0,
                        run.y.wrapping_add(by),
                        run.x.wrapping_add(bx),
                        object_id,
                    ]);
                }
            }
            bytes
        }
        None => bank1_width_object(desc, run, settings),
    }
}

fn buried_vegetable_object(desc: &EntityDescriptor, run: RunPlacement, settings: &EntitySettings) -> Vec<u8> {
    let object_id = settings
        .payload()
        .and_then(|p| desc.payload_object_id(p))
        .unwrap_or(desc.object_id);
    vec![bank_param1(1, 0), run.y, run.x, object_id]
}

fn airship_pipe_object(desc: &EntityDescriptor, run: RunPlacement, settings: &EntitySettings) -> Vec<u8> {
    let (_, height) = settings_size(desc, settings);
    let object_id = if settings.destination().is_some() {
        desc.object_id
    } else {
        desc.alternate_object_ids.first().copied().unwrap_or(desc.object_id)
    };
    vec![bank_param1(1, height.saturating_sub(1)), run.y, run.x, object_id]
}

fn simple_sprite(desc: &EntityDescriptor, x: u8, y: u8, _settings: &EntitySettings) -> Vec<u8> {
    simple_sprite_binary(desc.object_bank, desc.object_id, x, y)
}

fn ace_coin_sprite(desc: &EntityDescriptor, x: u8, y: u8, settings: &EntitySettings) -> Vec<u8> {
    let mut bytes = simple_sprite_binary(desc.object_bank, desc.object_id, x, y);
    bytes.push(settings.ace_coin_index().unwrap_or(0));
    bytes
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

/// Four byte bank 1 record with the width in param1
fn parse_bank1_width(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let raw = bytes.get(..4)?;
    Some(ObjectRecord {
        bank: raw[0] >> 6,
        id: raw[3],
        x: raw[2],
        y: raw[1],
        width: (raw[0] & 0x3f) as u16 + 1,
        height: 1,
        raw_bytes: raw.to_vec(),
        entity_type: Some(desc.entity_type),
        settings: EntitySettings::None,
    })
}

fn parse_bank1_height(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let mut record = parse_bank1_width(desc, bytes)?;
    record.height = record.width;
    record.width = 1;
    Some(record)
}

fn parse_music_block(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let bank = bytes.first()? >> 6;
    if bank == 1 {
        return parse_bank1_width(desc, bytes);
    }
    let mut record = ObjectRecord::generic(bytes)?;
    record.entity_type = Some(desc.entity_type);
    if let Some(payload) = desc.payload_for_object_id(record.id) {
        record.settings = EntitySettings::Payload { payload };
    }
    Some(record)
}

fn parse_buried_vegetable(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let mut record = parse_bank1_width(desc, bytes)?;
    record.width = 1;
    if let Some(payload) = desc.payload_for_object_id(record.id) {
        record.settings = EntitySettings::Payload { payload };
    }
    Some(record)
}

fn parse_airship_pipe(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let mut record = parse_bank1_width(desc, bytes)?;
    let height = (bytes[0] & 0x3f) + 1;
    record.width = desc.width as u16;
    record.height = height as u16;
    record.settings = EntitySettings::Transport {
        height,
        destination: None,
    };
    Some(record)
}

fn parse_wood_floor(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let mut record = ObjectRecord::generic(bytes)?;
    let height = (record.raw_bytes[0] & 0x3f) + 1;
    let width = record.raw_bytes[4].saturating_add(1);
    record.width = width as u16;
    record.height = height as u16;
    record.entity_type = Some(desc.entity_type);
    record.settings = EntitySettings::Size { width, height };
    Some(record)
}

fn parse_cloud_platform_thick(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let mut record = ObjectRecord::generic(bytes)?;
    let height = record.raw_bytes[0] & 0x3f;
    let width = record.raw_bytes[4];
    record.width = width as u16;
    record.height = height as u16;
    record.entity_type = Some(desc.entity_type);
    record.settings = EntitySettings::Size { width, height };
    Some(record)
}

fn parse_metal_box(desc: &EntityDescriptor, bytes: &[u8]) -> Option<ObjectRecord> {
    let mut record = ObjectRecord::generic(bytes)?;
    let width = record.raw_bytes[0] & 0x3f;
    let height = record.raw_bytes[4];
    let color = BoxColor::from_object_id(record.id).unwrap_or(BoxColor::White);
    record.width = width as u16;
    record.height = height as u16;
    record.entity_type = Some(desc.entity_type);
    record.settings = EntitySettings::MetalBox { width, height, color };
    Some(record)
}

fn pipe_transports(desc: &EntityDescriptor, room: usize, tile: TilePoint, settings: &EntitySettings) -> Vec<Transport> {
    let Some(destination) = settings.destination() else {
        return Vec::new();
    };
    let exit_type = destination.exit_type.unwrap_or_else(|| {
        desc.transport_category
            .unwrap_or(ExitCategory::Pipe)
            .default_exit()
    });
    vec![Transport {
        room,
        x: tile.x,
        y: tile.y,
        dest_room: destination.room,
        dest_x: destination.x,
        dest_y: destination.y,
        exit_type,
    }]
}

// ---------------------------------------------------------------------------
// Descriptor table
// ---------------------------------------------------------------------------

const GRAPHIC_SETS_1_TO_15: &[u8] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
const GRAPHIC_SETS_2_TO_15: &[u8] = &[2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
const GRAPHIC_SETS_BELOW_0X16: &[u8] = &[
    0x0, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0x8, 0x9, 0xa, 0xb, 0xc, 0xd, 0xe, 0xf, 0x10, 0x11, 0x12, 0x13,
    0x14, 0x15,
];

const CLOUD_OBJECT_SETS: &[u16] = &[
    encode_object_set(11, 13),
    encode_object_set(13, 13),
    encode_object_set(5, 13),
];
const GRASS_OBJECT_SETS: &[u16] = &[encode_object_set(14, 3), encode_object_set(3, 3)];
const GRASS_CORNER_OBJECT_SETS: &[u16] = &[encode_object_set(14, 3)];
const WATER_OBJECT_SETS: &[u16] = &[encode_object_set(6, 6)];
const AIRSHIP_OBJECT_SETS: &[u16] = &[encode_object_set(0xa, 10)];
const HILLS_OBJECT_SETS: &[u16] = &[encode_object_set(3, 3), encode_object_set(14, 3)];
const WOOD_OBJECT_SETS: &[u16] = &[encode_object_set(1, 1)];
const FORTRESS_OBJECT_SETS: &[u16] = &[encode_object_set(2, 2)];

fn describe(entity_type: EntityType) -> EntityDescriptor {
    use EntityType::*;

    let base = EntityDescriptor::base(entity_type);
    match entity_type {
        Player => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            deletable: false,
            height: 2,
            ..base
        },
        AceCoin => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            object_id: 0xe8,
            width: 2,
            height: 2,
            default_settings: EntitySettings::AceCoin { ace_coin_index: 0 },
            to_sprite_binary: Some(ace_coin_sprite),
            sprite_record_len: 5,
            ..base
        },
        Bubble => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            object_id: 0xbd,
            width: 2,
            height: 2,
            to_sprite_binary: Some(simple_sprite),
            ..base
        },
        WoodFloor => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_bank: 1,
            object_id: 0xb,
            object_sets: ObjectSets::Codes(WOOD_OBJECT_SETS),
            width: 2,
            default_settings: EntitySettings::Size { width: 2, height: 1 },
            to_object_binary: Some(wood_floor_object),
            parse_object_binary: Some(parse_wood_floor),
            ..base
        },
        MusicBlock => EntityDescriptor {
            axes: MergeAxes::X,
            object_bank: 1,
            object_id: 0x14,
            payload_bank: 0,
            payload_to_object_id: &[
                (Payload::FireFlower, 0x21),
                (Payload::Leaf, 0x22),
                (Payload::StarMan, 0x23),
            ],
            to_object_binary: Some(music_block_object),
            parse_object_binary: Some(parse_music_block),
            ..base
        },
        MusicBlockThreeWay => EntityDescriptor {
            axes: MergeAxes::X,
            object_bank: 1,
            object_id: 0x13,
            to_object_binary: Some(bank1_width_object),
            parse_object_binary: Some(parse_bank1_width),
            ..base
        },
        BuriedVegetable => EntityDescriptor {
            object_bank: 1,
            object_id: 0x66,
            payload_bank: 1,
            payload_to_object_id: &[
                (Payload::Coin, 0x63),
                (Payload::CoinCache, 0x64),
                (Payload::GiantVegetable, 0x5a),
                (Payload::KoopaShell, 0x7e),
                (Payload::OneUpMushroom, 0x65),
                (Payload::PoisonMushroom, 0x67),
                (Payload::RegularVegetable, 0x5b),
                (Payload::SmallVegetable, 0x5c),
            ],
            default_settings: EntitySettings::Payload {
                payload: Payload::SmallVegetable,
            },
            to_object_binary: Some(buried_vegetable_object),
            parse_object_binary: Some(parse_buried_vegetable),
            ..base
        },
        Cactus => EntityDescriptor {
            axes: MergeAxes::Y,
            object_bank: 1,
            object_id: 0x2e,
            to_object_binary: Some(bank1_height_object),
            parse_object_binary: Some(parse_bank1_height),
            ..base
        },
        MetalMushroom => EntityDescriptor {
            axes: MergeAxes::XY,
            object_bank: 1,
            object_id: 0x51,
            to_object_binary: Some(bank1_width_height_object),
            ..base
        },
        Water => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_id: 0xd,
            object_sets: ObjectSets::Codes(WATER_OBJECT_SETS),
            to_object_binary: Some(bank0_object),
            ..base
        },
        GrassStaircaseUpLeft => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_id: 0x3b,
            object_sets: ObjectSets::Codes(GRASS_OBJECT_SETS),
            width: 8,
            height: 6,
            to_object_binary: Some(bank0_object),
            ..base
        },
        GrassUpperRightCorner => EntityDescriptor {
            object_id: 0x4,
            object_sets: ObjectSets::Codes(GRASS_CORNER_OBJECT_SETS),
            to_object_binary: Some(bank0_object),
            ..base
        },
        BackgroundHillsTexturedLarge => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_id: 0x2c,
            object_sets: ObjectSets::Codes(HILLS_OBJECT_SETS),
            width: 6,
            height: 8,
            to_object_binary: Some(bank0_object),
            ..base
        },
        UndergroundFlatTerrainUpperLeftCorner => EntityDescriptor {
            object_id: 0x1,
            to_object_binary: Some(bank0_object),
            ..base
        },
        PipeAirshipVertical => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_bank: 1,
            object_id: 0x17,
            alternate_object_ids: &[0x18],
            object_sets: ObjectSets::Codes(AIRSHIP_OBJECT_SETS),
            width: 2,
            height: 2,
            default_settings: EntitySettings::Transport {
                height: 2,
                destination: None,
            },
            to_object_binary: Some(airship_pipe_object),
            parse_object_binary: Some(parse_airship_pipe),
            transports: Some(pipe_transports),
            transport_category: Some(ExitCategory::Pipe),
            ..base
        },
        ColorfulMetalBox => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_bank: 1,
            object_id: 0x4,
            alternate_object_ids: &[0x5, 0x6, 0x7],
            object_sets: ObjectSets::Codes(WOOD_OBJECT_SETS),
            width: 2,
            height: 2,
            default_settings: EntitySettings::MetalBox {
                width: 2,
                height: 2,
                color: BoxColor::White,
            },
            to_object_binary: Some(metal_box_object),
            parse_object_binary: Some(parse_metal_box),
            ..base
        },
        CloudPlatformThin => EntityDescriptor {
            axes: MergeAxes::X,
            object_bank: 1,
            object_id: 0xc,
            object_sets: ObjectSets::Codes(CLOUD_OBJECT_SETS),
            to_object_binary: Some(bank1_width_object),
            parse_object_binary: Some(parse_bank1_width),
            ..base
        },
        CloudPlatformThick => EntityDescriptor {
            editor_kind: EditorKind::Free,
            object_bank: 1,
            object_id: 0xd,
            object_sets: ObjectSets::Codes(CLOUD_OBJECT_SETS),
            width: 4,
            height: 2,
            default_settings: EntitySettings::Size { width: 4, height: 2 },
            to_object_binary: Some(cloud_platform_thick_object),
            parse_object_binary: Some(parse_cloud_platform_thick),
            ..base
        },
        CeilingBuzzyBeetle => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            object_id: 0x68,
            sprite_graphic_sets: [
                GraphicSetSlot::Values(GRAPHIC_SETS_1_TO_15),
                GraphicSetSlot::Values(GRAPHIC_SETS_1_TO_15),
                GraphicSetSlot::Any,
                GraphicSetSlot::Values(GRAPHIC_SETS_1_TO_15),
                GraphicSetSlot::Values(GRAPHIC_SETS_1_TO_15),
                GraphicSetSlot::Values(GRAPHIC_SETS_1_TO_15),
            ],
            to_sprite_binary: Some(simple_sprite),
            ..base
        },
        Flurry => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            object_id: 0xed,
            sprite_graphic_sets: [
                GraphicSetSlot::Any,
                GraphicSetSlot::Any,
                GraphicSetSlot::Any,
                GraphicSetSlot::Any,
                GraphicSetSlot::Any,
                GraphicSetSlot::Values(&[0xf]),
            ],
            to_sprite_binary: Some(simple_sprite),
            ..base
        },
        BeachedCheepCheep => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            object_bank: 1,
            object_id: 0x2c,
            sprite_graphic_sets: [
                GraphicSetSlot::Any,
                GraphicSetSlot::Any,
                GraphicSetSlot::Any,
                GraphicSetSlot::Values(GRAPHIC_SETS_2_TO_15),
                GraphicSetSlot::Any,
                GraphicSetSlot::Values(GRAPHIC_SETS_BELOW_0X16),
            ],
            to_sprite_binary: Some(simple_sprite),
            ..base
        },
        RedKoopaTroopa => EntityDescriptor {
            layer: LayerKind::Actors,
            editor_kind: EditorKind::Free,
            object_id: 0x6d,
            height: 2,
            to_sprite_binary: Some(simple_sprite),
            ..base
        },
        // bank 1 id 0xb reads back as WoodFloor
        FortressSpike => EntityDescriptor {
            axes: MergeAxes::X,
            object_bank: 1,
            object_id: 0xb,
            object_sets: ObjectSets::Codes(FORTRESS_OBJECT_SETS),
            to_object_binary: Some(bank1_width_object),
            decodable: false,
            ..base
        },
    }
}

/// Lookup table over every entity type
#[derive(Debug)]
pub struct Registry {
    /// Indexed by `EntityType as usize`
    descriptors: Vec<EntityDescriptor>,
    bank0_objects: HashMap<u8, EntityType>,
    bank1_objects: HashMap<u8, EntityType>,
    bank0_sprites: HashMap<u8, EntityType>,
    bank1_sprites: HashMap<u8, EntityType>,
}

impl Registry {
    /// The process-wide registry, built on first use
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::build)
    }

    fn build() -> Self {
        let descriptors: Vec<EntityDescriptor> = EntityType::ALL.iter().map(|t| describe(*t)).collect();

        let mut registry = Self {
            descriptors: Vec::new(),
            bank0_objects: HashMap::new(),
            bank1_objects: HashMap::new(),
            bank0_sprites: HashMap::new(),
            bank1_sprites: HashMap::new(),
        };

        for desc in &descriptors {
            if desc.to_object_binary.is_some() && desc.decodable {
                registry.register_object(desc.object_bank, desc.object_id, desc.entity_type);
                for id in desc.alternate_object_ids {
                    registry.register_object(desc.object_bank, *id, desc.entity_type);
                }
                for (_, id) in desc.payload_to_object_id {
                    registry.register_object(desc.payload_bank, *id, desc.entity_type);
                }
            }

            if let Some(encode) = desc.to_sprite_binary {
                let bytes = encode(desc, 0, 0, &desc.default_settings);
                let map = if bytes[0] == 0 {
                    &mut registry.bank0_sprites
                } else {
                    &mut registry.bank1_sprites
                };
                if let Some(existing) = map.insert(bytes[1], desc.entity_type) {
                    tracing::warn!("sprite id {:#04x} shared by {:?} and {:?}", bytes[1], existing, desc.entity_type);
                }
            }
        }

        registry.descriptors = descriptors;
        registry
    }

    fn register_object(&mut self, bank: u8, id: u8, entity_type: EntityType) {
        let map = if bank == 0 {
            &mut self.bank0_objects
        } else {
            &mut self.bank1_objects
        };
        if let Some(existing) = map.insert(id, entity_type) {
            if existing != entity_type {
                tracing::warn!("object id {:#04x} (bank {}) shared by {:?} and {:?}", id, bank, existing, entity_type);
            }
        }
    }

    /// Descriptor for `entity_type`
    #[inline]
    pub fn get(&self, entity_type: EntityType) -> &EntityDescriptor {
        &self.descriptors[entity_type as usize]
    }

    pub fn descriptors(&self) -> &[EntityDescriptor] {
        &self.descriptors
    }

    /// Entity type written with object `id` in `bank`
    pub fn object_type_for(&self, bank: u8, id: u8) -> Option<EntityType> {
        match bank {
            0 => self.bank0_objects.get(&id).copied(),
            1 => self.bank1_objects.get(&id).copied(),
            _ => None,
        }
    }

    /// Entity type written with sprite `id` in `bank`
    pub fn sprite_type_for(&self, bank: u8, id: u8) -> Option<EntityType> {
        match bank {
            0 => self.bank0_sprites.get(&id).copied(),
            1 => self.bank1_sprites.get(&id).copied(),
            _ => None,
        }
    }
}

impl EntityType {
    /// Shorthand for `Registry::global().get(self)`
    #[inline]
    pub fn descriptor(self) -> &'static EntityDescriptor {
        Registry::global().get(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(x: u8, y: u8, width: u8, height: u8) -> RunPlacement {
        RunPlacement { x, y, width, height }
    }

    #[test]
    fn test_descriptor_table_order() {
        let registry = Registry::global();
        for (i, t) in EntityType::ALL.iter().enumerate() {
            assert_eq!(registry.descriptors()[i].entity_type, *t);
            assert_eq!(t.descriptor().entity_type, *t);
        }
    }

    #[test]
    fn test_object_set_code() {
        let code = encode_object_set(14, 3);
        assert_eq!(decode_object_set(code), (14, 3));
        assert_eq!(bank_param1(1, 5), 0x45);
        assert_eq!(bank_param1(0, 25), 25);
    }

    #[test]
    fn test_reverse_object_lookup() {
        let registry = Registry::global();
        assert_eq!(registry.object_type_for(1, 0x14), Some(EntityType::MusicBlock));
        assert_eq!(registry.object_type_for(0, 0x22), Some(EntityType::MusicBlock));
        assert_eq!(registry.object_type_for(1, 0x5b), Some(EntityType::BuriedVegetable));
        assert_eq!(registry.object_type_for(1, 0x18), Some(EntityType::PipeAirshipVertical));
        assert_eq!(registry.object_type_for(1, 0x6), Some(EntityType::ColorfulMetalBox));
        assert_eq!(registry.object_type_for(0, 0x4), Some(EntityType::GrassUpperRightCorner));
        assert_eq!(registry.object_type_for(0, 0xfe), None);
    }

    #[test]
    fn test_reverse_sprite_lookup() {
        let registry = Registry::global();
        assert_eq!(registry.sprite_type_for(0, 0x68), Some(EntityType::CeilingBuzzyBeetle));
        assert_eq!(registry.sprite_type_for(1, 0x2c), Some(EntityType::BeachedCheepCheep));
        assert_eq!(registry.sprite_type_for(0, 0x2c), None);
        assert_eq!(registry.sprite_type_for(0, 0x6d), Some(EntityType::RedKoopaTroopa));
    }

    #[test]
    fn test_music_block_payload_splits_run() {
        let desc = EntityType::MusicBlock.descriptor();
        let encode = desc.to_object_binary.unwrap();

        let plain = encode(desc, run(4, 0x1a, 2, 0), &EntitySettings::None);
        assert_eq!(plain, vec![0x42, 0x1a, 4, 0x14]);

        let leaf = EntitySettings::Payload { payload: Payload::Leaf };
        let split = encode(desc, run(4, 0x1a, 1, 0), &leaf);
        assert_eq!(split, vec![0, 0x1a, 4, 0x22, 0, 0x1a, 5, 0x22]);
    }

    #[test]
    fn test_wood_floor_uses_settings_size() {
        let desc = EntityType::WoodFloor.descriptor();
        let encode = desc.to_object_binary.unwrap();
        let bytes = encode(desc, run(3, 0x19, 0, 0), &EntitySettings::Size { width: 5, height: 3 });
        assert_eq!(bytes, vec![0x42, 0x19, 3, 0xb, 4]);

        let parsed = (desc.parse_object_binary.unwrap())(desc, &bytes).unwrap();
        assert_eq!(parsed.settings, EntitySettings::Size { width: 5, height: 3 });
        assert_eq!((parsed.width, parsed.height), (5, 3));
    }

    #[test]
    fn test_pipe_object_id_depends_on_destination() {
        let desc = EntityType::PipeAirshipVertical.descriptor();
        let encode = desc.to_object_binary.unwrap();

        let unwired = encode(desc, run(1, 2, 0, 0), &desc.default_settings);
        assert_eq!(unwired, vec![0x41, 2, 1, 0x18]);

        let wired = EntitySettings::Transport {
            height: 3,
            destination: Some(crate::entity::TransportDestination::unset()),
        };
        assert_eq!(encode(desc, run(1, 2, 0, 0), &wired), vec![0x42, 2, 1, 0x17]);
    }

    #[test]
    fn test_buried_vegetable_payload() {
        let desc = EntityType::BuriedVegetable.descriptor();
        let encode = desc.to_object_binary.unwrap();
        let bytes = encode(desc, run(7, 8, 0, 0), &EntitySettings::Payload { payload: Payload::KoopaShell });
        assert_eq!(bytes, vec![0x40, 8, 7, 0x7e]);
        let empty = encode(desc, run(7, 8, 0, 0), &EntitySettings::None);
        assert_eq!(empty[3], 0x66);

        let parsed = (desc.parse_object_binary.unwrap())(desc, &bytes).unwrap();
        assert_eq!(parsed.settings.payload(), Some(Payload::KoopaShell));
        assert_eq!(parsed.raw_bytes.len(), 4);
    }

    #[test]
    fn test_generic_decode() {
        let bank0 = ObjectRecord::generic(&[0x03, 0x10, 0x20, 0x0d]).unwrap();
        assert_eq!((bank0.bank, bank0.width, bank0.height), (0, 4, 1));

        let bank1 = ObjectRecord::generic(&[0x41, 0x10, 0x20, 0x51, 0x02]).unwrap();
        assert_eq!((bank1.bank, bank1.id, bank1.width, bank1.height), (1, 0x51, 2, 3));

        assert!(ObjectRecord::generic(&[0x41, 0x10, 0x20, 0x51]).is_none());
    }

    #[test]
    fn test_pipe_transport_defaults_exit() {
        let desc = EntityType::PipeAirshipVertical.descriptor();
        let settings = EntitySettings::Transport {
            height: 2,
            destination: Some(crate::entity::TransportDestination {
                room: 1,
                x: 4,
                y: 5,
                exit_type: None,
            }),
        };
        let transports = (desc.transports.unwrap())(desc, 0, TilePoint::new(3, 9), &settings);
        assert_eq!(transports.len(), 1);
        assert_eq!(transports[0].exit_type, sma4_core::ExitType::UpFromPipe);
        assert_eq!((transports[0].x, transports[0].y), (3, 9));
    }

    #[test]
    fn test_single_code_object_sets() {
        let sets = |t: EntityType| match t.descriptor().object_sets {
            ObjectSets::Codes(codes) => codes.to_vec(),
            ObjectSets::Any => Vec::new(),
        };
        assert_eq!(sets(EntityType::Water), vec![encode_object_set(6, 6)]);
        assert_eq!(sets(EntityType::GrassUpperRightCorner), vec![encode_object_set(14, 3)]);
        assert_eq!(sets(EntityType::PipeAirshipVertical), vec![encode_object_set(0xa, 10)]);
    }

    #[test]
    fn test_fortress_spike_encodes_but_reads_as_wood_floor() {
        let desc = EntityType::FortressSpike.descriptor();
        assert!(desc.is_cell());
        assert!(desc.axes.allows_x());
        let encode = desc.to_object_binary.unwrap();
        assert_eq!(encode(desc, run(3, 20, 4, 0), &EntitySettings::None), vec![0x44, 20, 3, 0xb]);

        assert_eq!(Registry::global().object_type_for(1, 0xb), Some(EntityType::WoodFloor));
    }
}
