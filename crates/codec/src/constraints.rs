//! Constraint intersector
//!
//! A room stores one object set, six sprite graphic-set bytes and one
//! rotation byte shared by everything in it. Each entity declares what it is
//! compatible with; the room gets the first value every entity accepts.
//!
//! Empty intersections fall back to `0`. The editor keeps incompatible
//! entities apart, so an empty result is not treated as an error here.

use sma4_levels::level::Room;
use sma4_levels::registry::{decode_object_set, GraphicSetSlot, ObjectSets};
use sma4_levels::EntityDescriptor;

/// Resolved per-room configuration bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomConstraints {
    pub object_set: u8,
    pub object_graphic_set: u8,
    pub sprite_graphic_sets: [u8; 6],
    pub rotation: u8,
}

impl RoomConstraints {
    /// Constraints for every entity in `room`
    pub fn for_room(room: &Room) -> Self {
        resolve_room_constraints(room.all_entities().map(|e| e.entity_type.descriptor()))
    }
}

/// Intersect the object-set lists, ignoring entities that accept any set
///
/// Returns the first code of the intersection in the order of the first
/// constraining entity, or `0`.
pub fn intersect_object_sets<I>(sets: I) -> u16
where
    I: IntoIterator<Item = ObjectSets>,
{
    let mut remaining: Option<Vec<u16>> = None;
    for set in sets {
        let ObjectSets::Codes(codes) = set else {
            continue;
        };
        remaining = Some(match remaining {
            None => codes.to_vec(),
            Some(current) => current.into_iter().filter(|c| codes.contains(c)).collect(),
        });
    }
    remaining.and_then(|codes| codes.first().copied()).unwrap_or(0)
}

/// Intersect one sprite graphic-set slot across entities
pub fn intersect_graphic_set_slot<I>(slots: I) -> u8
where
    I: IntoIterator<Item = GraphicSetSlot>,
{
    let mut remaining: Option<Vec<u8>> = None;
    for slot in slots {
        let GraphicSetSlot::Values(values) = slot else {
            continue;
        };
        remaining = Some(match remaining {
            None => values.to_vec(),
            Some(current) => current.into_iter().filter(|v| values.contains(v)).collect(),
        });
    }
    remaining.and_then(|values| values.first().copied()).unwrap_or(0)
}

/// Resolve the shared configuration for a set of entities
pub fn resolve_room_constraints<'a, I>(descriptors: I) -> RoomConstraints
where
    I: IntoIterator<Item = &'a EntityDescriptor>,
{
    let descriptors: Vec<&EntityDescriptor> = descriptors.into_iter().collect();

    let code = intersect_object_sets(descriptors.iter().map(|d| d.object_sets));
    let (object_set, object_graphic_set) = decode_object_set(code);

    let mut sprite_graphic_sets = [0u8; 6];
    for (slot, value) in sprite_graphic_sets.iter_mut().enumerate() {
        *value = intersect_graphic_set_slot(descriptors.iter().map(|d| d.sprite_graphic_sets[slot]));
    }

    let rotation = descriptors
        .iter()
        .find_map(|d| d.rotation_graphic_set)
        .unwrap_or(0);

    RoomConstraints {
        object_set,
        object_graphic_set,
        sprite_graphic_sets,
        rotation,
    }
}
