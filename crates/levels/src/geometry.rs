//! Bounds, overlap and flood fill helpers

use crate::entity::{EntitySettings, EntityType, PlacedEntity, Placement};
use crate::level::CellGrid;
use sma4_core::{EntityId, EntityIdSequence, PixelPoint, TileBounds, TilePoint, TILE_SIZE};
use std::collections::HashSet;

/// Pixel rectangle, right and bottom edges exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub upper_left: PixelPoint,
    pub lower_right: PixelPoint,
}

/// Tiles covered by `entity`
///
/// Size comes from the entity's settings when they carry one, otherwise
/// from the registry default.
pub fn entity_tile_bounds(entity: &PlacedEntity) -> TileBounds {
    let desc = entity.entity_type.descriptor();
    let (width, height) = entity
        .settings
        .size()
        .unwrap_or((desc.width, desc.height));
    TileBounds::from_size(entity.placement.tile(), width as i32, height as i32)
}

pub fn entity_pixel_bounds(entity: &PlacedEntity) -> PixelBounds {
    let tiles = entity_tile_bounds(entity);
    PixelBounds {
        upper_left: tiles.upper_left.to_pixels(),
        lower_right: PixelPoint::new(
            tiles.lower_right.x * TILE_SIZE + TILE_SIZE,
            tiles.lower_right.y * TILE_SIZE + TILE_SIZE,
        ),
    }
}

#[inline]
pub fn point_is_inside(point: TilePoint, bounds: &TileBounds) -> bool {
    bounds.contains(point)
}

/// True when `entity` can be dropped without overlapping any of `others`
///
/// An entity never blocks itself, so moving an existing entity back onto
/// its own footprint is allowed.
pub fn can_drop<'a>(entity: &PlacedEntity, others: impl IntoIterator<Item = &'a PlacedEntity>) -> bool {
    let bounds = entity_tile_bounds(entity);
    !others
        .into_iter()
        .filter(|other| other.id != entity.id)
        .any(|other| bounds.overlaps(&entity_tile_bounds(other)))
}

/// Four-neighbour flood fill over a layer grid
///
/// Starting at `start`, every connected cell matching the start cell's type
/// (or every connected empty cell when the start is empty) becomes
/// `fill_type` with `settings`. Existing cells keep their id; new cells get a
/// fresh id from `ids`. The fill never leaves the `width` x `height` room.
///
/// # Returns
/// Bounds of every tile visited, or `None` when `start` is outside the room
pub fn flood_fill(
    grid: &mut CellGrid,
    fill_type: EntityType,
    settings: &EntitySettings,
    start: TilePoint,
    width: i32,
    height: i32,
    ids: &EntityIdSequence,
) -> Option<TileBounds> {
    let outside = |p: TilePoint| p.x < 0 || p.x >= width || p.y < 0 || p.y >= height;
    if outside(start) {
        return None;
    }

    let target: Option<EntityType> = grid.get(start.x, start.y).map(|e| e.entity_type);
    let mut bounds = TileBounds::new(start, start);
    let mut seen: HashSet<TilePoint> = HashSet::new();
    let mut to_process = vec![start];

    while let Some(point) = to_process.pop() {
        if outside(point) || !seen.insert(point) {
            continue;
        }
        bounds.include(point);

        let current = grid.get(point.x, point.y).map(|e| e.entity_type);
        let explore = match (current, target) {
            (Some(current_type), Some(target_type)) if current_type == target_type => {
                if let Some(cell) = grid.get_mut(point.x, point.y) {
                    cell.entity_type = fill_type;
                    cell.settings = settings.clone();
                }
                true
            }
            (None, None) => {
                grid.insert(new_cell(ids.next_id(), fill_type, point, settings));
                true
            }
            _ => false,
        };

        if explore {
            to_process.push(TilePoint::new(point.x - 1, point.y));
            to_process.push(TilePoint::new(point.x + 1, point.y));
            to_process.push(TilePoint::new(point.x, point.y - 1));
            to_process.push(TilePoint::new(point.x, point.y + 1));
        }
    }

    Some(bounds)
}

fn new_cell(id: EntityId, entity_type: EntityType, point: TilePoint, settings: &EntitySettings) -> PlacedEntity {
    PlacedEntity::new(id, entity_type, Placement::cell(point), settings.clone())
}
