//! Rectangle/run merger
//!
//! Collapses a layer's sparse cell grid into the smallest set of object
//! records the format can express. Each record covers a rectangle of cells
//! with the same entity type and the same settings.
//!
//! # Algorithm
//! 1. Walk the grid top to bottom, left to right
//! 2. At each cell still present in the working copy, extend right while the
//!    type allows X merging (at most [`MAX_RUN_LENGTH`] cells)
//! 3. If the type allows Y merging, extend every column of that span down
//!    and keep the shortest extension so the result stays a rectangle
//! 4. Erase the rectangle from the working copy and emit one run

use crate::primitives::{encode_y, to_byte};
use sma4_core::Result;
use sma4_levels::level::{CellGrid, RoomLayer};
use sma4_levels::registry::RunPlacement;
use sma4_levels::{EntityDescriptor, EntitySettings, PlacedEntity};

/// Longest run one record can hold. Lengths are stored as `len-1` in six bits.
pub const MAX_RUN_LENGTH: i32 = 26;

/// One rectangle ready for its entity's object encoder
#[derive(Debug, Clone)]
pub struct Run {
    pub descriptor: &'static EntityDescriptor,
    /// Upper left tile, in editor coordinates
    pub x: i32,
    pub y: i32,
    /// Run width minus one
    pub width: u8,
    /// Run height minus one
    pub height: u8,
    pub settings: EntitySettings,
}

impl Run {
    fn single(entity: &PlacedEntity, descriptor: &'static EntityDescriptor) -> Self {
        let tile = entity.placement.tile();
        Self {
            descriptor,
            x: tile.x,
            y: tile.y,
            width: 0,
            height: 0,
            settings: entity.settings.clone(),
        }
    }

    /// Object record bytes for this run in a room `room_height` tiles tall
    pub fn encode(&self, room_height: i32) -> Result<Vec<u8>> {
        let Some(encode) = self.descriptor.to_object_binary else {
            return Ok(Vec::new());
        };
        let placement = RunPlacement {
            x: to_byte(self.x, "object x")?,
            y: to_byte(encode_y(self.y, room_height), "object y")?,
            width: self.width,
            height: self.height,
        };
        Ok(encode(self.descriptor, placement, &self.settings))
    }
}

/// Merge the cells of `grid` into runs
///
/// Rows at or below `room_height` are ignored, as are cells whose entity type
/// has no object encoding.
pub fn merge_runs(grid: &CellGrid, room_height: i32) -> Vec<Run> {
    let mut working = grid.clone();
    let mut runs = Vec::new();

    let starts: Vec<(i32, i32)> = grid
        .iter()
        .map(|e| e.placement.tile())
        .filter(|t| t.y >= 0 && t.y < room_height)
        .map(|t| (t.x, t.y))
        .collect();

    for (x, y) in starts {
        let Some(start) = working.get(x, y).cloned() else {
            continue;
        };
        let descriptor = start.entity_type.descriptor();
        if descriptor.to_object_binary.is_none() {
            continue;
        }

        let end_x = if descriptor.axes.allows_x() {
            get_end_x(&working, &start, x, y)
        } else {
            x
        };

        let end_y = if descriptor.axes.allows_y() {
            (x..=end_x)
                .map(|column| get_max_y(&working, column, y, room_height))
                .min()
                .unwrap_or(y)
        } else {
            y
        };

        for ey in y..=end_y {
            for ex in x..=end_x {
                working.remove(ex, ey);
            }
        }

        runs.push(Run {
            descriptor,
            x,
            y,
            width: (end_x - x) as u8,
            height: (end_y - y) as u8,
            settings: start.settings,
        });
    }

    runs
}

fn get_end_x(grid: &CellGrid, start: &PlacedEntity, x: i32, y: i32) -> i32 {
    let mut end_x = x;
    while end_x + 1 - x < MAX_RUN_LENGTH {
        match grid.get(end_x + 1, y) {
            Some(next) if next.merges_with(start) => end_x += 1,
            _ => break,
        }
    }
    end_x
}

/// Lowest row the column starting at `(x, y)` reaches with matching cells
fn get_max_y(grid: &CellGrid, x: i32, y: i32, room_height: i32) -> i32 {
    let Some(top) = grid.get(x, y) else {
        return y;
    };
    let mut end_y = y;
    while end_y + 1 < room_height {
        match grid.get(x, end_y + 1) {
            Some(next) if next.merges_with(top) => end_y += 1,
            _ => break,
        }
    }
    end_y
}

/// All runs of a layer: merged cells first, then free entities in placement order
pub fn layer_runs(layer: &RoomLayer, room_height: i32) -> Vec<Run> {
    let mut runs = merge_runs(&layer.cells, room_height);
    runs.extend(layer.entities.iter().filter_map(|entity| {
        let descriptor = entity.entity_type.descriptor();
        descriptor
            .to_object_binary
            .map(|_| Run::single(entity, descriptor))
    }));
    runs
}
