//! Position types for placed entities

use serde::{Deserialize, Serialize};

/// Size of one tile in pixels
pub const TILE_SIZE: i32 = 16;

/// Tile-based position (grid cells, object records)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert tile position to pixel position (1 tile = 16 pixels)
    pub const fn to_pixels(self) -> PixelPoint {
        PixelPoint {
            x: self.x * TILE_SIZE,
            y: self.y * TILE_SIZE,
        }
    }
}

/// Pixel-based position (free entities)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert pixel position to the tile containing it
    pub fn to_tiles(self) -> TilePoint {
        TilePoint {
            x: self.x.div_euclid(TILE_SIZE),
            y: self.y.div_euclid(TILE_SIZE),
        }
    }

    /// Snap to the upper left corner of the containing tile
    pub fn snapped(self) -> PixelPoint {
        self.to_tiles().to_pixels()
    }
}

/// Inclusive axis-aligned rectangle in tile space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBounds {
    pub upper_left: TilePoint,
    pub lower_right: TilePoint,
}

impl TileBounds {
    pub const fn new(upper_left: TilePoint, lower_right: TilePoint) -> Self {
        Self {
            upper_left,
            lower_right,
        }
    }

    /// Bounds starting at `origin` covering `width` x `height` tiles
    pub fn from_size(origin: TilePoint, width: i32, height: i32) -> Self {
        Self {
            upper_left: origin,
            lower_right: TilePoint::new(origin.x + width.max(1) - 1, origin.y + height.max(1) - 1),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.lower_right.x - self.upper_left.x + 1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.lower_right.y - self.upper_left.y + 1
    }

    /// True when `point` lies inside these bounds (edges included)
    pub fn contains(&self, point: TilePoint) -> bool {
        point.x >= self.upper_left.x
            && point.x <= self.lower_right.x
            && point.y >= self.upper_left.y
            && point.y <= self.lower_right.y
    }

    /// True when the two rectangles share at least one tile
    pub fn overlaps(&self, other: &TileBounds) -> bool {
        !(self.lower_right.x < other.upper_left.x
            || self.upper_left.x > other.lower_right.x
            || self.lower_right.y < other.upper_left.y
            || self.upper_left.y > other.lower_right.y)
    }

    /// Grow to include `point`
    pub fn include(&mut self, point: TilePoint) {
        self.upper_left.x = self.upper_left.x.min(point.x);
        self.upper_left.y = self.upper_left.y.min(point.y);
        self.lower_right.x = self.lower_right.x.max(point.x);
        self.lower_right.y = self.lower_right.y.max(point.y);
    }
}
