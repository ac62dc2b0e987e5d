//! Dirty-region bookkeeping for pointer gestures.
//!
//! A [`Region`] is computed in grid units straight from pointer positions and may
//! extend past the canvas (negative origin, oversized extent). Consumers clamp it
//! into a [`CellRect`] before touching any buffer.

use crate::input::GridPos;
use serde::{Deserialize, Serialize};

/// Margin added on the min corner and to the extent of every computed region.
pub const REGION_PADDING: i32 = 10;

/// Axis-aligned region in grid units. Not clamped to any buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Bounding region of two pointer positions, padded on the min corner.
///
/// `x = min(a.x, b.x) - 10`, `width = |b.x - a.x| + 10`, and the same for y.
/// Negative coordinates pass through untouched. Every step saturates at the
/// `i32` range.
pub fn compute_region(a: GridPos, b: GridPos) -> Region {
    let extent = |p: i32, q: i32| {
        i32::try_from(p.abs_diff(q))
            .unwrap_or(i32::MAX)
            .saturating_add(REGION_PADDING)
    };
    Region {
        x: a.x.min(b.x).saturating_sub(REGION_PADDING),
        y: a.y.min(b.y).saturating_sub(REGION_PADDING),
        width: extent(a.x, b.x),
        height: extent(a.y, b.y),
    }
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Smallest region covering both.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region {
            x,
            y,
            width: self.right().max(other.right()).saturating_sub(x),
            height: self.bottom().max(other.bottom()).saturating_sub(y),
        }
    }

    /// Intersects the region with a `width` x `height` grid.
    ///
    /// The far edge (`x + width`, `y + height`) is treated as inclusive so the
    /// cell under the newest pointer position is always part of the result.
    /// Returns `None` when nothing of the region lies on the grid.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CellRect> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.right()) + 1).min(i64::from(width));
        let y1 = (i64::from(self.bottom()) + 1).min(i64::from(height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        // All four are within [0, u32::MAX] after the clamps above.
        Some(CellRect {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

/// A rectangle of grid cells known to lie inside a buffer. `x1`/`y1` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRect {
    /// Every cell of a `width` x `height` grid.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}
