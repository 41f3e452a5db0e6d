//! MaxRects free-rectangle packer
//!
//! Tracks every maximal empty rectangle of a fixed-width, effectively
//! bottomless container. Placing an item carves it out of each free
//! rectangle it intersects (non-guillotine: up to four overlapping
//! residuals per rectangle), then drops free rectangles that another one
//! already contains.

use super::types::{snap_to_grid, BoundingBox, Point};

/// Height of the container; taller than any realistic sheet
const CONTAINER_HEIGHT: f64 = 1.0e9;

/// Weight that makes a higher free rectangle beat any leftover difference
const ROW_WEIGHT: f64 = 10_000.0;

/// Packs rectangles into a container of fixed width
#[derive(Debug, Clone)]
pub struct FreeRectPacker {
    grid: f64,
    free: Vec<BoundingBox>,
    /// Lowest bottom edge of anything placed so far
    lowest: f64,
}

impl FreeRectPacker {
    /// Create a packer whose container is `width` wide, snapping positions to `grid`
    pub fn new(width: f64, grid: f64) -> Self {
        Self {
            grid,
            free: vec![BoundingBox::new(0.0, 0.0, width, CONTAINER_HEIGHT)],
            lowest: 0.0,
        }
    }

    /// Current free rectangles
    pub fn free_rects(&self) -> &[BoundingBox] {
        &self.free
    }

    /// Place a `width` x `height` rectangle and return its grid-snapped origin.
    ///
    /// Picks the free rectangle minimising `y * 10000 + short-side leftover`
    /// (topmost first, then tightest). When nothing fits, the rectangle goes
    /// at the left edge below everything placed so far.
    pub fn place(&mut self, width: f64, height: f64) -> Point {
        let spot = self
            .best_fit(width, height)
            .unwrap_or_else(|| Point::new(0.0, self.lowest));
        let spot = Point::new(snap_to_grid(spot.x, self.grid), snap_to_grid(spot.y, self.grid));

        let used = BoundingBox::new(spot.x, spot.y, width, height);
        self.free = prune_contained(split_free_rects(&self.free, &used));
        self.lowest = self.lowest.max(used.bottom());
        spot
    }

    fn best_fit(&self, width: f64, height: f64) -> Option<Point> {
        let mut best: Option<(f64, Point)> = None;
        for rect in &self.free {
            if !rect.fits(width, height) {
                continue;
            }
            let leftover = (rect.width - width).min(rect.height - height);
            let score = rect.y * ROW_WEIGHT + leftover;
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, rect.origin()));
            }
        }
        best.map(|(_, origin)| origin)
    }
}

/// Carve `used` out of every free rectangle it intersects.
///
/// Each intersected rectangle is replaced by the slivers of it lying left
/// of, right of, above and below `used`. Untouched rectangles pass through.
pub fn split_free_rects(free: &[BoundingBox], used: &BoundingBox) -> Vec<BoundingBox> {
    let mut result = Vec::with_capacity(free.len() + 4);
    for rect in free {
        if !rect.intersects(used) {
            result.push(*rect);
            continue;
        }
        if used.x > rect.x {
            result.push(BoundingBox::new(rect.x, rect.y, used.x - rect.x, rect.height));
        }
        if used.right() < rect.right() {
            result.push(BoundingBox::new(
                used.right(),
                rect.y,
                rect.right() - used.right(),
                rect.height,
            ));
        }
        if used.y > rect.y {
            result.push(BoundingBox::new(rect.x, rect.y, rect.width, used.y - rect.y));
        }
        if used.bottom() < rect.bottom() {
            result.push(BoundingBox::new(
                rect.x,
                used.bottom(),
                rect.width,
                rect.bottom() - used.bottom(),
            ));
        }
    }
    result
}

/// Drop rectangles contained in another; of two identical ones the first survives
pub fn prune_contained(rects: Vec<BoundingBox>) -> Vec<BoundingBox> {
    let keep: Vec<bool> = (0..rects.len())
        .map(|i| {
            !rects.iter().enumerate().any(|(j, other)| {
                j != i
                    && other.contains_box(&rects[i])
                    && (j < i || !rects[i].contains_box(other))
            })
        })
        .collect();

    rects
        .into_iter()
        .zip(keep)
        .filter_map(|(rect, keep)| keep.then_some(rect))
        .collect()
}
