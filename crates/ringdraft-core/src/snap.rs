//! Grid snapping.
//!
//! Course layouts are measured in feet and every stored coordinate sits on a
//! 2-inch grid, i.e. multiples of 1/6 of a unit.

use kurbo::{Point, Vec2};

/// Grid divisions per unit (six 2-inch steps per foot).
pub const GRID_DIVISIONS: f64 = 6.0;

/// Grid step in world units.
pub const GRID_STEP: f64 = 1.0 / GRID_DIVISIONS;

/// Snap a single coordinate to the grid.
pub fn snap(value: f64) -> f64 {
    (value * GRID_DIVISIONS).round() / GRID_DIVISIONS
}

/// Snap both coordinates of a point to the grid.
pub fn snap_point(point: Point) -> Point {
    Point::new(snap(point.x), snap(point.y))
}

/// Offset that moves `point` onto the nearest grid intersection.
pub fn snap_offset(point: Point) -> Vec2 {
    snap_point(point) - point
}

/// How far a loaded coordinate may sit from a grid line and still be put
/// back on it. Saved files keep four decimals, so grid values drift by less.
pub const RESTORE_TOLERANCE: f64 = 1e-3;

/// Undo rounding drift: a value within [`RESTORE_TOLERANCE`] of a grid line
/// lands exactly on it, anything further off is kept as-is.
pub fn restore(value: f64) -> f64 {
    let snapped = snap(value);
    if (snapped - value).abs() <= RESTORE_TOLERANCE { snapped } else { value }
}

pub fn restore_point(point: Point) -> Point {
    Point::new(restore(point.x), restore(point.y))
}

/// Whether a coordinate already lies on the grid.
pub fn is_on_grid(value: f64) -> bool {
    (snap(value) - value).abs() < 1e-9
}
