//! Generic transforms over any [`Placeable`], driven by its coordinate shape.

use super::{CoordsMut, Placeable};
use crate::geometry;
use crate::settings::CourseMeta;
use crate::snap::{snap_offset, snap_point};
use kurbo::{Point, Rect, Vec2};

/// Move an entity (and anything it owns) by `delta`, snapping the result.
pub fn translate(item: &mut dyn Placeable, meta: &CourseMeta, delta: Vec2) {
    shift(item, meta, delta, true);
}

fn shift(item: &mut dyn Placeable, meta: &CourseMeta, delta: Vec2, snap: bool) {
    let place = |p: Point| if snap { snap_point(p + delta) } else { p + delta };
    match item.coords_mut(meta) {
        CoordsMut::Box { pose, .. } => pose.set_origin(place(pose.origin())),
        CoordsMut::Segment(a, b) => {
            *a = place(*a);
            *b = place(*b);
        }
        CoordsMut::Polyline(points) => {
            for p in points {
                *p = place(*p);
            }
        }
    }
    for child in item.children_mut() {
        shift(child, meta, delta, snap);
    }
}

/// Rotate an entity about `pivot`.
///
/// Boxes rotate their center and re-derive the origin from it, also turning
/// their own rotation by `angle_deg`. Segments and polylines rotate every
/// stored point. All resulting coordinates are snapped.
pub fn rotate_about(item: &mut dyn Placeable, meta: &CourseMeta, pivot: Point, angle_deg: f64) {
    match item.coords_mut(meta) {
        CoordsMut::Box { pose, size } => {
            let center = geometry::box_center(pose.origin(), size);
            let moved = geometry::rotate_point(center, pivot, angle_deg);
            let half = Vec2::new(size.width / 2.0, size.height / 2.0);
            pose.set_origin(snap_point(moved - half));
            pose.rotation = geometry::normalize_angle(pose.rotation + angle_deg);
        }
        CoordsMut::Segment(a, b) => {
            *a = snap_point(geometry::rotate_point(*a, pivot, angle_deg));
            *b = snap_point(geometry::rotate_point(*b, pivot, angle_deg));
        }
        CoordsMut::Polyline(points) => {
            for p in points {
                *p = snap_point(geometry::rotate_point(*p, pivot, angle_deg));
            }
        }
    }
    for child in item.children_mut() {
        rotate_about(child, meta, pivot, angle_deg);
    }
}

/// Snap every stored coordinate to the grid as-is.
pub fn snap_coords(item: &mut dyn Placeable, meta: &CourseMeta) {
    shift(item, meta, Vec2::ZERO, true);
}

/// Put an entity on the grid the way the user sees it.
///
/// Boxes at a multiple of 90 degrees move so that their visual top-left lands
/// on the grid; any other rotation snaps the raw origin.
pub fn realign(item: &mut dyn Placeable, meta: &CourseMeta) {
    let snapped_box = match item.coords_mut(meta) {
        CoordsMut::Box { pose, size } => {
            if geometry::is_axis_aligned(pose.rotation) {
                let visual = geometry::box_bounds(pose.origin(), size, pose.rotation);
                let offset = snap_offset(visual.origin());
                pose.set_origin(pose.origin() + offset);
            } else {
                pose.set_origin(snap_point(pose.origin()));
            }
            true
        }
        CoordsMut::Segment(a, b) => {
            *a = snap_point(*a);
            *b = snap_point(*b);
            false
        }
        CoordsMut::Polyline(points) => {
            for p in points {
                *p = snap_point(*p);
            }
            false
        }
    };
    if snapped_box {
        for child in item.children_mut() {
            realign(child, meta);
        }
    }
}

/// Pull an entity back inside `bounds`.
///
/// Boxes shift as a whole so their visual bounds fit (aligning to the
/// top-left when larger than `bounds`), carrying owned entities along.
/// Segments and polylines clamp each point independently.
pub fn clamp_into(item: &mut dyn Placeable, meta: &CourseMeta, bounds: Rect) {
    let carried = match item.coords_mut(meta) {
        CoordsMut::Box { pose, size } => {
            let visual = geometry::box_bounds(pose.origin(), size, pose.rotation);
            let delta = Vec2::new(
                clamp_shift(visual.x0, visual.x1, bounds.x0, bounds.x1),
                clamp_shift(visual.y0, visual.y1, bounds.y0, bounds.y1),
            );
            pose.set_origin(pose.origin() + delta);
            delta
        }
        CoordsMut::Segment(a, b) => {
            *a = geometry::clamp_point(*a, bounds);
            *b = geometry::clamp_point(*b, bounds);
            Vec2::ZERO
        }
        CoordsMut::Polyline(points) => {
            for p in points {
                *p = geometry::clamp_point(*p, bounds);
            }
            Vec2::ZERO
        }
    };
    if carried != Vec2::ZERO {
        for child in item.children_mut() {
            shift(child, meta, carried, false);
        }
    }
}

fn clamp_shift(lo: f64, hi: f64, min: f64, max: f64) -> f64 {
    if hi - lo >= max - min || lo < min {
        min - lo
    } else if hi > max {
        max - hi
    } else {
        0.0
    }
}
