//! Pure geometry helpers shared by placement, anchoring and selection.
//!
//! Angles are in degrees and positive angles turn clockwise on screen, since
//! the y axis points down.

use kurbo::{Point, Rect, Size, Vec2};

/// Rotate `point` about `center` by `angle_deg` (clockwise in y-down space).
pub fn rotate_point(point: Point, center: Point, angle_deg: f64) -> Point {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Closest point to `point` on the segment `a`-`b`.
///
/// A degenerate segment (`a == b`) yields `a`.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    point.distance(closest_point_on_segment(point, a, b))
}

/// Minimum distance from a point to a polyline. Infinite for fewer than two points.
pub fn distance_to_polyline(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| distance_to_segment(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Axis-aligned bounds of a rectangle with the given half extents, rotated
/// about its center.
pub fn rotated_bounding_box(center: Point, half_w: f64, half_h: f64, angle_deg: f64) -> Rect {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let ext_x = (half_w * cos).abs() + (half_h * sin).abs();
    let ext_y = (half_w * sin).abs() + (half_h * cos).abs();
    Rect::new(
        center.x - ext_x,
        center.y - ext_y,
        center.x + ext_x,
        center.y + ext_y,
    )
}

/// World-space corners of a rotated box whose unrotated top-left is `origin`.
///
/// Order: top-left, top-right, bottom-right, bottom-left of the unrotated box.
pub fn rotated_corners(origin: Point, size: Size, angle_deg: f64) -> [Point; 4] {
    let center = box_center(origin, size);
    [
        Point::new(origin.x, origin.y),
        Point::new(origin.x + size.width, origin.y),
        Point::new(origin.x + size.width, origin.y + size.height),
        Point::new(origin.x, origin.y + size.height),
    ]
    .map(|corner| rotate_point(corner, center, angle_deg))
}

/// Center of an unrotated box with top-left `origin`.
pub fn box_center(origin: Point, size: Size) -> Point {
    Point::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0)
}

/// Visual (rotation-aware) bounds of a box with top-left `origin`.
pub fn box_bounds(origin: Point, size: Size, angle_deg: f64) -> Rect {
    rotated_bounding_box(
        box_center(origin, size),
        size.width / 2.0,
        size.height / 2.0,
        angle_deg,
    )
}

/// Area of the intersection of two rectangles (zero when disjoint).
pub fn overlap_area(a: Rect, b: Rect) -> f64 {
    let w = a.x1.min(b.x1) - a.x0.max(b.x0);
    let h = a.y1.min(b.y1) - a.y0.max(b.y0);
    if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
}

/// Sum of segment lengths along a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Midpoint of a segment.
pub fn segment_midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Axis-aligned bounds of a set of points, or `None` when empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    Some(
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
    )
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let wrapped = angle_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Whether an angle is a multiple of 90 degrees.
pub fn is_axis_aligned(angle_deg: f64) -> bool {
    let rem = normalize_angle(angle_deg) % 90.0;
    rem < 1e-6 || (90.0 - rem) < 1e-6
}

/// Clamp a point into a rectangle.
pub fn clamp_point(point: Point, bounds: Rect) -> Point {
    Point::new(
        point.x.clamp(bounds.x0, bounds.x1),
        point.y.clamp(bounds.y0, bounds.y1),
    )
}

/// Translate every point of a slice in place.
pub fn translate_points(points: &mut [Point], delta: Vec2) {
    for p in points {
        *p += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rotate_point_quarter_turn_is_clockwise() {
        let p = rotate_point(Point::new(1.0, 0.0), Point::ZERO, 90.0);
        assert!(close(p.x, 0.0));
        assert!(close(p.y, 1.0));
    }

    #[test]
    fn test_rotate_point_round_trip() {
        let center = Point::new(3.5, -2.0);
        let p = Point::new(7.25, 4.0);
        for angle in [0.0, 13.0, 45.0, 90.0, 179.5, 270.0, 333.3, -60.0] {
            let back = rotate_point(rotate_point(p, center, angle), center, -angle);
            assert!(close(back.x, p.x) && close(back.y, p.y), "angle {angle}");
        }
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Point::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Point::new(15.0, 3.0), a, b), b);
        assert_eq!(
            closest_point_on_segment(Point::new(4.0, 3.0), a, b),
            Point::new(4.0, 0.0)
        );
    }

    #[test]
    fn test_closest_point_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        assert_eq!(closest_point_on_segment(Point::new(9.0, 9.0), a, a), a);
        assert!(close(distance_to_segment(Point::new(5.0, 6.0), a, a), 5.0));
    }

    #[test]
    fn test_rotated_bounding_box() {
        let center = Point::new(0.0, 0.0);
        let unrotated = rotated_bounding_box(center, 2.0, 1.0, 0.0);
        assert!(close(unrotated.width(), 4.0) && close(unrotated.height(), 2.0));

        let quarter = rotated_bounding_box(center, 2.0, 1.0, 90.0);
        assert!(close(quarter.width(), 2.0) && close(quarter.height(), 4.0));

        let diagonal = rotated_bounding_box(center, 1.0, 1.0, 45.0);
        let expected = 2.0_f64.sqrt() * 2.0;
        assert!(close(diagonal.width(), expected));
    }

    #[test]
    fn test_rotated_corners_order() {
        let corners = rotated_corners(Point::new(0.0, 0.0), Size::new(2.0, 1.0), 0.0);
        assert_eq!(corners[0], Point::new(0.0, 0.0));
        assert_eq!(corners[1], Point::new(2.0, 0.0));
        assert_eq!(corners[2], Point::new(2.0, 1.0));
        assert_eq!(corners[3], Point::new(0.0, 1.0));
    }

    #[test]
    fn test_overlap_area() {
        let a = Rect::new(0.0, 0.0, 3.0, 1.5);
        assert!(close(overlap_area(a, a), 4.5));
        assert!(close(overlap_area(a, Rect::new(10.0, 10.0, 13.0, 11.5)), 0.0));
        assert!(close(overlap_area(a, Rect::new(1.0, 0.5, 5.0, 5.0)), 2.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(close(normalize_angle(-90.0), 270.0));
        assert!(close(normalize_angle(450.0), 90.0));
        assert!(close(normalize_angle(360.0), 0.0));
        assert!(is_axis_aligned(270.0));
        assert!(!is_axis_aligned(45.0));
    }

    #[test]
    fn test_polyline_length_and_bounds() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(3.0, 0.0)];
        assert!(close(polyline_length(&pts), 9.0));
        let bounds = points_bounds(&pts).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 3.0, 4.0));
        assert!(points_bounds(&[]).is_none());
    }
}
