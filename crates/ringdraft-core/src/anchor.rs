//! Dock points for anchor bales.
//!
//! An anchor bale docks against the nearest walls: from each corner of its
//! footprint a horizontal and a vertical ray are cast against every wall
//! segment (the ring boundary plus custom walls) and the corner with the
//! closest hits on both axes wins.

use crate::document::CourseDocument;
use crate::entities::Bale;
use kurbo::Point;

/// Tolerance when deciding whether a wall spans a ray's coordinate.
const SPAN_TOLERANCE: f64 = 0.01;

/// Score added for an axis with no wall hit.
const MISSING_AXIS_PENALTY: f64 = 1000.0;

/// Below this extent a segment is treated as parallel to the ray.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// A wall segment used for ray casting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub a: Point,
    pub b: Point,
}

impl WallSegment {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// X where this segment crosses the horizontal line at `y`.
    fn cross_horizontal(&self, y: f64) -> Option<f64> {
        let (y_min, y_max) = (self.a.y.min(self.b.y), self.a.y.max(self.b.y));
        let dy = self.b.y - self.a.y;
        if dy.abs() < DEGENERATE_EPSILON
            || y < y_min - SPAN_TOLERANCE
            || y > y_max + SPAN_TOLERANCE
        {
            return None;
        }
        Some(self.a.x + (y - self.a.y) * (self.b.x - self.a.x) / dy)
    }

    /// Y where this segment crosses the vertical line at `x`.
    fn cross_vertical(&self, x: f64) -> Option<f64> {
        let (x_min, x_max) = (self.a.x.min(self.b.x), self.a.x.max(self.b.x));
        let dx = self.b.x - self.a.x;
        if dx.abs() < DEGENERATE_EPSILON
            || x < x_min - SPAN_TOLERANCE
            || x > x_max + SPAN_TOLERANCE
        {
            return None;
        }
        Some(self.a.y + (x - self.a.x) * (self.b.y - self.a.y) / dx)
    }
}

/// Every wall segment of the course: the four ring edges followed by the
/// edges of each custom wall, closing edge included.
pub fn wall_segments(doc: &CourseDocument) -> Vec<WallSegment> {
    let (w, h) = (doc.meta.ring.width, doc.meta.ring.height);
    let mut segments = vec![
        WallSegment::new(Point::new(0.0, 0.0), Point::new(w, 0.0)),
        WallSegment::new(Point::new(w, 0.0), Point::new(w, h)),
        WallSegment::new(Point::new(w, h), Point::new(0.0, h)),
        WallSegment::new(Point::new(0.0, h), Point::new(0.0, 0.0)),
    ];
    for wall in &doc.custom_walls {
        segments.extend(wall.edges().into_iter().map(|(a, b)| WallSegment::new(a, b)));
    }
    segments
}

/// Nearest wall hits for one corner.
#[derive(Debug, Clone, Copy, Default)]
struct CornerHits {
    /// Nearest hit along the horizontal ray: (distance, point).
    horizontal: Option<(f64, Point)>,
    /// Nearest hit along the vertical ray: (distance, point).
    vertical: Option<(f64, Point)>,
}

impl CornerHits {
    fn score(&self) -> f64 {
        self.horizontal.map_or(MISSING_AXIS_PENALTY, |(d, _)| d)
            + self.vertical.map_or(MISSING_AXIS_PENALTY, |(d, _)| d)
    }
}

fn cast(corner: Point, walls: &[WallSegment]) -> CornerHits {
    let mut hits = CornerHits::default();
    for wall in walls {
        if let Some(x) = wall.cross_horizontal(corner.y) {
            let dist = (x - corner.x).abs();
            if hits.horizontal.is_none_or(|(best, _)| dist < best) {
                hits.horizontal = Some((dist, Point::new(x, corner.y)));
            }
        }
        if let Some(y) = wall.cross_vertical(corner.x) {
            let dist = (y - corner.y).abs();
            if hits.vertical.is_none_or(|(best, _)| dist < best) {
                hits.vertical = Some((dist, Point::new(corner.x, y)));
            }
        }
    }
    hits
}

/// Dock points for a footprint given its four corners.
///
/// Returns at most two points: the horizontal dock first, then the vertical.
/// Ties between corners go to the earliest corner.
pub fn resolve_corners(corners: &[Point; 4], walls: &[WallSegment]) -> Vec<Point> {
    let mut best: Option<CornerHits> = None;
    for corner in corners {
        let hits = cast(*corner, walls);
        if best.is_none_or(|b| hits.score() < b.score()) {
            best = Some(hits);
        }
    }
    let Some(best) = best else {
        return Vec::new();
    };
    best.horizontal
        .into_iter()
        .chain(best.vertical)
        .map(|(_, point)| point)
        .collect()
}

/// Dock points for a bale against the document's walls.
pub fn resolve_anchors(bale: &Bale, doc: &CourseDocument) -> Vec<Point> {
    resolve_corners(&bale.corners(&doc.meta.bale), &wall_segments(doc))
}

/// Recompute derived dock points for every bale.
///
/// Anchor bales get fresh dock points; any other bale has them cleared.
/// Returns the number of bales whose dock points changed.
pub fn recompute_all(doc: &mut CourseDocument) -> usize {
    let walls = wall_segments(doc);
    let defaults = doc.meta.bale;
    let mut changed = 0;
    for bale in &mut doc.bales {
        let anchors = if bale.is_anchor {
            resolve_corners(&bale.corners(&defaults), &walls)
        } else {
            Vec::new()
        };
        if anchors != bale.custom_anchors {
            bale.custom_anchors = anchors;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CustomWall, Entity, SegmentType};
    use crate::settings::CourseMeta;

    fn doc() -> CourseDocument {
        CourseDocument::with_meta(CourseMeta::with_ring(24.0, 24.0))
    }

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_ring_segments() {
        let segments = wall_segments(&doc());
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1], WallSegment::new(Point::new(24.0, 0.0), Point::new(24.0, 24.0)));
    }

    #[test]
    fn test_custom_wall_adds_closing_edge() {
        let mut d = doc();
        d.insert(Entity::Wall(CustomWall::new(
            vec![Point::new(5.0, 5.0), Point::new(10.0, 5.0), Point::new(10.0, 10.0)],
            vec![SegmentType::Fence],
        )));
        assert_eq!(wall_segments(&d).len(), 7);
    }

    #[test]
    fn test_top_left_corner_docks_to_ring() {
        let d = doc();
        let bale = Bale::new(Point::new(1.0, 2.0), 1);
        let anchors = resolve_anchors(&bale, &d);
        assert_eq!(anchors.len(), 2);
        assert!(close(anchors[0], Point::new(0.0, 2.0)));
        assert!(close(anchors[1], Point::new(1.0, 0.0)));
    }

    #[test]
    fn test_bottom_right_corner_wins_near_far_walls() {
        let d = doc();
        // 3 x 1.5 bale whose bottom-right corner sits at (23, 23.5)
        let bale = Bale::new(Point::new(20.0, 22.0), 1);
        let anchors = resolve_anchors(&bale, &d);
        assert!(close(anchors[0], Point::new(24.0, 23.5)));
        assert!(close(anchors[1], Point::new(23.0, 24.0)));
    }

    #[test]
    fn test_custom_wall_is_nearer_than_ring() {
        let mut d = doc();
        d.insert(Entity::Wall(CustomWall::new(
            vec![
                Point::new(6.0, 6.0),
                Point::new(12.0, 6.0),
                Point::new(12.0, 12.0),
                Point::new(6.0, 12.0),
            ],
            vec![SegmentType::Solid],
        )));
        // Right edge of the bale at x = 5.5, half a foot from the wall at x = 6.
        // Top-right corner scores 0.5 + 10 and beats the ring-side corners.
        let bale = Bale::new(Point::new(2.5, 10.0), 1);
        let anchors = resolve_anchors(&bale, &d);
        assert!(close(anchors[0], Point::new(6.0, 10.0)));
        assert!(close(anchors[1], Point::new(5.5, 0.0)));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let d = doc();
        let mut bale = Bale::new(Point::new(7.0, 4.0), 1);
        bale.pose.rotation = 30.0;
        let first = resolve_anchors(&bale, &d);
        for _ in 0..5 {
            assert_eq!(resolve_anchors(&bale, &d), first);
        }
    }

    #[test]
    fn test_no_walls_yields_nothing() {
        let corners = [Point::ZERO; 4];
        assert!(resolve_corners(&corners, &[]).is_empty());
    }

    #[test]
    fn test_recompute_all_clears_non_anchors() {
        let mut d = doc();
        let mut anchor = Bale::new(Point::new(1.0, 2.0), 1);
        anchor.is_anchor = true;
        let mut plain = Bale::new(Point::new(5.0, 5.0), 1);
        plain.custom_anchors = vec![Point::ZERO];
        d.insert(Entity::Bale(anchor));
        d.insert(Entity::Bale(plain));

        assert_eq!(recompute_all(&mut d), 2);
        assert_eq!(d.bales[0].custom_anchors.len(), 2);
        assert!(d.bales[1].custom_anchors.is_empty());
        assert_eq!(recompute_all(&mut d), 0);
    }
}
