//! Custom ring walls and tunnel board edges.

use super::{Collection, CoordsMut, EntityId, Footprint, Placeable, new_id};
use crate::document::CourseDocument;
use crate::settings::CourseMeta;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// How a wall segment is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    #[default]
    Fence,
    Solid,
}

impl SegmentType {
    pub fn toggle(self) -> Self {
        match self {
            SegmentType::Fence => SegmentType::Solid,
            SegmentType::Solid => SegmentType::Fence,
        }
    }
}

/// A closed wall polygon. Segment `i` runs from point `i` to point `i + 1`,
/// the last one closing back to point 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomWall {
    pub(crate) id: EntityId,
    pub points: Vec<Point>,
    pub segment_types: Vec<SegmentType>,
}

impl CustomWall {
    /// Build a wall, padding or trimming segment types to match the points.
    pub fn new(points: Vec<Point>, mut segment_types: Vec<SegmentType>) -> Self {
        let fill = segment_types.last().copied().unwrap_or_default();
        segment_types.resize(points.len(), fill);
        Self {
            id: new_id(),
            points,
            segment_types,
        }
    }

    /// Every edge of the closed polygon, including the closing edge.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|i| (self.points[i], self.points[(i + 1) % n]))
            .collect()
    }
}

impl Placeable for CustomWall {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::CustomWalls
    }

    fn footprint(&self, _doc: &CourseDocument) -> Footprint {
        Footprint::Polyline(self.points.clone())
    }

    fn coords_mut(&mut self, _meta: &CourseMeta) -> CoordsMut<'_> {
        CoordsMut::Polyline(self.points.iter_mut().collect())
    }

    fn regenerate_id(&mut self) {
        self.id = new_id();
    }
}

/// A wall being drawn, not yet part of the document's walls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWall {
    pub points: Vec<Point>,
    pub segment_types: Vec<SegmentType>,
}

impl ActiveWall {
    pub fn push(&mut self, point: Point, segment_type: SegmentType) {
        self.points.push(point);
        self.segment_types.push(segment_type);
    }

    pub fn pop(&mut self) -> Option<(Point, SegmentType)> {
        let point = self.points.pop()?;
        let segment_type = self.segment_types.pop().unwrap_or_default();
        Some((point, segment_type))
    }

    /// Whether the wall has enough points to be closed.
    pub fn can_close(&self) -> bool {
        self.points.len() > 2
    }

    pub fn into_wall(self) -> CustomWall {
        CustomWall::new(self.points, self.segment_types)
    }
}

/// One edge of a tunnel board; tunnel paths dock onto its midpoint.
///
/// Stored flat as `{ id, x1, y1, x2, y2, layer }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "BoardEdgeRecord", from = "BoardEdgeRecord")]
pub struct BoardEdge {
    pub(crate) id: EntityId,
    pub start: Point,
    pub end: Point,
    pub layer: u32,
}

#[derive(Serialize, Deserialize)]
struct BoardEdgeRecord {
    id: EntityId,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    #[serde(default = "super::default_layer")]
    layer: u32,
}

impl From<BoardEdge> for BoardEdgeRecord {
    fn from(edge: BoardEdge) -> Self {
        Self {
            id: edge.id,
            x1: edge.start.x,
            y1: edge.start.y,
            x2: edge.end.x,
            y2: edge.end.y,
            layer: edge.layer,
        }
    }
}

impl From<BoardEdgeRecord> for BoardEdge {
    fn from(record: BoardEdgeRecord) -> Self {
        Self {
            id: record.id,
            start: Point::new(record.x1, record.y1),
            end: Point::new(record.x2, record.y2),
            layer: record.layer.max(1),
        }
    }
}

impl BoardEdge {
    pub fn new(start: Point, end: Point, layer: u32) -> Self {
        Self {
            id: new_id(),
            start,
            end,
            layer: layer.max(1),
        }
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }
}

impl Placeable for BoardEdge {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::BoardEdges
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn footprint(&self, _doc: &CourseDocument) -> Footprint {
        Footprint::Segment(self.start, self.end)
    }

    fn coords_mut(&mut self, _meta: &CourseMeta) -> CoordsMut<'_> {
        CoordsMut::Segment(&mut self.start, &mut self.end)
    }

    fn regenerate_id(&mut self) {
        self.id = new_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_edges_close_the_polygon() {
        let wall = CustomWall::new(
            vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 3.0)],
            vec![SegmentType::Solid],
        );
        let edges = wall.edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], (Point::new(4.0, 3.0), Point::new(0.0, 0.0)));
        assert_eq!(wall.segment_types, vec![SegmentType::Solid; 3]);
    }

    #[test]
    fn test_active_wall_close_threshold() {
        let mut active = ActiveWall::default();
        active.push(Point::new(0.0, 0.0), SegmentType::Fence);
        active.push(Point::new(1.0, 0.0), SegmentType::Fence);
        assert!(!active.can_close());
        active.push(Point::new(1.0, 1.0), SegmentType::Solid);
        assert!(active.can_close());
        assert_eq!(active.pop(), Some((Point::new(1.0, 1.0), SegmentType::Solid)));
    }

    #[test]
    fn test_board_edge_stored_flat() {
        let edge = BoardEdge::new(Point::new(1.0, 2.0), Point::new(4.0, 2.0), 2);
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["x1"], 1.0);
        assert_eq!(value["y2"], 2.0);
        assert_eq!(value["layer"], 2);
        assert!(value.get("start").is_none());

        let json = format!(r#"{{"id": "{}", "x1": 0, "y1": 0, "x2": 0, "y2": 3}}"#, edge.id);
        let loaded: BoardEdge = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.end, Point::new(0.0, 3.0));
        assert_eq!(loaded.layer, 1);
    }

    #[test]
    fn test_board_edge_midpoint() {
        let edge = BoardEdge::new(Point::new(0.0, 0.0), Point::new(4.0, 2.0), 1);
        assert_eq!(edge.midpoint(), Point::new(2.0, 1.0));
    }
}
