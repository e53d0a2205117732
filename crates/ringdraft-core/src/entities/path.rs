//! Tunnel paths drawn between board edges.

use super::{Collection, CoordsMut, EntityId, Footprint, Placeable, new_id};
use crate::document::CourseDocument;
use crate::settings::CourseMeta;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A point of a tunnel path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathPoint {
    /// A fixed coordinate.
    #[serde(rename = "static")]
    Static(Point),
    /// Weak reference to a board edge; follows the edge's midpoint.
    #[serde(rename = "edge-anchor")]
    EdgeAnchor {
        #[serde(rename = "targetId")]
        target_id: EntityId,
    },
}

impl PathPoint {
    /// World position of this point.
    ///
    /// An edge anchor whose board edge is gone resolves to the origin.
    pub fn resolve(&self, doc: &CourseDocument) -> Point {
        match self {
            PathPoint::Static(p) => *p,
            PathPoint::EdgeAnchor { target_id } => doc
                .board_edge(*target_id)
                .map(|edge| edge.midpoint())
                .unwrap_or(Point::ZERO),
        }
    }

    pub fn edge_target(&self) -> Option<EntityId> {
        match self {
            PathPoint::EdgeAnchor { target_id } => Some(*target_id),
            PathPoint::Static(_) => None,
        }
    }
}

/// A tunnel path through the bales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelPath {
    pub(crate) id: EntityId,
    pub points: Vec<PathPoint>,
}

impl Default for TunnelPath {
    fn default() -> Self {
        Self::new()
    }
}

impl TunnelPath {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            points: Vec::new(),
        }
    }

    pub fn from_points(points: Vec<PathPoint>) -> Self {
        Self {
            id: new_id(),
            points,
        }
    }

    /// World positions of every point, in order.
    pub fn resolve(&self, doc: &CourseDocument) -> Vec<Point> {
        self.points.iter().map(|p| p.resolve(doc)).collect()
    }
}

impl Placeable for TunnelPath {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::TunnelPaths
    }

    fn footprint(&self, doc: &CourseDocument) -> Footprint {
        Footprint::Polyline(self.resolve(doc))
    }

    /// Only static points are movable; edge anchors follow their edge.
    fn coords_mut(&mut self, _meta: &CourseMeta) -> CoordsMut<'_> {
        CoordsMut::Polyline(
            self.points
                .iter_mut()
                .filter_map(|p| match p {
                    PathPoint::Static(point) => Some(point),
                    PathPoint::EdgeAnchor { .. } => None,
                })
                .collect(),
        )
    }

    fn regenerate_id(&mut self) {
        self.id = new_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BoardEdge, Entity};

    #[test]
    fn test_path_point_serialization() {
        let p = PathPoint::Static(Point::new(1.0, 2.0));
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["type"], "static");
        assert_eq!(value["x"], 1.0);

        let id = new_id();
        let anchor = PathPoint::EdgeAnchor { target_id: id };
        let value = serde_json::to_value(&anchor).unwrap();
        assert_eq!(value["type"], "edge-anchor");
        assert_eq!(value["targetId"], id.to_string());
        let back: PathPoint = serde_json::from_value(value).unwrap();
        assert_eq!(back, anchor);
    }

    #[test]
    fn test_edge_anchor_follows_edge_and_falls_back() {
        let mut doc = CourseDocument::new();
        let edge = BoardEdge::new(Point::new(2.0, 2.0), Point::new(4.0, 2.0), 1);
        let edge_id = doc.insert(Entity::BoardEdge(edge));

        let path = TunnelPath::from_points(vec![
            PathPoint::EdgeAnchor { target_id: edge_id },
            PathPoint::Static(Point::new(3.0, 8.0)),
        ]);
        assert_eq!(path.resolve(&doc), vec![Point::new(3.0, 2.0), Point::new(3.0, 8.0)]);

        doc.remove(edge_id);
        assert_eq!(path.resolve(&doc), vec![Point::ZERO, Point::new(3.0, 8.0)]);
    }
}
