//! Course entities: bales, hides, walls, tunnels and the smaller fixtures.
//!
//! Every entity lives in exactly one [`Collection`] of the document (hides
//! nested inside a blind are the one exception). Generic operations such as
//! selection, moving and rotation go through the [`Placeable`] capability
//! trait instead of matching on concrete types.

mod bale;
mod fixture;
mod hide;
mod measurement;
mod path;
mod transform;
mod wall;

pub use bale::{Bale, BaleCustom, Lean, Orientation};
pub use fixture::{Fixture, FixtureCustom, FixtureKind};
pub use hide::{Blind, Elevation, Hide, HideKind};
pub use measurement::Measurement;
pub use path::{PathPoint, TunnelPath};
pub use transform::{clamp_into, realign, rotate_about, snap_coords, translate};
pub use wall::{ActiveWall, BoardEdge, CustomWall, SegmentType};

use crate::document::CourseDocument;
use crate::geometry;
use crate::settings::CourseMeta;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for entities.
pub type EntityId = Uuid;

fn default_layer() -> u32 {
    1
}

/// Position, rotation and stacking tier shared by box-shaped entities.
///
/// `x`/`y` is the top-left corner of the unrotated footprint; rotation is in
/// degrees about the footprint center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_layer")]
    pub layer: u32,
}

impl Pose {
    /// Unrotated pose at `origin` on `layer`.
    pub fn at(origin: Point, layer: u32) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            rotation: 0.0,
            layer: layer.max(1),
        }
    }

    /// Top-left corner of the unrotated footprint.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the footprint so its unrotated top-left sits at `origin`.
    /// Rotation and layer are kept.
    pub fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }
}

/// The named collections of a course document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Bales,
    Hides,
    Blinds,
    Zones,
    DcMats,
    StartBoxes,
    TunnelBoards,
    Notes,
    Steps,
    Gates,
    CustomWalls,
    BoardEdges,
    TunnelPaths,
    Measurements,
}

/// How an entity stores its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    /// A rotated box with a top-left origin.
    Box,
    /// A two-point line segment.
    Segment,
    /// A list of points.
    Polyline,
}

impl Collection {
    /// All collections in document order.
    pub const ALL: [Collection; 14] = [
        Collection::Bales,
        Collection::Hides,
        Collection::Blinds,
        Collection::Zones,
        Collection::DcMats,
        Collection::StartBoxes,
        Collection::TunnelBoards,
        Collection::Notes,
        Collection::Steps,
        Collection::Gates,
        Collection::CustomWalls,
        Collection::BoardEdges,
        Collection::TunnelPaths,
        Collection::Measurements,
    ];

    /// Key used in the persisted document.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Bales => "bales",
            Collection::Hides => "hides",
            Collection::Blinds => "blinds",
            Collection::Zones => "zones",
            Collection::DcMats => "dcMats",
            Collection::StartBoxes => "startBoxes",
            Collection::TunnelBoards => "tunnelBoards",
            Collection::Notes => "notes",
            Collection::Steps => "steps",
            Collection::Gates => "gates",
            Collection::CustomWalls => "customWalls",
            Collection::BoardEdges => "boardEdges",
            Collection::TunnelPaths => "tunnelPaths",
            Collection::Measurements => "measurements",
        }
    }

    pub fn coord_kind(self) -> CoordKind {
        match self {
            Collection::BoardEdges => CoordKind::Segment,
            Collection::CustomWalls | Collection::TunnelPaths | Collection::Measurements => {
                CoordKind::Polyline
            }
            _ => CoordKind::Box,
        }
    }

    /// Default footprint for box collections whose size does not depend on
    /// configuration. Bales are sized from the course bale settings instead.
    pub fn default_size(self) -> Option<Size> {
        match self {
            Collection::Hides => Some(Hide::SIZE),
            Collection::Blinds => Some(Blind::DEFAULT_SIZE),
            _ => FixtureKind::from_collection(self).map(FixtureKind::default_size),
        }
    }

    /// Gates are never picked up by rubber-band selection.
    pub fn area_selectable(self) -> bool {
        self != Collection::Gates
    }

    /// Gates stay put when the selection is dragged.
    pub fn bulk_movable(self) -> bool {
        self != Collection::Gates
    }
}

/// Read-only view of an entity's geometry in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Box {
        origin: Point,
        size: Size,
        rotation: f64,
    },
    Segment(Point, Point),
    Polyline(Vec<Point>),
}

impl Footprint {
    /// Rotation-aware axis-aligned bounds. `None` for an empty polyline.
    pub fn visual_bounds(&self) -> Option<Rect> {
        match self {
            Footprint::Box {
                origin,
                size,
                rotation,
            } => Some(geometry::box_bounds(*origin, *size, *rotation)),
            Footprint::Segment(a, b) => Some(Rect::from_points(*a, *b)),
            Footprint::Polyline(points) => geometry::points_bounds(points),
        }
    }

    /// Point used for rubber-band selection. Polylines have none and are
    /// tested by bounds overlap instead.
    pub fn representative_point(&self) -> Option<Point> {
        match self {
            Footprint::Box { origin, size, .. } => Some(geometry::box_center(*origin, *size)),
            Footprint::Segment(a, b) => Some(geometry::segment_midpoint(*a, *b)),
            Footprint::Polyline(_) => None,
        }
    }

    /// Whether `point` hits this footprint within `tolerance`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Footprint::Box {
                origin,
                size,
                rotation,
            } => {
                // Undo the rotation and test against the axis-aligned box.
                let center = geometry::box_center(*origin, *size);
                let local = geometry::rotate_point(point, center, -rotation);
                Rect::from_origin_size(*origin, *size)
                    .inflate(tolerance, tolerance)
                    .contains(local)
            }
            Footprint::Segment(a, b) => geometry::distance_to_segment(point, *a, *b) <= tolerance,
            Footprint::Polyline(points) => match points.len() {
                0 => false,
                1 => points[0].distance(point) <= tolerance,
                _ => geometry::distance_to_polyline(point, points) <= tolerance,
            },
        }
    }
}

/// Mutable access to an entity's stored coordinates.
pub enum CoordsMut<'a> {
    Box { pose: &'a mut Pose, size: Size },
    Segment(&'a mut Point, &'a mut Point),
    Polyline(Vec<&'a mut Point>),
}

/// Capabilities every document entity provides.
pub trait Placeable {
    /// Get the unique identifier.
    fn id(&self) -> EntityId;

    /// Collection this entity belongs to.
    fn collection(&self) -> Collection;

    /// Stacking tier (1 = ground).
    fn layer(&self) -> u32 {
        1
    }

    /// World-space geometry. The document is needed to resolve weak
    /// references and configured sizes.
    fn footprint(&self, doc: &CourseDocument) -> Footprint;

    /// Mutable coordinates for generic transforms.
    fn coords_mut(&mut self, meta: &CourseMeta) -> CoordsMut<'_>;

    /// Entities owned by this one that move along with it.
    fn children_mut(&mut self) -> Vec<&mut dyn Placeable> {
        Vec::new()
    }

    /// Assign a fresh identifier (used when pasting copies).
    fn regenerate_id(&mut self);
}

/// Owned entity of any kind, tagged with its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Bale(Bale),
    Hide(Hide),
    Blind(Blind),
    Fixture(Fixture),
    Wall(CustomWall),
    BoardEdge(BoardEdge),
    TunnelPath(TunnelPath),
    Measurement(Measurement),
}

impl Entity {
    pub fn as_placeable(&self) -> &dyn Placeable {
        match self {
            Entity::Bale(e) => e,
            Entity::Hide(e) => e,
            Entity::Blind(e) => e,
            Entity::Fixture(e) => e,
            Entity::Wall(e) => e,
            Entity::BoardEdge(e) => e,
            Entity::TunnelPath(e) => e,
            Entity::Measurement(e) => e,
        }
    }

    pub fn as_placeable_mut(&mut self) -> &mut dyn Placeable {
        match self {
            Entity::Bale(e) => e,
            Entity::Hide(e) => e,
            Entity::Blind(e) => e,
            Entity::Fixture(e) => e,
            Entity::Wall(e) => e,
            Entity::BoardEdge(e) => e,
            Entity::TunnelPath(e) => e,
            Entity::Measurement(e) => e,
        }
    }

    pub fn id(&self) -> EntityId {
        self.as_placeable().id()
    }

    pub fn collection(&self) -> Collection {
        self.as_placeable().collection()
    }

    /// Regenerate the entity's ID (and the IDs of anything it owns).
    pub fn regenerate_id(&mut self) {
        self.as_placeable_mut().regenerate_id();
    }
}

pub(crate) fn new_id() -> EntityId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_shapes() {
        assert_eq!(Collection::Bales.coord_kind(), CoordKind::Box);
        assert_eq!(Collection::BoardEdges.coord_kind(), CoordKind::Segment);
        assert_eq!(Collection::TunnelPaths.coord_kind(), CoordKind::Polyline);
        assert!(!Collection::Gates.area_selectable());
        assert!(!Collection::Gates.bulk_movable());
        assert_eq!(Collection::Hides.default_size(), Some(Hide::SIZE));
        assert!(Collection::Bales.default_size().is_none());
    }

    #[test]
    fn test_collection_names_match_serde() {
        for collection in Collection::ALL {
            let json = serde_json::to_string(&collection).unwrap();
            assert_eq!(json, format!("\"{}\"", collection.name()));
        }
    }

    #[test]
    fn test_box_footprint_hit_test_respects_rotation() {
        let fp = Footprint::Box {
            origin: Point::new(0.0, 0.0),
            size: Size::new(4.0, 1.0),
            rotation: 90.0,
        };
        // Rotated upright about (2, 0.5): spans x 1.5..2.5, y -1.5..2.5
        assert!(fp.hit_test(Point::new(2.0, 2.0), 0.0));
        assert!(!fp.hit_test(Point::new(3.5, 0.5), 0.0));
    }

    #[test]
    fn test_representative_points() {
        let seg = Footprint::Segment(Point::new(0.0, 0.0), Point::new(4.0, 2.0));
        assert_eq!(seg.representative_point(), Some(Point::new(2.0, 1.0)));
        let poly = Footprint::Polyline(vec![Point::new(0.0, 0.0)]);
        assert!(poly.representative_point().is_none());
    }
}
