//! Straw bales, the main building block of a course.

use super::{Collection, CoordsMut, EntityId, Footprint, Placeable, Pose, new_id};
use crate::document::CourseDocument;
use crate::geometry;
use crate::settings::{BaleSize, CourseMeta};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Which face of the bale rests on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Lying on its widest face: length x width.
    #[default]
    Flat,
    /// Standing on its long edge: length x height.
    Tall,
    /// Standing on its end: width x height.
    Pillar,
}

impl Orientation {
    /// Cycle to the next orientation.
    pub fn next(self) -> Self {
        match self {
            Orientation::Flat => Orientation::Tall,
            Orientation::Tall => Orientation::Pillar,
            Orientation::Pillar => Orientation::Flat,
        }
    }
}

/// Direction a flat bale leans against its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lean {
    Left,
    Right,
}

impl Lean {
    /// Cycle none -> right -> left -> none.
    pub fn cycle(lean: Option<Lean>) -> Option<Lean> {
        match lean {
            None => Some(Lean::Right),
            Some(Lean::Right) => Some(Lean::Left),
            Some(Lean::Left) => None,
        }
    }
}

/// Per-bale overrides of the course bale size and look.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaleCustom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A single bale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bale {
    pub(crate) id: EntityId,
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub lean: Option<Lean>,
    #[serde(default)]
    pub is_anchor: bool,
    /// Dock points derived from the nearest walls while `is_anchor` is set.
    #[serde(default)]
    pub custom_anchors: Vec<Point>,
    #[serde(default)]
    pub custom: BaleCustom,
}

impl Bale {
    /// Create a flat, unrotated bale.
    pub fn new(origin: Point, layer: u32) -> Self {
        Self {
            id: new_id(),
            pose: Pose::at(origin, layer),
            orientation: Orientation::Flat,
            lean: None,
            is_anchor: false,
            custom_anchors: Vec::new(),
            custom: BaleCustom::default(),
        }
    }

    /// Course dimensions with this bale's overrides applied.
    pub fn dimensions(&self, defaults: &BaleSize) -> BaleSize {
        BaleSize {
            length: self.custom.length.unwrap_or(defaults.length),
            width: self.custom.width.unwrap_or(defaults.width),
            height: self.custom.height.unwrap_or(defaults.height),
        }
    }

    /// Unrotated ground footprint for the current orientation.
    pub fn footprint_size(&self, defaults: &BaleSize) -> Size {
        let dims = self.dimensions(defaults);
        match self.orientation {
            Orientation::Flat => Size::new(dims.length, dims.width),
            Orientation::Tall => Size::new(dims.length, dims.height),
            Orientation::Pillar => Size::new(dims.width, dims.height),
        }
    }

    /// Rotation-aware bounds of the footprint.
    pub fn bounds(&self, defaults: &BaleSize) -> Rect {
        geometry::box_bounds(self.pose.origin(), self.footprint_size(defaults), self.pose.rotation)
    }

    /// World-space corners of the rotated footprint.
    pub fn corners(&self, defaults: &BaleSize) -> [Point; 4] {
        geometry::rotated_corners(
            self.pose.origin(),
            self.footprint_size(defaults),
            self.pose.rotation,
        )
    }
}

impl Placeable for Bale {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::Bales
    }

    fn layer(&self) -> u32 {
        self.pose.layer
    }

    fn footprint(&self, doc: &CourseDocument) -> Footprint {
        Footprint::Box {
            origin: self.pose.origin(),
            size: self.footprint_size(&doc.meta.bale),
            rotation: self.pose.rotation,
        }
    }

    fn coords_mut(&mut self, meta: &CourseMeta) -> CoordsMut<'_> {
        let size = self.footprint_size(&meta.bale);
        CoordsMut::Box {
            pose: &mut self.pose,
            size,
        }
    }

    fn regenerate_id(&mut self) {
        self.id = new_id();
    }
}
