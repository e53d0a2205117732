//! Hides and the blinds that group them.

use super::{Collection, CoordsMut, EntityId, FixtureCustom, Footprint, Placeable, Pose, new_id};
use crate::document::CourseDocument;
use crate::settings::CourseMeta;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// What a hide contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HideKind {
    #[default]
    Rat,
    Litter,
    Empty,
}

impl HideKind {
    /// Cycle rat -> litter -> empty -> rat.
    pub fn next(self) -> Self {
        match self {
            HideKind::Rat => HideKind::Litter,
            HideKind::Litter => HideKind::Empty,
            HideKind::Empty => HideKind::Rat,
        }
    }
}

/// Where a hide sits relative to the bales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Elevation {
    #[default]
    RegularOver,
    Under,
}

impl Elevation {
    pub fn toggle(self) -> Self {
        match self {
            Elevation::RegularOver => Elevation::Under,
            Elevation::Under => Elevation::RegularOver,
        }
    }
}

/// A hide (rat tube, litter tube or empty tube).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hide {
    pub(crate) id: EntityId,
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(rename = "type", default)]
    pub kind: HideKind,
    #[serde(default)]
    pub elevation: Elevation,
    #[serde(default)]
    pub number: Option<u32>,
}

impl Hide {
    /// Footprint of a hide tube.
    pub const SIZE: Size = Size::new(1.0, 1.0);

    pub fn new(origin: Point, layer: u32, kind: HideKind) -> Self {
        Self {
            id: new_id(),
            pose: Pose::at(origin, layer),
            kind,
            elevation: Elevation::RegularOver,
            number: None,
        }
    }
}

impl Placeable for Hide {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::Hides
    }

    fn layer(&self) -> u32 {
        self.pose.layer
    }

    fn footprint(&self, _doc: &CourseDocument) -> Footprint {
        Footprint::Box {
            origin: self.pose.origin(),
            size: Self::SIZE,
            rotation: self.pose.rotation,
        }
    }

    fn coords_mut(&mut self, _meta: &CourseMeta) -> CoordsMut<'_> {
        CoordsMut::Box {
            pose: &mut self.pose,
            size: Self::SIZE,
        }
    }

    fn regenerate_id(&mut self) {
        self.id = new_id();
    }
}

/// A blind: a screened area owning its own hides.
///
/// Nested hides are stored in world coordinates and are not part of the
/// top-level `hides` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blind {
    pub(crate) id: EntityId,
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(default)]
    pub hides: Vec<Hide>,
    #[serde(default)]
    pub custom: FixtureCustom,
}

impl Blind {
    pub const DEFAULT_SIZE: Size = Size::new(4.0, 4.0);

    pub fn new(origin: Point, layer: u32) -> Self {
        Self {
            id: new_id(),
            pose: Pose::at(origin, layer),
            hides: Vec::new(),
            custom: FixtureCustom::default(),
        }
    }

    pub fn size(&self) -> Size {
        self.custom.size_or(Self::DEFAULT_SIZE)
    }

    /// Find a nested hide by ID.
    pub fn hide(&self, id: EntityId) -> Option<&Hide> {
        self.hides.iter().find(|h| h.id == id)
    }

    /// Find a mutable nested hide by ID.
    pub fn hide_mut(&mut self, id: EntityId) -> Option<&mut Hide> {
        self.hides.iter_mut().find(|h| h.id == id)
    }
}

impl Placeable for Blind {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::Blinds
    }

    fn layer(&self) -> u32 {
        self.pose.layer
    }

    fn footprint(&self, _doc: &CourseDocument) -> Footprint {
        Footprint::Box {
            origin: self.pose.origin(),
            size: self.size(),
            rotation: self.pose.rotation,
        }
    }

    fn coords_mut(&mut self, _meta: &CourseMeta) -> CoordsMut<'_> {
        let size = self.size();
        CoordsMut::Box {
            pose: &mut self.pose,
            size,
        }
    }

    fn children_mut(&mut self) -> Vec<&mut dyn Placeable> {
        self.hides
            .iter_mut()
            .map(|h| h as &mut dyn Placeable)
            .collect()
    }

    fn regenerate_id(&mut self) {
        self.id = new_id();
        for hide in &mut self.hides {
            hide.regenerate_id();
        }
    }
}
