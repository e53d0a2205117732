//! Simple box-shaped course furniture: zones, mats, start boxes and friends.

use super::{Collection, CoordsMut, EntityId, Footprint, Placeable, Pose, new_id};
use crate::document::CourseDocument;
use crate::settings::CourseMeta;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// The kind of fixture, which also decides its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixtureKind {
    Zone,
    DcMat,
    StartBox,
    TunnelBoard,
    Note,
    Step,
    Gate,
}

impl FixtureKind {
    pub const ALL: [FixtureKind; 7] = [
        FixtureKind::Zone,
        FixtureKind::DcMat,
        FixtureKind::StartBox,
        FixtureKind::TunnelBoard,
        FixtureKind::Note,
        FixtureKind::Step,
        FixtureKind::Gate,
    ];

    pub fn collection(self) -> Collection {
        match self {
            FixtureKind::Zone => Collection::Zones,
            FixtureKind::DcMat => Collection::DcMats,
            FixtureKind::StartBox => Collection::StartBoxes,
            FixtureKind::TunnelBoard => Collection::TunnelBoards,
            FixtureKind::Note => Collection::Notes,
            FixtureKind::Step => Collection::Steps,
            FixtureKind::Gate => Collection::Gates,
        }
    }

    pub fn from_collection(collection: Collection) -> Option<Self> {
        FixtureKind::ALL
            .into_iter()
            .find(|kind| kind.collection() == collection)
    }

    /// Footprint used when no override is set.
    pub fn default_size(self) -> Size {
        match self {
            FixtureKind::Zone => Size::new(4.0, 4.0),
            FixtureKind::DcMat => Size::new(3.0, 2.0),
            FixtureKind::StartBox => Size::new(4.0, 4.0),
            FixtureKind::TunnelBoard => Size::new(4.0, 2.0),
            FixtureKind::Note => Size::new(4.0, 1.0),
            FixtureKind::Step => Size::new(2.0, 1.0),
            FixtureKind::Gate => Size::new(4.0, 0.5),
        }
    }
}

/// Optional size and style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureCustom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FixtureCustom {
    /// Apply the overrides to a default size.
    pub fn size_or(&self, default: Size) -> Size {
        Size::new(
            self.width.unwrap_or(default.width),
            self.height.unwrap_or(default.height),
        )
    }
}

/// A zone, mat, start box, tunnel board, note, step or gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub(crate) id: EntityId,
    pub kind: FixtureKind,
    #[serde(flatten)]
    pub pose: Pose,
    /// Label or note text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub custom: FixtureCustom,
}

impl Fixture {
    pub fn new(kind: FixtureKind, origin: Point, layer: u32) -> Self {
        Self {
            id: new_id(),
            kind,
            pose: Pose::at(origin, layer),
            text: None,
            custom: FixtureCustom::default(),
        }
    }

    pub fn size(&self) -> Size {
        self.custom.size_or(self.kind.default_size())
    }
}

impl Placeable for Fixture {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        self.kind.collection()
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

    fn regenerate_id(&mut self) {
        self.id = new_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_collection_round_trip() {
        for kind in FixtureKind::ALL {
            assert_eq!(FixtureKind::from_collection(kind.collection()), Some(kind));
        }
        assert_eq!(FixtureKind::from_collection(Collection::Bales), None);
    }

    #[test]
    fn test_size_overrides() {
        let mut zone = Fixture::new(FixtureKind::Zone, Point::ZERO, 1);
        assert_eq!(zone.size(), Size::new(4.0, 4.0));
        zone.custom.height = Some(10.0);
        assert_eq!(zone.size(), Size::new(4.0, 10.0));
    }
}
