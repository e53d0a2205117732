//! Distance measurements drawn on the course.

use super::{Collection, CoordsMut, EntityId, Footprint, Placeable, new_id};
use crate::document::CourseDocument;
use crate::geometry;
use crate::settings::CourseMeta;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An open polyline whose total length is shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub(crate) id: EntityId,
    pub points: Vec<Point>,
}

impl Default for Measurement {
    fn default() -> Self {
        Self::new()
    }
}

impl Measurement {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            points: Vec::new(),
        }
    }

    pub fn length(&self) -> f64 {
        geometry::polyline_length(&self.points)
    }
}

impl Placeable for Measurement {
    fn id(&self) -> EntityId {
        self.id
    }

    fn collection(&self) -> Collection {
        Collection::Measurements
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
