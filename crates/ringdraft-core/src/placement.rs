//! Adding, editing and removing entities.
//!
//! Every stored coordinate is snapped to the grid. Candidate states are
//! built on a copy and validated against the ring (and, depending on the
//! course policy, against other bales) before the document is touched, so a
//! rejected edit never reaches history.

use crate::document::CourseDocument;
use crate::editor::{Editor, Rejection};
use crate::entities::{
    Bale, Blind, BoardEdge, Collection, CoordsMut, Entity, EntityId, Fixture, FixtureKind, Hide,
    HideKind, Lean, Measurement, Orientation, Placeable, clamp_into, realign, rotate_about,
    translate,
};
use crate::geometry;
use crate::notify::Severity;
use crate::settings::{CourseMeta, PlacementPolicy, RingSize};
use crate::snap::{snap, snap_point};
use kurbo::{Point, Vec2};

/// Overlap with the layer below needed to hold a bale up, in square feet.
pub const MIN_SUPPORT_AREA: f64 = 1.0;

/// Same-layer bale overlap tolerated before a placement counts as obstructed.
const OBSTRUCTION_AREA: f64 = 0.01;

/// Slack when testing a footprint against the ring edges.
const BOUNDS_EPSILON: f64 = 1e-6;

/// Partial update of an entity's placement.
///
/// Position and rotation apply to box entities as-is. Segments and polylines
/// move so that their first point lands on the new position; rotation is not
/// applicable to them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub layer: Option<u32>,
}

impl EntityPatch {
    pub fn position(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn layer(layer: u32) -> Self {
        Self {
            layer: Some(layer),
            ..Self::default()
        }
    }
}

fn apply_patch(entity: &mut Entity, meta: &CourseMeta, patch: EntityPatch) {
    if let Entity::BoardEdge(edge) = entity {
        if let Some(layer) = patch.layer {
            edge.layer = layer.max(1);
        }
    }
    let item = entity.as_placeable_mut();
    let target = |from: Point| {
        snap_point(Point::new(
            patch.x.unwrap_or(from.x),
            patch.y.unwrap_or(from.y),
        ))
    };
    let carried = match item.coords_mut(meta) {
        CoordsMut::Box { pose, .. } => {
            let old = pose.origin();
            pose.set_origin(target(old));
            if let Some(rotation) = patch.rotation {
                pose.rotation = geometry::normalize_angle(rotation);
            }
            if let Some(layer) = patch.layer {
                pose.layer = layer.max(1);
            }
            pose.origin() - old
        }
        CoordsMut::Segment(a, b) => {
            let delta = target(*a) - *a;
            *a += delta;
            *b += delta;
            Vec2::ZERO
        }
        CoordsMut::Polyline(mut points) => {
            if let Some(first) = points.first().map(|p| **p) {
                let delta = target(first) - first;
                for p in points.iter_mut() {
                    **p += delta;
                }
            }
            Vec2::ZERO
        }
    };
    if carried != Vec2::ZERO {
        for child in item.children_mut() {
            translate(child, meta, carried);
        }
    }
}

/// Summed overlap between a bale and every bale one layer below it.
///
/// Overlaps are added independently, so two lower bales under the same spot
/// both count.
pub fn support_area(doc: &CourseDocument, bale: &Bale) -> f64 {
    if bale.pose.layer <= 1 {
        return 0.0;
    }
    let bounds = bale.bounds(&doc.meta.bale);
    doc.bales
        .iter()
        .filter(|other| other.id != bale.id && other.pose.layer == bale.pose.layer - 1)
        .map(|other| geometry::overlap_area(bounds, other.bounds(&doc.meta.bale)))
        .sum()
}

/// Ground-level bales are always supported; higher ones need enough overlap
/// with the layer below.
pub fn is_supported(doc: &CourseDocument, bale: &Bale) -> bool {
    bale.pose.layer <= 1 || support_area(doc, bale) >= MIN_SUPPORT_AREA
}

/// IDs of every bale lacking support, in display order.
pub fn unsupported_bales(doc: &CourseDocument) -> Vec<EntityId> {
    doc.bales
        .iter()
        .filter(|bale| !is_supported(doc, bale))
        .map(|bale| bale.id)
        .collect()
}

impl Editor {
    /// Check a candidate state against the ring and the placement policy.
    pub(crate) fn validate(&self, item: &dyn Placeable) -> Result<(), Rejection> {
        let doc = &self.document;
        let Some(bounds) = item.footprint(doc).visual_bounds() else {
            return Ok(());
        };
        let ring = doc.meta.ring.bounds();
        if bounds.x0 < ring.x0 - BOUNDS_EPSILON
            || bounds.y0 < ring.y0 - BOUNDS_EPSILON
            || bounds.x1 > ring.x1 + BOUNDS_EPSILON
            || bounds.y1 > ring.y1 + BOUNDS_EPSILON
        {
            return Err(Rejection::OutOfBounds);
        }
        if doc.meta.placement_policy == PlacementPolicy::BoundsAndObstruction
            && item.collection() == Collection::Bales
        {
            let obstructed = doc.bales.iter().any(|other| {
                other.id != item.id()
                    && other.pose.layer == item.layer()
                    && geometry::overlap_area(bounds, other.bounds(&doc.meta.bale))
                        > OBSTRUCTION_AREA
            });
            if obstructed {
                return Err(Rejection::Obstructed);
            }
        }
        Ok(())
    }

    /// Validate and insert a new entity, then commit.
    fn place(&mut self, entity: Entity, label: &str) -> Option<EntityId> {
        if let Err(rejection) = self.validate(entity.as_placeable()) {
            self.reject(rejection);
            return None;
        }
        let id = self.document.insert(entity);
        self.commit(label);
        Some(id)
    }

    /// Validate a modified copy and swap it in, then commit.
    fn swap_in(&mut self, entity: Entity, label: &str) -> bool {
        if let Err(rejection) = self.validate(entity.as_placeable()) {
            self.reject(rejection);
            return false;
        }
        let id = entity.id();
        if !self.document.replace(entity) {
            return false;
        }
        self.warn_if_unsupported(id);
        self.commit(label)
    }

    fn warn_if_unsupported(&self, id: EntityId) {
        if let Some(bale) = self.document.bale(id) {
            if !is_supported(&self.document, bale) {
                self.notify("Bale is not supported by the layer below", Severity::Info);
            }
        }
    }

    /// Place a flat bale with its top-left at `point` on the active layer.
    pub fn add_bale(&mut self, point: Point) -> Option<EntityId> {
        let bale = Bale::new(snap_point(point), self.context.layer);
        let id = self.place(Entity::Bale(bale), "add bale")?;
        self.warn_if_unsupported(id);
        Some(id)
    }

    pub fn add_hide(&mut self, point: Point, kind: HideKind) -> Option<EntityId> {
        let hide = Hide::new(snap_point(point), self.context.layer, kind);
        self.place(Entity::Hide(hide), "add hide")
    }

    /// Add a hide owned by a blind. The hide moves with the blind.
    pub fn add_hide_to_blind(
        &mut self,
        blind_id: EntityId,
        point: Point,
        kind: HideKind,
    ) -> Option<EntityId> {
        let layer = self.document.blinds.iter().find(|b| b.id == blind_id)?.pose.layer;
        let hide = Hide::new(snap_point(point), layer, kind);
        if let Err(rejection) = self.validate(&hide) {
            self.reject(rejection);
            return None;
        }
        let id = hide.id;
        self.document.blind_mut(blind_id)?.hides.push(hide);
        self.commit("add hide to blind");
        Some(id)
    }

    pub fn add_blind(&mut self, point: Point) -> Option<EntityId> {
        let blind = Blind::new(snap_point(point), self.context.layer);
        self.place(Entity::Blind(blind), "add blind")
    }

    pub fn add_fixture(&mut self, kind: FixtureKind, point: Point) -> Option<EntityId> {
        let fixture = Fixture::new(kind, snap_point(point), self.context.layer);
        self.place(Entity::Fixture(fixture), "add fixture")
    }

    pub fn add_note(&mut self, point: Point, text: impl Into<String>) -> Option<EntityId> {
        let mut note = Fixture::new(FixtureKind::Note, snap_point(point), self.context.layer);
        note.text = Some(text.into());
        self.place(Entity::Fixture(note), "add note")
    }

    /// Add a board edge. A zero-length edge is ignored.
    pub fn add_board_edge(&mut self, start: Point, end: Point) -> Option<EntityId> {
        let (start, end) = (snap_point(start), snap_point(end));
        if start == end {
            return None;
        }
        let edge = BoardEdge::new(start, end, self.context.layer);
        self.place(Entity::BoardEdge(edge), "add board edge")
    }

    /// Apply a partial placement update.
    pub fn update(&mut self, id: EntityId, patch: EntityPatch) -> bool {
        let Some(mut entity) = self.document.entity(id) else {
            return false;
        };
        if let Entity::Bale(bale) = &entity {
            let turns = patch
                .rotation
                .is_some_and(|r| geometry::normalize_angle(r) != bale.pose.rotation);
            if bale.is_anchor && turns {
                self.reject(Rejection::AnchorRotation);
                return false;
            }
        }
        apply_patch(&mut entity, &self.document.meta, patch);
        self.swap_in(entity, "update")
    }

    /// Replace a note or label's text.
    pub fn set_text(&mut self, id: EntityId, text: impl Into<String>) -> bool {
        let Some(fixture) = self.document.fixture_mut(id) else {
            return false;
        };
        fixture.text = Some(text.into());
        self.commit("set text")
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        if self.document.remove(id).is_none() {
            return false;
        }
        self.selection.remove(id);
        self.commit("remove")
    }

    /// Rotate an entity about its own center by `delta_deg`.
    pub fn rotate(&mut self, id: EntityId, delta_deg: f64) -> bool {
        let Some(mut entity) = self.document.entity(id) else {
            return false;
        };
        if self.is_anchor_bale(id) {
            self.reject(Rejection::AnchorRotation);
            return false;
        }
        let footprint = entity.as_placeable().footprint(&self.document);
        let Some(pivot) = footprint
            .representative_point()
            .or_else(|| footprint.visual_bounds().map(|b| b.center()))
        else {
            return false;
        };
        rotate_about(entity.as_placeable_mut(), &self.document.meta, pivot, delta_deg);
        self.swap_in(entity, "rotate")
    }

    pub(crate) fn is_anchor_bale(&self, id: EntityId) -> bool {
        self.document.bale(id).is_some_and(|bale| bale.is_anchor)
    }

    fn edit_bale(
        &mut self,
        id: EntityId,
        label: &str,
        edit: impl FnOnce(&mut Bale) -> Result<(), Rejection>,
    ) -> bool {
        let Some(mut bale) = self.document.bale(id).cloned() else {
            return false;
        };
        if let Err(rejection) = edit(&mut bale) {
            self.reject(rejection);
            return false;
        }
        self.swap_in(Entity::Bale(bale), label)
    }

    /// Flat -> tall -> pillar -> flat. Anchors keep their orientation.
    pub fn cycle_orientation(&mut self, id: EntityId) -> bool {
        self.edit_bale(id, "cycle orientation", |bale| {
            if bale.is_anchor {
                return Err(Rejection::AnchorOrientation);
            }
            bale.orientation = bale.orientation.next();
            if bale.orientation != Orientation::Flat {
                bale.lean = None;
            }
            Ok(())
        })
    }

    /// None -> right -> left -> none, for flat non-anchor bales.
    pub fn cycle_lean(&mut self, id: EntityId) -> bool {
        self.edit_bale(id, "cycle lean", |bale| {
            if bale.is_anchor {
                return Err(Rejection::AnchorLean);
            }
            if bale.orientation != Orientation::Flat {
                return Err(Rejection::LeanNotFlat);
            }
            bale.lean = Lean::cycle(bale.lean);
            Ok(())
        })
    }

    /// Flag or unflag a bale as an anchor. Dock points follow on commit.
    pub fn toggle_anchor(&mut self, id: EntityId) -> bool {
        self.edit_bale(id, "toggle anchor", |bale| {
            if !bale.is_anchor && bale.orientation == Orientation::Pillar {
                return Err(Rejection::PillarAnchor);
            }
            bale.is_anchor = !bale.is_anchor;
            if bale.is_anchor {
                bale.lean = None;
            }
            Ok(())
        })
    }

    fn edit_hide(&mut self, id: EntityId, label: &str, edit: impl FnOnce(&mut Hide)) -> bool {
        let Some(hide) = self.document.hide_mut(id) else {
            return false;
        };
        edit(hide);
        self.commit(label)
    }

    /// Rat -> litter -> empty -> rat.
    pub fn cycle_hide_kind(&mut self, id: EntityId) -> bool {
        self.edit_hide(id, "cycle hide kind", |hide| hide.kind = hide.kind.next())
    }

    pub fn cycle_elevation(&mut self, id: EntityId) -> bool {
        self.edit_hide(id, "cycle elevation", |hide| {
            hide.elevation = hide.elevation.toggle()
        })
    }

    pub fn set_hide_number(&mut self, id: EntityId, number: Option<u32>) -> bool {
        self.edit_hide(id, "set hide number", |hide| hide.number = number)
    }

    /// Toggle one segment of a wall between fence and solid.
    pub fn cycle_segment_type(&mut self, wall_id: EntityId, index: usize) -> bool {
        let Some(segment) = self
            .document
            .wall_mut(wall_id)
            .and_then(|wall| wall.segment_types.get_mut(index))
        else {
            return false;
        };
        *segment = segment.toggle();
        self.commit("cycle segment type")
    }

    /// Add a corner to the wall being drawn, starting one if needed.
    pub fn wall_click(&mut self, point: Point) -> bool {
        let point = snap_point(point);
        let ring = self.document.meta.ring.bounds();
        if geometry::clamp_point(point, ring) != point {
            self.reject(Rejection::OutOfBounds);
            return false;
        }
        let segment_type = self.document.meta.wall_defaults.segment_type;
        self.history.clear_draw_redo();
        self.document
            .active_wall
            .get_or_insert_with(Default::default)
            .push(point, segment_type);
        true
    }

    /// Close the wall being drawn and add it to the course.
    pub fn close_wall(&mut self) -> Option<EntityId> {
        let active = self.document.active_wall.as_ref()?;
        if !active.can_close() {
            self.reject(Rejection::WallTooShort);
            return None;
        }
        let wall = self.document.active_wall.take()?.into_wall();
        self.history.clear_draw_redo();
        let id = self.document.insert(Entity::Wall(wall));
        log::debug!("Wall closed");
        self.commit("close wall");
        Some(id)
    }

    /// Add a point to the measurement being drawn.
    pub fn measure_click(&mut self, point: Point) -> bool {
        self.history.clear_draw_redo();
        self.document
            .active_measurement
            .get_or_insert_with(Measurement::new)
            .points
            .push(snap_point(point));
        true
    }

    /// Keep the measurement being drawn. Fewer than two points discards it.
    pub fn finish_measurement(&mut self) -> Option<EntityId> {
        let measurement = self.document.active_measurement.take()?;
        self.history.clear_draw_redo();
        if measurement.points.len() < 2 {
            return None;
        }
        let id = self.document.insert(Entity::Measurement(measurement));
        self.commit("add measurement");
        Some(id)
    }

    /// Put every entity back on the grid as the user sees it.
    pub fn realign(&mut self) -> bool {
        let (meta, items) = self.document.placeables_mut();
        for item in items {
            realign(item, meta);
        }
        self.commit("realign")
    }

    /// Change the ring size.
    ///
    /// When the grid origin sits on the right or bottom edge, entities shift
    /// with that edge. Anything left outside is then pulled back in.
    pub fn resize_ring(&mut self, width: f64, height: f64) -> bool {
        let (width, height) = (snap(width), snap(height));
        // A size below one grid step snaps to nothing.
        if !(width > 0.0 && height > 0.0) {
            self.reject(Rejection::InvalidRing);
            return false;
        }
        let old = self.document.meta.ring;
        let origin = self.document.meta.grid_origin;
        let delta = Vec2::new(
            if origin.is_right() { width - old.width } else { 0.0 },
            if origin.is_bottom() { height - old.height } else { 0.0 },
        );
        self.document.meta.ring = RingSize::new(width, height);
        let bounds = self.document.meta.ring.bounds();
        let (meta, items) = self.document.placeables_mut();
        for item in items {
            if delta != Vec2::ZERO {
                translate(item, meta, delta);
            }
            clamp_into(item, meta, bounds);
        }
        self.commit("resize ring")
    }

    /// Whether a bale is held up by the layer below.
    pub fn is_supported(&self, id: EntityId) -> bool {
        self.document
            .bale(id)
            .is_some_and(|bale| is_supported(&self.document, bale))
    }

    pub fn unsupported_bales(&self) -> Vec<EntityId> {
        unsupported_bales(&self.document)
    }

    /// Move an entity to the top of its collection's drawing order.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        self.document.bring_to_front(id) && self.commit("bring to front")
    }

    /// Move an entity to the bottom of its collection's drawing order.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        self.document.send_to_back(id) && self.commit("send to back")
    }
}
