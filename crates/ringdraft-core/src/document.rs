//! Course document: every collection of entities plus the metadata block.

use crate::entities::{
    ActiveWall, Bale, Blind, BoardEdge, Collection, CustomWall, Entity, EntityId, Fixture,
    FixtureKind, Hide, Measurement, Placeable, TunnelPath,
};
use crate::settings::CourseMeta;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course layout. Order inside each collection is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    #[serde(default)]
    pub meta: CourseMeta,
    #[serde(default)]
    pub bales: Vec<Bale>,
    #[serde(default)]
    pub hides: Vec<Hide>,
    #[serde(default)]
    pub blinds: Vec<Blind>,
    #[serde(default)]
    pub zones: Vec<Fixture>,
    #[serde(default)]
    pub dc_mats: Vec<Fixture>,
    #[serde(default)]
    pub start_boxes: Vec<Fixture>,
    #[serde(default)]
    pub tunnel_boards: Vec<Fixture>,
    #[serde(default)]
    pub notes: Vec<Fixture>,
    #[serde(default)]
    pub steps: Vec<Fixture>,
    #[serde(default)]
    pub gates: Vec<Fixture>,
    #[serde(default)]
    pub custom_walls: Vec<CustomWall>,
    #[serde(default)]
    pub board_edges: Vec<BoardEdge>,
    #[serde(default)]
    pub tunnel_paths: Vec<TunnelPath>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    /// Wall being drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_wall: Option<ActiveWall>,
    /// Measurement being drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_measurement: Option<Measurement>,
    /// Tunnel path being drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tunnel: Option<TunnelPath>,
}

impl Default for CourseDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn take<T: Placeable>(items: &mut Vec<T>, id: EntityId) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}

fn reorder<T: Placeable>(items: &mut Vec<T>, id: EntityId, to_front: bool) -> bool {
    let Some(index) = items.iter().position(|item| item.id() == id) else {
        return false;
    };
    let item = items.remove(index);
    if to_front {
        items.push(item);
    } else {
        items.insert(0, item);
    }
    true
}

fn extend_dyn<'a, T: Placeable>(out: &mut Vec<&'a dyn Placeable>, items: &'a [T]) {
    out.extend(items.iter().map(|item| item as &dyn Placeable));
}

fn extend_dyn_mut<'a, T: Placeable>(out: &mut Vec<&'a mut dyn Placeable>, items: &'a mut [T]) {
    out.extend(items.iter_mut().map(|item| item as &mut dyn Placeable));
}

impl CourseDocument {
    /// Create a new empty document with default metadata.
    pub fn new() -> Self {
        Self::with_meta(CourseMeta::default())
    }

    /// Create a new empty document with the given metadata.
    pub fn with_meta(meta: CourseMeta) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            meta,
            bales: Vec::new(),
            hides: Vec::new(),
            blinds: Vec::new(),
            zones: Vec::new(),
            dc_mats: Vec::new(),
            start_boxes: Vec::new(),
            tunnel_boards: Vec::new(),
            notes: Vec::new(),
            steps: Vec::new(),
            gates: Vec::new(),
            custom_walls: Vec::new(),
            board_edges: Vec::new(),
            tunnel_paths: Vec::new(),
            measurements: Vec::new(),
            active_wall: None,
            active_measurement: None,
            active_tunnel: None,
        }
    }

    /// The collection holding fixtures of `kind`.
    pub fn fixtures(&self, kind: FixtureKind) -> &Vec<Fixture> {
        match kind {
            FixtureKind::Zone => &self.zones,
            FixtureKind::DcMat => &self.dc_mats,
            FixtureKind::StartBox => &self.start_boxes,
            FixtureKind::TunnelBoard => &self.tunnel_boards,
            FixtureKind::Note => &self.notes,
            FixtureKind::Step => &self.steps,
            FixtureKind::Gate => &self.gates,
        }
    }

    /// Mutable collection holding fixtures of `kind`.
    pub fn fixtures_mut(&mut self, kind: FixtureKind) -> &mut Vec<Fixture> {
        match kind {
            FixtureKind::Zone => &mut self.zones,
            FixtureKind::DcMat => &mut self.dc_mats,
            FixtureKind::StartBox => &mut self.start_boxes,
            FixtureKind::TunnelBoard => &mut self.tunnel_boards,
            FixtureKind::Note => &mut self.notes,
            FixtureKind::Step => &mut self.steps,
            FixtureKind::Gate => &mut self.gates,
        }
    }

    /// Append an entity to the end of its collection.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        match entity {
            Entity::Bale(e) => self.bales.push(e),
            Entity::Hide(e) => self.hides.push(e),
            Entity::Blind(e) => self.blinds.push(e),
            Entity::Fixture(e) => self.fixtures_mut(e.kind).push(e),
            Entity::Wall(e) => self.custom_walls.push(e),
            Entity::BoardEdge(e) => self.board_edges.push(e),
            Entity::TunnelPath(e) => self.tunnel_paths.push(e),
            Entity::Measurement(e) => self.measurements.push(e),
        }
        id
    }

    /// Remove an entity from wherever it lives, including blind sub-lists.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        if let Some(e) = take(&mut self.bales, id) {
            return Some(Entity::Bale(e));
        }
        if let Some(e) = take(&mut self.hides, id) {
            return Some(Entity::Hide(e));
        }
        if let Some(e) = take(&mut self.blinds, id) {
            return Some(Entity::Blind(e));
        }
        for kind in FixtureKind::ALL {
            if let Some(e) = take(self.fixtures_mut(kind), id) {
                return Some(Entity::Fixture(e));
            }
        }
        if let Some(e) = take(&mut self.custom_walls, id) {
            return Some(Entity::Wall(e));
        }
        if let Some(e) = take(&mut self.board_edges, id) {
            return Some(Entity::BoardEdge(e));
        }
        if let Some(e) = take(&mut self.tunnel_paths, id) {
            return Some(Entity::TunnelPath(e));
        }
        if let Some(e) = take(&mut self.measurements, id) {
            return Some(Entity::Measurement(e));
        }
        self.blinds
            .iter_mut()
            .find_map(|blind| take(&mut blind.hides, id))
            .map(Entity::Hide)
    }

    /// Overwrite the stored entity with the same ID, keeping its position in
    /// the display order. Returns `false` if no such entity exists.
    pub fn replace(&mut self, entity: Entity) -> bool {
        fn put<T: Placeable>(slot: Option<&mut T>, value: T) -> bool {
            match slot {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            }
        }
        let id = entity.id();
        match entity {
            Entity::Bale(e) => put(self.bale_mut(id), e),
            Entity::Hide(e) => put(self.hide_mut(id), e),
            Entity::Blind(e) => put(self.blind_mut(id), e),
            Entity::Fixture(e) => put(self.fixture_mut(id), e),
            Entity::Wall(e) => put(self.wall_mut(id), e),
            Entity::BoardEdge(e) => put(self.board_edges.iter_mut().find(|b| b.id == id), e),
            Entity::TunnelPath(e) => put(self.tunnel_paths.iter_mut().find(|p| p.id == id), e),
            Entity::Measurement(e) => put(self.measurements.iter_mut().find(|m| m.id == id), e),
        }
    }

    /// Clone an entity by ID. Hides nested in a blind come back as plain hides.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        fn find<T: Placeable + Clone>(items: &[T], id: EntityId) -> Option<T> {
            items.iter().find(|item| item.id() == id).cloned()
        }
        find(&self.bales, id)
            .map(Entity::Bale)
            .or_else(|| find(&self.hides, id).map(Entity::Hide))
            .or_else(|| find(&self.blinds, id).map(Entity::Blind))
            .or_else(|| {
                FixtureKind::ALL
                    .into_iter()
                    .find_map(|kind| find(self.fixtures(kind), id))
                    .map(Entity::Fixture)
            })
            .or_else(|| find(&self.custom_walls, id).map(Entity::Wall))
            .or_else(|| find(&self.board_edges, id).map(Entity::BoardEdge))
            .or_else(|| find(&self.tunnel_paths, id).map(Entity::TunnelPath))
            .or_else(|| find(&self.measurements, id).map(Entity::Measurement))
            .or_else(|| self.nested_hide(id).map(|(_, hide)| Entity::Hide(hide.clone())))
    }

    /// Whether an entity with this ID exists anywhere in the document.
    pub fn contains(&self, id: EntityId) -> bool {
        self.find(id).is_some()
    }

    /// All top-level entities in collection order. Hides nested in blinds
    /// are reached through [`Self::nested_hides`].
    pub fn placeables(&self) -> Vec<&dyn Placeable> {
        let mut out: Vec<&dyn Placeable> = Vec::new();
        extend_dyn(&mut out, &self.bales);
        extend_dyn(&mut out, &self.hides);
        extend_dyn(&mut out, &self.blinds);
        for kind in FixtureKind::ALL {
            extend_dyn(&mut out, self.fixtures(kind));
        }
        extend_dyn(&mut out, &self.custom_walls);
        extend_dyn(&mut out, &self.board_edges);
        extend_dyn(&mut out, &self.tunnel_paths);
        extend_dyn(&mut out, &self.measurements);
        out
    }

    /// Mutable top-level entities, together with the metadata needed to
    /// size them.
    pub fn placeables_mut(&mut self) -> (&CourseMeta, Vec<&mut dyn Placeable>) {
        let mut out: Vec<&mut dyn Placeable> = Vec::new();
        extend_dyn_mut(&mut out, &mut self.bales);
        extend_dyn_mut(&mut out, &mut self.hides);
        extend_dyn_mut(&mut out, &mut self.blinds);
        extend_dyn_mut(&mut out, &mut self.zones);
        extend_dyn_mut(&mut out, &mut self.dc_mats);
        extend_dyn_mut(&mut out, &mut self.start_boxes);
        extend_dyn_mut(&mut out, &mut self.tunnel_boards);
        extend_dyn_mut(&mut out, &mut self.notes);
        extend_dyn_mut(&mut out, &mut self.steps);
        extend_dyn_mut(&mut out, &mut self.gates);
        extend_dyn_mut(&mut out, &mut self.custom_walls);
        extend_dyn_mut(&mut out, &mut self.board_edges);
        extend_dyn_mut(&mut out, &mut self.tunnel_paths);
        extend_dyn_mut(&mut out, &mut self.measurements);
        (&self.meta, out)
    }

    /// Hides owned by blinds, with their owning blind.
    pub fn nested_hides(&self) -> impl Iterator<Item = (&Blind, &Hide)> {
        self.blinds
            .iter()
            .flat_map(|blind| blind.hides.iter().map(move |hide| (blind, hide)))
    }

    /// Find a hide nested in a blind.
    pub fn nested_hide(&self, id: EntityId) -> Option<(&Blind, &Hide)> {
        self.nested_hides().find(|(_, hide)| hide.id == id)
    }

    /// ID of the blind owning a nested hide.
    pub fn blind_of(&self, hide_id: EntityId) -> Option<EntityId> {
        self.nested_hide(hide_id).map(|(blind, _)| blind.id)
    }

    /// Find any entity by ID, top-level or nested.
    pub fn find(&self, id: EntityId) -> Option<&dyn Placeable> {
        self.placeables()
            .into_iter()
            .find(|item| item.id() == id)
            .or_else(|| self.nested_hide(id).map(|(_, hide)| hide as &dyn Placeable))
    }

    /// Find any entity by ID for mutation, with the metadata needed to size it.
    pub fn find_mut(&mut self, id: EntityId) -> Option<(&mut dyn Placeable, &CourseMeta)> {
        if self.placeables().iter().any(|item| item.id() == id) {
            let (meta, items) = self.placeables_mut();
            return items
                .into_iter()
                .find(|item| item.id() == id)
                .map(|item| (item, meta));
        }
        let meta = &self.meta;
        self.blinds
            .iter_mut()
            .flat_map(|blind| blind.hides.iter_mut())
            .find(|hide| hide.id == id)
            .map(|hide| (hide as &mut dyn Placeable, meta))
    }

    pub fn bale(&self, id: EntityId) -> Option<&Bale> {
        self.bales.iter().find(|b| b.id == id)
    }

    pub fn bale_mut(&mut self, id: EntityId) -> Option<&mut Bale> {
        self.bales.iter_mut().find(|b| b.id == id)
    }

    /// Find a hide, top-level or nested in a blind.
    pub fn hide_mut(&mut self, id: EntityId) -> Option<&mut Hide> {
        if let Some(index) = self.hides.iter().position(|h| h.id == id) {
            return self.hides.get_mut(index);
        }
        self.blinds.iter_mut().find_map(|blind| blind.hide_mut(id))
    }

    pub fn blind_mut(&mut self, id: EntityId) -> Option<&mut Blind> {
        self.blinds.iter_mut().find(|b| b.id == id)
    }

    pub fn fixture_mut(&mut self, id: EntityId) -> Option<&mut Fixture> {
        let kind = FixtureKind::ALL
            .into_iter()
            .find(|kind| self.fixtures(*kind).iter().any(|f| f.id == id))?;
        self.fixtures_mut(kind).iter_mut().find(|f| f.id == id)
    }

    pub fn wall_mut(&mut self, id: EntityId) -> Option<&mut CustomWall> {
        self.custom_walls.iter_mut().find(|w| w.id == id)
    }

    pub fn board_edge(&self, id: EntityId) -> Option<&BoardEdge> {
        self.board_edges.iter().find(|e| e.id == id)
    }

    pub fn tunnel_path(&self, id: EntityId) -> Option<&TunnelPath> {
        self.tunnel_paths.iter().find(|p| p.id == id)
    }

    /// Collection an entity belongs to.
    pub fn collection_of(&self, id: EntityId) -> Option<Collection> {
        self.find(id).map(|item| item.collection())
    }

    /// Move an entity to the end of its collection (drawn on top).
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        self.reorder(id, true)
    }

    /// Move an entity to the start of its collection (drawn underneath).
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        self.reorder(id, false)
    }

    fn reorder(&mut self, id: EntityId, to_front: bool) -> bool {
        reorder(&mut self.bales, id, to_front)
            || reorder(&mut self.hides, id, to_front)
            || reorder(&mut self.blinds, id, to_front)
            || reorder(&mut self.zones, id, to_front)
            || reorder(&mut self.dc_mats, id, to_front)
            || reorder(&mut self.start_boxes, id, to_front)
            || reorder(&mut self.tunnel_boards, id, to_front)
            || reorder(&mut self.notes, id, to_front)
            || reorder(&mut self.steps, id, to_front)
            || reorder(&mut self.gates, id, to_front)
            || reorder(&mut self.custom_walls, id, to_front)
            || reorder(&mut self.board_edges, id, to_front)
            || reorder(&mut self.tunnel_paths, id, to_front)
            || reorder(&mut self.measurements, id, to_front)
            || self
                .blinds
                .iter_mut()
                .any(|blind| reorder(&mut blind.hides, id, to_front))
    }

    /// Entities under a point, frontmost first. Blind hides sit above their blind.
    pub fn entities_at_point(&self, point: Point, tolerance: f64) -> Vec<EntityId> {
        let mut hits = Vec::new();
        for item in self.placeables() {
            if item.footprint(self).hit_test(point, tolerance) {
                hits.push(item.id());
            }
            if item.collection() == Collection::Blinds {
                for (blind, hide) in self.nested_hides() {
                    if blind.id == item.id() && hide.footprint(self).hit_test(point, tolerance) {
                        hits.push(hide.id);
                    }
                }
            }
        }
        hits.reverse();
        hits
    }

    /// Get the bounding box of all entities.
    pub fn bounds(&self) -> Option<Rect> {
        self.placeables()
            .into_iter()
            .filter_map(|item| item.footprint(self).visual_bounds())
            .reduce(|a, b| a.union(b))
    }

    /// Number of entities, counting hides nested in blinds.
    pub fn len(&self) -> usize {
        self.placeables().len() + self.nested_hides().count()
    }

    /// Check if the document has no entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{HideKind, PathPoint};

    #[test]
    fn test_document_creation() {
        let doc = CourseDocument::new();
        assert!(doc.is_empty());
        assert!(doc.bounds().is_none());
    }

    #[test]
    fn test_insert_routes_by_collection() {
        let mut doc = CourseDocument::new();
        let gate = Fixture::new(FixtureKind::Gate, Point::new(1.0, 1.0), 1);
        let id = doc.insert(Entity::Fixture(gate));
        assert_eq!(doc.gates.len(), 1);
        assert_eq!(doc.collection_of(id), Some(Collection::Gates));
    }

    #[test]
    fn test_remove_nested_hide() {
        let mut doc = CourseDocument::new();
        let mut blind = Blind::new(Point::new(0.0, 0.0), 1);
        let hide = Hide::new(Point::new(1.0, 1.0), 1, HideKind::Rat);
        let hide_id = hide.id;
        blind.hides.push(hide);
        let blind_id = doc.insert(Entity::Blind(blind));

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.blind_of(hide_id), Some(blind_id));
        assert!(matches!(doc.remove(hide_id), Some(Entity::Hide(_))));
        assert_eq!(doc.len(), 1);
        assert!(doc.remove(hide_id).is_none());
    }

    #[test]
    fn test_find_mut_reaches_nested_hides() {
        let mut doc = CourseDocument::new();
        let mut blind = Blind::new(Point::new(0.0, 0.0), 1);
        let hide = Hide::new(Point::new(1.0, 1.0), 1, HideKind::Rat);
        let hide_id = hide.id;
        blind.hides.push(hide);
        doc.insert(Entity::Blind(blind));

        let (item, _) = doc.find_mut(hide_id).unwrap();
        assert_eq!(item.collection(), Collection::Hides);
    }

    #[test]
    fn test_z_order() {
        let mut doc = CourseDocument::new();
        let id1 = doc.insert(Entity::Bale(Bale::new(Point::new(0.0, 0.0), 1)));
        let id2 = doc.insert(Entity::Bale(Bale::new(Point::new(5.0, 5.0), 1)));
        assert_eq!(doc.bales.iter().map(|b| b.id).collect::<Vec<_>>(), vec![id1, id2]);

        assert!(doc.bring_to_front(id1));
        assert_eq!(doc.bales.iter().map(|b| b.id).collect::<Vec<_>>(), vec![id2, id1]);

        assert!(doc.send_to_back(id1));
        assert_eq!(doc.bales.iter().map(|b| b.id).collect::<Vec<_>>(), vec![id1, id2]);
    }

    #[test]
    fn test_entities_at_point() {
        let mut doc = CourseDocument::new();
        let id1 = doc.insert(Entity::Bale(Bale::new(Point::new(0.0, 0.0), 1)));
        let id2 = doc.insert(Entity::Bale(Bale::new(Point::new(1.0, 0.0), 2)));

        let hits = doc.entities_at_point(Point::new(2.0, 0.5), 0.0);
        assert_eq!(hits, vec![id2, id1]);

        let hits = doc.entities_at_point(Point::new(0.5, 0.5), 0.0);
        assert_eq!(hits, vec![id1]);
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut doc = CourseDocument::new();
        let id1 = doc.insert(Entity::Bale(Bale::new(Point::new(0.0, 0.0), 1)));
        doc.insert(Entity::Bale(Bale::new(Point::new(5.0, 5.0), 1)));

        let Some(Entity::Bale(mut bale)) = doc.entity(id1) else {
            panic!("bale missing");
        };
        bale.pose.x = 2.0;
        assert!(doc.replace(Entity::Bale(bale)));
        assert_eq!(doc.bales[0].id, id1);
        assert_eq!(doc.bales[0].pose.x, 2.0);

        assert!(!doc.replace(Entity::Bale(Bale::new(Point::ZERO, 1))));
    }

    #[test]
    fn test_entity_clone_lookup() {
        let mut doc = CourseDocument::new();
        let path = TunnelPath::from_points(vec![PathPoint::Static(Point::new(1.0, 1.0))]);
        let id = doc.insert(Entity::TunnelPath(path));
        assert!(matches!(doc.entity(id), Some(Entity::TunnelPath(_))));
        assert!(doc.entity(Uuid::new_v4()).is_none());
    }
}
