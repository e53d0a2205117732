//! Selection, group transforms and the clipboard.
//!
//! Selection changes are not undoable; everything that changes the document
//! commits. Hides nested in a selected blind already travel with the blind,
//! so group operations skip them to avoid applying a transform twice.

use crate::document::CourseDocument;
use crate::editor::{Editor, Rejection};
use crate::entities::{Entity, EntityId, PathPoint, Placeable, rotate_about, translate};
use kurbo::{Point, Rect, Vec2};
use std::collections::{HashMap, HashSet};

/// Offset applied to pasted copies so they do not sit exactly on the
/// originals.
pub const PASTE_OFFSET: f64 = 1.0;

/// The set of selected entity IDs. Order is irrelevant; IDs that no longer
/// exist are ignored by every consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<EntityId>,
}

impl Selection {
    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn insert(&mut self, id: EntityId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.ids.remove(&id)
    }

    /// Flip membership. Returns whether the ID is now selected.
    pub fn toggle(&mut self, id: EntityId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) {
        self.ids.retain(|id| keep(*id));
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

fn inside(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `item` falls inside a rubber-band rectangle.
fn in_area(item: &dyn Placeable, doc: &CourseDocument, area: Rect) -> bool {
    let footprint = item.footprint(doc);
    match footprint.representative_point() {
        Some(point) => inside(area, point),
        None => footprint.visual_bounds().is_some_and(|b| overlaps(area, b)),
    }
}

impl Editor {
    /// Select a single entity, replacing the selection.
    pub fn select(&mut self, id: EntityId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selection.clear();
        self.selection.insert(id)
    }

    pub fn add_to_selection(&mut self, id: EntityId) -> bool {
        self.document.contains(id) && self.selection.insert(id)
    }

    /// Flip an entity's membership. Returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: EntityId) -> bool {
        self.document.contains(id) && self.selection.toggle(id)
    }

    /// Select every top-level entity.
    pub fn select_all(&mut self) -> usize {
        self.selection.clear();
        for item in self.document.placeables() {
            self.selection.insert(item.id());
        }
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select the frontmost entity under `point`, or clear the selection.
    pub fn select_at(&mut self, point: Point, tolerance: f64) -> Option<EntityId> {
        let hit = self.document.entities_at_point(point, tolerance).first().copied();
        self.selection.clear();
        if let Some(id) = hit {
            self.selection.insert(id);
        }
        hit
    }

    /// Replace the selection with everything inside a rectangle.
    ///
    /// Negative sizes are allowed. Boxes are picked by their center and
    /// segments by their midpoint; polylines need their bounds to overlap.
    /// Gates are never picked.
    pub fn select_area(&mut self, x: f64, y: f64, width: f64, height: f64) -> usize {
        let area = Rect::new(x, y, x + width, y + height).abs();
        let doc = &self.document;
        let mut picked: Vec<EntityId> = doc
            .placeables()
            .into_iter()
            .filter(|item| item.collection().area_selectable() && in_area(*item, doc, area))
            .map(|item| item.id())
            .collect();
        picked.extend(
            doc.nested_hides()
                .filter(|(_, hide)| in_area(*hide, doc, area))
                .map(|(_, hide)| hide.id()),
        );
        self.selection.clear();
        for id in picked {
            self.selection.insert(id);
        }
        self.selection.len()
    }

    /// Selected IDs that exist, minus nested hides whose blind is also
    /// selected.
    fn effective_selection(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .selection
            .iter()
            .filter(|id| self.document.contains(*id))
            .filter(|id| {
                self.document
                    .blind_of(*id)
                    .is_none_or(|blind| !self.selection.contains(blind))
            })
            .collect();
        ids.sort();
        ids
    }

    /// Move every selected entity by `(dx, dy)`. Gates stay put.
    pub fn move_selection(&mut self, dx: f64, dy: f64) -> bool {
        let delta = Vec2::new(dx, dy);
        let mut moved = false;
        for id in self.effective_selection() {
            let Some((item, meta)) = self.document.find_mut(id) else {
                continue;
            };
            if !item.collection().bulk_movable() {
                continue;
            }
            translate(item, meta, delta);
            moved = true;
        }
        moved && self.commit("move selection")
    }

    /// Rotate the selection as a group about the center of its combined
    /// visual bounds.
    pub fn rotate_selection(&mut self, angle_deg: f64) -> bool {
        let ids = self.effective_selection();
        if ids.iter().any(|id| self.is_anchor_bale(*id)) {
            self.reject(Rejection::AnchorRotation);
            return false;
        }
        let Some(pivot) = ids
            .iter()
            .filter_map(|id| self.document.find(*id))
            .filter_map(|item| item.footprint(&self.document).visual_bounds())
            .reduce(|a, b| a.union(b))
            .map(|bounds| bounds.center())
        else {
            return false;
        };
        for id in ids {
            if let Some((item, meta)) = self.document.find_mut(id) {
                rotate_about(item, meta, pivot, angle_deg);
            }
        }
        self.commit("rotate selection")
    }

    /// Delete every selected entity. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.effective_selection();
        let removed = ids
            .into_iter()
            .filter(|id| self.document.remove(*id).is_some())
            .count();
        self.selection.clear();
        if removed > 0 {
            self.commit("delete selection");
        }
        removed
    }

    /// Copy the selection to the clipboard. Nested hides are copied as
    /// plain hides. Returns how many entities were copied.
    pub fn copy(&mut self) -> usize {
        let copied: Vec<Entity> = self
            .effective_selection()
            .into_iter()
            .filter_map(|id| self.document.entity(id))
            .collect();
        if copied.is_empty() {
            return 0;
        }
        self.clipboard = copied;
        self.clipboard.len()
    }

    pub fn cut(&mut self) -> usize {
        let copied = self.copy();
        if copied > 0 {
            self.delete_selected();
        }
        copied
    }

    /// Insert fresh copies of the clipboard, offset slightly, and select them.
    ///
    /// Tunnel paths docked onto board edges copied in the same batch are
    /// re-docked onto the new copies.
    pub fn paste(&mut self) -> Vec<EntityId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let offset = Vec2::new(PASTE_OFFSET, PASTE_OFFSET);
        let mut edge_map: HashMap<EntityId, EntityId> = HashMap::new();
        let mut copies: Vec<Entity> = Vec::with_capacity(self.clipboard.len());
        for original in &self.clipboard {
            let mut copy = original.clone();
            copy.regenerate_id();
            if let Entity::BoardEdge(_) = copy {
                edge_map.insert(original.id(), copy.id());
            }
            translate(copy.as_placeable_mut(), &self.document.meta, offset);
            copies.push(copy);
        }
        for copy in &mut copies {
            if let Entity::TunnelPath(path) = copy {
                for point in &mut path.points {
                    if let PathPoint::EdgeAnchor { target_id } = point {
                        if let Some(new_id) = edge_map.get(&*target_id) {
                            *target_id = *new_id;
                        }
                    }
                }
            }
        }
        let ids: Vec<EntityId> = copies
            .into_iter()
            .map(|copy| self.document.insert(copy))
            .collect();
        self.selection.clear();
        for id in &ids {
            self.selection.insert(*id);
        }
        self.commit("paste");
        ids
    }
}
