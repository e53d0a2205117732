//! Snapshot-based undo/redo over the whole course document.
//!
//! The stack always holds at least one entry (the state the editor started
//! from). A cursor points at the snapshot matching the live document; taking
//! a new snapshot after an undo discards everything past the cursor.
//!
//! Multi-click draws (walls, tunnels, measurements) are not committed until
//! they finish, so their individual clicks are undone through a separate
//! point stack that takes precedence over the document history.

use crate::document::CourseDocument;
use crate::entities::{PathPoint, SegmentType};
use kurbo::Point;

/// Maximum number of snapshots to keep.
pub const MAX_HISTORY: usize = 50;

/// Whether a restore is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// A snapshot is being applied; new snapshots are suppressed.
    Restoring,
}

/// A point popped off an in-progress draw.
#[derive(Debug, Clone, PartialEq)]
pub enum RedoPoint {
    Wall(Point, SegmentType),
    Measurement(Point),
    Tunnel(PathPoint),
}

#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<CourseDocument>,
    index: usize,
    phase: Phase,
    draw_redo: Vec<RedoPoint>,
}

impl History {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: &CourseDocument) -> Self {
        Self {
            snapshots: vec![initial.clone()],
            index: 0,
            phase: Phase::Idle,
            draw_redo: Vec::new(),
        }
    }

    /// Drop every entry and start over from `doc`.
    pub fn reset(&mut self, doc: &CourseDocument) {
        *self = Self::new(doc);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Record the document after a mutation.
    ///
    /// Returns `false` when nothing was recorded: during a restore, or when
    /// the document equals the current snapshot.
    pub fn snapshot(&mut self, doc: &CourseDocument) -> bool {
        if self.phase == Phase::Restoring {
            return false;
        }
        if self.snapshots.get(self.index) == Some(doc) {
            return false;
        }
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(doc.clone());
        if self.snapshots.len() > MAX_HISTORY {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
        self.draw_redo.clear();
        true
    }

    /// Whether undo would do anything for this document.
    pub fn can_undo(&self, doc: &CourseDocument) -> bool {
        active_draw_len(doc) > 0 || self.index > 0
    }

    /// Whether redo would do anything for this document.
    pub fn can_redo(&self, doc: &CourseDocument) -> bool {
        (has_active_draw(doc) && !self.draw_redo.is_empty())
            || self.index + 1 < self.snapshots.len()
    }

    /// Undo one step. Returns `false` at the start of history.
    pub fn undo(&mut self, doc: &mut CourseDocument) -> bool {
        self.undo_with(doc, |_| {})
    }

    /// Undo one step, running `derive` on the restored document before the
    /// restore guard is released.
    pub fn undo_with(
        &mut self,
        doc: &mut CourseDocument,
        derive: impl FnOnce(&mut CourseDocument),
    ) -> bool {
        if let Some(point) = pop_draw_point(doc) {
            self.draw_redo.push(point);
            log::debug!("Undid draw point ({} to redo)", self.draw_redo.len());
            return true;
        }
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.restore(doc, derive);
        log::debug!("Undo to snapshot {}/{}", self.index, self.snapshots.len());
        true
    }

    /// Redo one step. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut CourseDocument) -> bool {
        self.redo_with(doc, |_| {})
    }

    /// Redo one step, running `derive` on the restored document before the
    /// restore guard is released.
    pub fn redo_with(
        &mut self,
        doc: &mut CourseDocument,
        derive: impl FnOnce(&mut CourseDocument),
    ) -> bool {
        if has_active_draw(doc) {
            if let Some(point) = self.draw_redo.pop() {
                if push_draw_point(doc, point) {
                    log::debug!("Redid draw point");
                    return true;
                }
                // The draw it came from is gone.
                self.draw_redo.clear();
            }
        }
        if self.index + 1 >= self.snapshots.len() {
            return false;
        }
        self.index += 1;
        self.restore(doc, derive);
        log::debug!("Redo to snapshot {}/{}", self.index, self.snapshots.len());
        true
    }

    /// Forget popped draw points. Called on any direct edit of a draw.
    pub fn clear_draw_redo(&mut self) {
        self.draw_redo.clear();
    }

    pub fn draw_redo_len(&self) -> usize {
        self.draw_redo.len()
    }

    fn restore(&mut self, doc: &mut CourseDocument, derive: impl FnOnce(&mut CourseDocument)) {
        self.phase = Phase::Restoring;
        *doc = self.snapshots[self.index].clone();
        derive(doc);
        self.draw_redo.clear();
        self.phase = Phase::Idle;
    }
}

fn has_active_draw(doc: &CourseDocument) -> bool {
    doc.active_measurement.is_some() || doc.active_wall.is_some() || doc.active_tunnel.is_some()
}

fn active_draw_len(doc: &CourseDocument) -> usize {
    doc.active_measurement.as_ref().map_or(0, |m| m.points.len())
        + doc.active_wall.as_ref().map_or(0, |w| w.points.len())
        + doc.active_tunnel.as_ref().map_or(0, |t| t.points.len())
}

fn pop_draw_point(doc: &mut CourseDocument) -> Option<RedoPoint> {
    if let Some(point) = doc.active_measurement.as_mut().and_then(|m| m.points.pop()) {
        return Some(RedoPoint::Measurement(point));
    }
    if let Some((point, segment)) = doc.active_wall.as_mut().and_then(|w| w.pop()) {
        return Some(RedoPoint::Wall(point, segment));
    }
    doc.active_tunnel
        .as_mut()
        .and_then(|t| t.points.pop())
        .map(RedoPoint::Tunnel)
}

fn push_draw_point(doc: &mut CourseDocument, point: RedoPoint) -> bool {
    match point {
        RedoPoint::Measurement(p) => match doc.active_measurement.as_mut() {
            Some(m) => {
                m.points.push(p);
                true
            }
            None => false,
        },
        RedoPoint::Wall(p, segment) => match doc.active_wall.as_mut() {
            Some(w) => {
                w.push(p, segment);
                true
            }
            None => false,
        },
        RedoPoint::Tunnel(p) => match doc.active_tunnel.as_mut() {
            Some(t) => {
                t.points.push(p);
                true
            }
            None => false,
        },
    }
}
