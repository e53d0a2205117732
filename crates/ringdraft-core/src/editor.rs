//! The editor: owns a course document and routes every mutation through
//! validation, commit and history.
//!
//! Operations live next to the engine they belong to (`placement`, `tunnel`,
//! `selection`); this module holds the shared state and the commit path.

use crate::anchor;
use crate::document::CourseDocument;
use crate::entities::{Entity, HideKind};
use crate::history::History;
use crate::notify::{LogNotifier, Notifier, Severity};
use crate::selection::Selection;
use crate::tools::{EditContext, ToolKind};
use kurbo::Point;
use std::sync::Arc;
use thiserror::Error;

/// Why an operation was refused. Shown to the user as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Cannot place outside the ring")]
    OutOfBounds,
    #[error("Another bale is in the way")]
    Obstructed,
    #[error("Pillar bales cannot be anchors")]
    PillarAnchor,
    #[error("Cannot change the orientation of an anchor bale")]
    AnchorOrientation,
    #[error("Cannot rotate an anchor bale")]
    AnchorRotation,
    #[error("Anchor bales cannot lean")]
    AnchorLean,
    #[error("Only flat bales can lean")]
    LeanNotFlat,
    #[error("A wall needs at least three points")]
    WallTooShort,
    #[error("Ring size must be positive")]
    InvalidRing,
}

pub struct Editor {
    pub(crate) document: CourseDocument,
    pub(crate) history: History,
    pub(crate) selection: Selection,
    pub(crate) clipboard: Vec<Entity>,
    pub(crate) context: EditContext,
    /// First click of a board edge being placed.
    pub(crate) edge_start: Option<Point>,
    notifier: Arc<dyn Notifier>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(CourseDocument::new())
    }
}

impl Editor {
    /// Open a document. Notifications go to the log.
    pub fn new(document: CourseDocument) -> Self {
        Self::with_notifier(document, Arc::new(LogNotifier))
    }

    pub fn with_notifier(mut document: CourseDocument, notifier: Arc<dyn Notifier>) -> Self {
        anchor::recompute_all(&mut document);
        let history = History::new(&document);
        Self {
            document,
            history,
            selection: Selection::default(),
            clipboard: Vec::new(),
            context: EditContext::default(),
            edge_start: None,
            notifier,
        }
    }

    pub fn document(&self) -> &CourseDocument {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn context(&self) -> &EditContext {
        &self.context
    }

    pub fn clipboard(&self) -> &[Entity] {
        &self.clipboard
    }

    /// Replace the open document, dropping history, selection and draws.
    pub fn load(&mut self, mut document: CourseDocument) {
        anchor::recompute_all(&mut document);
        document.active_wall = None;
        document.active_measurement = None;
        document.active_tunnel = None;
        self.history.reset(&document);
        self.document = document;
        self.selection.clear();
        log::debug!("Loaded document {}", self.document.id);
    }

    /// Apply an arbitrary edit to the document and commit it.
    pub fn apply(&mut self, label: &str, edit: impl FnOnce(&mut CourseDocument)) -> bool {
        edit(&mut self.document);
        self.commit(label)
    }

    /// Switch tools. Any in-progress draw is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.context.tool {
            self.cancel_draw();
        }
        self.context.tool = tool;
    }

    /// Layer new entities go on.
    pub fn set_layer(&mut self, layer: u32) {
        self.context.set_layer(layer);
    }

    pub fn set_hide_kind(&mut self, kind: HideKind) {
        self.context.hide_kind = kind;
    }

    /// Abandon every in-progress draw. Nothing is committed.
    pub fn cancel_draw(&mut self) -> bool {
        let had_draw = self.document.active_wall.take().is_some()
            | self.document.active_measurement.take().is_some()
            | self.document.active_tunnel.take().is_some()
            | self.edge_start.take().is_some();
        self.history.clear_draw_redo();
        if had_draw {
            log::debug!("Draw cancelled");
        }
        had_draw
    }

    /// Finish a mutation: recompute derived anchor points, then record a
    /// snapshot. Returns whether a snapshot was taken.
    pub fn commit(&mut self, label: &str) -> bool {
        let changed = anchor::recompute_all(&mut self.document);
        let recorded = self.history.snapshot(&self.document);
        log::debug!(
            "Commit '{label}': {} anchor(s) updated, snapshot {}",
            changed,
            if recorded { "recorded" } else { "skipped" }
        );
        recorded
    }

    /// Report a refused operation to the user.
    pub(crate) fn reject(&self, rejection: Rejection) {
        log::debug!("Rejected: {rejection:?}");
        self.notifier.show(&rejection.to_string(), Severity::Warning);
    }

    pub(crate) fn notify(&self, message: &str, severity: Severity) {
        self.notifier.show(message, severity);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo(&self.document)
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo(&self.document)
    }

    /// Undo the last change. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo_with(&mut self.document, |doc| {
            anchor::recompute_all(doc);
        });
        if undone {
            self.prune_selection();
        }
        undone
    }

    /// Redo the last undone change. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo_with(&mut self.document, |doc| {
            anchor::recompute_all(doc);
        });
        if redone {
            self.prune_selection();
        }
        redone
    }

    /// Drop selected IDs that no longer exist.
    fn prune_selection(&mut self) {
        let document = &self.document;
        self.selection.retain(|id| document.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Bale;
    use crate::notify::RecordingNotifier;

    #[test]
    fn test_commit_records_snapshot() {
        let mut editor = Editor::default();
        assert!(!editor.can_undo());
        assert!(editor.apply("add", |doc| {
            doc.insert(Entity::Bale(Bale::new(Point::new(1.0, 1.0), 1)));
        }));
        assert!(editor.can_undo());
        assert!(!editor.commit("noop"));
    }

    #[test]
    fn test_undo_recomputes_anchors() {
        let mut editor = Editor::default();
        editor.apply("add", |doc| {
            let mut bale = Bale::new(Point::new(1.0, 2.0), 1);
            bale.is_anchor = true;
            doc.insert(Entity::Bale(bale));
        });
        assert_eq!(editor.document().bales[0].custom_anchors.len(), 2);

        editor.apply("move", |doc| doc.bales[0].pose.x = 4.0);
        assert!(editor.undo());
        assert_eq!(editor.document().bales[0].pose.x, 1.0);
        assert_eq!(editor.document().bales[0].custom_anchors[0], Point::new(0.0, 2.0));
        assert!(editor.redo());
        assert_eq!(editor.document().bales[0].pose.x, 4.0);
    }

    #[test]
    fn test_reject_notifies_warning() {
        let notifier = Arc::new(RecordingNotifier::new());
        let editor = Editor::with_notifier(CourseDocument::new(), notifier.clone());
        editor.reject(Rejection::OutOfBounds);
        assert_eq!(notifier.count(Severity::Warning), 1);
        assert_eq!(notifier.messages()[0].0, "Cannot place outside the ring");
    }

    #[test]
    fn test_switching_tools_cancels_draw() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Measure);
        editor.document.active_measurement = Some(Default::default());
        editor.set_tool(ToolKind::Select);
        assert!(editor.document().active_measurement.is_none());
    }

    #[test]
    fn test_load_resets_history() {
        let mut editor = Editor::default();
        editor.apply("add", |doc| {
            doc.insert(Entity::Bale(Bale::new(Point::new(1.0, 1.0), 1)));
        });
        editor.load(CourseDocument::new());
        assert!(!editor.can_undo());
        assert!(editor.document().is_empty());
    }
}
