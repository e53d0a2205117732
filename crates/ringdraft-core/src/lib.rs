//! RingDraft Core Library
//!
//! Platform-agnostic editing engine for the RingDraft course designer:
//! entity model, placement rules, wall anchors, tunnel connectivity,
//! selection and undo history.

pub mod anchor;
pub mod document;
pub mod editor;
pub mod entities;
pub mod geometry;
pub mod history;
pub mod notify;
pub mod persist;
pub mod placement;
pub mod selection;
pub mod settings;
pub mod snap;
pub mod storage;
pub mod tools;
pub mod tunnel;

pub use document::CourseDocument;
pub use editor::{Editor, Rejection};
pub use entities::{Entity, EntityId, Placeable};
pub use history::{History, MAX_HISTORY};
pub use notify::{LogNotifier, Notifier, RecordingNotifier, Severity};
pub use persist::{FormatError, from_json, to_json};
pub use placement::EntityPatch;
pub use selection::Selection;
pub use settings::{CourseMeta, GridOrigin, PlacementPolicy, RingSize};
pub use snap::{GRID_STEP, snap, snap_point};
pub use tools::{ClickOutcome, EditContext, ToolKind};
pub use tunnel::{TOUCH_TOLERANCE, TunnelGroup};
