//! Tool selection and the ambient editing context.

use crate::editor::Editor;
use crate::entities::{Collection, EntityId, FixtureKind, HideKind};
use crate::snap::snap_point;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pick radius for clicks, in feet.
pub const HIT_TOLERANCE: f64 = 0.25;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Bale,
    Hide,
    Blind,
    Zone,
    DcMat,
    StartBox,
    TunnelBoard,
    Note,
    Step,
    Gate,
    /// Click-by-click custom wall.
    Wall,
    BoardEdge,
    /// Click-by-click tunnel path.
    Tunnel,
    /// Click-by-click distance measurement.
    Measure,
}

impl ToolKind {
    /// Tools that build an entity over several clicks.
    pub fn is_multi_click(self) -> bool {
        matches!(self, ToolKind::Wall | ToolKind::Tunnel | ToolKind::Measure)
    }

    /// Fixture placed by a single click with this tool, if any.
    pub fn fixture_kind(self) -> Option<FixtureKind> {
        match self {
            ToolKind::Zone => Some(FixtureKind::Zone),
            ToolKind::DcMat => Some(FixtureKind::DcMat),
            ToolKind::StartBox => Some(FixtureKind::StartBox),
            ToolKind::TunnelBoard => Some(FixtureKind::TunnelBoard),
            ToolKind::Note => Some(FixtureKind::Note),
            ToolKind::Step => Some(FixtureKind::Step),
            ToolKind::Gate => Some(FixtureKind::Gate),
            _ => None,
        }
    }
}

/// Ambient inputs most editing operations read: which tool is active and
/// which stacking tier new entities go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditContext {
    pub tool: ToolKind,
    /// Layer new entities are placed on (1 = ground).
    pub layer: u32,
    /// Kind used by the hide tool.
    pub hide_kind: HideKind,
}

impl Default for EditContext {
    fn default() -> Self {
        Self {
            tool: ToolKind::Select,
            layer: 1,
            hide_kind: HideKind::Rat,
        }
    }
}

impl EditContext {
    /// Set the active layer. Layers start at 1.
    pub fn set_layer(&mut self, layer: u32) {
        self.layer = layer.max(1);
    }
}

/// What a click with the active tool did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A new entity was added.
    Placed(EntityId),
    /// The selection now holds this entity, or was cleared.
    Selected(Option<EntityId>),
    /// A point was added to the draw in progress.
    DrawPoint,
    /// Rejected, or nothing to do.
    Ignored,
}

fn placed(id: Option<EntityId>) -> ClickOutcome {
    id.map_or(ClickOutcome::Ignored, ClickOutcome::Placed)
}

fn drew(accepted: bool) -> ClickOutcome {
    if accepted { ClickOutcome::DrawPoint } else { ClickOutcome::Ignored }
}

impl Editor {
    /// Handle a click on the course with the active tool.
    pub fn click(&mut self, point: Point) -> ClickOutcome {
        let tool = self.context.tool;
        if let Some(kind) = tool.fixture_kind() {
            return placed(self.add_fixture(kind, point));
        }
        match tool {
            ToolKind::Select => ClickOutcome::Selected(self.select_at(point, HIT_TOLERANCE)),
            ToolKind::Bale => placed(self.add_bale(point)),
            ToolKind::Hide => {
                let kind = self.context.hide_kind;
                // Dropped on a blind, the hide goes inside it.
                match self.hit(point, Collection::Blinds) {
                    Some(blind) => placed(self.add_hide_to_blind(blind, point, kind)),
                    None => placed(self.add_hide(point, kind)),
                }
            }
            ToolKind::Blind => placed(self.add_blind(point)),
            ToolKind::BoardEdge => match self.edge_start.take() {
                Some(start) => placed(self.add_board_edge(start, point)),
                None => {
                    self.edge_start = Some(snap_point(point));
                    ClickOutcome::DrawPoint
                }
            },
            ToolKind::Wall => drew(self.wall_click(point)),
            ToolKind::Measure => drew(self.measure_click(point)),
            ToolKind::Tunnel => match self.hit(point, Collection::BoardEdges) {
                Some(edge) => drew(self.tunnel_click_edge(edge)),
                None => drew(self.tunnel_click_point(point)),
            },
            _ => ClickOutcome::Ignored,
        }
    }

    /// Complete the click-by-click draw of the active tool.
    pub fn finish_draw(&mut self) -> Option<EntityId> {
        if !self.context.tool.is_multi_click() {
            return None;
        }
        match self.context.tool {
            ToolKind::Wall => self.close_wall(),
            ToolKind::Measure => self.finish_measurement(),
            ToolKind::Tunnel => self.finish_tunnel(),
            _ => None,
        }
    }

    /// Frontmost entity of `collection` under `point`.
    fn hit(&self, point: Point, collection: Collection) -> Option<EntityId> {
        self.document
            .entities_at_point(point, HIT_TOLERANCE)
            .into_iter()
            .find(|id| self.document.collection_of(*id) == Some(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CourseDocument;
    use crate::settings::CourseMeta;

    fn editor() -> Editor {
        Editor::new(CourseDocument::with_meta(CourseMeta::with_ring(24.0, 24.0)))
    }

    #[test]
    fn test_default_context() {
        let ctx = EditContext::default();
        assert_eq!(ctx.tool, ToolKind::Select);
        assert_eq!(ctx.layer, 1);
    }

    #[test]
    fn test_layer_floor() {
        let mut ctx = EditContext::default();
        ctx.set_layer(0);
        assert_eq!(ctx.layer, 1);
        ctx.set_layer(3);
        assert_eq!(ctx.layer, 3);
    }

    #[test]
    fn test_tool_categories() {
        assert!(ToolKind::Wall.is_multi_click());
        assert!(!ToolKind::Bale.is_multi_click());
        assert_eq!(ToolKind::Gate.fixture_kind(), Some(FixtureKind::Gate));
        assert_eq!(ToolKind::Bale.fixture_kind(), None);
    }

    #[test]
    fn test_click_places_with_active_tool() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Bale);
        let ClickOutcome::Placed(id) = editor.click(Point::new(2.0, 2.0)) else {
            panic!("bale not placed");
        };
        assert!(editor.document().bale(id).is_some());

        editor.set_tool(ToolKind::Gate);
        assert!(matches!(editor.click(Point::new(10.0, 10.0)), ClickOutcome::Placed(_)));
        assert_eq!(editor.document().gates.len(), 1);

        editor.set_tool(ToolKind::Select);
        assert_eq!(editor.click(Point::new(3.0, 2.5)), ClickOutcome::Selected(Some(id)));
        assert_eq!(editor.click(Point::new(20.0, 20.0)), ClickOutcome::Selected(None));
    }

    #[test]
    fn test_rejected_click_is_ignored() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Bale);
        assert_eq!(editor.click(Point::new(23.0, 23.0)), ClickOutcome::Ignored);
        assert!(editor.document().bales.is_empty());
    }

    #[test]
    fn test_hide_click_on_blind_nests() {
        let mut editor = editor();
        let blind = editor.add_blind(Point::new(4.0, 4.0)).unwrap();
        editor.set_tool(ToolKind::Hide);
        editor.set_hide_kind(HideKind::Litter);
        let ClickOutcome::Placed(hide) = editor.click(Point::new(5.0, 5.0)) else {
            panic!("hide not placed");
        };
        assert!(editor.document().hides.is_empty());
        assert_eq!(editor.document().blind_of(hide), Some(blind));
    }

    #[test]
    fn test_board_edge_takes_two_clicks() {
        let mut editor = editor();
        editor.set_tool(ToolKind::BoardEdge);
        assert_eq!(editor.click(Point::new(1.0, 1.0)), ClickOutcome::DrawPoint);
        assert!(matches!(editor.click(Point::new(1.0, 4.0)), ClickOutcome::Placed(_)));
        assert_eq!(editor.document().board_edges.len(), 1);

        editor.click(Point::new(6.0, 6.0));
        assert!(editor.cancel_draw());
        assert_eq!(editor.click(Point::new(8.0, 8.0)), ClickOutcome::DrawPoint);
    }

    #[test]
    fn test_tunnel_click_docks_on_edges() {
        let mut editor = editor();
        let edge = editor.add_board_edge(Point::new(2.0, 2.0), Point::new(2.0, 4.0)).unwrap();
        editor.set_tool(ToolKind::Tunnel);
        editor.click(Point::new(2.0, 3.0));
        editor.click(Point::new(8.0, 3.0));
        let path_id = editor.finish_draw().unwrap();

        let path = editor.document().tunnel_path(path_id).unwrap();
        assert_eq!(path.points[0].edge_target(), Some(edge));
        assert_eq!(path.points[1].edge_target(), None);
    }

    #[test]
    fn test_finish_draw_per_tool() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Measure);
        editor.click(Point::new(1.0, 1.0));
        editor.click(Point::new(4.0, 5.0));
        let id = editor.finish_draw().unwrap();
        assert_eq!(editor.document().measurements[0].id, id);

        editor.set_tool(ToolKind::Bale);
        assert!(editor.finish_draw().is_none());
    }
}
