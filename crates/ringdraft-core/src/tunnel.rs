//! Tunnel paths: drawing them and grouping the ones that connect.

use crate::document::CourseDocument;
use crate::editor::Editor;
use crate::entities::{Entity, EntityId, PathPoint, TunnelPath};
use crate::geometry;
use crate::snap::snap_point;
use kurbo::Point;

/// How close a point must be to another path to count as touching it.
pub const TOUCH_TOLERANCE: f64 = 0.15;

/// A set of tunnel paths that connect into one tunnel.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelGroup {
    /// Member paths, in discovery order.
    pub path_ids: Vec<EntityId>,
    /// Sum of every member's polyline length. Shared stretches count once
    /// per path.
    pub length: f64,
}

/// World positions of a path's points.
pub fn resolve_path_points(path: &TunnelPath, doc: &CourseDocument) -> Vec<Point> {
    path.resolve(doc)
}

fn segments(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let single = (points.len() == 1).then(|| (points[0], points[0]));
    points.windows(2).map(|w| (w[0], w[1])).chain(single)
}

/// Whether any point of `a` lies within tolerance of a segment of `b`.
fn reaches(a: &[Point], b: &[Point]) -> bool {
    a.iter().any(|p| {
        segments(b).any(|(s, e)| geometry::distance_to_segment(*p, s, e) <= TOUCH_TOLERANCE)
    })
}

/// Two resolved paths touch if either one reaches the other.
pub fn paths_touch(a: &[Point], b: &[Point]) -> bool {
    reaches(a, b) || reaches(b, a)
}

/// Group tunnel paths into connected components.
pub fn tunnel_groups(doc: &CourseDocument) -> Vec<TunnelGroup> {
    let resolved: Vec<Vec<Point>> = doc
        .tunnel_paths
        .iter()
        .map(|path| resolve_path_points(path, doc))
        .collect();
    let mut visited = vec![false; resolved.len()];
    let mut groups = Vec::new();

    for seed in 0..resolved.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut stack = vec![seed];
        let mut members = Vec::new();
        while let Some(current) = stack.pop() {
            members.push(current);
            for next in 0..resolved.len() {
                if !visited[next] && paths_touch(&resolved[current], &resolved[next]) {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        groups.push(TunnelGroup {
            path_ids: members.iter().map(|&i| doc.tunnel_paths[i].id).collect(),
            length: members
                .iter()
                .map(|&i| geometry::polyline_length(&resolved[i]))
                .sum(),
        });
    }
    groups
}

/// Closest point on a polyline. `None` when it has no points.
fn closest_on_polyline(point: Point, polyline: &[Point]) -> Option<Point> {
    segments(polyline)
        .map(|(s, e)| geometry::closest_point_on_segment(point, s, e))
        .min_by(|a, b| a.distance(point).total_cmp(&b.distance(point)))
}

impl Editor {
    fn push_tunnel_point(&mut self, point: PathPoint) {
        self.history.clear_draw_redo();
        let path = self.document.active_tunnel.get_or_insert_with(|| {
            log::debug!("Tunnel draw started");
            TunnelPath::new()
        });
        path.points.push(point);
    }

    /// Dock the path being drawn onto a board edge's midpoint.
    ///
    /// The point follows the edge when it moves later.
    pub fn tunnel_click_edge(&mut self, edge_id: EntityId) -> bool {
        if self.document.board_edge(edge_id).is_none() {
            return false;
        }
        self.push_tunnel_point(PathPoint::EdgeAnchor { target_id: edge_id });
        true
    }

    /// Add a free point to the path being drawn.
    pub fn tunnel_click_point(&mut self, point: Point) -> bool {
        self.push_tunnel_point(PathPoint::Static(snap_point(point)));
        true
    }

    /// Join the path being drawn onto an existing path at the spot closest
    /// to `point`.
    ///
    /// Starts a path if none is being drawn. Once the path has two points the
    /// draw finishes; the new path's ID is returned in that case.
    pub fn tunnel_branch(&mut self, target: EntityId, point: Point) -> Option<EntityId> {
        let polyline = resolve_path_points(self.document.tunnel_path(target)?, &self.document);
        let joint = closest_on_polyline(point, &polyline)?;
        self.push_tunnel_point(PathPoint::Static(snap_point(joint)));
        let len = self.document.active_tunnel.as_ref().map_or(0, |p| p.points.len());
        if len >= 2 { self.finish_tunnel() } else { None }
    }

    /// Keep the path being drawn. Fewer than two points discards it.
    pub fn finish_tunnel(&mut self) -> Option<EntityId> {
        let path = self.document.active_tunnel.take()?;
        self.history.clear_draw_redo();
        if path.points.len() < 2 {
            log::debug!("Tunnel draw discarded");
            return None;
        }
        let id = self.document.insert(Entity::TunnelPath(path));
        self.commit("add tunnel path");
        Some(id)
    }

    pub fn tunnel_groups(&self) -> Vec<TunnelGroup> {
        tunnel_groups(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BoardEdge;
    use crate::settings::CourseMeta;

    fn static_path(points: &[(f64, f64)]) -> TunnelPath {
        TunnelPath::from_points(
            points
                .iter()
                .map(|&(x, y)| PathPoint::Static(Point::new(x, y)))
                .collect(),
        )
    }

    #[test]
    fn test_shared_endpoint_joins_then_splits() {
        let mut doc = CourseDocument::new();
        let a = doc.insert(Entity::TunnelPath(static_path(&[(0.0, 0.0), (5.0, 0.0)])));
        let b = doc.insert(Entity::TunnelPath(static_path(&[(5.1, 0.0), (5.0, 4.0)])));

        let groups = tunnel_groups(&doc);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].path_ids, vec![a, b]);
        let expected = 5.0 + Point::new(5.1, 0.0).distance(Point::new(5.0, 4.0));
        assert!((groups[0].length - expected).abs() < 1e-9);

        doc.tunnel_paths[1].points[0] = PathPoint::Static(Point::new(6.1, 0.0));
        doc.tunnel_paths[1].points[1] = PathPoint::Static(Point::new(6.1, 4.0));
        let groups = tunnel_groups(&doc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].path_ids, vec![a]);
        assert_eq!(groups[1].path_ids, vec![b]);
    }

    #[test]
    fn test_touch_is_checked_both_ways() {
        // Endpoint of `a` lands mid-segment on `b`; no point of `b` is near `a`.
        let a = [Point::new(2.0, 5.0), Point::new(2.0, 0.1)];
        let b = [Point::new(0.0, 0.0), Point::new(4.0, 0.0)];
        assert!(paths_touch(&a, &b));
        assert!(paths_touch(&b, &a));
    }

    #[test]
    fn test_chain_is_one_group() {
        let mut doc = CourseDocument::new();
        doc.insert(Entity::TunnelPath(static_path(&[(0.0, 0.0), (2.0, 0.0)])));
        doc.insert(Entity::TunnelPath(static_path(&[(10.0, 0.0), (12.0, 0.0)])));
        doc.insert(Entity::TunnelPath(static_path(&[(2.0, 0.0), (10.0, 0.0)])));
        let groups = tunnel_groups(&doc);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].path_ids.len(), 3);
        assert!((groups[0].length - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_anchored_paths_follow_edges() {
        let mut editor = Editor::new(CourseDocument::with_meta(CourseMeta::with_ring(24.0, 24.0)));
        let edge = editor
            .add_board_edge(Point::new(4.0, 4.0), Point::new(6.0, 4.0))
            .unwrap();
        assert!(editor.tunnel_click_edge(edge));
        assert!(editor.tunnel_click_point(Point::new(5.0, 10.0)));
        let path_id = editor.finish_tunnel().unwrap();

        let doc = editor.document();
        let path = doc.tunnel_path(path_id).unwrap();
        assert_eq!(
            resolve_path_points(path, doc),
            vec![Point::new(5.0, 4.0), Point::new(5.0, 10.0)]
        );

        editor.remove(edge);
        let doc = editor.document();
        let path = doc.tunnel_path(path_id).unwrap();
        assert_eq!(resolve_path_points(path, doc)[0], Point::ZERO);
    }

    #[test]
    fn test_missing_edge_is_not_clickable() {
        let mut editor = Editor::default();
        assert!(!editor.tunnel_click_edge(uuid::Uuid::new_v4()));
        assert!(editor.document().active_tunnel.is_none());
    }

    #[test]
    fn test_branch_joins_existing_path() {
        let mut editor = Editor::default();
        editor.tunnel_click_point(Point::new(0.0, 0.0));
        editor.tunnel_click_point(Point::new(10.0, 0.0));
        let trunk = editor.finish_tunnel().unwrap();

        editor.tunnel_click_point(Point::new(4.0, 6.0));
        let branch = editor.tunnel_branch(trunk, Point::new(4.2, 1.0)).unwrap();
        assert!(editor.document().active_tunnel.is_none());

        let doc = editor.document();
        let points = resolve_path_points(doc.tunnel_path(branch).unwrap(), doc);
        assert!(points[1].distance(Point::new(4.1667, 0.0)) < 1e-3);
        assert_eq!(editor.tunnel_groups().len(), 1);
    }

    #[test]
    fn test_branch_starts_a_session() {
        let mut editor = Editor::default();
        editor.tunnel_click_point(Point::new(0.0, 0.0));
        editor.tunnel_click_point(Point::new(10.0, 0.0));
        let trunk = editor.finish_tunnel().unwrap();

        assert!(editor.tunnel_branch(trunk, Point::new(3.0, 2.0)).is_none());
        assert_eq!(editor.document().active_tunnel.as_ref().unwrap().points.len(), 1);
        editor.tunnel_click_point(Point::new(3.0, 8.0));
        assert!(editor.finish_tunnel().is_some());
        assert_eq!(editor.tunnel_groups().len(), 1);
    }

    #[test]
    fn test_short_path_discarded() {
        let mut editor = Editor::default();
        editor.tunnel_click_point(Point::new(1.0, 1.0));
        assert!(editor.finish_tunnel().is_none());
        assert!(editor.document().tunnel_paths.is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_tunnel_point_undo_redo() {
        let mut editor = Editor::default();
        editor.tunnel_click_point(Point::new(1.0, 1.0));
        editor.tunnel_click_point(Point::new(3.0, 1.0));
        assert!(editor.undo());
        assert_eq!(editor.document().active_tunnel.as_ref().unwrap().points.len(), 1);
        assert!(editor.redo());
        assert_eq!(editor.document().active_tunnel.as_ref().unwrap().points.len(), 2);

        assert!(editor.undo());
        editor.tunnel_click_point(Point::new(1.0, 5.0));
        assert!(!editor.redo());
    }

    #[test]
    fn test_cancel_draw() {
        let mut editor = Editor::default();
        editor.tunnel_click_point(Point::new(1.0, 1.0));
        assert!(editor.cancel_draw());
        assert!(editor.document().active_tunnel.is_none());
        assert!(!editor.cancel_draw());
    }

    #[test]
    fn test_board_edge_moves_drag_docked_points() {
        let mut doc = CourseDocument::new();
        let edge = BoardEdge::new(Point::new(0.0, 0.0), Point::new(2.0, 0.0), 1);
        let edge_id = doc.insert(Entity::BoardEdge(edge));
        let path = TunnelPath::from_points(vec![
            PathPoint::EdgeAnchor { target_id: edge_id },
            PathPoint::Static(Point::new(1.0, 5.0)),
        ]);
        doc.insert(Entity::TunnelPath(path));
        doc.board_edges[0].start.x += 4.0;
        doc.board_edges[0].end.x += 4.0;
        assert_eq!(resolve_path_points(&doc.tunnel_paths[0], &doc)[0], Point::new(5.0, 0.0));
    }
}
