//! Moving, resizing and rotating elements, line re-anchoring and frame
//! membership.

use super::{ElementStore, StoreEvent};
use crate::elements::{Connection, Element, ElementId};
use crate::geometry::{self, LineEnd};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;

impl ElementStore {
    /// Move elements by `delta`.
    ///
    /// Groups bring their descendants and frames their members. A line
    /// moved without the element it is connected to lets go of it; lines
    /// connected to moved elements have that endpoint re-anchored.
    pub fn move_elements(&mut self, ids: &[ElementId], delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        let moved = self.expand_ids(ids, true);
        if moved.is_empty() {
            return;
        }
        let moved_set: HashSet<ElementId> = moved.iter().copied().collect();
        for id in &moved {
            let Some(el) = self.elements.get_mut(id) else {
                continue;
            };
            el.translate(delta);
            if let Some(line) = el.as_line_mut() {
                if line
                    .start_connection
                    .is_some_and(|c| !moved_set.contains(&c.element_id))
                {
                    line.start_connection = None;
                }
                if line
                    .end_connection
                    .is_some_and(|c| !moved_set.contains(&c.element_id))
                {
                    line.end_connection = None;
                }
            }
        }
        self.reanchor_lines(&moved_set);
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Give an element a new unrotated box. Lines and groups are not resizable.
    pub fn resize_element(&mut self, id: ElementId, rect: Rect) {
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if el.is_group() || el.as_line().is_some() {
            return;
        }
        let rect = rect.abs();
        el.x = rect.x0;
        el.y = rect.y0;
        el.set_size(rect.width(), rect.height());
        self.reanchor_lines(&HashSet::from([id]));
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Set the rotation of a shape, text or image. Other kinds ignore it.
    pub fn rotate_element(&mut self, id: ElementId, angle: f64) {
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if !el.supports_rotation() || !angle.is_finite() {
            return;
        }
        el.rotation = angle;
        self.reanchor_lines(&HashSet::from([id]));
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Move one end of a line and record (or clear) its connection.
    /// A connection to a missing, non-connectable or self element is dropped.
    pub fn set_line_endpoint(
        &mut self,
        id: ElementId,
        end: LineEnd,
        point: Point,
        connection: Option<Connection>,
    ) {
        let connection = connection.filter(|c| {
            c.element_id != id
                && self
                    .elements
                    .get(&c.element_id)
                    .is_some_and(Element::is_connectable)
        });
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        let Some(line) = el.as_line_mut() else {
            return;
        };
        match end {
            LineEnd::Start => {
                line.start_connection = connection;
                el.x = point.x;
                el.y = point.y;
            }
            LineEnd::End => {
                line.end_connection = connection;
                line.x2 = point.x;
                line.y2 = point.y;
            }
        }
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Re-anchor every line endpoint connected to an element in `changed`.
    /// Lines that are themselves in `changed` are left alone.
    pub(super) fn reanchor_lines(&mut self, changed: &HashSet<ElementId>) {
        let anchor = |conn: Option<Connection>| -> Option<Point> {
            let conn = conn.filter(|c| changed.contains(&c.element_id))?;
            self.elements
                .get(&conn.element_id)
                .map(|target| target.connection_point(conn.side))
        };
        let updates: Vec<(ElementId, Option<Point>, Option<Point>)> = self
            .elements
            .values()
            .filter(|el| !changed.contains(&el.id))
            .filter_map(|el| {
                let line = el.as_line()?;
                let start = anchor(line.start_connection);
                let end = anchor(line.end_connection);
                (start.is_some() || end.is_some()).then_some((el.id, start, end))
            })
            .collect();
        for (id, start, end) in updates {
            self.apply_line_anchors(id, start, end);
        }
    }

    /// Snap both ends of line `id` to whatever they are connected to.
    pub(super) fn snap_line_to_connections(&mut self, id: ElementId) {
        let Some(line) = self.elements.get(&id).and_then(Element::as_line) else {
            return;
        };
        let anchor = |conn: Option<Connection>| {
            conn.and_then(|c| {
                self.elements
                    .get(&c.element_id)
                    .map(|target| target.connection_point(c.side))
            })
        };
        let start = anchor(line.start_connection);
        let end = anchor(line.end_connection);
        self.apply_line_anchors(id, start, end);
    }

    fn apply_line_anchors(&mut self, id: ElementId, start: Option<Point>, end: Option<Point>) {
        let Some(el) = self.elements.get_mut(&id) else {
            return;
        };
        if let Some(p) = start {
            el.x = p.x;
            el.y = p.y;
        }
        if let (Some(p), Some(line)) = (end, el.as_line_mut()) {
            line.x2 = p.x;
            line.y2 = p.y;
        }
    }

    /// Recompute frame membership of `ids` by containment: an element
    /// belongs to the topmost frame whose box fully contains its bounds.
    pub fn assign_to_frames(&mut self, ids: &[ElementId]) {
        let frames: Vec<(ElementId, Rect)> = self
            .element_order
            .iter()
            .rev()
            .filter_map(|fid| self.elements.get(fid))
            .filter(|f| f.is_frame())
            .map(|f| (f.id, f.rect()))
            .collect();

        let mut assignments = Vec::new();
        for &id in ids {
            let Some(el) = self.elements.get(&id) else {
                continue;
            };
            if el.is_frame() {
                continue;
            }
            let Some(bounds) = self.element_bounds(id) else {
                continue;
            };
            let parent = frames
                .iter()
                .find(|(_, rect)| geometry::rect_contains_rect(*rect, bounds))
                .map(|(fid, _)| *fid);
            if el.parent_id != parent {
                assignments.push((id, parent));
            }
        }
        if assignments.is_empty() {
            return;
        }
        for (id, parent) in assignments {
            if let Some(el) = self.elements.get_mut(&id) {
                el.parent_id = parent;
            }
        }
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Elements whose `parent_id` is the given frame.
    pub fn frame_members(&self, frame_id: ElementId) -> Vec<ElementId> {
        self.elements_ordered()
            .filter(|el| el.parent_id == Some(frame_id))
            .map(|el| el.id)
            .collect()
    }
}
