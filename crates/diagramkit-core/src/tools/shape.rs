//! Shape, text and frame placement: drag out a box, or click for a
//! default-sized one.

use super::{CanvasView, Cursor, Tool, ToolKind, world_distance};
use crate::elements::{Element, ElementId};
use crate::store::ElementStore;
use kurbo::{Point, Rect, Size, Vec2};

#[derive(Debug, Clone, Copy)]
struct Placing {
    kind: ToolKind,
    start: Point,
}

#[derive(Debug, Default)]
pub struct ShapeTool {
    placing: Option<Placing>,
}

/// Square off the drag when shift is held, keeping the drag direction.
fn constrain(start: Point, end: Point, square: bool) -> Point {
    if !square {
        return end;
    }
    let d = end - start;
    let side = d.x.abs().max(d.y.abs());
    start + Vec2::new(side.copysign(d.x), side.copysign(d.y))
}

fn default_size(store: &ElementStore, kind: ToolKind) -> Size {
    match kind {
        ToolKind::Text => store.config().default_text_size,
        _ => store.config().default_shape_size,
    }
}

fn build(store: &ElementStore, kind: ToolKind, rect: Rect) -> Option<Element> {
    let factory = store.factory();
    match kind {
        ToolKind::Shape => Some(factory.shape(rect)),
        ToolKind::Text => Some(factory.text(rect, "")),
        ToolKind::Frame => {
            let n = store.elements_ordered().filter(|el| el.is_frame()).count() + 1;
            Some(factory.frame(rect, format!("Frame {n}")))
        }
        _ => None,
    }
}

impl ShapeTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn commit(store: &mut ElementStore, kind: ToolKind, element: Element) -> ElementId {
        store.push_history_checkpoint();
        let id = store.add_element(element);
        if kind == ToolKind::Frame {
            let others: Vec<ElementId> = store
                .element_order()
                .iter()
                .copied()
                .filter(|other| *other != id)
                .collect();
            store.assign_to_frames(&others);
        } else {
            store.assign_to_frames(&[id]);
        }
        store.set_selection(&[id]);
        if kind == ToolKind::Text {
            store.begin_text_edit(id);
        }
        log::debug!("placed {:?} {id}", kind);
        id
    }
}

impl Tool for ShapeTool {
    fn on_mouse_down(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        self.placing = Some(Placing {
            kind: store.tool(),
            start: store.grid().apply(point),
        });
        view.mark_dirty();
    }

    fn on_mouse_move(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let Some(placing) = self.placing else {
            return;
        };
        let end = constrain(placing.start, store.grid().apply(point), shift);
        let preview = build(store, placing.kind, Rect::from_points(placing.start, end));
        store.update_overlay(|o| o.preview = preview);
        view.mark_dirty();
    }

    fn on_mouse_up(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let Some(placing) = self.placing.take() else {
            return;
        };
        store.clear_overlay();

        let end = constrain(placing.start, store.grid().apply(point), shift);
        let min = world_distance(store, store.config().min_drag_distance);
        let mut rect = Rect::from_points(placing.start, end);
        if rect.width() < min && rect.height() < min {
            rect = Rect::from_origin_size(placing.start, default_size(store, placing.kind));
        }
        if let Some(element) = build(store, placing.kind, rect) {
            Self::commit(store, placing.kind, element);
        }
        view.mark_dirty();
    }

    fn cancel(&mut self, store: &mut ElementStore) {
        if self.placing.take().is_some() {
            store.clear_overlay();
        }
    }

    fn is_active(&self) -> bool {
        self.placing.is_some()
    }

    fn cursor(&self) -> Cursor {
        Cursor::Crosshair
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use crate::tools::HeadlessView;

    fn place(store: &mut ElementStore, from: Point, to: Point, shift: bool) -> ElementId {
        let mut tool = ShapeTool::new();
        let mut view = HeadlessView::default();
        tool.on_mouse_down(from, shift, store, &mut view);
        tool.on_mouse_move(to, shift, store, &mut view);
        tool.on_mouse_up(to, shift, store, &mut view);
        store.selection()[0]
    }

    #[test]
    fn test_drag_defines_box() {
        let mut store = ElementStore::new();
        store.set_tool(ToolKind::Shape);
        let id = place(&mut store, Point::new(100.0, 100.0), Point::new(20.0, 60.0), false);
        assert_eq!(store.element(id).unwrap().rect(), Rect::new(20.0, 60.0, 100.0, 100.0));
        assert!(store.overlay().is_empty());
        assert!(store.can_undo());
    }

    #[test]
    fn test_click_places_default_size() {
        let mut store = ElementStore::new();
        store.set_tool(ToolKind::Shape);
        let id = place(&mut store, Point::new(10.0, 10.0), Point::new(11.0, 10.0), false);
        let rect = store.element(id).unwrap().rect();
        assert_eq!(rect, Rect::new(10.0, 10.0, 130.0, 90.0));
    }

    #[test]
    fn test_shift_draws_square() {
        let mut store = ElementStore::new();
        store.set_tool(ToolKind::Shape);
        let id = place(&mut store, Point::new(0.0, 0.0), Point::new(-40.0, 100.0), true);
        assert_eq!(store.element(id).unwrap().rect(), Rect::new(-100.0, 0.0, 0.0, 100.0));
    }

    #[test]
    fn test_text_placement_opens_editor() {
        let mut store = ElementStore::new();
        store.set_tool(ToolKind::Text);
        let id = place(&mut store, Point::new(0.0, 0.0), Point::new(0.0, 0.0), false);
        assert!(matches!(store.element(id).unwrap().kind, ElementKind::Text(_)));
        assert_eq!(store.editing_element(), Some(id));
        store.commit_text_edit("");
        assert!(store.element(id).is_none());
    }

    #[test]
    fn test_frame_captures_existing_elements() {
        let mut store = ElementStore::new();
        let inside = store.add_element(crate::store::tests::shape_at(50.0, 50.0, 40.0, 40.0));
        let outside = store.add_element(crate::store::tests::shape_at(500.0, 50.0, 40.0, 40.0));
        store.set_tool(ToolKind::Frame);
        let frame = place(&mut store, Point::new(0.0, 0.0), Point::new(200.0, 200.0), false);
        assert_eq!(store.element(inside).unwrap().parent_id, Some(frame));
        assert_eq!(store.element(outside).unwrap().parent_id, None);
        assert_eq!(store.frame_members(frame), vec![inside]);
    }
}
