//! Freehand pen tool.

use super::{CanvasView, Cursor, Tool};
use crate::store::ElementStore;
use kurbo::Point;

/// Points closer than this (world units) to the previous one are dropped.
const MIN_POINT_SPACING: f64 = 1.0;

#[derive(Debug, Default)]
pub struct PenTool {
    points: Option<Vec<Point>>,
}

impl PenTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for PenTool {
    fn on_mouse_down(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        self.points = Some(vec![point]);
        store.update_overlay(|o| o.path_preview = vec![point]);
        view.mark_dirty();
    }

    fn on_mouse_move(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let Some(points) = self.points.as_mut() else {
            return;
        };
        if points
            .last()
            .is_some_and(|last| (point - *last).hypot() < MIN_POINT_SPACING)
        {
            return;
        }
        points.push(point);
        store.update_overlay(|o| o.path_preview.push(point));
        view.mark_dirty();
    }

    fn on_mouse_up(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        self.on_mouse_move(point, shift, store, view);
        let Some(points) = self.points.take() else {
            return;
        };
        store.clear_overlay();
        view.mark_dirty();
        let Some(path) = store.factory().path(&points) else {
            return;
        };
        store.push_history_checkpoint();
        let id = store.add_element(path);
        store.assign_to_frames(&[id]);
        log::debug!("pen stroke {id} with {} points", points.len());
    }

    fn cancel(&mut self, store: &mut ElementStore) {
        if self.points.take().is_some() {
            store.clear_overlay();
        }
    }

    fn is_active(&self) -> bool {
        self.points.is_some()
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

    #[test]
    fn test_stroke_becomes_path() {
        let mut store = ElementStore::new();
        let mut tool = PenTool::new();
        let mut view = HeadlessView::default();
        tool.on_mouse_down(Point::new(10.0, 10.0), false, &mut store, &mut view);
        tool.on_mouse_move(Point::new(20.0, 15.0), false, &mut store, &mut view);
        tool.on_mouse_move(Point::new(20.2, 15.0), false, &mut store, &mut view);
        assert_eq!(store.overlay().path_preview.len(), 2);
        tool.on_mouse_up(Point::new(40.0, 30.0), false, &mut store, &mut view);

        assert_eq!(store.len(), 1);
        let el = store.elements_ordered().next().unwrap();
        let ElementKind::Path(path) = &el.kind else {
            panic!("expected a path");
        };
        assert_eq!(path.points.len(), 3);
        assert_eq!(el.origin(), Point::new(10.0, 10.0));
        assert!(store.overlay().path_preview.is_empty());
    }

    #[test]
    fn test_single_point_creates_nothing() {
        let mut store = ElementStore::new();
        let mut tool = PenTool::new();
        let mut view = HeadlessView::default();
        tool.on_mouse_down(Point::new(10.0, 10.0), false, &mut store, &mut view);
        tool.on_mouse_up(Point::new(10.0, 10.0), false, &mut store, &mut view);
        assert!(store.is_empty());
        assert!(!tool.is_active());
    }
}
