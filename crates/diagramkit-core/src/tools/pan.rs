//! Hand tool: drag to pan the view.

use super::{CanvasView, Cursor, Tool};
use crate::store::ElementStore;
use kurbo::Point;

#[derive(Debug, Default)]
pub struct PanTool {
    /// World point grabbed on mouse-down; kept under the pointer while dragging.
    anchor: Option<Point>,
}

impl PanTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for PanTool {
    fn on_mouse_down(
        &mut self,
        point: Point,
        _shift: bool,
        _store: &mut ElementStore,
        _view: &mut dyn CanvasView,
    ) {
        self.anchor = Some(point);
    }

    fn on_mouse_move(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let Some(anchor) = self.anchor else {
            return;
        };
        // Points arrive in world space under the current camera, so panning
        // by the screen-space offset puts the anchor back under the pointer.
        let delta = (point - anchor) * store.zoom();
        if delta.hypot2() > 0.0 {
            store.pan_by(delta);
            view.mark_dirty();
        }
    }

    fn on_mouse_up(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        self.on_mouse_move(point, shift, store, view);
        self.anchor = None;
    }

    fn cancel(&mut self, _store: &mut ElementStore) {
        self.anchor = None;
    }

    fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    fn cursor(&self) -> Cursor {
        if self.anchor.is_some() {
            Cursor::Grabbing
        } else {
            Cursor::Grab
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::HeadlessView;
    use kurbo::Vec2;

    #[test]
    fn test_drag_keeps_anchor_under_pointer() {
        let mut store = ElementStore::new();
        store.set_zoom(2.0);
        let mut tool = PanTool::new();
        let mut view = HeadlessView::default();

        let screen_down = Point::new(100.0, 100.0);
        let world_down = store.camera().screen_to_world(screen_down);
        tool.on_mouse_down(world_down, false, &mut store, &mut view);
        assert_eq!(tool.cursor(), Cursor::Grabbing);

        let screen_move = Point::new(130.0, 80.0);
        let world_move = store.camera().screen_to_world(screen_move);
        tool.on_mouse_move(world_move, false, &mut store, &mut view);
        assert_eq!(store.camera().pan, Vec2::new(30.0, -20.0));
        let under = store.camera().screen_to_world(screen_move);
        assert!((under - world_down).hypot() < 1e-9);

        tool.on_mouse_up(under, false, &mut store, &mut view);
        assert!(!tool.is_active());
        assert_eq!(store.camera().pan, Vec2::new(30.0, -20.0));
    }
}
