//! Tool system: one pointer-driven state machine per interaction mode.
//!
//! Tools receive world-space pointer events together with the store and a
//! [`CanvasView`] (the renderer handle), mutate the store and ask the view
//! to repaint. Releasing the pointer or pressing Escape always returns a
//! tool to idle.

mod line;
mod pan;
mod pen;
mod select;
mod shape;

pub use line::LineTool;
pub use pan::PanTool;
pub use pen::PenTool;
pub use select::SelectTool;
pub use shape::ShapeTool;

use crate::elements::ElementId;
use crate::geometry::{Corner, HandleKind, Side};
use crate::hit;
use crate::store::ElementStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Shape,
    Text,
    Frame,
    Line,
    Pen,
    Pan,
}

/// Pointer cursor a host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Move,
    Crosshair,
    Text,
    Grab,
    Grabbing,
    ResizeNwse,
    ResizeNesw,
    ResizeEw,
    ResizeNs,
    Rotate,
}

impl Cursor {
    /// Cursor for hovering or dragging a selection handle.
    pub fn for_handle(kind: HandleKind) -> Self {
        match kind {
            HandleKind::Corner(Corner::TopLeft | Corner::BottomRight) => Cursor::ResizeNwse,
            HandleKind::Corner(Corner::TopRight | Corner::BottomLeft) => Cursor::ResizeNesw,
            HandleKind::Edge(Side::Left | Side::Right) => Cursor::ResizeEw,
            HandleKind::Edge(Side::Top | Side::Bottom) => Cursor::ResizeNs,
            HandleKind::Rotate => Cursor::Rotate,
            HandleKind::Endpoint(_) => Cursor::Crosshair,
        }
    }
}

/// What a tool needs from the renderer: synchronous hit-testing and a way
/// to request a repaint.
pub trait CanvasView {
    /// Topmost element under a world-space point.
    fn hit_test(&self, store: &ElementStore, world: Point) -> Option<ElementId>;

    /// Request a repaint on the next frame.
    fn mark_dirty(&mut self);
}

/// A view with no drawing surface. Hit-tests straight against the store.
#[derive(Debug, Clone, Default)]
pub struct HeadlessView {
    /// Number of repaint requests received.
    pub dirty_marks: usize,
}

impl CanvasView for HeadlessView {
    fn hit_test(&self, store: &ElementStore, world: Point) -> Option<ElementId> {
        let tolerance = store.config().hit_tolerance_px / store.zoom();
        hit::hit_test(store, world, tolerance)
    }

    fn mark_dirty(&mut self) {
        self.dirty_marks += 1;
    }
}

/// A pointer-driven interaction mode.
pub trait Tool {
    fn on_mouse_down(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    );

    fn on_mouse_move(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    );

    fn on_mouse_up(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    );

    fn on_double_click(
        &mut self,
        _point: Point,
        _shift: bool,
        _store: &mut ElementStore,
        _view: &mut dyn CanvasView,
    ) {
    }

    /// Abandon any gesture in progress and return to idle.
    fn cancel(&mut self, store: &mut ElementStore);

    /// Whether a gesture is in progress.
    fn is_active(&self) -> bool;

    fn cursor(&self) -> Cursor {
        Cursor::Default
    }
}

/// Screen-pixel distance converted to world units at the current zoom.
pub(crate) fn world_distance(store: &ElementStore, px: f64) -> f64 {
    px / store.zoom()
}

/// Owns one instance of every tool and routes events to the one selected
/// in the store.
#[derive(Debug, Default)]
pub struct ToolManager {
    select: SelectTool,
    shape: ShapeTool,
    line: LineTool,
    pen: PenTool,
    pan: PanTool,
    /// Tool that received the last event; switching away cancels it.
    last: ToolKind,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn tool_mut(&mut self, kind: ToolKind) -> &mut dyn Tool {
        match kind {
            ToolKind::Select => &mut self.select,
            ToolKind::Shape | ToolKind::Text | ToolKind::Frame => &mut self.shape,
            ToolKind::Line => &mut self.line,
            ToolKind::Pen => &mut self.pen,
            ToolKind::Pan => &mut self.pan,
        }
    }

    fn tool(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::Select => &self.select,
            ToolKind::Shape | ToolKind::Text | ToolKind::Frame => &self.shape,
            ToolKind::Line => &self.line,
            ToolKind::Pen => &self.pen,
            ToolKind::Pan => &self.pan,
        }
    }

    /// Active tool for this event, cancelling the previous one if the
    /// store's tool changed underneath us.
    fn sync(&mut self, store: &mut ElementStore) -> ToolKind {
        let current = store.tool();
        if current != self.last {
            let last = self.last;
            self.tool_mut(last).cancel(store);
            self.last = current;
        }
        current
    }

    pub fn on_mouse_down(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let kind = self.sync(store);
        self.tool_mut(kind).on_mouse_down(point, shift, store, view);
    }

    pub fn on_mouse_move(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let kind = self.sync(store);
        self.tool_mut(kind).on_mouse_move(point, shift, store, view);
    }

    pub fn on_mouse_up(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let kind = self.sync(store);
        self.tool_mut(kind).on_mouse_up(point, shift, store, view);
    }

    pub fn on_double_click(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let kind = self.sync(store);
        self.tool_mut(kind).on_double_click(point, shift, store, view);
    }

    /// Escape: abandon the current gesture, leave inline editing and clear
    /// the overlay.
    pub fn on_escape(&mut self, store: &mut ElementStore, view: &mut dyn CanvasView) {
        let kind = self.sync(store);
        self.tool_mut(kind).cancel(store);
        store.cancel_text_edit();
        store.clear_overlay();
        view.mark_dirty();
    }

    pub fn is_active(&self, store: &ElementStore) -> bool {
        self.tool(store.tool()).is_active()
    }

    pub fn cursor(&self, store: &ElementStore) -> Cursor {
        self.tool(store.tool()).cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    #[test]
    fn test_tool_kind_serde() {
        let json = serde_json::to_string(&ToolKind::Pen).unwrap();
        assert_eq!(json, "\"pen\"");
        assert_eq!(ToolKind::default(), ToolKind::Select);
    }

    #[test]
    fn test_switching_tool_cancels_gesture() {
        let mut store = ElementStore::new();
        let mut view = HeadlessView::default();
        let mut tools = ToolManager::new();

        store.set_tool(ToolKind::Shape);
        tools.on_mouse_down(Point::new(0.0, 0.0), false, &mut store, &mut view);
        tools.on_mouse_move(Point::new(50.0, 50.0), false, &mut store, &mut view);
        assert!(tools.is_active(&store));
        assert!(store.overlay().preview.is_some());

        store.set_tool(ToolKind::Select);
        tools.on_mouse_move(Point::new(60.0, 60.0), false, &mut store, &mut view);
        assert!(store.is_empty());
        assert!(store.overlay().preview.is_none());
    }

    #[test]
    fn test_escape_cancels_and_clears() {
        let mut store = ElementStore::new();
        let mut view = HeadlessView::default();
        let mut tools = ToolManager::new();
        store.add_element(store.factory().shape(Rect::new(0.0, 0.0, 100.0, 100.0)));

        tools.on_mouse_down(Point::new(300.0, 300.0), false, &mut store, &mut view);
        tools.on_mouse_move(Point::new(-10.0, -10.0), false, &mut store, &mut view);
        assert!(store.overlay().marquee.is_some());
        tools.on_escape(&mut store, &mut view);
        assert!(!tools.is_active(&store));
        assert!(store.overlay().is_empty());
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_headless_view_counts_repaints() {
        let mut store = ElementStore::new();
        let mut view = HeadlessView::default();
        let mut tools = ToolManager::new();
        tools.on_mouse_down(Point::new(0.0, 0.0), false, &mut store, &mut view);
        tools.on_mouse_up(Point::new(0.0, 0.0), false, &mut store, &mut view);
        assert!(view.dirty_marks >= 2);
        assert_eq!(tools.cursor(&store), Cursor::Default);
    }
}
