//! Line tool: drag from point to point, snapping either end to a nearby
//! connection point.

use super::{CanvasView, Cursor, Tool, world_distance};
use crate::elements::Connection;
use crate::geometry::ConnectionCandidate;
use crate::snap;
use crate::store::ElementStore;
use kurbo::Point;

#[derive(Debug, Clone, Copy)]
struct Anchor {
    point: Point,
    connection: Option<ConnectionCandidate>,
}

#[derive(Debug, Default)]
pub struct LineTool {
    start: Option<Anchor>,
}

/// Snap `point` to the nearest connection point, else to the grid.
fn anchor(store: &ElementStore, point: Point) -> Anchor {
    let radius = world_distance(store, store.config().snap_radius_px);
    match snap::find_connection(store, point, radius, None) {
        Some(candidate) => Anchor {
            point: candidate.point,
            connection: Some(candidate),
        },
        None => Anchor {
            point: store.grid().apply(point),
            connection: None,
        },
    }
}

fn connection(anchor: &Anchor) -> Option<Connection> {
    anchor
        .connection
        .map(|c| Connection::new(c.element_id, c.side))
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for LineTool {
    fn on_mouse_down(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let start = anchor(store, point);
        self.start = Some(start);
        store.update_overlay(|o| o.connection_hint = start.connection);
        view.mark_dirty();
    }

    fn on_mouse_move(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let end = anchor(store, point);
        match self.start {
            Some(start) => {
                let preview =
                    store
                        .factory()
                        .line(start.point, end.point, connection(&start), connection(&end));
                store.update_overlay(|o| {
                    o.preview = Some(preview);
                    o.connection_hint = end.connection;
                });
            }
            None => {
                if store.overlay().connection_hint == end.connection {
                    return;
                }
                store.update_overlay(|o| o.connection_hint = end.connection);
            }
        }
        view.mark_dirty();
    }

    fn on_mouse_up(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        let Some(start) = self.start.take() else {
            return;
        };
        store.clear_overlay();
        view.mark_dirty();

        let end = anchor(store, point);
        let min = world_distance(store, store.config().min_drag_distance);
        if (end.point - start.point).hypot() < min {
            return;
        }
        let line = store
            .factory()
            .line(start.point, end.point, connection(&start), connection(&end));
        store.push_history_checkpoint();
        let id = store.add_element(line);
        store.assign_to_frames(&[id]);
        store.set_selection(&[id]);
        log::debug!(
            "line {id} connected: start={} end={}",
            start.connection.is_some(),
            end.connection.is_some()
        );
    }

    fn cancel(&mut self, store: &mut ElementStore) {
        self.start = None;
        store.clear_overlay();
    }

    fn is_active(&self) -> bool {
        self.start.is_some()
    }

    fn cursor(&self) -> Cursor {
        Cursor::Crosshair
    }
}
