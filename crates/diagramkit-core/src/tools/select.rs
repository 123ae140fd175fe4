//! Select tool: click and shift-click selection, marquee, dragging,
//! handle resize and rotation, and line endpoint editing.

use super::{CanvasView, Cursor, Tool, world_distance};
use crate::elements::{Connection, ElementId};
use crate::geometry::{self, HandleKind, LineEnd};
use crate::snap;
use crate::store::ElementStore;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, PI};

/// Rotation snap increment with shift held (15°).
const ROTATION_SNAP: f64 = PI / 12.0;

#[derive(Debug, Clone)]
struct DragState {
    start: Point,
    /// Offset already applied to the elements.
    applied: Vec2,
    ids: Vec<ElementId>,
    /// Whether the pointer has left the dead zone (and history was saved).
    started: bool,
    /// Bounds of everything not being dragged, for alignment guides.
    others: Vec<Rect>,
    origin_bounds: Option<Rect>,
}

#[derive(Debug, Clone, Default)]
enum SelectState {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing {
        id: ElementId,
        handle: HandleKind,
        original: Rect,
        rotation: f64,
        started: bool,
    },
    Rotating {
        id: ElementId,
        center: Point,
        started: bool,
    },
    LineEndpoint {
        id: ElementId,
        end: LineEnd,
        started: bool,
    },
    Marquee {
        start: Point,
        /// Selection before the marquee, kept when shift was held.
        previous: Option<Vec<ElementId>>,
    },
}

#[derive(Debug, Default)]
pub struct SelectTool {
    state: SelectState,
    cursor: Cursor,
}

/// Handle of the single selected element under `point`.
fn handle_at(store: &ElementStore, point: Point) -> Option<(ElementId, HandleKind)> {
    let [id] = store.selection() else {
        return None;
    };
    let el = store.element(*id)?;
    if !store.is_interactive(*id) {
        return None;
    }
    let handles = if let Some((start, end)) = el.line_endpoints() {
        geometry::line_handles(start, end)
    } else if el.is_group() {
        return None;
    } else {
        geometry::resize_handles(
            el.rect(),
            el.effective_rotation(),
            store.zoom(),
            el.supports_rotation(),
        )
    };
    let tolerance = world_distance(store, store.config().handle_tolerance_px);
    geometry::hit_test_handles(&handles, point, tolerance).map(|kind| (*id, kind))
}

/// Interactive top-level element under `point`. Locked hits count as empty canvas.
fn element_at(store: &ElementStore, view: &dyn CanvasView, point: Point) -> Option<ElementId> {
    let hit = view.hit_test(store, point)?;
    let root = store.top_level_group(hit);
    (store.is_interactive(hit) && store.is_interactive(root)).then_some(root)
}

fn snap_angle(angle: f64) -> f64 {
    (angle / ROTATION_SNAP).round() * ROTATION_SNAP
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_drag(&mut self, store: &ElementStore, start: Point) {
        let ids: Vec<ElementId> = store.selection().to_vec();
        let moving: HashSet<ElementId> = store.expand_ids(&ids, true).into_iter().collect();
        let others = store
            .elements_ordered()
            .filter(|el| !el.is_group() && !moving.contains(&el.id) && store.is_displayed(el.id))
            .map(|el| el.bounds())
            .collect();
        self.state = SelectState::Dragging(DragState {
            start,
            applied: Vec2::ZERO,
            origin_bounds: store.selection_bounds(),
            ids,
            started: false,
            others,
        });
        self.cursor = Cursor::Move;
    }

    fn drag(drag: &mut DragState, point: Point, store: &mut ElementStore) -> bool {
        let total = point - drag.start;
        if !drag.started {
            if total.hypot() < world_distance(store, store.config().min_drag_distance) {
                return false;
            }
            store.push_history_checkpoint();
            drag.started = true;
        }

        let mut desired = total;
        let mut guides = Vec::new();
        if let Some(bounds) = drag.origin_bounds {
            let moved = bounds + total;
            if store.grid().snap {
                desired += store.grid().apply(moved.origin()) - moved.origin();
            } else {
                let threshold = world_distance(store, store.config().guide_threshold_px);
                let (correction, found) = snap::alignment_guides(moved, &drag.others, threshold);
                desired += correction;
                guides = found;
            }
        }
        store.move_elements(&drag.ids, desired - drag.applied);
        drag.applied = desired;
        store.update_overlay(|o| o.guides = guides);
        true
    }

    fn hover(&mut self, point: Point, store: &ElementStore, view: &dyn CanvasView) {
        self.cursor = if let Some((_, kind)) = handle_at(store, point) {
            Cursor::for_handle(kind)
        } else if element_at(store, view, point).is_some() {
            Cursor::Move
        } else {
            Cursor::Default
        };
    }
}

impl Tool for SelectTool {
    fn on_mouse_down(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        if let Some((id, kind)) = handle_at(store, point) {
            let Some(el) = store.element(id) else {
                return;
            };
            self.state = match kind {
                HandleKind::Endpoint(end) => SelectState::LineEndpoint {
                    id,
                    end,
                    started: false,
                },
                HandleKind::Rotate => SelectState::Rotating {
                    id,
                    center: el.center(),
                    started: false,
                },
                handle => SelectState::Resizing {
                    id,
                    handle,
                    original: el.rect(),
                    rotation: el.effective_rotation(),
                    started: false,
                },
            };
            self.cursor = Cursor::for_handle(kind);
            view.mark_dirty();
            return;
        }

        if let Some(id) = element_at(store, view, point) {
            if shift {
                store.select_element(id, true);
            } else {
                if !store.is_selected(id) {
                    store.select_element(id, false);
                }
                self.begin_drag(store, point);
            }
            view.mark_dirty();
            return;
        }

        let previous = shift.then(|| store.selection().to_vec());
        if !shift {
            store.clear_selection();
        }
        self.state = SelectState::Marquee {
            start: point,
            previous,
        };
        view.mark_dirty();
    }

    fn on_mouse_move(
        &mut self,
        point: Point,
        shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        if matches!(self.state, SelectState::Idle) {
            self.hover(point, store, view);
            return;
        }
        match &mut self.state {
            SelectState::Idle => return,
            SelectState::Dragging(drag) => {
                if !Self::drag(drag, point, store) {
                    return;
                }
            }
            SelectState::Resizing {
                id,
                handle,
                original,
                rotation,
                started,
            } => {
                if !*started {
                    store.push_history_checkpoint();
                    *started = true;
                }
                let pointer = store.grid().apply(point);
                let rect = geometry::resize_rect(*original, *rotation, *handle, pointer);
                store.resize_element(*id, rect);
            }
            SelectState::Rotating {
                id,
                center,
                started,
            } => {
                if !*started {
                    store.push_history_checkpoint();
                    *started = true;
                }
                let d = point - *center;
                let mut angle = d.y.atan2(d.x) + FRAC_PI_2;
                if shift {
                    angle = snap_angle(angle);
                }
                store.rotate_element(*id, angle);
            }
            SelectState::LineEndpoint { id, end, started } => {
                if !*started {
                    store.push_history_checkpoint();
                    *started = true;
                }
                let radius = world_distance(store, store.config().snap_radius_px);
                let candidate = snap::find_connection(store, point, radius, Some(*id));
                let target = candidate.map_or_else(|| store.grid().apply(point), |c| c.point);
                let connection = candidate.map(|c| Connection::new(c.element_id, c.side));
                store.set_line_endpoint(*id, *end, target, connection);
                store.update_overlay(|o| o.connection_hint = candidate);
            }
            SelectState::Marquee { start, .. } => {
                let rect = Rect::from_points(*start, point);
                store.update_overlay(|o| o.marquee = Some(rect));
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
        match std::mem::take(&mut self.state) {
            SelectState::Idle => {}
            SelectState::Dragging(drag) => {
                if drag.started {
                    let mut moved = drag.ids.clone();
                    for id in &drag.ids {
                        moved.extend(store.descendants(*id));
                    }
                    store.assign_to_frames(&moved);
                }
            }
            SelectState::Resizing { id, started, .. } | SelectState::Rotating { id, started, .. } => {
                if started {
                    store.assign_to_frames(&[id]);
                }
            }
            SelectState::LineEndpoint { .. } => {}
            SelectState::Marquee { start, previous } => {
                store.select_by_lasso(Rect::from_points(start, point));
                if let Some(mut previous) = previous {
                    let lassoed: Vec<ElementId> = store.selection().to_vec();
                    for id in lassoed {
                        if !previous.contains(&id) {
                            previous.push(id);
                        }
                    }
                    store.set_selection(&previous);
                }
            }
        }
        store.clear_overlay();
        self.hover(point, store, view);
        view.mark_dirty();
    }

    fn on_double_click(
        &mut self,
        point: Point,
        _shift: bool,
        store: &mut ElementStore,
        view: &mut dyn CanvasView,
    ) {
        self.state = SelectState::Idle;
        if let Some((id, HandleKind::Rotate)) = handle_at(store, point) {
            store.push_history_checkpoint();
            store.rotate_element(id, 0.0);
            view.mark_dirty();
            return;
        }
        let Some(hit) = view.hit_test(store, point) else {
            return;
        };
        if store.begin_text_edit(hit) {
            store.set_selection(&[hit]);
            view.mark_dirty();
        }
    }

    fn cancel(&mut self, store: &mut ElementStore) {
        self.state = SelectState::Idle;
        self.cursor = Cursor::Default;
        store.clear_overlay();
    }

    fn is_active(&self) -> bool {
        !matches!(self.state, SelectState::Idle)
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }
}
