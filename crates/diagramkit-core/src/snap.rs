//! Snapping: line endpoints to connection points, dragged selections to
//! the edges and centres of other elements.

use crate::elements::ElementId;
use crate::geometry::{self, ConnectionCandidate};
use crate::store::ElementStore;
use kurbo::{Point, Rect, Vec2};

/// An alignment guide drawn while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guide {
    /// Vertical line at `x` from `from` to `to` (y coordinates).
    Vertical { x: f64, from: f64, to: f64 },
    /// Horizontal line at `y` from `from` to `to` (x coordinates).
    Horizontal { y: f64, from: f64, to: f64 },
}

/// Nearest connection point within `radius` (world units) of `point`.
///
/// Candidates are the four side points of every displayed element a line
/// may attach to (not lines, text or groups) on a visible, unlocked layer.
/// `exclude` skips one element, typically the line being drawn.
pub fn find_connection(
    store: &ElementStore,
    point: Point,
    radius: f64,
    exclude: Option<ElementId>,
) -> Option<ConnectionCandidate> {
    let candidates = store
        .elements_ordered()
        .filter(|el| {
            Some(el.id) != exclude
                && el.is_connectable()
                && store.is_displayed(el.id)
                && store.layer_is_interactive(&el.layer_id)
        })
        .flat_map(|el| {
            geometry::connection_points(el.rect(), el.effective_rotation())
                .map(|(side, point)| ConnectionCandidate {
                    element_id: el.id,
                    side,
                    point,
                })
        });
    geometry::nearest_connection_point(candidates, point, radius)
}

fn x_stops(r: Rect) -> [f64; 3] {
    [r.x0, r.center().x, r.x1]
}

fn y_stops(r: Rect) -> [f64; 3] {
    [r.y0, r.center().y, r.y1]
}

/// Smallest offset (within `threshold`) that lines one of `moving` up with
/// one of a target's stops, and the target rect it came from.
fn best_offset(
    moving: [f64; 3],
    others: &[Rect],
    stops: fn(Rect) -> [f64; 3],
    threshold: f64,
) -> Option<(f64, f64, Rect)> {
    let mut best: Option<(f64, f64, Rect)> = None;
    for other in others {
        for target in stops(*other) {
            for m in moving {
                let offset = target - m;
                if offset.abs() <= threshold && best.is_none_or(|(b, _, _)| offset.abs() < b.abs()) {
                    best = Some((offset, target, *other));
                }
            }
        }
    }
    best
}

/// Snap a dragged selection box to the other elements' edges and centres.
///
/// Returns the correction to add to the drag and the guides to draw. Each
/// axis snaps independently.
pub fn alignment_guides(moving: Rect, others: &[Rect], threshold: f64) -> (Vec2, Vec<Guide>) {
    let mut correction = Vec2::ZERO;
    let mut guides = Vec::new();

    let snapped_x = best_offset(x_stops(moving), others, x_stops, threshold);
    let snapped_y = best_offset(y_stops(moving), others, y_stops, threshold);
    if let Some((dx, _, _)) = snapped_x {
        correction.x = dx;
    }
    if let Some((dy, _, _)) = snapped_y {
        correction.y = dy;
    }

    let placed = moving + correction;
    if let Some((_, x, other)) = snapped_x {
        guides.push(Guide::Vertical {
            x,
            from: placed.y0.min(other.y0),
            to: placed.y1.max(other.y1),
        });
    }
    if let Some((_, y, other)) = snapped_y {
        guides.push(Guide::Horizontal {
            y,
            from: placed.x0.min(other.x0),
            to: placed.x1.max(other.x1),
        });
    }
    (correction, guides)
}
