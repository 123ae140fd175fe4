//! Alignment, distribution and automatic layout.
//!
//! Every planner is pure: it takes element ids with their world bounds and
//! returns the translation each element needs. Elements that would not
//! move are left out of the result.

use crate::elements::ElementId;
use crate::geometry;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::{FRAC_PI_2, TAU};

/// A planned move.
pub type Move = (ElementId, Vec2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignDirection {
    Left,
    Right,
    Top,
    Bottom,
    /// Same horizontal centre (a shared vertical axis).
    CenterH,
    /// Same vertical centre (a shared horizontal axis).
    CenterV,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    Grid,
    Tree,
    Circle,
    Horizontal,
    Vertical,
}

fn collect_moves(moves: impl IntoIterator<Item = Move>) -> Vec<Move> {
    moves
        .into_iter()
        .filter(|(_, d)| d.x.abs() > 1e-9 || d.y.abs() > 1e-9)
        .collect()
}

fn combined(items: &[(ElementId, Rect)]) -> Option<Rect> {
    geometry::union_rects(items.iter().map(|(_, r)| *r))
}

/// Snap one edge or centre of every item to the matching coordinate of the
/// combined bounding box. Needs at least two items.
pub fn align(items: &[(ElementId, Rect)], direction: AlignDirection) -> Vec<Move> {
    if items.len() < 2 {
        return Vec::new();
    }
    let Some(bounds) = combined(items) else {
        return Vec::new();
    };
    let center = bounds.center();
    collect_moves(items.iter().map(|(id, r)| {
        let delta = match direction {
            AlignDirection::Left => Vec2::new(bounds.x0 - r.x0, 0.0),
            AlignDirection::Right => Vec2::new(bounds.x1 - r.x1, 0.0),
            AlignDirection::Top => Vec2::new(0.0, bounds.y0 - r.y0),
            AlignDirection::Bottom => Vec2::new(0.0, bounds.y1 - r.y1),
            AlignDirection::CenterH => Vec2::new(center.x - r.center().x, 0.0),
            AlignDirection::CenterV => Vec2::new(0.0, center.y - r.center().y),
        };
        (*id, delta)
    }))
}

/// Space centres evenly between the first and last item along `axis`.
/// Needs at least three items.
pub fn distribute(items: &[(ElementId, Rect)], axis: DistributeAxis) -> Vec<Move> {
    if items.len() < 3 {
        return Vec::new();
    }
    let along = |r: &Rect| match axis {
        DistributeAxis::Horizontal => r.center().x,
        DistributeAxis::Vertical => r.center().y,
    };
    let mut sorted: Vec<(ElementId, f64)> = items.iter().map(|(id, r)| (*id, along(r))).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let first = sorted[0].1;
    let last = sorted[sorted.len() - 1].1;
    let step = (last - first) / (sorted.len() - 1) as f64;
    collect_moves(sorted.iter().enumerate().map(|(i, (id, c))| {
        let shift = first + step * i as f64 - c;
        let delta = match axis {
            DistributeAxis::Horizontal => Vec2::new(shift, 0.0),
            DistributeAxis::Vertical => Vec2::new(0.0, shift),
        };
        (*id, delta)
    }))
}

/// Plan an automatic layout. `edges` are parent→child links used by
/// [`LayoutMode::Tree`]. Needs at least two items.
pub fn auto_layout(
    items: &[(ElementId, Rect)],
    mode: LayoutMode,
    edges: &[(ElementId, ElementId)],
    gap: f64,
) -> Vec<Move> {
    if items.len() < 2 {
        return Vec::new();
    }
    match mode {
        LayoutMode::Grid => grid_layout(items, gap),
        LayoutMode::Tree => tree_layout(items, edges, gap),
        LayoutMode::Circle => circle_layout(items, gap),
        LayoutMode::Horizontal => linear_layout(items, gap, true),
        LayoutMode::Vertical => linear_layout(items, gap, false),
    }
}

/// Uniform cells in the smallest square-ish grid, filled in reading order
/// of the current centres and anchored at the top-left of the selection.
pub fn grid_layout(items: &[(ElementId, Rect)], gap: f64) -> Vec<Move> {
    let Some(bounds) = combined(items) else {
        return Vec::new();
    };
    let cols = (items.len() as f64).sqrt().ceil() as usize;
    let cell_w = items.iter().map(|(_, r)| r.width()).fold(0.0, f64::max);
    let cell_h = items.iter().map(|(_, r)| r.height()).fold(0.0, f64::max);

    let mut sorted: Vec<&(ElementId, Rect)> = items.iter().collect();
    sorted.sort_by(|(_, a), (_, b)| {
        let (ca, cb) = (a.center(), b.center());
        ca.y.total_cmp(&cb.y).then(ca.x.total_cmp(&cb.x))
    });

    collect_moves(sorted.iter().enumerate().map(|(i, (id, r))| {
        let (row, col) = (i / cols, i % cols);
        let target = Point::new(
            bounds.x0 + col as f64 * (cell_w + gap) + cell_w / 2.0,
            bounds.y0 + row as f64 * (cell_h + gap) + cell_h / 2.0,
        );
        (*id, target - r.center())
    }))
}

/// Rows by breadth-first depth from the roots (items with no incoming
/// edge). Falls back to a grid when no edge links two items.
pub fn tree_layout(
    items: &[(ElementId, Rect)],
    edges: &[(ElementId, ElementId)],
    gap: f64,
) -> Vec<Move> {
    let ids: HashSet<ElementId> = items.iter().map(|(id, _)| *id).collect();
    let edges: Vec<(ElementId, ElementId)> = edges
        .iter()
        .copied()
        .filter(|(a, b)| a != b && ids.contains(a) && ids.contains(b))
        .collect();
    if edges.is_empty() {
        return grid_layout(items, gap);
    }
    let Some(bounds) = combined(items) else {
        return Vec::new();
    };

    let mut children: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
    let mut has_parent = HashSet::new();
    for (parent, child) in &edges {
        children.entry(*parent).or_default().push(*child);
        has_parent.insert(*child);
    }

    let mut depth: HashMap<ElementId, usize> = HashMap::new();
    let mut rows: Vec<Vec<ElementId>> = Vec::new();
    // Roots first; anything only reachable through a cycle starts its own tree.
    let starts = items
        .iter()
        .filter(|(id, _)| !has_parent.contains(id))
        .chain(items.iter())
        .map(|(id, _)| *id);
    for start in starts {
        if depth.contains_key(&start) {
            continue;
        }
        let mut queue = VecDeque::from([(start, 0)]);
        depth.insert(start, 0);
        while let Some((id, d)) = queue.pop_front() {
            if rows.len() <= d {
                rows.push(Vec::new());
            }
            rows[d].push(id);
            for child in children.get(&id).into_iter().flatten() {
                if !depth.contains_key(child) {
                    depth.insert(*child, d + 1);
                    queue.push_back((*child, d + 1));
                }
            }
        }
    }

    let rects: HashMap<ElementId, Rect> = items.iter().copied().collect();
    let row_width = |row: &[ElementId]| {
        let widths: f64 = row.iter().map(|id| rects[id].width()).sum();
        widths + gap * row.len().saturating_sub(1) as f64
    };
    let widest = rows.iter().map(|r| row_width(r.as_slice())).fold(0.0, f64::max);

    let mut moves = Vec::new();
    let mut y = bounds.y0;
    for row in &rows {
        let height = row.iter().map(|id| rects[id].height()).fold(0.0, f64::max);
        let mut x = bounds.x0 + (widest - row_width(row.as_slice())) / 2.0;
        for id in row {
            let r = rects[id];
            let target = Point::new(x + r.width() / 2.0, y + height / 2.0);
            moves.push((*id, target - r.center()));
            x += r.width() + gap;
        }
        y += height + gap;
    }
    collect_moves(moves)
}

/// Centres evenly spaced on a circle around the selection centre, starting
/// at twelve o'clock.
pub fn circle_layout(items: &[(ElementId, Rect)], gap: f64) -> Vec<Move> {
    let Some(bounds) = combined(items) else {
        return Vec::new();
    };
    let center = bounds.center();
    let diagonals: Vec<f64> = items
        .iter()
        .map(|(_, r)| r.width().hypot(r.height()))
        .collect();
    let total: f64 = diagonals.iter().sum();
    let largest = diagonals.iter().copied().fold(0.0, f64::max);
    let radius = (total / TAU).max(largest) + gap;

    let n = items.len() as f64;
    collect_moves(items.iter().enumerate().map(|(i, (id, r))| {
        let angle = -FRAC_PI_2 + TAU * i as f64 / n;
        let target = center + Vec2::new(angle.cos(), angle.sin()) * radius;
        (*id, target - r.center())
    }))
}

/// A single row (or column) with a fixed gap, ordered by current position.
/// The cross-axis coordinate is kept.
pub fn linear_layout(items: &[(ElementId, Rect)], gap: f64, horizontal: bool) -> Vec<Move> {
    let Some(bounds) = combined(items) else {
        return Vec::new();
    };
    let mut sorted: Vec<&(ElementId, Rect)> = items.iter().collect();
    if horizontal {
        sorted.sort_by(|(_, a), (_, b)| a.center().x.total_cmp(&b.center().x));
    } else {
        sorted.sort_by(|(_, a), (_, b)| a.center().y.total_cmp(&b.center().y));
    }

    let mut cursor = if horizontal { bounds.x0 } else { bounds.y0 };
    let mut moves = Vec::with_capacity(sorted.len());
    for (id, r) in sorted {
        if horizontal {
            moves.push((*id, Vec2::new(cursor - r.x0, 0.0)));
            cursor += r.width() + gap;
        } else {
            moves.push((*id, Vec2::new(0.0, cursor - r.y0)));
            cursor += r.height() + gap;
        }
    }
    collect_moves(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn items(rects: &[Rect]) -> Vec<(ElementId, Rect)> {
        rects.iter().map(|r| (Uuid::new_v4(), *r)).collect()
    }

    fn apply(items: &[(ElementId, Rect)], moves: &[Move]) -> Vec<Rect> {
        items
            .iter()
            .map(|(id, r)| {
                let d = moves
                    .iter()
                    .find(|(m, _)| m == id)
                    .map_or(Vec2::ZERO, |(_, d)| *d);
                *r + d
            })
            .collect()
    }

    #[test]
    fn test_align_left_and_center() {
        let it = items(&[
            Rect::new(10.0, 0.0, 60.0, 50.0),
            Rect::new(40.0, 100.0, 140.0, 150.0),
        ]);
        let out = apply(&it, &align(&it, AlignDirection::Left));
        assert!((out[0].x0 - 10.0).abs() < 1e-9);
        assert!((out[1].x0 - 10.0).abs() < 1e-9);

        let out = apply(&it, &align(&it, AlignDirection::CenterH));
        assert!((out[0].center().x - 75.0).abs() < 1e-9);
        assert!((out[1].center().x - 75.0).abs() < 1e-9);
        assert!((out[1].y0 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_align_needs_two() {
        let it = items(&[Rect::new(10.0, 0.0, 60.0, 50.0)]);
        assert!(align(&it, AlignDirection::Right).is_empty());
    }

    #[test]
    fn test_distribute_evens_centres() {
        let it = items(&[
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(100.0, 0.0, 110.0, 10.0),
            Rect::new(20.0, 0.0, 30.0, 10.0),
        ]);
        let out = apply(&it, &distribute(&it, DistributeAxis::Horizontal));
        assert!((out[0].center().x - 5.0).abs() < 1e-9);
        assert!((out[2].center().x - 55.0).abs() < 1e-9);
        assert!((out[1].center().x - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_of_four_is_two_by_two() {
        let it = items(&[
            Rect::new(300.0, 10.0, 350.0, 60.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(120.0, 400.0, 170.0, 450.0),
            Rect::new(10.0, 200.0, 60.0, 250.0),
        ]);
        let out = apply(&it, &auto_layout(&it, LayoutMode::Grid, &[], 40.0));
        let mut xs: Vec<f64> = out.iter().map(|r| r.center().x).collect();
        let mut ys: Vec<f64> = out.iter().map(|r| r.center().y).collect();
        xs.sort_by(f64::total_cmp);
        ys.sort_by(f64::total_cmp);
        assert!((xs[0] - xs[1]).abs() < 1e-9 && (xs[2] - xs[3]).abs() < 1e-9);
        assert!((ys[0] - ys[1]).abs() < 1e-9 && (ys[2] - ys[3]).abs() < 1e-9);
        assert!((xs[2] - xs[0] - 90.0).abs() < 1e-9);
        assert!((ys[2] - ys[0] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_tree_rows_follow_depth() {
        let it = items(&[
            Rect::new(0.0, 300.0, 40.0, 340.0),
            Rect::new(500.0, 0.0, 540.0, 40.0),
            Rect::new(200.0, 100.0, 240.0, 140.0),
        ]);
        let (root, a, b) = (it[0].0, it[1].0, it[2].0);
        let out = apply(&it, &tree_layout(&it, &[(root, a), (root, b)], 20.0));
        assert!(out[0].y1 < out[1].y0);
        assert!((out[1].y0 - out[2].y0).abs() < 1e-9);
        // The root is centred over its children.
        let children_mid = (out[1].center().x + out[2].center().x) / 2.0;
        assert!((out[0].center().x - children_mid).abs() < 1e-9);
    }

    #[test]
    fn test_tree_without_edges_is_grid() {
        let it = items(&[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 50.0, 60.0, 60.0)]);
        assert_eq!(tree_layout(&it, &[], 10.0), grid_layout(&it, 10.0));
    }

    #[test]
    fn test_circle_keeps_equal_radius() {
        let it = items(&[
            Rect::new(0.0, 0.0, 30.0, 40.0),
            Rect::new(100.0, 0.0, 130.0, 40.0),
            Rect::new(0.0, 100.0, 30.0, 140.0),
        ]);
        let center = combined(&it).unwrap().center();
        let out = apply(&it, &circle_layout(&it, 10.0));
        let radii: Vec<f64> = out.iter().map(|r| (r.center() - center).hypot()).collect();
        assert!((radii[0] - radii[1]).abs() < 1e-9);
        assert!((radii[0] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_row_keeps_y() {
        let it = items(&[
            Rect::new(100.0, 30.0, 150.0, 80.0),
            Rect::new(0.0, 0.0, 20.0, 20.0),
        ]);
        let out = apply(&it, &linear_layout(&it, 10.0, true));
        assert!((out[1].x0 - 0.0).abs() < 1e-9);
        assert!((out[0].x0 - 30.0).abs() < 1e-9);
        assert!((out[0].y0 - 30.0).abs() < 1e-9);
    }
}
