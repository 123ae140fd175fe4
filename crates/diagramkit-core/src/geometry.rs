//! Pure geometry helpers: bounds, rotation, point-in-shape tests,
//! selection handles and connection points.

use crate::elements::{ElementId, ShapeVariant};
use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Distance from the top edge to the rotation handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;
/// Smallest width or height a resize can produce.
pub const MIN_RESIZE: f64 = 10.0;

/// Side of an element's bounding box, used for connections and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    /// Whether leaving through this side travels horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Rotate `point` around `center` by `angle` radians.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Corners of `rect` after rotating it about its center.
pub fn rotated_corners(rect: Rect, rotation: f64) -> [Point; 4] {
    let c = rect.center();
    [
        rotate_point(Point::new(rect.x0, rect.y0), c, rotation),
        rotate_point(Point::new(rect.x1, rect.y0), c, rotation),
        rotate_point(Point::new(rect.x1, rect.y1), c, rotation),
        rotate_point(Point::new(rect.x0, rect.y1), c, rotation),
    ]
}

/// Axis-aligned bounds of `rect` rotated about its center.
pub fn rotated_bounds(rect: Rect, rotation: f64) -> Rect {
    if rotation == 0.0 {
        return rect;
    }
    let corners = rotated_corners(rect, rotation);
    corners[1..]
        .iter()
        .fold(Rect::from_points(corners[0], corners[0]), |acc, p| {
            acc.union_pt(*p)
        })
}

/// Bounding box of a line, computed from its endpoints.
pub fn line_bounds(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

/// Rectangle intersection test. Touching edges count as intersecting,
/// so zero-width boxes (horizontal or vertical lines) are still found.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Whether `inner` lies entirely within `outer` (edges inclusive).
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Union of all rectangles, or `None` for an empty input.
pub fn union_rects(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Whether `point` lies inside the ellipse inscribed in `rect`.
pub fn point_in_ellipse(rect: Rect, point: Point) -> bool {
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = rect.center();
    let nx = (point.x - c.x) / rx;
    let ny = (point.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Outline path of a shape variant filling `rect`.
pub fn shape_outline(variant: ShapeVariant, rect: Rect) -> BezPath {
    let Rect { x0, y0, x1, y1 } = rect;
    let c = rect.center();
    match variant {
        ShapeVariant::Rectangle => rect.to_path(0.1),
        ShapeVariant::RoundedRectangle => {
            let radius = (rect.width().min(rect.height()) * 0.2).min(16.0);
            RoundedRect::from_rect(rect, radius).to_path(0.1)
        }
        ShapeVariant::Ellipse => Ellipse::from_rect(rect).to_path(0.1),
        ShapeVariant::Diamond => polygon(&[
            Point::new(c.x, y0),
            Point::new(x1, c.y),
            Point::new(c.x, y1),
            Point::new(x0, c.y),
        ]),
        ShapeVariant::Triangle => polygon(&[
            Point::new(c.x, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]),
        ShapeVariant::Hexagon => {
            let inset = rect.width() * 0.25;
            polygon(&[
                Point::new(x0 + inset, y0),
                Point::new(x1 - inset, y0),
                Point::new(x1, c.y),
                Point::new(x1 - inset, y1),
                Point::new(x0 + inset, y1),
                Point::new(x0, c.y),
            ])
        }
        ShapeVariant::Parallelogram => {
            let skew = rect.width() * 0.2;
            polygon(&[
                Point::new(x0 + skew, y0),
                Point::new(x1, y0),
                Point::new(x1 - skew, y1),
                Point::new(x0, y1),
            ])
        }
    }
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Type-specific containment test for an unrotated shape.
pub fn point_in_shape(variant: ShapeVariant, rect: Rect, point: Point) -> bool {
    match variant {
        ShapeVariant::Rectangle | ShapeVariant::RoundedRectangle => rect.contains(point),
        ShapeVariant::Ellipse => point_in_ellipse(rect, point),
        _ => rect.contains(point) && shape_outline(variant, rect).contains(point),
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Which end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnd {
    Start,
    End,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Side),
    Rotate,
    Endpoint(LineEnd),
}

/// A selection handle with its world position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// `tolerance` is in world units (already divided by zoom).
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Eight resize handles plus an optional rotation handle, rotated with the element.
pub fn resize_handles(rect: Rect, rotation: f64, zoom: f64, rotatable: bool) -> Vec<Handle> {
    let c = rect.center();
    let hw = rect.width() / 2.0;
    let hh = rect.height() / 2.0;
    let at = |dx: f64, dy: f64| rotate_point(Point::new(c.x + dx, c.y + dy), c, rotation);

    let mut handles = vec![
        Handle::new(at(-hw, -hh), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(at(hw, -hh), HandleKind::Corner(Corner::TopRight)),
        Handle::new(at(-hw, hh), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(at(hw, hh), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(at(0.0, -hh), HandleKind::Edge(Side::Top)),
        Handle::new(at(hw, 0.0), HandleKind::Edge(Side::Right)),
        Handle::new(at(0.0, hh), HandleKind::Edge(Side::Bottom)),
        Handle::new(at(-hw, 0.0), HandleKind::Edge(Side::Left)),
    ];
    if rotatable {
        let offset = ROTATE_HANDLE_OFFSET / zoom.max(f64::EPSILON);
        handles.push(Handle::new(at(0.0, -hh - offset), HandleKind::Rotate));
    }
    handles
}

/// Endpoint handles of a line.
pub fn line_handles(start: Point, end: Point) -> Vec<Handle> {
    vec![
        Handle::new(start, HandleKind::Endpoint(LineEnd::Start)),
        Handle::new(end, HandleKind::Endpoint(LineEnd::End)),
    ]
}

/// First handle under `point`, if any.
pub fn hit_test_handles(handles: &[Handle], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles
        .iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// New rectangle after dragging `handle` of `original` to `pointer`.
///
/// Works in the element's unrotated frame and keeps the opposite corner
/// (or edge) fixed in world space.
pub fn resize_rect(original: Rect, rotation: f64, handle: HandleKind, pointer: Point) -> Rect {
    let center = original.center();
    let local = rotate_point(pointer, center, -rotation);
    let mut r = original;

    let (moves_left, moves_right, moves_top, moves_bottom) = match handle {
        HandleKind::Corner(Corner::TopLeft) => (true, false, true, false),
        HandleKind::Corner(Corner::TopRight) => (false, true, true, false),
        HandleKind::Corner(Corner::BottomLeft) => (true, false, false, true),
        HandleKind::Corner(Corner::BottomRight) => (false, true, false, true),
        HandleKind::Edge(Side::Left) => (true, false, false, false),
        HandleKind::Edge(Side::Right) => (false, true, false, false),
        HandleKind::Edge(Side::Top) => (false, false, true, false),
        HandleKind::Edge(Side::Bottom) => (false, false, false, true),
        HandleKind::Rotate | HandleKind::Endpoint(_) => return original,
    };

    if moves_left {
        r.x0 = local.x.min(r.x1 - MIN_RESIZE);
    }
    if moves_right {
        r.x1 = local.x.max(r.x0 + MIN_RESIZE);
    }
    if moves_top {
        r.y0 = local.y.min(r.y1 - MIN_RESIZE);
    }
    if moves_bottom {
        r.y1 = local.y.max(r.y0 + MIN_RESIZE);
    }

    if rotation == 0.0 {
        return r;
    }

    // The anchor keeps its local coordinates; re-rotating about the new
    // center moves it, so shift the rect back.
    let anchor = Point::new(
        if moves_left { original.x1 } else { original.x0 },
        if moves_top { original.y1 } else { original.y0 },
    );
    let before = rotate_point(anchor, center, rotation);
    let after = rotate_point(anchor, r.center(), rotation);
    r + (before - after)
}

/// Connection point on one side of a (possibly rotated) rectangle.
pub fn connection_point(rect: Rect, rotation: f64, side: Side) -> Point {
    let c = rect.center();
    let local = match side {
        Side::Left => Point::new(rect.x0, c.y),
        Side::Right => Point::new(rect.x1, c.y),
        Side::Top => Point::new(c.x, rect.y0),
        Side::Bottom => Point::new(c.x, rect.y1),
    };
    rotate_point(local, c, rotation)
}

/// All four connection points of a rectangle.
pub fn connection_points(rect: Rect, rotation: f64) -> [(Side, Point); 4] {
    Side::ALL.map(|side| (side, connection_point(rect, rotation, side)))
}

/// A connection point belonging to a specific element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionCandidate {
    pub element_id: ElementId,
    pub side: Side,
    pub point: Point,
}

/// Nearest candidate within `radius` of `point`. Ties go to the earliest candidate.
pub fn nearest_connection_point(
    candidates: impl IntoIterator<Item = ConnectionCandidate>,
    point: Point,
    radius: f64,
) -> Option<ConnectionCandidate> {
    let mut best: Option<(f64, ConnectionCandidate)> = None;
    for candidate in candidates {
        let dist = (candidate.point - point).hypot();
        if dist > radius {
            continue;
        }
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, candidate));
        }
    }
    best.map(|(_, c)| c)
}

/// Unit vector perpendicular to `v` (rotated +90°), or zero for a zero vector.
pub fn perpendicular(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < f64::EPSILON {
        return Vec2::ZERO;
    }
    Vec2::new(-v.y / len, v.x / len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;
    use uuid::Uuid;

    fn approx(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Point::new(10.0, 0.0), Point::ZERO, FRAC_PI_2);
        assert!(approx(p, Point::new(0.0, 10.0)));
    }

    #[test]
    fn test_rotated_bounds_square_45() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = rotated_bounds(rect, std::f64::consts::FRAC_PI_4);
        let half_diag = 50.0 * std::f64::consts::SQRT_2;
        assert!((bounds.width() - 2.0 * half_diag).abs() < 1e-9);
        assert!((bounds.center().x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rects_intersect_touching_and_degenerate() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_intersect(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(rects_intersect(a, Rect::new(5.0, 5.0, 5.0, 30.0)));
        assert!(!rects_intersect(a, Rect::new(11.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_point_to_segment_dist() {
        let d = point_to_segment_dist(Point::new(5.0, 5.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
        let d = point_to_segment_dist(Point::new(-3.0, 4.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_in_shape_variants() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        // Corner is inside the rectangle but outside ellipse and diamond.
        let corner = Point::new(5.0, 5.0);
        assert!(point_in_shape(ShapeVariant::Rectangle, rect, corner));
        assert!(!point_in_shape(ShapeVariant::Ellipse, rect, corner));
        assert!(!point_in_shape(ShapeVariant::Diamond, rect, corner));
        assert!(point_in_shape(ShapeVariant::Diamond, rect, Point::new(50.0, 50.0)));
        assert!(point_in_shape(ShapeVariant::Triangle, rect, Point::new(50.0, 90.0)));
        assert!(!point_in_shape(ShapeVariant::Triangle, rect, Point::new(5.0, 10.0)));
    }

    #[test]
    fn test_resize_handles_layout() {
        let handles = resize_handles(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0, 1.0, true);
        assert_eq!(handles.len(), 9);
        let rotate = handles.iter().find(|h| h.kind == HandleKind::Rotate).unwrap();
        assert!(approx(rotate.position, Point::new(50.0, -ROTATE_HANDLE_OFFSET)));
        assert_eq!(
            hit_test_handles(&handles, Point::new(99.0, 49.0), 4.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
    }

    #[test]
    fn test_resize_rect_clamps_and_anchors() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = resize_rect(
            original,
            0.0,
            HandleKind::Corner(Corner::BottomRight),
            Point::new(150.0, 120.0),
        );
        assert_eq!(r, Rect::new(0.0, 0.0, 150.0, 120.0));

        let r = resize_rect(original, 0.0, HandleKind::Edge(Side::Left), Point::new(200.0, 50.0));
        assert!((r.x0 - 90.0).abs() < 1e-9);
        assert!((r.x1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_rotated_keeps_anchor() {
        let original = Rect::new(0.0, 0.0, 100.0, 100.0);
        let rotation = 0.5;
        let anchor_before = rotated_corners(original, rotation)[0];
        let pointer = rotate_point(Point::new(140.0, 130.0), original.center(), rotation);
        let r = resize_rect(
            original,
            rotation,
            HandleKind::Corner(Corner::BottomRight),
            pointer,
        );
        let anchor_after = rotated_corners(r, rotation)[0];
        assert!(approx(anchor_before, anchor_after));
        assert!((r.width() - 140.0).abs() < 1e-6);
    }

    #[test]
    fn test_connection_points() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(approx(connection_point(rect, 0.0, Side::Right), Point::new(100.0, 50.0)));
        assert!(approx(connection_point(rect, 0.0, Side::Top), Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_nearest_connection_point_radius() {
        let id = Uuid::new_v4();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let candidates: Vec<_> = connection_points(rect, 0.0)
            .into_iter()
            .map(|(side, point)| ConnectionCandidate { element_id: id, side, point })
            .collect();

        let hit = nearest_connection_point(candidates.clone(), Point::new(96.0, 52.0), 10.0);
        assert_eq!(hit.map(|c| c.side), Some(Side::Right));

        let miss = nearest_connection_point(candidates, Point::new(75.0, 75.0), 10.0);
        assert!(miss.is_none());
    }

    #[test]
    fn test_snap_to_grid() {
        let p = snap_to_grid(Point::new(29.0, 11.0), 20.0);
        assert!(approx(p, Point::new(20.0, 20.0)));
    }
}
