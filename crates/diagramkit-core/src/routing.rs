//! Line geometry: orthogonal elbow routing, quadratic curves and the
//! tangents used to orient arrow heads.

use crate::geometry::{Side, perpendicular, point_to_polyline_dist, point_to_segment_dist};
use kurbo::{BezPath, ParamCurve, ParamCurveExtrema, Point, QuadBez, Rect, Vec2};

/// Minimum distance an orthogonal route travels out of its start side
/// before turning.
pub const ORTHOGONAL_CLEARANCE: f64 = 20.0;

/// Samples used when measuring distance to a curved line.
const CURVE_SAMPLES: usize = 24;

/// Four-point elbow from `start` to `end`.
///
/// Left/right exits run horizontal-vertical-horizontal, top/bottom exits
/// vertical-horizontal-vertical. The turn sits at the midpoint, pushed out
/// to at least [`ORTHOGONAL_CLEARANCE`] from the start side. Without a side
/// the route is a plain horizontal-midpoint elbow.
pub fn orthogonal_route(start: Point, end: Point, start_side: Option<Side>) -> [Point; 4] {
    match start_side {
        Some(side) if side.is_horizontal() => {
            let mid = (start.x + end.x) / 2.0;
            let mid_x = if side == Side::Right {
                mid.max(start.x + ORTHOGONAL_CLEARANCE)
            } else {
                mid.min(start.x - ORTHOGONAL_CLEARANCE)
            };
            [
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ]
        }
        Some(side) => {
            let mid = (start.y + end.y) / 2.0;
            let mid_y = if side == Side::Bottom {
                mid.max(start.y + ORTHOGONAL_CLEARANCE)
            } else {
                mid.min(start.y - ORTHOGONAL_CLEARANCE)
            };
            [
                start,
                Point::new(start.x, mid_y),
                Point::new(end.x, mid_y),
                end,
            ]
        }
        None => {
            let mid_x = (start.x + end.x) / 2.0;
            [
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ]
        }
    }
}

/// Control point of a curved line: the chord midpoint pushed along the
/// chord normal by `curvature` times the chord length.
pub fn quadratic_control(start: Point, end: Point, curvature: f64) -> Point {
    let chord = end - start;
    start.midpoint(end) + perpendicular(chord) * (curvature * chord.hypot())
}

/// Point at t = 0.5 on a quadratic Bézier.
pub fn quadratic_midpoint(p0: Point, control: Point, p1: Point) -> Point {
    Point::new(
        0.25 * p0.x + 0.5 * control.x + 0.25 * p1.x,
        0.25 * p0.y + 0.5 * control.y + 0.25 * p1.y,
    )
}

/// Resolved drawing geometry of a line element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinePath {
    Straight { start: Point, end: Point },
    Curved { start: Point, control: Point, end: Point },
    Orthogonal([Point; 4]),
}

impl LinePath {
    pub fn start(&self) -> Point {
        match self {
            LinePath::Straight { start, .. } | LinePath::Curved { start, .. } => *start,
            LinePath::Orthogonal(points) => points[0],
        }
    }

    pub fn end(&self) -> Point {
        match self {
            LinePath::Straight { end, .. } | LinePath::Curved { end, .. } => *end,
            LinePath::Orthogonal(points) => points[3],
        }
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        match self {
            LinePath::Straight { start, end } => {
                path.move_to(*start);
                path.line_to(*end);
            }
            LinePath::Curved {
                start,
                control,
                end,
            } => {
                path.move_to(*start);
                path.quad_to(*control, *end);
            }
            LinePath::Orthogonal(points) => {
                path.move_to(points[0]);
                for p in &points[1..] {
                    path.line_to(*p);
                }
            }
        }
        path
    }

    /// Angle of travel arriving at the end point.
    pub fn end_angle(&self) -> f64 {
        let dir = match self {
            LinePath::Straight { start, end } => *end - *start,
            LinePath::Curved {
                start,
                control,
                end,
            } => non_zero(*end - *control, *end - *start),
            LinePath::Orthogonal(points) => points
                .windows(2)
                .rev()
                .map(|w| w[1] - w[0])
                .find(|d| d.hypot2() > f64::EPSILON)
                .unwrap_or(Vec2::ZERO),
        };
        dir.atan2()
    }

    /// Angle pointing out of the line at its start point (the direction a
    /// tail arrow head faces).
    pub fn start_angle(&self) -> f64 {
        let dir = match self {
            LinePath::Straight { start, end } => *start - *end,
            LinePath::Curved {
                start,
                control,
                end,
            } => non_zero(*start - *control, *start - *end),
            LinePath::Orthogonal(points) => points
                .windows(2)
                .map(|w| w[0] - w[1])
                .find(|d| d.hypot2() > f64::EPSILON)
                .unwrap_or(Vec2::ZERO),
        };
        dir.atan2()
    }

    /// Where a label sits before any perpendicular offset.
    pub fn midpoint(&self) -> Point {
        match self {
            LinePath::Straight { start, end } => start.midpoint(*end),
            LinePath::Curved {
                start,
                control,
                end,
            } => quadratic_midpoint(*start, *control, *end),
            LinePath::Orthogonal(points) => points[1].midpoint(points[2]),
        }
    }

    /// Label position: the midpoint shifted perpendicular to the chord.
    pub fn label_anchor(&self, offset: f64) -> Point {
        self.midpoint() + perpendicular(self.end() - self.start()) * offset
    }

    /// Shortest distance from `point` to the drawn line.
    pub fn distance_to(&self, point: Point) -> f64 {
        match self {
            LinePath::Straight { start, end } => point_to_segment_dist(point, *start, *end),
            LinePath::Curved {
                start,
                control,
                end,
            } => {
                let quad = QuadBez::new(*start, *control, *end);
                let samples: Vec<Point> = (0..=CURVE_SAMPLES)
                    .map(|i| quad.eval(i as f64 / CURVE_SAMPLES as f64))
                    .collect();
                point_to_polyline_dist(point, &samples)
            }
            LinePath::Orthogonal(points) => point_to_polyline_dist(point, points),
        }
    }

    /// Bounds of everything the path touches, including elbows.
    pub fn bounds(&self) -> Rect {
        match self {
            LinePath::Straight { start, end } => Rect::from_points(*start, *end),
            LinePath::Curved {
                start,
                control,
                end,
            } => ParamCurveExtrema::bounding_box(&QuadBez::new(*start, *control, *end)),
            LinePath::Orthogonal(points) => points[1..]
                .iter()
                .fold(Rect::from_points(points[0], points[0]), |r, p| r.union_pt(*p)),
        }
    }
}

fn non_zero(preferred: Vec2, fallback: Vec2) -> Vec2 {
    if preferred.hypot2() > f64::EPSILON {
        preferred
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_right_to_left_scenario() {
        let route = orthogonal_route(Point::new(100.0, 50.0), Point::new(300.0, 50.0), Some(Side::Right));
        assert_eq!(route[0], Point::new(100.0, 50.0));
        assert_eq!(route[3], Point::new(300.0, 50.0));
        let mid = route[1].x;
        assert!(mid > 100.0 && mid < 300.0);
        assert!((route[1].y - 50.0).abs() < f64::EPSILON);
        assert_eq!(route[1].x, route[2].x);
        assert!((route[2].y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_route_is_deterministic() {
        let a = orthogonal_route(Point::new(3.0, 7.0), Point::new(-40.0, 90.0), Some(Side::Bottom));
        let b = orthogonal_route(Point::new(3.0, 7.0), Point::new(-40.0, 90.0), Some(Side::Bottom));
        assert_eq!(a, b);
    }

    #[test]
    fn test_clearance_when_target_behind_start() {
        // Exits right but the target is to the left: the turn still clears the side.
        let route = orthogonal_route(Point::new(100.0, 0.0), Point::new(50.0, 100.0), Some(Side::Right));
        assert!((route[1].x - (100.0 + ORTHOGONAL_CLEARANCE)).abs() < f64::EPSILON);

        let route = orthogonal_route(Point::new(0.0, 100.0), Point::new(50.0, 150.0), Some(Side::Top));
        assert!((route[1].y - (100.0 - ORTHOGONAL_CLEARANCE)).abs() < f64::EPSILON);
        assert_eq!(route[1].x, 0.0);
        assert_eq!(route[2].x, 50.0);
    }

    #[test]
    fn test_default_elbow_without_side() {
        let route = orthogonal_route(Point::new(0.0, 0.0), Point::new(100.0, 60.0), None);
        assert_eq!(route[1], Point::new(50.0, 0.0));
        assert_eq!(route[2], Point::new(50.0, 60.0));
    }

    #[test]
    fn test_quadratic_control_and_midpoint() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let control = quadratic_control(start, end, 0.5);
        assert!((control.x - 50.0).abs() < 1e-9);
        assert!((control.y - 50.0).abs() < 1e-9);
        let mid = quadratic_midpoint(start, control, end);
        assert!((mid.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_orthogonal_tangent_skips_degenerate_segment() {
        let path = LinePath::Orthogonal(orthogonal_route(
            Point::new(100.0, 50.0),
            Point::new(300.0, 50.0),
            Some(Side::Right),
        ));
        assert!(path.end_angle().abs() < 1e-9);
        assert!((path.start_angle().abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_elbow_end_tangent_uses_last_segment() {
        let path = LinePath::Orthogonal(orthogonal_route(
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Some(Side::Top),
        ));
        // Last segment runs down from the turn to the end.
        assert!((path.end_angle() - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_label_anchor_offset() {
        let path = LinePath::Straight {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
        };
        let anchor = path.label_anchor(10.0);
        assert!((anchor.x - 50.0).abs() < 1e-9);
        assert!((anchor.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_curved_bounds_cover_the_whole_curve() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 100.0);
        let control = quadratic_control(start, end, 1.5);
        let quad = QuadBez::new(start, control, end);
        let bounds = LinePath::Curved {
            start,
            control,
            end,
        }
        .bounds();
        for i in 0..=100 {
            let p = quad.eval(i as f64 / 100.0);
            assert!(bounds.inflate(1e-9, 1e-9).contains(p), "{p:?} outside {bounds:?}");
        }
    }

    #[test]
    fn test_distance_to_curve() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let path = LinePath::Curved {
            start,
            control: quadratic_control(start, end, 0.5),
            end,
        };
        assert!(path.distance_to(Point::new(50.0, 25.0)) < 1.0);
        assert!(path.distance_to(Point::new(50.0, -20.0)) > 10.0);
    }
}
