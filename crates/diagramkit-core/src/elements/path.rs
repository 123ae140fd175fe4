//! Freehand paths.

use super::ElementStyle;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke. Points are relative to the element's `x, y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathElement {
    pub points: Vec<Point>,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default)]
    pub closed: bool,
}

impl PathElement {
    /// Build a path from absolute points, returning the origin it is relative to.
    pub fn from_absolute(points: &[Point], style: ElementStyle) -> (Point, Self) {
        let origin = points
            .iter()
            .fold(Point::new(f64::INFINITY, f64::INFINITY), |acc, p| {
                Point::new(acc.x.min(p.x), acc.y.min(p.y))
            });
        let origin = if origin.x.is_finite() { origin } else { Point::ZERO };
        let points = points.iter().map(|p| (*p - origin).to_point()).collect();
        (
            origin,
            Self {
                points,
                style,
                closed: false,
            },
        )
    }

    /// Points translated to world space.
    pub fn absolute_points(&self, origin: Point) -> Vec<Point> {
        let offset = origin.to_vec2();
        self.points.iter().map(|p| *p + offset).collect()
    }

    /// Bounds of the relative points (zero rect when empty).
    pub fn local_bounds(&self) -> Rect {
        match self.points.split_first() {
            Some((first, rest)) => rest
                .iter()
                .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
            None => Rect::ZERO,
        }
    }

    /// Scale the points so their bounds match `size`.
    pub fn fit_to(&mut self, width: f64, height: f64) {
        let bounds = self.local_bounds();
        let sx = if bounds.width() > f64::EPSILON { width / bounds.width() } else { 1.0 };
        let sy = if bounds.height() > f64::EPSILON { height / bounds.height() } else { 1.0 };
        let shift = Vec2::new(bounds.x0, bounds.y0);
        for p in &mut self.points {
            let local = *p - shift;
            *p = Point::new(local.x * sx, local.y * sy);
        }
    }
}
