//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// The view transform of the canvas.
///
/// Screen = `translate(pan) * scale(zoom) * world`, so `pan` is in screen
/// pixels and is applied after zooming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset in screen pixels.
    pub pan: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen to world.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom level, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Keep world_point under the cursor.
        let new_screen = self.world_to_screen(world_point);
        self.pan += screen_point - new_screen;
    }

    /// World-space rectangle visible in a viewport of the given CSS size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(viewport.width, viewport.height));
        Rect::from_points(top_left, bottom_right)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(MIN_ZOOM, MAX_ZOOM);

        let bounds_center = bounds.center();
        self.pan = Vec2::new(
            viewport.width / 2.0 - bounds_center.x * self.zoom,
            viewport.height / 2.0 - bounds_center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.pan, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_pan_and_zoom() {
        let camera = Camera {
            pan: Vec2::new(50.0, 100.0),
            zoom: 2.0,
        };
        let world = camera.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let camera = Camera {
            pan: Vec2::new(30.0, -20.0),
            zoom: 1.5,
        };
        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        camera.set_zoom(1000.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera::new();
        let anchor = Point::new(200.0, 100.0);
        let before = camera.screen_to_world(anchor);
        camera.zoom_at(anchor, 2.0);
        let after = camera.screen_to_world(anchor);
        assert!((before - after).hypot() < 1e-9);
    }

    #[test]
    fn test_visible_world_rect() {
        let camera = Camera {
            pan: Vec2::new(-100.0, 0.0),
            zoom: 2.0,
        };
        let rect = camera.visible_world_rect(Size::new(800.0, 600.0));
        assert!((rect.x0 - 50.0).abs() < 1e-9);
        assert!((rect.width() - 400.0).abs() < 1e-9);
        assert!((rect.height() - 300.0).abs() < 1e-9);
    }
}
