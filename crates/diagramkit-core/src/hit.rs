//! Hit-testing world points against elements.

use crate::elements::{Element, ElementId, ElementKind};
use crate::geometry::{self, rotate_point};
use crate::store::ElementStore;
use kurbo::{Point, Rect};

/// Height of the clickable name strip drawn above a frame.
pub const FRAME_LABEL_HEIGHT: f64 = 20.0;

/// Topmost element under `point`, walking the z-order front to back.
///
/// Elements on hidden or locked layers, invisible elements and groups are
/// skipped. Locked elements are still returned so they keep occluding what
/// lies beneath them; callers decide whether to act on them.
pub fn hit_test(store: &ElementStore, point: Point, tolerance: f64) -> Option<ElementId> {
    store
        .element_order()
        .iter()
        .rev()
        .filter_map(|id| store.element(*id))
        .filter(|el| {
            !el.is_group()
                && store.is_displayed(el.id)
                && store.layer_is_interactive(&el.layer_id)
        })
        .find(|el| hits_element(el, point, tolerance))
        .map(|el| el.id)
}

/// Whether `point` lies on `element`, allowing `tolerance` world units of
/// slack for thin strokes. Rotated elements are tested in their own frame.
pub fn hits_element(element: &Element, point: Point, tolerance: f64) -> bool {
    let rect = element.rect();
    let rotation = element.effective_rotation();
    let local = if rotation.abs() > f64::EPSILON {
        rotate_point(point, rect.center(), -rotation)
    } else {
        point
    };

    match &element.kind {
        ElementKind::Shape(shape) => {
            geometry::point_in_shape(shape.shape_variant, rect.inflate(tolerance, tolerance), local)
        }
        ElementKind::Text(_) | ElementKind::Image(_) => {
            rect.inflate(tolerance, tolerance).contains(local)
        }
        ElementKind::Line(line) => element.line_path().is_some_and(|path| {
            path.distance_to(point) <= tolerance + line.style.stroke_width / 2.0
        }),
        ElementKind::Path(path) => {
            let mut points = path.absolute_points(element.origin());
            if path.closed {
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
            }
            geometry::point_to_polyline_dist(point, &points)
                <= tolerance + path.style.stroke_width / 2.0
        }
        ElementKind::Frame(_) => hits_frame(rect, point, tolerance),
        ElementKind::Group(_) => false,
    }
}

/// Frames are hit on their border or name strip, never their interior, so
/// that members stay clickable.
fn hits_frame(rect: Rect, point: Point, tolerance: f64) -> bool {
    let label = Rect::new(rect.x0, rect.y0 - FRAME_LABEL_HEIGHT, rect.x1, rect.y0);
    if label.contains(point) {
        return true;
    }
    let outer = rect.inflate(tolerance, tolerance);
    let inner = rect.inflate(-tolerance, -tolerance);
    outer.contains(point) && !(inner.width() > 0.0 && inner.height() > 0.0 && inner.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{
        ElementPatch, FrameElement, LineElement, ShapeElement, ShapeVariant,
    };
    use std::f64::consts::FRAC_PI_4;

    fn rect_shape(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, w, h)),
            x,
            y,
        )
    }

    #[test]
    fn test_topmost_wins() {
        let mut store = ElementStore::new();
        store.add_element(rect_shape(0.0, 0.0, 100.0, 100.0));
        let top = store.add_element(rect_shape(50.0, 50.0, 100.0, 100.0));
        assert_eq!(hit_test(&store, Point::new(75.0, 75.0), 0.0), Some(top));
    }

    #[test]
    fn test_hidden_and_locked_layers_skipped() {
        let mut store = ElementStore::new();
        let bottom = store.add_element(rect_shape(0.0, 0.0, 100.0, 100.0));
        let layer = store.add_layer("Top");
        let mut el = rect_shape(0.0, 0.0, 100.0, 100.0);
        el.layer_id = layer.clone();
        let top = store.add_element(el);

        assert_eq!(hit_test(&store, Point::new(10.0, 10.0), 0.0), Some(top));
        store.set_layer_locked(&layer, true);
        assert_eq!(hit_test(&store, Point::new(10.0, 10.0), 0.0), Some(bottom));
        store.set_layer_locked(&layer, false);
        store.set_layer_visible(&layer, false);
        assert_eq!(hit_test(&store, Point::new(10.0, 10.0), 0.0), Some(bottom));
    }

    #[test]
    fn test_rotated_shape_uses_local_frame() {
        let mut el = rect_shape(0.0, 40.0, 100.0, 20.0);
        // Unrotated, (50, 10) is above the bar.
        assert!(!hits_element(&el, Point::new(50.0, 10.0), 0.0));
        ElementPatch {
            rotation: Some(std::f64::consts::FRAC_PI_2),
            ..Default::default()
        }
        .apply(&mut el);
        assert!(hits_element(&el, Point::new(50.0, 10.0), 0.0));
        assert!(!hits_element(&el, Point::new(5.0, 50.0), 0.0));
    }

    #[test]
    fn test_ellipse_corner_misses() {
        let el = Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Ellipse, 100.0, 100.0)),
            0.0,
            0.0,
        );
        assert!(hits_element(&el, Point::new(50.0, 50.0), 0.0));
        assert!(!hits_element(&el, Point::new(3.0, 3.0), 0.0));
        let mut rotated = el.clone();
        rotated.rotation = FRAC_PI_4;
        assert!(hits_element(&rotated, Point::new(50.0, 50.0), 0.0));
    }

    #[test]
    fn test_line_tolerance() {
        let el = Element::new(ElementKind::Line(LineElement::new(100.0, 0.0)), 0.0, 0.0);
        assert!(hits_element(&el, Point::new(50.0, 3.0), 4.0));
        assert!(!hits_element(&el, Point::new(50.0, 10.0), 4.0));
    }

    #[test]
    fn test_frame_interior_is_transparent() {
        let frame = Element::new(ElementKind::Frame(FrameElement::new(200.0, 200.0, "F")), 0.0, 0.0);
        assert!(!hits_element(&frame, Point::new(100.0, 100.0), 4.0));
        assert!(hits_element(&frame, Point::new(1.0, 100.0), 4.0));
        assert!(hits_element(&frame, Point::new(50.0, -10.0), 4.0));
    }
}
