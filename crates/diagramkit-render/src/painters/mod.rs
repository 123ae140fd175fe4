//! Per-kind element paint routines.
//!
//! Painters draw in world coordinates; the caller sets up the camera
//! transform. They are shared by the live canvas and the off-screen
//! exporters.

mod frame;
mod image;
mod line;
mod path;
mod shape;
mod text;

pub use frame::{FRAME_STROKE_WIDTH, paint_frame};
pub use image::{ImageCache, decode_image, paint_image};
pub use line::{arrow_head_path, arrow_size, paint_line};
pub use path::paint_path;
pub use shape::paint_shape;
pub use text::{TEXT_PADDING, VerticalAlign, paint_text, paint_text_lines};

use crate::context::DrawContext;
use diagramkit_core::elements::{Element, ElementKind, ElementStyle};
use kurbo::{Affine, Circle, Point, Rect, Shape, Stroke};
use peniko::Color;

/// Radius of the marker drawn on elements linked to an external record.
pub const PLM_BADGE_RADIUS: f64 = 6.0;

fn plm_badge_color() -> Color {
    Color::from_rgba8(99, 102, 241, 255)
}

/// Outline stroke for a styled element.
pub(crate) fn style_stroke(style: &ElementStyle) -> Stroke {
    let dashes = style.dash_pattern();
    let stroke = Stroke::new(style.stroke_width);
    if dashes.is_empty() {
        stroke
    } else {
        stroke.with_dashes(0.0, dashes)
    }
}

/// Paint any element. Rotation is applied about the element center; groups
/// paint nothing of their own.
pub fn paint_element(ctx: &mut dyn DrawContext, element: &Element, images: &mut ImageCache) {
    let rotation = element.effective_rotation();
    ctx.save();
    if rotation.abs() > f64::EPSILON {
        ctx.transform(Affine::rotate_about(rotation, element.center()));
    }
    match &element.kind {
        ElementKind::Shape(shape) => paint_shape(ctx, element, shape),
        ElementKind::Text(text) => paint_text(ctx, element, text),
        ElementKind::Line(line) => paint_line(ctx, element, line),
        ElementKind::Path(path) => paint_path(ctx, element, path),
        ElementKind::Image(image) => paint_image(ctx, element, image, images),
        ElementKind::Frame(frame) => paint_frame(ctx, element, frame),
        ElementKind::Group(_) => {}
    }
    ctx.restore();

    if element.plm_node_id.is_some() && !element.is_group() {
        paint_plm_badge(ctx, element.bounds());
    }
}

/// Small filled marker at the top-right corner of `bounds`.
pub fn paint_plm_badge(ctx: &mut dyn DrawContext, bounds: Rect) {
    let center = Point::new(bounds.x1, bounds.y0);
    let outer = Circle::new(center, PLM_BADGE_RADIUS).to_path(0.1);
    ctx.fill_path(&outer, plm_badge_color());
    ctx.stroke_path(&outer, &Stroke::new(1.5), Color::WHITE);
    let inner = Circle::new(center, PLM_BADGE_RADIUS * 0.35).to_path(0.1);
    ctx.fill_path(&inner, Color::WHITE);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingContext};
    use diagramkit_core::elements::{GroupElement, ShapeElement, ShapeVariant, StrokeStyle};

    pub(crate) fn shape_element(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, w, h)),
            x,
            y,
        )
    }

    #[test]
    fn test_rotation_wraps_element() {
        let mut ctx = RecordingContext::new(100, 100);
        let mut el = shape_element(0.0, 0.0, 100.0, 50.0);
        el.rotation = 0.5;
        paint_element(&mut ctx, &el, &mut ImageCache::new());

        let expected = Affine::rotate_about(0.5, Point::new(50.0, 25.0));
        assert!(!ctx.commands().is_empty());
        for cmd in ctx.commands() {
            assert_eq!(cmd.transform(), expected);
        }
        assert_eq!(ctx.save_depth(), 0);
    }

    #[test]
    fn test_group_paints_nothing() {
        let mut ctx = RecordingContext::new(100, 100);
        let group = Element::new(ElementKind::Group(GroupElement::new(Vec::new())), 0.0, 0.0);
        paint_element(&mut ctx, &group, &mut ImageCache::new());
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn test_plm_badge_is_drawn() {
        let mut ctx = RecordingContext::new(100, 100);
        let mut el = shape_element(0.0, 0.0, 40.0, 40.0);
        paint_element(&mut ctx, &el, &mut ImageCache::new());
        let plain = ctx.take_commands().len();

        el.plm_node_id = Some("node-7".into());
        paint_element(&mut ctx, &el, &mut ImageCache::new());
        assert_eq!(ctx.commands().len(), plain + 3);
    }

    #[test]
    fn test_dashed_style_stroke() {
        let style = ElementStyle {
            stroke_style: StrokeStyle::Dashed,
            stroke_width: 2.0,
            ..ElementStyle::default()
        };
        let stroke = style_stroke(&style);
        assert_eq!(stroke.dash_pattern.as_slice(), &[8.0, 6.0]);

        let mut ctx = RecordingContext::new(10, 10);
        let mut el = shape_element(0.0, 0.0, 10.0, 10.0);
        if let ElementKind::Shape(shape) = &mut el.kind {
            shape.style = style;
        }
        paint_element(&mut ctx, &el, &mut ImageCache::new());
        assert!(ctx.commands().iter().any(|c| matches!(
            c,
            DrawCommand::StrokePath { stroke, .. } if !stroke.dash_pattern.is_empty()
        )));
    }
}
