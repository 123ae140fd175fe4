use super::style_stroke;
use super::text::{VerticalAlign, paint_text_lines};
use crate::context::DrawContext;
use diagramkit_core::elements::{Element, ShapeElement};
use diagramkit_core::geometry::shape_outline;

/// Fill, outline, then any inline label centered in the box.
pub fn paint_shape(ctx: &mut dyn DrawContext, element: &Element, shape: &ShapeElement) {
    let rect = element.rect();
    let outline = shape_outline(shape.shape_variant, rect);
    if let Some(fill) = shape.style.fill_color() {
        ctx.fill_path(&outline, fill);
    }
    ctx.stroke_path(&outline, &style_stroke(&shape.style), shape.style.stroke_color());

    if let Some(text) = shape.text.as_deref().filter(|t| !t.is_empty()) {
        let lines: Vec<&str> = text.split('\n').collect();
        let color = shape
            .text_style
            .color
            .to_color_with_alpha(shape.style.opacity);
        paint_text_lines(ctx, &lines, rect, &shape.text_style, color, VerticalAlign::Middle);
    }
}
