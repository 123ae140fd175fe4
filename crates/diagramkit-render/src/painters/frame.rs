use crate::context::{DrawContext, FontSpec};
use diagramkit_core::elements::{Element, FrameElement};
use diagramkit_core::hit::FRAME_LABEL_HEIGHT;
use kurbo::{Point, Shape, Stroke};

pub const FRAME_STROKE_WIDTH: f64 = 1.5;

/// Optional fill, dashed border, and the name in a strip above the frame.
pub fn paint_frame(ctx: &mut dyn DrawContext, element: &Element, frame: &FrameElement) {
    let rect = element.rect();
    let outline = rect.to_path(0.1);
    if let Some(fill) = frame.fill {
        ctx.fill_path(&outline, fill.into());
    }
    let dashes = frame.stroke_style.dash_pattern(FRAME_STROKE_WIDTH);
    let mut stroke = Stroke::new(FRAME_STROKE_WIDTH);
    if !dashes.is_empty() {
        stroke = stroke.with_dashes(0.0, dashes);
    }
    ctx.stroke_path(&outline, &stroke, frame.stroke.into());

    if frame.name.is_empty() {
        return;
    }
    let font = FontSpec::from_style(&frame.label_style);
    let y = rect.y0 - FRAME_LABEL_HEIGHT + (FRAME_LABEL_HEIGHT - font.line_height()) / 2.0;
    ctx.fill_text(
        &frame.name,
        Point::new(rect.x0, y),
        &font,
        frame.label_style.color.into(),
    );
}
