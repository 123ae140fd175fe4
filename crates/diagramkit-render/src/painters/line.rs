use super::style_stroke;
use crate::context::{DrawContext, FontSpec};
use diagramkit_core::elements::{ArrowHead, Element, LineElement};
use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, Shape, Stroke};
use peniko::Color;

const LABEL_PADDING_X: f64 = 6.0;
const LABEL_PADDING_Y: f64 = 2.0;

/// Arrow head length for a given stroke width.
pub fn arrow_size(stroke_width: f64) -> f64 {
    8.0 + stroke_width * 2.0
}

/// Arrow head outline with its tip at the origin, pointing along +x.
/// Returns the path and whether it is filled (open arrows are stroked).
pub fn arrow_head_path(kind: ArrowHead, size: f64) -> Option<(BezPath, bool)> {
    let half = size / 2.0;
    let path = match kind {
        ArrowHead::None => return None,
        ArrowHead::Arrow => {
            let mut p = BezPath::new();
            p.move_to((0.0, 0.0));
            p.line_to((-size, -half));
            p.line_to((-size, half));
            p.close_path();
            (p, true)
        }
        ArrowHead::OpenArrow => {
            let mut p = BezPath::new();
            p.move_to((-size, -half));
            p.line_to((0.0, 0.0));
            p.line_to((-size, half));
            (p, false)
        }
        ArrowHead::Diamond => {
            let mut p = BezPath::new();
            p.move_to((0.0, 0.0));
            p.line_to((-half, -size / 3.0));
            p.line_to((-size, 0.0));
            p.line_to((-half, size / 3.0));
            p.close_path();
            (p, true)
        }
        ArrowHead::Circle => (Circle::new((-half, 0.0), half).to_path(0.1), true),
    };
    Some(path)
}

/// Draw an arrow head at `tip`, facing `angle`, in a local rotated frame.
fn paint_arrow_head(
    ctx: &mut dyn DrawContext,
    kind: ArrowHead,
    tip: Point,
    angle: f64,
    line: &LineElement,
) {
    let size = arrow_size(line.style.stroke_width);
    let Some((path, filled)) = arrow_head_path(kind, size) else {
        return;
    };
    let color = line.style.stroke_color();
    ctx.save();
    ctx.transform(Affine::translate(tip.to_vec2()) * Affine::rotate(angle));
    if filled {
        ctx.fill_path(&path, color);
    } else {
        ctx.stroke_path(&path, &Stroke::new(line.style.stroke_width), color);
    }
    ctx.restore();
}

/// Pill-shaped label background centered on `anchor`.
pub(crate) fn label_pill(width: f64, height: f64, anchor: Point) -> RoundedRect {
    let w = width + LABEL_PADDING_X * 2.0;
    let h = height + LABEL_PADDING_Y * 2.0;
    Rect::from_center_size(anchor, (w, h)).to_rounded_rect(h / 2.0)
}

/// Path, arrow heads, then the optional label.
pub fn paint_line(ctx: &mut dyn DrawContext, element: &Element, line: &LineElement) {
    let Some(path) = element.line_path() else {
        return;
    };
    ctx.stroke_path(
        &path.to_bez_path(),
        &style_stroke(&line.style),
        line.style.stroke_color(),
    );
    paint_arrow_head(ctx, line.arrow_head, path.end(), path.end_angle(), line);
    paint_arrow_head(ctx, line.arrow_tail, path.start(), path.start_angle(), line);

    let Some(label) = line.label.as_deref().filter(|l| !l.is_empty()) else {
        return;
    };
    let font = FontSpec::from_style(&line.label_style);
    let anchor = path.label_anchor(line.label_offset);
    let width = ctx.measure_text(label, &font);
    let pill = label_pill(width, font.line_height(), anchor);
    let pill_path = pill.to_path(0.1);
    ctx.fill_path(&pill_path, Color::WHITE);
    ctx.stroke_path(&pill_path, &Stroke::new(1.0), Color::from_rgba8(203, 213, 225, 255));
    ctx.fill_text(
        label,
        Point::new(anchor.x - width / 2.0, anchor.y - font.line_height() / 2.0),
        &font,
        line.label_style.color.to_color_with_alpha(line.style.opacity),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingContext};
    use diagramkit_core::elements::{ElementKind, LineRouting};
    use std::f64::consts::FRAC_PI_2;

    fn line_element(line: LineElement, x: f64, y: f64) -> Element {
        Element::new(ElementKind::Line(line), x, y)
    }

    fn paint(el: &Element) -> RecordingContext {
        let mut ctx = RecordingContext::new(100, 100);
        let ElementKind::Line(line) = &el.kind else {
            unreachable!()
        };
        paint_line(&mut ctx, el, line);
        ctx
    }

    fn head_transforms(ctx: &RecordingContext) -> Vec<Affine> {
        ctx.commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath { .. }))
            .map(|c| c.transform())
            .collect()
    }

    #[test]
    fn test_arrow_head_at_end() {
        let el = line_element(LineElement::new(100.0, 0.0), 0.0, 0.0);
        let ctx = paint(&el);
        let heads = head_transforms(&ctx);
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0], Affine::translate((100.0, 0.0)) * Affine::rotate(0.0));
    }

    #[test]
    fn test_orthogonal_head_follows_last_segment() {
        let mut line = LineElement::new(100.0, 100.0);
        line.routing = LineRouting::Orthogonal;
        line.arrow_tail = ArrowHead::Diamond;
        let el = line_element(line, 0.0, 0.0);
        let ctx = paint(&el);
        let heads = head_transforms(&ctx);
        assert_eq!(heads.len(), 2);

        // Horizontal-midpoint elbow: the last and first segments are horizontal.
        let end = heads[0] * Point::new(-1.0, 0.0);
        assert!((end.x - 99.0).abs() < 1e-9 && (end.y - 100.0).abs() < 1e-9);
        let start = heads[1] * Point::new(-1.0, 0.0);
        assert!((start.x - 1.0).abs() < 1e-9 && start.y.abs() < 1e-9);
    }

    #[test]
    fn test_curved_head_uses_tangent() {
        let mut line = LineElement::new(100.0, 0.0);
        line.curvature = 0.5;
        let el = line_element(line, 0.0, 0.0);
        let path = el.line_path().unwrap();
        let angle = path.end_angle();
        assert!(angle.abs() > 0.1 && angle.abs() < FRAC_PI_2);

        let ctx = paint(&el);
        let head = head_transforms(&ctx)[0];
        assert_eq!(head, Affine::translate((100.0, 0.0)) * Affine::rotate(angle));
    }

    #[test]
    fn test_open_arrow_is_stroked() {
        let mut line = LineElement::new(50.0, 0.0);
        line.arrow_head = ArrowHead::OpenArrow;
        let ctx = paint(&line_element(line, 0.0, 0.0));
        assert!(head_transforms(&ctx).is_empty());
        let strokes = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokePath { .. }))
            .count();
        assert_eq!(strokes, 2);
    }

    #[test]
    fn test_label_pill_at_midpoint() {
        let mut line = LineElement::new(200.0, 0.0);
        line.arrow_head = ArrowHead::None;
        line.label = Some("yes".into());
        let ctx = paint(&line_element(line, 0.0, 0.0));
        assert_eq!(ctx.texts(), vec!["yes"]);

        let pill = ctx
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillPath { path, .. } => Some(path.bounding_box()),
                _ => None,
            })
            .unwrap();
        assert!((pill.center().x - 100.0).abs() < 1e-6);
        assert!(pill.center().y.abs() < 1e-6);
    }
}
