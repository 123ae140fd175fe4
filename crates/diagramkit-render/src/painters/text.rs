use crate::context::{DrawContext, FontSpec};
use diagramkit_core::elements::{Element, TextAlign, TextElement, TextStyle};
use kurbo::{Point, Rect, Shape};
use peniko::Color;

/// Inset between a text box edge and its text.
pub const TEXT_PADDING: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
}

/// Lay out `lines` inside `rect` and draw them one `fill_text` call per line.
pub fn paint_text_lines(
    ctx: &mut dyn DrawContext,
    lines: &[&str],
    rect: Rect,
    style: &TextStyle,
    color: Color,
    valign: VerticalAlign,
) {
    if lines.iter().all(|l| l.is_empty()) {
        return;
    }
    let font = FontSpec::from_style(style);
    let line_height = style.line_height();
    let total = line_height * lines.len() as f64;
    let mut y = match valign {
        VerticalAlign::Top => rect.y0 + TEXT_PADDING,
        VerticalAlign::Middle => rect.center().y - total / 2.0,
    };
    for line in lines {
        if !line.is_empty() {
            let width = ctx.measure_text(line, &font);
            let x = match style.align {
                TextAlign::Left => rect.x0 + TEXT_PADDING,
                TextAlign::Center => rect.center().x - width / 2.0,
                TextAlign::Right => rect.x1 - TEXT_PADDING - width,
            };
            ctx.fill_text(line, Point::new(x, y), &font, color);
        }
        y += line_height;
    }
}

pub fn paint_text(ctx: &mut dyn DrawContext, element: &Element, text: &TextElement) {
    let rect = element.rect();
    if let Some(background) = text.background {
        ctx.fill_path(&rect.to_path(0.1), background.into());
    }
    let lines: Vec<&str> = text.lines().collect();
    paint_text_lines(
        ctx,
        &lines,
        rect,
        &text.text_style,
        text.text_style.color.into(),
        VerticalAlign::Top,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingContext};
    use diagramkit_core::elements::ElementKind;

    fn origins(ctx: &RecordingContext) -> Vec<Point> {
        ctx.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { origin, .. } => Some(*origin),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_call_per_line() {
        let mut ctx = RecordingContext::new(100, 100);
        let el = Element::new(
            ElementKind::Text(TextElement::new(200.0, 80.0, "first\nsecond")),
            10.0,
            20.0,
        );
        let ElementKind::Text(text) = &el.kind else {
            unreachable!()
        };
        paint_text(&mut ctx, &el, text);

        assert_eq!(ctx.texts(), vec!["first", "second"]);
        let o = origins(&ctx);
        assert_eq!(o[0], Point::new(10.0 + TEXT_PADDING, 20.0 + TEXT_PADDING));
        let lh = text.text_style.line_height();
        assert!((o[1].y - o[0].y - lh).abs() < 1e-9);
    }

    #[test]
    fn test_centered_lines_share_center() {
        let mut ctx = RecordingContext::new(100, 100);
        let style = TextStyle {
            align: TextAlign::Center,
            ..TextStyle::default()
        };
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        paint_text_lines(
            &mut ctx,
            &["ab", "abcd"],
            rect,
            &style,
            Color::BLACK,
            VerticalAlign::Middle,
        );
        let font = FontSpec::from_style(&style);
        let o = origins(&ctx);
        let w0 = ctx.measure_text("ab", &font);
        let w1 = ctx.measure_text("abcd", &font);
        assert!((o[0].x + w0 / 2.0 - 100.0).abs() < 1e-9);
        assert!((o[1].x + w1 / 2.0 - 100.0).abs() < 1e-9);
        assert!((o[0].y - (50.0 - style.line_height())).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut ctx = RecordingContext::new(100, 100);
        paint_text_lines(
            &mut ctx,
            &[""],
            Rect::new(0.0, 0.0, 10.0, 10.0),
            &TextStyle::default(),
            Color::BLACK,
            VerticalAlign::Top,
        );
        assert!(ctx.commands().is_empty());
    }
}
