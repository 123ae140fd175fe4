use super::style_stroke;
use crate::context::DrawContext;
use diagramkit_core::elements::{Element, PathElement};
use kurbo::{BezPath, Cap, Join};

/// Freehand stroke through the recorded points. Closed paths may be filled.
pub fn paint_path(ctx: &mut dyn DrawContext, element: &Element, path: &PathElement) {
    let points = path.absolute_points(element.origin());
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let mut bez = BezPath::new();
    bez.move_to(*first);
    for p in rest {
        bez.line_to(*p);
    }
    if path.closed {
        bez.close_path();
        if let Some(fill) = path.style.fill_color() {
            ctx.fill_path(&bez, fill);
        }
    }
    let stroke = style_stroke(&path.style)
        .with_caps(Cap::Round)
        .with_join(Join::Round);
    ctx.stroke_path(&bez, &stroke, path.style.stroke_color());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingContext};
    use diagramkit_core::elements::{ElementKind, ElementStyle};
    use kurbo::{PathEl, Point};

    #[test]
    fn test_points_are_offset_by_origin() {
        let (origin, path) = PathElement::from_absolute(
            &[Point::new(10.0, 10.0), Point::new(30.0, 20.0)],
            ElementStyle::default(),
        );
        let el = Element::new(ElementKind::Path(path), origin.x, origin.y);
        let ElementKind::Path(path) = &el.kind else {
            unreachable!()
        };
        let mut ctx = RecordingContext::new(100, 100);
        paint_path(&mut ctx, &el, path);

        // Open paths are never filled.
        assert_eq!(ctx.commands().len(), 1);
        let DrawCommand::StrokePath { path, .. } = &ctx.commands()[0] else {
            panic!("expected a stroke");
        };
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(10.0, 10.0)),
                PathEl::LineTo(Point::new(30.0, 20.0)),
            ]
        );
    }
}
