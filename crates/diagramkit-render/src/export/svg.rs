//! SVG export. Each element kind re-derives its own markup; arrow heads are
//! `<marker>`s defined once per distinct head and referenced by lines.

use super::{ExportError, ExportScope, collect_elements, content_bounds};
use crate::painters::{FRAME_STROKE_WIDTH, TEXT_PADDING, arrow_head_path, arrow_size};
use crate::renderer::RendererConfig;
use ::svg::Document;
use ::svg::node::element::{Definitions, Group, Image, Marker, Path, Rectangle, TSpan, Text};
use diagramkit_core::ElementStore;
use diagramkit_core::elements::{
    ArrowHead, Element, ElementKind, ElementStyle, FontWeight, FrameElement, ImageElement,
    LineElement, PathElement, SerializableColor, ShapeElement, TextAlign, TextElement, TextStyle,
};
use diagramkit_core::geometry::shape_outline;
use diagramkit_core::hit::FRAME_LABEL_HEIGHT;
use kurbo::{BezPath, Rect, Shape, Vec2};
use std::collections::BTreeMap;

/// `#rrggbb` plus a separate opacity, which SVG 1.1 viewers understand.
fn paint(color: SerializableColor) -> (String, f64) {
    (
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b),
        color.a as f64 / 255.0,
    )
}

fn dash_array(pattern: &[f64]) -> Option<String> {
    if pattern.is_empty() {
        return None;
    }
    Some(
        pattern
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn styled_path(d: String, style: &ElementStyle, fill: bool) -> Path {
    let (stroke, stroke_opacity) = paint(style.stroke);
    let mut path = Path::new()
        .set("d", d)
        .set("stroke", stroke)
        .set("stroke-opacity", stroke_opacity)
        .set("stroke-width", style.stroke_width);
    match style.fill.filter(|_| fill) {
        Some(color) => {
            let (fill, opacity) = paint(color);
            path = path
                .set("fill", fill)
                .set("fill-opacity", opacity * style.fill_opacity);
        }
        None => path = path.set("fill", "none"),
    }
    if let Some(dashes) = dash_array(&style.dash_pattern()) {
        path = path.set("stroke-dasharray", dashes);
    }
    if style.opacity < 1.0 {
        path = path.set("opacity", style.opacity);
    }
    path
}

/// `<text>` with one `<tspan>` per line, laid out like the canvas text
/// painter: lines stacked at `line_height`, aligned inside `rect`.
fn text_block(lines: &[&str], rect: Rect, style: &TextStyle, middle: bool) -> Option<Text> {
    if lines.iter().all(|l| l.is_empty()) {
        return None;
    }
    let line_height = style.line_height();
    let total = line_height * lines.len() as f64;
    let top = if middle {
        rect.center().y - total / 2.0
    } else {
        rect.y0 + TEXT_PADDING
    };
    let (x, anchor) = match style.align {
        TextAlign::Left => (rect.x0 + TEXT_PADDING, "start"),
        TextAlign::Center => (rect.center().x, "middle"),
        TextAlign::Right => (rect.x1 - TEXT_PADDING, "end"),
    };
    let (fill, opacity) = paint(style.color);
    let mut text = Text::new("")
        .set("font-family", style.font_family.as_str())
        .set("font-size", style.font_size)
        .set("fill", fill)
        .set("fill-opacity", opacity)
        .set("text-anchor", anchor)
        .set("dominant-baseline", "middle");
    if style.font_weight == FontWeight::Bold {
        text = text.set("font-weight", "bold");
    }
    if style.italic {
        text = text.set("font-style", "italic");
    }
    for (i, line) in lines.iter().enumerate() {
        let y = top + line_height * (i as f64 + 0.5);
        text = text.add(TSpan::new(*line).set("x", x).set("y", y));
    }
    Some(text)
}

/// Marker ids keyed by head kind, color and size, so identical heads share
/// one definition.
#[derive(Default)]
struct Markers {
    defs: BTreeMap<String, Marker>,
}

impl Markers {
    fn reference(&mut self, kind: ArrowHead, line: &LineElement) -> Option<String> {
        let size = arrow_size(line.style.stroke_width);
        let (path, filled) = arrow_head_path(kind, size)?;
        let (color, opacity) = paint(line.style.stroke);
        let id = format!(
            "arrow-{kind:?}-{}-{}",
            color.trim_start_matches('#'),
            (size * 10.0).round() as i64
        )
        .to_lowercase();
        self.defs.entry(id.clone()).or_insert_with(|| {
            let half = size / 2.0;
            let mut head = Path::new().set("d", path.to_svg());
            head = if filled {
                head.set("fill", color.as_str()).set("fill-opacity", opacity)
            } else {
                head.set("fill", "none")
                    .set("stroke", color.as_str())
                    .set("stroke-opacity", opacity)
                    .set("stroke-width", line.style.stroke_width)
            };
            Marker::new()
                .set("id", id.as_str())
                .set("viewBox", format!("{} {} {} {}", -size, -half, size, size))
                .set("refX", 0)
                .set("refY", 0)
                .set("markerWidth", size)
                .set("markerHeight", size)
                .set("markerUnits", "userSpaceOnUse")
                .set("orient", "auto-start-reverse")
                .set("overflow", "visible")
                .add(head)
        });
        Some(format!("url(#{id})"))
    }

    fn into_definitions(self) -> Definitions {
        self.defs
            .into_values()
            .fold(Definitions::new(), |defs, marker| defs.add(marker))
    }
}

fn shape_markup(element: &Element, shape: &ShapeElement) -> Group {
    let rect = element.rect();
    let outline = shape_outline(shape.shape_variant, rect);
    let mut group = Group::new().add(styled_path(outline.to_svg(), &shape.style, true));
    if let Some(content) = shape.text.as_deref() {
        let lines: Vec<&str> = content.split('\n').collect();
        if let Some(text) = text_block(&lines, rect, &shape.text_style, true) {
            group = group.add(text);
        }
    }
    group
}

fn text_markup(element: &Element, text: &TextElement) -> Group {
    let rect = element.rect();
    let mut group = Group::new();
    if let Some(background) = text.background {
        let (fill, opacity) = paint(background);
        group = group.add(
            Rectangle::new()
                .set("x", rect.x0)
                .set("y", rect.y0)
                .set("width", rect.width())
                .set("height", rect.height())
                .set("fill", fill)
                .set("fill-opacity", opacity),
        );
    }
    let lines: Vec<&str> = text.lines().collect();
    if let Some(block) = text_block(&lines, rect, &text.text_style, false) {
        group = group.add(block);
    }
    group
}

fn line_markup(element: &Element, line: &LineElement, markers: &mut Markers) -> Group {
    let mut group = Group::new();
    let Some(path) = element.line_path() else {
        return group;
    };
    let mut stroke = styled_path(path.to_bez_path().to_svg(), &line.style, false);
    if let Some(end) = markers.reference(line.arrow_head, line) {
        stroke = stroke.set("marker-end", end);
    }
    if let Some(start) = markers.reference(line.arrow_tail, line) {
        stroke = stroke.set("marker-start", start);
    }
    group = group.add(stroke);

    if let Some(label) = line.label.as_deref().filter(|l| !l.is_empty()) {
        let anchor = path.label_anchor(line.label_offset);
        let style = TextStyle {
            align: TextAlign::Center,
            ..line.label_style.clone()
        };
        let height = style.line_height();
        let width = label.chars().count() as f64 * style.font_size * 0.56;
        let pill = Rect::from_center_size(anchor, (width + 12.0, height + 4.0));
        group = group.add(
            Rectangle::new()
                .set("x", pill.x0)
                .set("y", pill.y0)
                .set("width", pill.width())
                .set("height", pill.height())
                .set("rx", pill.height() / 2.0)
                .set("fill", "#ffffff")
                .set("stroke", "#cbd5e1"),
        );
        if let Some(text) = text_block(&[label], pill, &style, true) {
            group = group.add(text);
        }
    }
    group
}

fn path_markup(element: &Element, path: &PathElement) -> Option<Path> {
    let points = path.absolute_points(element.origin());
    let (first, rest) = points.split_first()?;
    let mut bez = BezPath::new();
    bez.move_to(*first);
    for p in rest {
        bez.line_to(*p);
    }
    if path.closed {
        bez.close_path();
    }
    Some(
        styled_path(bez.to_svg(), &path.style, path.closed)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round"),
    )
}

fn image_markup(element: &Element, image: &ImageElement) -> Image {
    let rect = element.rect();
    let href = if image.src.starts_with("data:") {
        image.src.clone()
    } else {
        format!("data:image/png;base64,{}", image.src)
    };
    let mut markup = Image::new()
        .set("x", rect.x0)
        .set("y", rect.y0)
        .set("width", rect.width())
        .set("height", rect.height())
        .set("preserveAspectRatio", "none")
        .set("href", href);
    if image.opacity < 1.0 {
        markup = markup.set("opacity", image.opacity);
    }
    markup
}

fn frame_markup(element: &Element, frame: &FrameElement) -> Group {
    let rect = element.rect();
    let style = ElementStyle {
        fill: frame.fill,
        stroke: frame.stroke,
        stroke_width: FRAME_STROKE_WIDTH,
        stroke_style: frame.stroke_style,
        ..ElementStyle::default()
    };
    let mut group = Group::new().add(styled_path(rect.to_path(0.1).to_svg(), &style, true));
    if !frame.name.is_empty() {
        let strip = Rect::new(rect.x0, rect.y0 - FRAME_LABEL_HEIGHT, rect.x1, rect.y0);
        let label_style = TextStyle {
            align: TextAlign::Left,
            ..frame.label_style.clone()
        };
        // The canvas label starts flush with the frame edge.
        let strip = strip - Vec2::new(TEXT_PADDING, 0.0);
        if let Some(text) = text_block(&[frame.name.as_str()], strip, &label_style, true) {
            group = group.add(text);
        }
    }
    group
}

/// Markup for one element, rotated about its center when needed.
fn element_markup(element: &Element, markers: &mut Markers) -> Option<Group> {
    let group = match &element.kind {
        ElementKind::Shape(shape) => shape_markup(element, shape),
        ElementKind::Text(text) => text_markup(element, text),
        ElementKind::Line(line) => line_markup(element, line, markers),
        ElementKind::Path(path) => Group::new().add(path_markup(element, path)?),
        ElementKind::Image(image) => Group::new().add(image_markup(element, image)),
        ElementKind::Frame(frame) => frame_markup(element, frame),
        ElementKind::Group(_) => return None,
    };
    let mut group = group.set("data-id", element.id.to_string());
    let rotation = element.effective_rotation();
    if rotation.abs() > f64::EPSILON {
        let c = element.center();
        group = group.set(
            "transform",
            format!("rotate({} {} {})", rotation.to_degrees(), c.x, c.y),
        );
    }
    Some(group)
}

/// Render the elements in `scope` as a standalone SVG document.
pub fn export_svg(
    store: &ElementStore,
    scope: &ExportScope,
    config: &RendererConfig,
) -> Result<String, ExportError> {
    let elements = collect_elements(store, scope);
    let bounds = content_bounds(&elements)?;
    let padding = config.export_padding.max(0.0);
    let padded = bounds.inflate(padding, padding);
    log::info!(
        "Exporting SVG: {} elements, {}x{}",
        elements.len(),
        padded.width(),
        padded.height()
    );

    let mut markers = Markers::default();
    let body: Vec<Group> = elements
        .iter()
        .filter_map(|el| element_markup(el, &mut markers))
        .collect();

    let mut doc = Document::new()
        .set(
            "viewBox",
            format!("{} {} {} {}", padded.x0, padded.y0, padded.width(), padded.height()),
        )
        .set("width", padded.width())
        .set("height", padded.height())
        .add(
            Rectangle::new()
                .set("x", padded.x0)
                .set("y", padded.y0)
                .set("width", padded.width())
                .set("height", padded.height())
                .set("fill", "#ffffff"),
        );
    if !markers.defs.is_empty() {
        doc = doc.add(markers.into_definitions());
    }
    for group in body {
        doc = doc.add(group);
    }

    let mut out = Vec::new();
    ::svg::write(&mut out, &doc).map_err(|e| ExportError::Svg(e.to_string()))?;
    let markup = String::from_utf8(out).map_err(|e| ExportError::Svg(e.to_string()))?;
    log::info!("SVG export complete: {} bytes", markup.len());
    Ok(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagramkit_core::elements::{FrameElement, ShapeVariant};

    fn store_with_arrows() -> ElementStore {
        let mut store = ElementStore::new();
        for i in 0..3 {
            let y = i as f64 * 40.0;
            let mut line = LineElement::new(200.0, y);
            line.arrow_tail = ArrowHead::Arrow;
            store.add_element(Element::new(ElementKind::Line(line), 0.0, y));
        }
        store
    }

    #[test]
    fn test_markers_defined_once_and_referenced() {
        let svg = export_svg(&store_with_arrows(), &ExportScope::All, &RendererConfig::default())
            .unwrap();
        assert_eq!(svg.matches("<marker").count(), 1);
        assert_eq!(svg.matches("marker-end=").count(), 3);
        assert_eq!(svg.matches("marker-start=").count(), 3);
        assert!(svg.contains("orient=\"auto-start-reverse\""));
    }

    #[test]
    fn test_distinct_heads_get_distinct_markers() {
        let mut store = store_with_arrows();
        let mut line = LineElement::new(100.0, 300.0);
        line.arrow_head = ArrowHead::Diamond;
        store.add_element(Element::new(ElementKind::Line(line), 0.0, 300.0));
        let svg = export_svg(&store, &ExportScope::All, &RendererConfig::default()).unwrap();
        assert_eq!(svg.matches("<marker").count(), 2);
    }

    #[test]
    fn test_shape_text_and_rotation() {
        let mut store = ElementStore::new();
        let mut shape = ShapeElement::new(ShapeVariant::Ellipse, 100.0, 60.0);
        shape.text = Some("first\nsecond".into());
        let mut el = Element::new(ElementKind::Shape(shape), 0.0, 0.0);
        el.rotation = std::f64::consts::FRAC_PI_2;
        store.add_element(el);

        let svg = export_svg(&store, &ExportScope::All, &RendererConfig::default()).unwrap();
        assert!(svg.contains("first"));
        assert!(svg.contains("second"));
        assert_eq!(svg.matches("<tspan").count(), 2);
        assert!(svg.contains("transform=\"rotate("));
        assert!(svg.contains(" 50 30)\""));
        assert!(!svg.contains("<marker"));
    }

    #[test]
    fn test_frame_label_and_view_box() {
        let mut store = ElementStore::new();
        store.add_element(Element::new(
            ElementKind::Frame(FrameElement::new(200.0, 100.0, "Payments")),
            0.0,
            0.0,
        ));
        let svg = export_svg(&store, &ExportScope::All, &RendererConfig::default()).unwrap();
        assert!(svg.contains("Payments"));
        let expected = format!("viewBox=\"-20 {} 240 {}\"", -20.0 - FRAME_LABEL_HEIGHT, 140.0 + FRAME_LABEL_HEIGHT);
        assert!(svg.contains(&expected), "{svg}");
    }

    #[test]
    fn test_empty_svg_export() {
        assert!(matches!(
            export_svg(&ElementStore::new(), &ExportScope::All, &RendererConfig::default()),
            Err(ExportError::Empty)
        ));
    }
}
