//! Partial updates applied through `ElementStore::update_element`.

use super::{
    ArrowHead, Connection, Element, ElementKind, LineRouting, SerializableColor, ShapeVariant,
    StrokeStyle, TextAlign, style,
};
use kurbo::Point;
use serde::{Deserialize, Deserializer};

/// Distinguishes "field absent" (`None`) from "field set to null" (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// A partial element update. Absent fields are left alone; fields that do
/// not apply to the target's kind are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub layer_id: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub plm_node_id: Option<Option<String>>,

    pub width: Option<f64>,
    pub height: Option<f64>,

    #[serde(default, deserialize_with = "double_option")]
    pub fill: Option<Option<SerializableColor>>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub stroke_style: Option<StrokeStyle>,
    pub fill_opacity: Option<f64>,
    pub opacity: Option<f64>,

    pub shape_variant: Option<ShapeVariant>,
    #[serde(default, deserialize_with = "double_option")]
    pub text: Option<Option<String>>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub text_color: Option<SerializableColor>,
    pub text_align: Option<TextAlign>,

    pub x2: Option<f64>,
    pub y2: Option<f64>,
    pub arrow_head: Option<ArrowHead>,
    pub arrow_tail: Option<ArrowHead>,
    pub curvature: Option<f64>,
    pub routing: Option<LineRouting>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_connection: Option<Option<Connection>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_connection: Option<Option<Connection>>,
    #[serde(default, deserialize_with = "double_option")]
    pub label: Option<Option<String>>,
    pub label_offset: Option<f64>,

    pub name: Option<String>,
    pub src: Option<String>,
    pub points: Option<Vec<Point>>,
    pub closed: Option<bool>,
}

impl ElementPatch {
    /// Whether applying this patch can move or reshape the element.
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.rotation.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.x2.is_some()
            || self.y2.is_some()
            || self.points.is_some()
            || self.routing.is_some()
            || self.start_connection.is_some()
            || self.end_connection.is_some()
    }

    /// Apply to `element`, clamping sizes, stroke width and opacities.
    pub fn apply(&self, element: &mut Element) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(rotation) = self.rotation {
            if element.supports_rotation() {
                element.rotation = rotation;
            }
        }
        if let Some(visible) = self.visible {
            element.visible = visible;
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
        if let Some(layer_id) = &self.layer_id {
            element.layer_id = layer_id.clone();
        }
        if let Some(plm) = &self.plm_node_id {
            element.plm_node_id = plm.clone().filter(|s| !s.is_empty());
        }

        if self.width.is_some() || self.height.is_some() {
            if let Some((w, h)) = element.size().or_else(|| {
                matches!(element.kind, ElementKind::Path(_)).then(|| {
                    let r = element.rect();
                    (r.width(), r.height())
                })
            }) {
                element.set_size(self.width.unwrap_or(w), self.height.unwrap_or(h));
            }
        }

        if let Some(style) = element.style_mut() {
            if let Some(fill) = self.fill {
                style.fill = fill;
            }
            if let Some(stroke) = self.stroke {
                style.stroke = stroke;
            }
            if let Some(width) = self.stroke_width {
                style.stroke_width = style::clamp_stroke_width(width);
            }
            if let Some(stroke_style) = self.stroke_style {
                style.stroke_style = stroke_style;
            }
            if let Some(fill_opacity) = self.fill_opacity {
                style.fill_opacity = style::clamp_unit(fill_opacity);
            }
            if let Some(opacity) = self.opacity {
                style.opacity = style::clamp_unit(opacity);
            }
        }

        match &mut element.kind {
            ElementKind::Shape(shape) => {
                if let Some(variant) = self.shape_variant {
                    shape.shape_variant = variant;
                }
                if let Some(text) = &self.text {
                    shape.text = text.clone();
                }
                self.apply_text_style(&mut shape.text_style);
            }
            ElementKind::Text(text) => {
                if let Some(content) = &self.content {
                    text.content = content.clone();
                }
                if let Some(fill) = self.fill {
                    text.background = fill;
                }
                self.apply_text_style(&mut text.text_style);
            }
            ElementKind::Line(line) => {
                if let Some(x2) = self.x2 {
                    line.x2 = x2;
                }
                if let Some(y2) = self.y2 {
                    line.y2 = y2;
                }
                if let Some(head) = self.arrow_head {
                    line.arrow_head = head;
                }
                if let Some(tail) = self.arrow_tail {
                    line.arrow_tail = tail;
                }
                if let Some(curvature) = self.curvature {
                    line.curvature = curvature;
                }
                if let Some(routing) = self.routing {
                    line.routing = routing;
                }
                if let Some(conn) = self.start_connection {
                    line.start_connection = conn;
                }
                if let Some(conn) = self.end_connection {
                    line.end_connection = conn;
                }
                if let Some(label) = &self.label {
                    line.label = label.clone().filter(|s| !s.is_empty());
                }
                if let Some(offset) = self.label_offset {
                    line.label_offset = offset;
                }
                self.apply_text_style(&mut line.label_style);
            }
            ElementKind::Path(path) => {
                if let Some(points) = &self.points {
                    path.points = points.clone();
                }
                if let Some(closed) = self.closed {
                    path.closed = closed;
                }
            }
            ElementKind::Image(image) => {
                if let Some(src) = &self.src {
                    image.src = src.clone();
                }
                if let Some(opacity) = self.opacity {
                    image.opacity = style::clamp_unit(opacity);
                }
            }
            ElementKind::Frame(frame) => {
                if let Some(name) = &self.name {
                    frame.name = name.clone();
                }
                if let Some(fill) = self.fill {
                    frame.fill = fill;
                }
                if let Some(stroke) = self.stroke {
                    frame.stroke = stroke;
                }
                if let Some(stroke_style) = self.stroke_style {
                    frame.stroke_style = stroke_style;
                }
                self.apply_text_style(&mut frame.label_style);
            }
            ElementKind::Group(_) => {}
        }
    }

    fn apply_text_style(&self, text_style: &mut super::TextStyle) {
        if let Some(size) = self.font_size {
            text_style.font_size = size.max(1.0);
        }
        if let Some(color) = self.text_color {
            text_style.color = color;
        }
        if let Some(align) = self.text_align {
            text_style.align = align;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{LineElement, MIN_ELEMENT_SIZE, ShapeElement};

    fn shape() -> Element {
        Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, 100.0, 100.0)),
            0.0,
            0.0,
        )
    }

    #[test]
    fn test_patch_clamps_values() {
        let mut el = shape();
        let patch: ElementPatch = serde_json::from_str(
            r#"{"width": 3, "fillOpacity": 1.7, "strokeWidth": 0.1, "x": 40}"#,
        )
        .unwrap();
        patch.apply(&mut el);
        assert_eq!(el.size(), Some((MIN_ELEMENT_SIZE, 100.0)));
        let style = el.style().unwrap();
        assert!((style.fill_opacity - 1.0).abs() < f64::EPSILON);
        assert!((style.stroke_width - 0.5).abs() < f64::EPSILON);
        assert!((el.x - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_clears_and_absent_keeps() {
        let mut el = shape();
        let patch: ElementPatch = serde_json::from_str(r#"{"fill": null}"#).unwrap();
        patch.apply(&mut el);
        assert!(el.style().unwrap().fill.is_none());

        let patch: ElementPatch = serde_json::from_str(r##"{"stroke": "#ff0000"}"##).unwrap();
        patch.apply(&mut el);
        assert!(el.style().unwrap().fill.is_none());
        assert_eq!(el.style().unwrap().stroke, SerializableColor::new(255, 0, 0, 255));
    }

    #[test]
    fn test_rotation_ignored_for_lines() {
        let mut el = Element::new(ElementKind::Line(LineElement::new(5.0, 5.0)), 0.0, 0.0);
        let patch = ElementPatch {
            rotation: Some(1.0),
            ..Default::default()
        };
        patch.apply(&mut el);
        assert_eq!(el.rotation, 0.0);
    }
}
