//! Element creation seeded from the store's current style.

use crate::elements::{
    ArrowHead, Connection, Element, ElementKind, ElementStyle, FrameElement, ImageElement,
    LineElement, LineRouting, PathElement, ShapeElement, ShapeVariant, TextAlign, TextElement,
    TextStyle,
};
use crate::layer::LayerId;
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Tool selections the host UI reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    pub tool: ToolKind,
    pub shape_variant: ShapeVariant,
    pub line_routing: LineRouting,
    pub arrow_head: ArrowHead,
    pub arrow_tail: ArrowHead,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Select,
            shape_variant: ShapeVariant::Rectangle,
            line_routing: LineRouting::Straight,
            arrow_head: ArrowHead::Arrow,
            arrow_tail: ArrowHead::None,
        }
    }
}

/// Store-wide styling applied to newly created elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentStyle {
    pub style: ElementStyle,
    pub text_style: TextStyle,
}

/// Builds elements with the current style, tool configuration and active
/// layer. Obtained from `ElementStore::factory`.
#[derive(Debug, Clone, Copy)]
pub struct ElementFactory<'a> {
    style: &'a CurrentStyle,
    tool: &'a ToolConfig,
    layer: &'a LayerId,
}

impl<'a> ElementFactory<'a> {
    pub(super) fn new(style: &'a CurrentStyle, tool: &'a ToolConfig, layer: &'a LayerId) -> Self {
        Self { style, tool, layer }
    }

    fn finish(&self, kind: ElementKind, origin: Point) -> Element {
        let mut el = Element::new(kind, origin.x, origin.y);
        el.layer_id = self.layer.clone();
        el.clamp_invariants();
        el
    }

    /// A shape of the configured variant filling `rect`.
    pub fn shape(&self, rect: Rect) -> Element {
        self.shape_of(self.tool.shape_variant, rect)
    }

    pub fn shape_of(&self, variant: ShapeVariant, rect: Rect) -> Element {
        let rect = rect.abs();
        let mut shape = ShapeElement::new(variant, rect.width(), rect.height());
        shape.style = self.style.style.clone();
        shape.text_style = TextStyle {
            align: TextAlign::Center,
            ..self.style.text_style.clone()
        };
        self.finish(ElementKind::Shape(shape), rect.origin())
    }

    pub fn text(&self, rect: Rect, content: impl Into<String>) -> Element {
        let rect = rect.abs();
        let mut text = TextElement::new(rect.width(), rect.height(), content);
        text.text_style = self.style.text_style.clone();
        self.finish(ElementKind::Text(text), rect.origin())
    }

    /// A line with the configured routing and arrow heads.
    pub fn line(
        &self,
        start: Point,
        end: Point,
        start_connection: Option<Connection>,
        end_connection: Option<Connection>,
    ) -> Element {
        let mut line = LineElement::new(end.x, end.y);
        line.style = ElementStyle {
            fill: None,
            ..self.style.style.clone()
        };
        line.routing = self.tool.line_routing;
        line.arrow_head = self.tool.arrow_head;
        line.arrow_tail = self.tool.arrow_tail;
        line.start_connection = start_connection;
        line.end_connection = end_connection;
        self.finish(ElementKind::Line(line), start)
    }

    /// A freehand path through world-space `points`. None for fewer than two.
    pub fn path(&self, points: &[Point]) -> Option<Element> {
        if points.len() < 2 {
            return None;
        }
        let style = ElementStyle {
            fill: None,
            ..self.style.style.clone()
        };
        let (origin, path) = PathElement::from_absolute(points, style);
        Some(self.finish(ElementKind::Path(path), origin))
    }

    pub fn frame(&self, rect: Rect, name: impl Into<String>) -> Element {
        let rect = rect.abs();
        let frame = FrameElement::new(rect.width(), rect.height(), name);
        self.finish(ElementKind::Frame(frame), rect.origin())
    }

    pub fn image(&self, rect: Rect, src: impl Into<String>) -> Element {
        let rect = rect.abs();
        let image = ImageElement::new(rect.width(), rect.height(), src);
        self.finish(ElementKind::Image(image), rect.origin())
    }
}
