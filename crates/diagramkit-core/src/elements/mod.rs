//! Element definitions for the diagram.
//!
//! An [`Element`] carries the attributes every kind shares (position,
//! rotation, visibility, layer and group membership) plus an
//! [`ElementKind`] payload. Serialized, the payload is flattened into the
//! element object and tagged by `type`.

mod frame;
mod group;
mod image;
mod line;
mod patch;
mod path;
mod shape;
mod style;
mod text;

pub use frame::FrameElement;
pub use group::GroupElement;
pub use image::ImageElement;
pub use line::{ArrowHead, Connection, LineElement, LineRouting};
pub use patch::ElementPatch;
pub use path::PathElement;
pub use shape::{ShapeElement, ShapeVariant};
pub use style::{
    ElementStyle, FontWeight, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, SerializableColor, StrokeStyle,
    TextAlign, TextStyle,
};
pub use text::TextElement;

use crate::geometry::{self, Side};
use crate::layer::{DEFAULT_LAYER_ID, LayerId};
use crate::routing::{self, LinePath};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Smallest width or height a sized element may have.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

fn default_true() -> bool {
    true
}

fn default_layer() -> LayerId {
    DEFAULT_LAYER_ID.to_string()
}

/// One visual object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    /// Radians around the element center. Only shapes, text and images rotate.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_layer")]
    pub layer_id: LayerId,
    /// Owning group element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<ElementId>,
    /// Frame this element sits in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    /// Opaque reference to an external record; only stored and badged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plm_node_id: Option<String>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Per-kind payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Shape(ShapeElement),
    Text(TextElement),
    Line(LineElement),
    Path(PathElement),
    Image(ImageElement),
    Frame(FrameElement),
    Group(GroupElement),
}

impl Element {
    /// Create an element with a fresh id on the default layer.
    pub fn new(kind: ElementKind, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            rotation: 0.0,
            visible: true,
            locked: false,
            layer_id: default_layer(),
            group_id: None,
            parent_id: None,
            plm_node_id: None,
            kind,
        }
    }

    /// The `type` tag of this element.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Shape(_) => "shape",
            ElementKind::Text(_) => "text",
            ElementKind::Line(_) => "line",
            ElementKind::Path(_) => "path",
            ElementKind::Image(_) => "image",
            ElementKind::Frame(_) => "frame",
            ElementKind::Group(_) => "group",
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height for kinds that carry them.
    pub fn size(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ElementKind::Shape(s) => Some((s.width, s.height)),
            ElementKind::Text(t) => Some((t.width, t.height)),
            ElementKind::Image(i) => Some((i.width, i.height)),
            ElementKind::Frame(f) => Some((f.width, f.height)),
            ElementKind::Line(_) | ElementKind::Path(_) | ElementKind::Group(_) => None,
        }
    }

    /// Set width and height, clamped to [`MIN_ELEMENT_SIZE`]. No-op for unsized kinds.
    pub fn set_size(&mut self, width: f64, height: f64) {
        let width = clamp_size(width);
        let height = clamp_size(height);
        match &mut self.kind {
            ElementKind::Shape(s) => (s.width, s.height) = (width, height),
            ElementKind::Text(t) => (t.width, t.height) = (width, height),
            ElementKind::Image(i) => (i.width, i.height) = (width, height),
            ElementKind::Frame(f) => (f.width, f.height) = (width, height),
            ElementKind::Path(p) => p.fit_to(width, height),
            ElementKind::Line(_) | ElementKind::Group(_) => {}
        }
    }

    /// Unrotated box in world space. Lines use their endpoints, paths their
    /// points, and groups collapse to their origin.
    pub fn rect(&self) -> Rect {
        match &self.kind {
            ElementKind::Line(line) => {
                geometry::line_bounds(self.origin(), Point::new(line.x2, line.y2))
            }
            ElementKind::Path(path) => path.local_bounds() + self.origin().to_vec2(),
            ElementKind::Group(_) => Rect::from_origin_size(self.origin(), (0.0, 0.0)),
            _ => {
                let (w, h) = self.size().unwrap_or_default();
                Rect::from_origin_size(self.origin(), (w, h))
            }
        }
    }

    /// Axis-aligned world bounds including rotation.
    ///
    /// Group bounds depend on their children; use
    /// `ElementStore::element_bounds` for those.
    pub fn bounds(&self) -> Rect {
        let rect = self.rect();
        if self.supports_rotation() {
            geometry::rotated_bounds(rect, self.rotation)
        } else {
            rect
        }
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    pub fn supports_rotation(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Shape(_) | ElementKind::Text(_) | ElementKind::Image(_)
        )
    }

    /// Rotation actually applied when drawing and hit-testing.
    pub fn effective_rotation(&self) -> f64 {
        if self.supports_rotation() { self.rotation } else { 0.0 }
    }

    /// Whether line endpoints may snap to this element.
    pub fn is_connectable(&self) -> bool {
        !matches!(
            self.kind,
            ElementKind::Line(_) | ElementKind::Text(_) | ElementKind::Group(_)
        )
    }

    /// World position of the connection point on `side`.
    pub fn connection_point(&self, side: Side) -> Point {
        geometry::connection_point(self.rect(), self.effective_rotation(), side)
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    pub fn is_frame(&self) -> bool {
        matches!(self.kind, ElementKind::Frame(_))
    }

    pub fn as_group(&self) -> Option<&GroupElement> {
        match &self.kind {
            ElementKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupElement> {
        match &mut self.kind {
            ElementKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineElement> {
        match &self.kind {
            ElementKind::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut LineElement> {
        match &mut self.kind {
            ElementKind::Line(l) => Some(l),
            _ => None,
        }
    }

    /// Start and end point of a line element.
    pub fn line_endpoints(&self) -> Option<(Point, Point)> {
        self.as_line()
            .map(|l| (self.origin(), Point::new(l.x2, l.y2)))
    }

    /// Resolved drawing geometry of a line element.
    pub fn line_path(&self) -> Option<LinePath> {
        let line = self.as_line()?;
        let start = self.origin();
        let end = Point::new(line.x2, line.y2);
        Some(match line.routing {
            LineRouting::Orthogonal => LinePath::Orthogonal(routing::orthogonal_route(
                start,
                end,
                line.start_connection.map(|c| c.side),
            )),
            LineRouting::Straight if line.curvature.abs() > f64::EPSILON => LinePath::Curved {
                start,
                control: routing::quadratic_control(start, end, line.curvature),
                end,
            },
            LineRouting::Straight => LinePath::Straight { start, end },
        })
    }

    pub fn style(&self) -> Option<&ElementStyle> {
        match &self.kind {
            ElementKind::Shape(s) => Some(&s.style),
            ElementKind::Line(l) => Some(&l.style),
            ElementKind::Path(p) => Some(&p.style),
            _ => None,
        }
    }

    pub fn style_mut(&mut self) -> Option<&mut ElementStyle> {
        match &mut self.kind {
            ElementKind::Shape(s) => Some(&mut s.style),
            ElementKind::Line(l) => Some(&mut l.style),
            ElementKind::Path(p) => Some(&mut p.style),
            _ => None,
        }
    }

    /// Every piece of text a search can match.
    pub fn searchable_text(&self) -> Vec<&str> {
        let mut out = Vec::new();
        match &self.kind {
            ElementKind::Shape(s) => out.extend(s.text.as_deref()),
            ElementKind::Text(t) => out.push(t.content.as_str()),
            ElementKind::Line(l) => out.extend(l.label.as_deref()),
            ElementKind::Frame(f) => out.push(f.name.as_str()),
            ElementKind::Path(_) | ElementKind::Image(_) | ElementKind::Group(_) => {}
        }
        out.extend(self.plm_node_id.as_deref());
        out
    }

    /// Move by `delta`. Groups move only their own origin; the store moves
    /// their children.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        if let ElementKind::Line(line) = &mut self.kind {
            line.x2 += delta.x;
            line.y2 += delta.y;
        }
    }

    /// Force numeric invariants: sizes, stroke width, opacities.
    pub fn clamp_invariants(&mut self) {
        if let Some((w, h)) = self.size() {
            if w < MIN_ELEMENT_SIZE || h < MIN_ELEMENT_SIZE || w.is_nan() || h.is_nan() {
                self.set_size(w, h);
            }
        }
        if let Some(style) = self.style_mut() {
            style.clamp();
        }
        if let ElementKind::Image(image) = &mut self.kind {
            image.opacity = style::clamp_unit(image.opacity);
        }
        if !self.supports_rotation() {
            self.rotation = 0.0;
        }
    }
}

fn clamp_size(value: f64) -> f64 {
    if value.is_nan() { MIN_ELEMENT_SIZE } else { value.max(MIN_ELEMENT_SIZE) }
}
