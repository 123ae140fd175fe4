//! Connector lines.

use super::{ElementId, ElementStyle, TextStyle};
use crate::geometry::Side;
use serde::{Deserialize, Serialize};

/// Decoration drawn at a line end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowHead {
    #[default]
    None,
    Arrow,
    OpenArrow,
    Diamond,
    Circle,
}

/// How a line travels between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineRouting {
    #[default]
    Straight,
    Orthogonal,
}

/// A line endpoint snapped to a side of another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub element_id: ElementId,
    pub side: Side,
}

impl Connection {
    pub fn new(element_id: ElementId, side: Side) -> Self {
        Self { element_id, side }
    }
}

fn default_label_offset() -> f64 {
    0.0
}

/// A line from the element's `x, y` to `x2, y2`. Lines never rotate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default)]
    pub arrow_head: ArrowHead,
    #[serde(default)]
    pub arrow_tail: ArrowHead,
    /// Bend of a straight-routed line as a fraction of its length; 0 is straight.
    #[serde(default)]
    pub curvature: f64,
    #[serde(default)]
    pub routing: LineRouting,
    #[serde(default)]
    pub start_connection: Option<Connection>,
    #[serde(default)]
    pub end_connection: Option<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Perpendicular distance of the label from the line.
    #[serde(default = "default_label_offset")]
    pub label_offset: f64,
    #[serde(default)]
    pub label_style: TextStyle,
}

impl LineElement {
    pub fn new(x2: f64, y2: f64) -> Self {
        Self {
            x2,
            y2,
            style: ElementStyle {
                fill: None,
                ..ElementStyle::default()
            },
            arrow_head: ArrowHead::Arrow,
            arrow_tail: ArrowHead::None,
            curvature: 0.0,
            routing: LineRouting::Straight,
            start_connection: None,
            end_connection: None,
            label: None,
            label_offset: 0.0,
            label_style: TextStyle {
                font_size: 13.0,
                ..TextStyle::default()
            },
        }
    }

    /// Whether either endpoint is connected to `id`.
    pub fn references(&self, id: ElementId) -> bool {
        self.start_connection.is_some_and(|c| c.element_id == id)
            || self.end_connection.is_some_and(|c| c.element_id == id)
    }

    /// Null out connections pointing at `id`. Returns true if anything changed.
    pub fn disconnect(&mut self, id: ElementId) -> bool {
        let mut changed = false;
        if self.start_connection.is_some_and(|c| c.element_id == id) {
            self.start_connection = None;
            changed = true;
        }
        if self.end_connection.is_some_and(|c| c.element_id == id) {
            self.end_connection = None;
            changed = true;
        }
        changed
    }
}
