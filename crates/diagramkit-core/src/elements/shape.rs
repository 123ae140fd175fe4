//! Geometric shapes with optional inline text.

use super::{ElementStyle, TextStyle};
use serde::{Deserialize, Serialize};

/// Outline drawn by a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeVariant {
    #[default]
    Rectangle,
    RoundedRectangle,
    Ellipse,
    Diamond,
    Triangle,
    Hexagon,
    Parallelogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub shape_variant: ShapeVariant,
    #[serde(default)]
    pub style: ElementStyle,
    /// Centered label inside the shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub text_style: TextStyle,
}

impl ShapeElement {
    pub fn new(shape_variant: ShapeVariant, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shape_variant,
            style: ElementStyle::default(),
            text: None,
            text_style: TextStyle {
                align: super::TextAlign::Center,
                ..TextStyle::default()
            },
        }
    }
}
