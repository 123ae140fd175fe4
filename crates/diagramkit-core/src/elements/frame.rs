//! Frames: labelled containers drawn behind their members.

use super::{SerializableColor, StrokeStyle, TextStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameElement {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<SerializableColor>,
    #[serde(default = "default_frame_stroke")]
    pub stroke: SerializableColor,
    #[serde(default = "default_frame_stroke_style")]
    pub stroke_style: StrokeStyle,
    #[serde(default = "default_label_style")]
    pub label_style: TextStyle,
}

fn default_frame_stroke() -> SerializableColor {
    SerializableColor::new(0x94, 0xa3, 0xb8, 255)
}

fn default_frame_stroke_style() -> StrokeStyle {
    StrokeStyle::Dashed
}

fn default_label_style() -> TextStyle {
    TextStyle {
        font_size: 13.0,
        color: SerializableColor::new(0x47, 0x55, 0x69, 255),
        ..TextStyle::default()
    }
}

impl FrameElement {
    pub fn new(width: f64, height: f64, name: impl Into<String>) -> Self {
        Self {
            width,
            height,
            name: name.into(),
            fill: None,
            stroke: default_frame_stroke(),
            stroke_style: default_frame_stroke_style(),
            label_style: default_label_style(),
        }
    }
}
