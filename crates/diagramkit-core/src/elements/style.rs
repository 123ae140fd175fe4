//! Colors, stroke and text styling shared by element payloads.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable RGBA8 color, stored as `#rrggbb` / `#rrggbbaa` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }
        let hex = value.strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// The color with its alpha multiplied by `factor` (clamped to [0, 1]).
    pub fn to_color_with_alpha(self, factor: f64) -> Color {
        let a = (self.a as f64 * factor.clamp(0.0, 1.0)).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, a)
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke pattern for outlines and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// Dash pattern scaled to the stroke width; empty for solid strokes.
    pub fn dash_pattern(self, width: f64) -> Vec<f64> {
        let w = width.max(1.0);
        match self {
            StrokeStyle::Solid => Vec::new(),
            StrokeStyle::Dashed => vec![w * 4.0, w * 3.0],
            StrokeStyle::Dotted => vec![w, w * 2.0],
        }
    }
}

pub const MIN_STROKE_WIDTH: f64 = 0.5;
pub const MAX_STROKE_WIDTH: f64 = 20.0;

fn default_opacity() -> f64 {
    1.0
}

/// Fill and stroke of a drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
    #[serde(default = "default_opacity")]
    pub fill_opacity: f64,
    /// Overall opacity applied on top of fill and stroke.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: Some(SerializableColor::white()),
            stroke: SerializableColor::new(0x1f, 0x29, 0x37, 255),
            stroke_width: 2.0,
            stroke_style: StrokeStyle::Solid,
            fill_opacity: 1.0,
            opacity: 1.0,
        }
    }
}

impl ElementStyle {
    /// Fill color with fill opacity and overall opacity applied.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill
            .map(|c| c.to_color_with_alpha(self.fill_opacity * self.opacity))
    }

    /// Stroke color with overall opacity applied.
    pub fn stroke_color(&self) -> Color {
        self.stroke.to_color_with_alpha(self.opacity)
    }

    pub fn dash_pattern(&self) -> Vec<f64> {
        self.stroke_style.dash_pattern(self.stroke_width)
    }

    /// Clamp numeric fields into their valid ranges.
    pub fn clamp(&mut self) {
        self.fill_opacity = clamp_unit(self.fill_opacity);
        self.opacity = clamp_unit(self.opacity);
        self.stroke_width = clamp_stroke_width(self.stroke_width);
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) }
}

pub(crate) fn clamp_stroke_width(value: f64) -> f64 {
    if value.is_nan() {
        MIN_STROKE_WIDTH
    } else {
        value.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Horizontal text alignment inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Typography for text elements, inline shape text and frame labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub italic: bool,
    pub color: SerializableColor,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_family: "sans-serif".to_string(),
            font_weight: FontWeight::Normal,
            italic: false,
            color: SerializableColor::new(0x1f, 0x29, 0x37, 255),
            align: TextAlign::Left,
        }
    }
}

impl TextStyle {
    /// Line height used for layout and measurement.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.25
    }
}
