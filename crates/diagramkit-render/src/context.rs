//! Backend-neutral 2D drawing interface.

use diagramkit_core::elements::{FontWeight, TextStyle};
use kurbo::{Affine, BezPath, Point, Rect, Stroke, Vec2};
use peniko::Color;
use std::sync::Arc;

/// Font parameters for `fill_text` and `measure_text`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn from_style(style: &TextStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size,
            bold: style.font_weight == FontWeight::Bold,
            italic: style.italic,
        }
    }

    /// Height of one line of text.
    pub fn line_height(&self) -> f64 {
        self.size * 1.25
    }
}

/// Decoded straight-alpha RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<Vec<u8>>,
}

impl RasterImage {
    /// None when the buffer does not hold `width * height` pixels.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba: Arc::new(rgba),
        })
    }
}

/// Graphics state saved and restored as a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    pub alpha: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// Save/restore stack shared by the backends.
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn transform(&mut self, affine: Affine) {
        self.current.transform = self.current.transform * affine;
    }

    pub fn set_transform(&mut self, affine: Affine) {
        self.current.transform = affine;
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.current.alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
    }

    /// `color` with the current global alpha applied.
    pub fn apply_alpha(&self, color: Color) -> Color {
        if self.current.alpha >= 1.0 {
            color
        } else {
            color.multiply_alpha(self.current.alpha as f32)
        }
    }

    /// Drop all saved states and reset to identity.
    pub fn reset(&mut self) {
        self.current = DrawState::default();
        self.saved.clear();
    }
}

/// A 2D canvas-style drawing context.
///
/// Coordinates pass through the current transform. Colors are multiplied by
/// the global alpha. `save`/`restore` cover both.
pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);

    /// Multiply the current transform by `affine` (applied first).
    fn transform(&mut self, affine: Affine);
    fn set_transform(&mut self, affine: Affine);
    fn current_transform(&self) -> Affine;

    fn translate(&mut self, offset: Vec2) {
        self.transform(Affine::translate(offset));
    }

    fn scale(&mut self, factor: f64) {
        self.transform(Affine::scale(factor));
    }

    fn rotate(&mut self, angle: f64) {
        self.transform(Affine::rotate(angle));
    }

    /// Fill the whole backing buffer, ignoring transform and alpha.
    fn clear(&mut self, color: Color);

    /// Backing buffer size in device pixels.
    fn backing_size(&self) -> (u32, u32);
    fn resize_backing(&mut self, width: u32, height: u32);

    fn set_global_alpha(&mut self, alpha: f64);
    fn global_alpha(&self) -> f64;

    fn fill_path(&mut self, path: &BezPath, color: Color);
    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color);

    /// Draw one line of text with its line box's top-left corner at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color);

    /// Advance width of `text`. The default is an average-glyph estimate.
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64 {
        let factor = if font.bold { 0.62 } else { 0.56 };
        text.chars().count() as f64 * font.size * factor
    }

    /// Draw `image` stretched over `dest`.
    fn draw_image(&mut self, image: &RasterImage, dest: Rect);
}
