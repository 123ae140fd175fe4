//! Vello backend: encodes draw calls into a [`vello::Scene`] for a GPU host.

use crate::context::{DrawContext, FontSpec, RasterImage, StateStack};
use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::{Blob, Brush, Color, Fill};
use std::sync::Arc;
use vello::Scene;

/// [`DrawContext`] recording into a Vello scene. Text is shaped with parley
/// from fonts registered through [`VelloContext::register_font`].
pub struct VelloContext {
    scene: Scene,
    state: StateStack,
    /// Target surface size in device pixels.
    size: (u32, u32),
    /// Cached to avoid re-registering fonts.
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
}

impl VelloContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scene: Scene::new(),
            state: StateStack::new(),
            size: (width, height),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Register a TrueType/OpenType font for `fill_text`.
    pub fn register_font(&mut self, bytes: Vec<u8>) {
        log::debug!("registering font ({} bytes)", bytes.len());
        self.font_cx
            .collection
            .register_fonts(Blob::new(Arc::new(bytes)), None);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn layout(&mut self, text: &str, font: &FontSpec, color: Color) -> Layout<Brush> {
        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font.size as f32));
        builder.push_default(StyleProperty::Brush(Brush::Solid(color)));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::from(
            font.family.as_str(),
        )));
        let weight = if font.bold {
            parley::FontWeight::BOLD
        } else {
            parley::FontWeight::NORMAL
        };
        builder.push_default(StyleProperty::FontWeight(weight));
        if font.italic {
            builder.push_default(StyleProperty::FontStyle(parley::FontStyle::Italic));
        }
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }
}

impl DrawContext for VelloContext {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform(affine);
    }

    fn set_transform(&mut self, affine: Affine) {
        self.state.set_transform(affine);
    }

    fn current_transform(&self) -> Affine {
        self.state.current().transform
    }

    fn clear(&mut self, color: Color) {
        self.scene.reset();
        let (w, h) = self.size;
        let rect = Rect::new(0.0, 0.0, w as f64, h as f64);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, color, None, &rect);
    }

    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn resize_backing(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.set_alpha(alpha);
    }

    fn global_alpha(&self) -> f64 {
        self.state.current().alpha
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let color = self.state.apply_alpha(color);
        let transform = self.current_transform();
        self.scene.fill(Fill::NonZero, transform, color, None, path);
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        let color = self.state.apply_alpha(color);
        let transform = self.current_transform();
        self.scene.stroke(stroke, transform, color, None, path);
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        if text.is_empty() {
            return;
        }
        let color = self.state.apply_alpha(color);
        let brush = Brush::Solid(color);
        let layout = self.layout(text, font, color);
        // Parley layouts have y=0 at the top of the line box.
        let text_transform = self.current_transform() * Affine::translate(origin.to_vec2());

        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));
                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();
                if glyphs.is_empty() {
                    continue;
                }
                glyph_count += glyphs.len();
                self.scene
                    .draw_glyphs(run.font())
                    .brush(&brush)
                    .hint(true)
                    .transform(text_transform)
                    .glyph_transform(glyph_xform)
                    .font_size(run.font_size())
                    .normalized_coords(run.normalized_coords())
                    .draw(Fill::NonZero, glyphs.into_iter());
            }
        }

        // No registered font covers the text: mark where it would be.
        if glyph_count == 0 {
            let width = text.chars().count() as f64 * font.size * 0.6;
            let rect = Rect::from_origin_size(origin, (width.max(20.0), font.line_height()));
            let transform = self.current_transform();
            self.scene
                .fill(Fill::NonZero, transform, color.multiply_alpha(0.4), None, &rect);
        }
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64 {
        let width = self.layout(text, font, Color::BLACK).width() as f64;
        if width > 0.0 || text.is_empty() {
            width
        } else {
            let factor = if font.bold { 0.62 } else { 0.56 };
            text.chars().count() as f64 * font.size * factor
        }
    }

    fn draw_image(&mut self, image: &RasterImage, dest: Rect) {
        let image_data = peniko::ImageData {
            data: Blob::new(image.rgba.clone()),
            format: peniko::ImageFormat::Rgba8,
            width: image.width,
            height: image.height,
            alpha_type: peniko::ImageAlphaType::Alpha,
        };
        let scale_x = dest.width() / image.width as f64;
        let scale_y = dest.height() / image.height as f64;
        let image_transform = self.current_transform()
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);
        self.scene.draw_image(&image_data.into(), image_transform);
    }
}
