//! Off-screen CPU backend on a tiny-skia pixmap.
//!
//! Geometry and images are rasterised; text is not, since no font stack is
//! bundled. Used by PNG export.

use crate::context::{DrawContext, FontSpec, RasterImage, StateStack};
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Point, Rect, Stroke};
use peniko::Color;
use resvg::tiny_skia;

pub struct RasterContext {
    pixmap: tiny_skia::Pixmap,
    state: StateStack,
}

fn to_skia_transform(affine: Affine) -> tiny_skia::Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    tiny_skia::Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn to_skia_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    let line_cap = match stroke.start_cap {
        Cap::Butt => tiny_skia::LineCap::Butt,
        Cap::Round => tiny_skia::LineCap::Round,
        Cap::Square => tiny_skia::LineCap::Square,
    };
    let line_join = match stroke.join {
        Join::Bevel => tiny_skia::LineJoin::Bevel,
        Join::Miter => tiny_skia::LineJoin::Miter,
        Join::Round => tiny_skia::LineJoin::Round,
    };
    let dash = if stroke.dash_pattern.is_empty() {
        None
    } else {
        tiny_skia::StrokeDash::new(
            stroke.dash_pattern.iter().map(|d| *d as f32).collect(),
            stroke.dash_offset as f32,
        )
    };
    tiny_skia::Stroke {
        width: stroke.width as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap,
        line_join,
        dash,
    }
}

fn to_skia_paint(color: Color) -> tiny_skia::Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}

/// Premultiplied copy of a straight-alpha image.
fn to_skia_pixmap(image: &RasterImage) -> Option<tiny_skia::Pixmap> {
    let size = tiny_skia::IntSize::from_wh(image.width, image.height)?;
    let mut data = Vec::with_capacity(image.rgba.len());
    for px in image.rgba.chunks_exact(4) {
        let c = tiny_skia::ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    tiny_skia::Pixmap::from_vec(data, size)
}

impl RasterContext {
    /// None when either dimension is zero or the pixmap cannot be allocated.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: tiny_skia::Pixmap::new(width, height)?,
            state: StateStack::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA8 pixels, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Straight-alpha pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    fn skia_transform(&self) -> tiny_skia::Transform {
        to_skia_transform(self.state.current().transform)
    }
}

impl DrawContext for RasterContext {
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
        let rgba = color.to_rgba8();
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a));
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn resize_backing(&mut self, width: u32, height: u32) {
        match tiny_skia::Pixmap::new(width, height) {
            Some(pixmap) => self.pixmap = pixmap,
            None => log::warn!("cannot allocate a {width}x{height} pixmap"),
        }
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.set_alpha(alpha);
    }

    fn global_alpha(&self) -> f64 {
        self.state.current().alpha
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = to_skia_paint(self.state.apply_alpha(color));
        let transform = self.skia_transform();
        self.pixmap
            .fill_path(&path, &paint, tiny_skia::FillRule::Winding, transform, None);
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = to_skia_paint(self.state.apply_alpha(color));
        let transform = self.skia_transform();
        self.pixmap
            .stroke_path(&path, &paint, &to_skia_stroke(stroke), transform, None);
    }

    fn fill_text(&mut self, _text: &str, _origin: Point, _font: &FontSpec, _color: Color) {}

    fn draw_image(&mut self, image: &RasterImage, dest: Rect) {
        let Some(source) = to_skia_pixmap(image) else {
            return;
        };
        let placement = self.state.current().transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / image.width as f64,
                dest.height() / image.height as f64,
            );
        let paint = tiny_skia::PixmapPaint {
            opacity: self.state.current().alpha as f32,
            quality: tiny_skia::FilterQuality::Bilinear,
            ..tiny_skia::PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            to_skia_transform(placement),
            None,
        );
    }
}
