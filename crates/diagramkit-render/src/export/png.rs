use super::{ExportError, ExportScope, collect_elements, content_bounds};
use crate::context::DrawContext;
use crate::painters::{ImageCache, paint_element};
use crate::raster::RasterContext;
use crate::renderer::RendererConfig;
use diagramkit_core::ElementStore;
use kurbo::Affine;
use peniko::Color;

/// Largest exported side, in pixels.
const MAX_EXPORT_SIDE: f64 = 16_384.0;
/// Largest exported area, in pixels.
const MAX_EXPORT_PIXELS: f64 = 64.0 * 1024.0 * 1024.0;

/// Encode RGBA pixel data to PNG bytes.
fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(::png::ColorType::Rgba);
        encoder.set_depth(::png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// Rasterize the elements in `scope` on a white background.
///
/// The combined bounds are padded by `export_padding` and scaled by
/// `export_scale`; elements are painted with the canvas painters.
pub fn export_png(
    store: &ElementStore,
    scope: &ExportScope,
    config: &RendererConfig,
) -> Result<Vec<u8>, ExportError> {
    let elements = collect_elements(store, scope);
    let bounds = content_bounds(&elements)?;
    let scale = if config.export_scale > 0.0 {
        config.export_scale
    } else {
        1.0
    };
    let padding = config.export_padding.max(0.0);
    let padded = bounds.inflate(padding, padding);
    let width = (padded.width() * scale).ceil().max(1.0);
    let height = (padded.height() * scale).ceil().max(1.0);
    if width > MAX_EXPORT_SIDE || height > MAX_EXPORT_SIDE || width * height > MAX_EXPORT_PIXELS {
        log::warn!("Export of {width}x{height} pixels exceeds the surface limit");
        return Err(ExportError::Surface(format!("{width}x{height} exceeds limit")));
    }
    let (width, height) = (width as u32, height as u32);
    log::info!("Exporting PNG at {scale}x scale: {width}x{height}");

    let mut ctx = RasterContext::new(width, height)
        .ok_or_else(|| ExportError::Surface(format!("{width}x{height}")))?;
    ctx.clear(Color::WHITE);
    ctx.set_transform(Affine::scale(scale) * Affine::translate((-padded.x0, -padded.y0)));
    let mut images = ImageCache::new();
    for element in &elements {
        paint_element(&mut ctx, element, &mut images);
    }

    let png = encode_png(&ctx.to_rgba(), width, height)?;
    log::info!("PNG export complete: {} bytes", png.len());
    Ok(png)
}
