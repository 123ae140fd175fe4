use crate::context::{DrawContext, RasterImage};
use diagramkit_core::ElementId;
use diagramkit_core::elements::{Element, ImageElement};
use kurbo::{BezPath, Point, Shape, Stroke};
use peniko::Color;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Decode a data URL or bare base64 payload into RGBA pixels.
pub fn decode_image(image: &ImageElement) -> Option<RasterImage> {
    let bytes = image.decode_bytes()?;
    match ::image::load_from_memory(&bytes) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            RasterImage::new(width, height, rgba.into_vec())
        }
        Err(e) => {
            log::warn!("image decode failed: {e}");
            None
        }
    }
}

fn src_hash(src: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish()
}

/// Decoded images keyed by element id. An entry is reused while the
/// element's `src` is unchanged; failed decodes are cached too.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<ElementId, (u64, Option<RasterImage>)>,
    decodes: usize,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, id: ElementId, image: &ImageElement) -> Option<&RasterImage> {
        let hash = src_hash(&image.src);
        let stale = self.entries.get(&id).is_none_or(|(h, _)| *h != hash);
        if stale {
            self.decodes += 1;
            self.entries.insert(id, (hash, decode_image(image)));
        }
        self.entries.get(&id).and_then(|(_, img)| img.as_ref())
    }

    /// Drop entries for elements that no longer exist.
    pub fn retain(&mut self, mut live: impl FnMut(ElementId) -> bool) {
        self.entries.retain(|id, _| live(*id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode attempts so far.
    pub fn decodes(&self) -> usize {
        self.decodes
    }
}

/// Gray box with a cross, for images that cannot be decoded.
fn paint_placeholder(ctx: &mut dyn DrawContext, element: &Element) {
    let rect = element.rect();
    ctx.fill_path(&rect.to_path(0.1), Color::from_rgba8(200, 200, 200, 255));
    let mut cross = BezPath::new();
    cross.move_to(Point::new(rect.x0, rect.y0));
    cross.line_to(Point::new(rect.x1, rect.y1));
    cross.move_to(Point::new(rect.x1, rect.y0));
    cross.line_to(Point::new(rect.x0, rect.y1));
    ctx.stroke_path(&cross, &Stroke::new(2.0), Color::from_rgba8(150, 150, 150, 255));
}

pub fn paint_image(
    ctx: &mut dyn DrawContext,
    element: &Element,
    image: &ImageElement,
    cache: &mut ImageCache,
) {
    let Some(raster) = cache.get(element.id, image) else {
        paint_placeholder(ctx, element);
        return;
    };
    ctx.save();
    let alpha = ctx.global_alpha() * image.opacity;
    ctx.set_global_alpha(alpha);
    ctx.draw_image(raster, element.rect());
    ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingContext};
    use diagramkit_core::elements::ElementKind;

    /// A 2x1 PNG encoded on the fly.
    fn png_data_url() -> String {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&[255, 0, 0, 255, 0, 0, 255, 255])
                .unwrap();
        }
        ImageElement::data_url("image/png", &bytes)
    }

    fn image_element(src: String) -> Element {
        Element::new(ElementKind::Image(ImageElement::new(40.0, 20.0, src)), 0.0, 0.0)
    }

    #[test]
    fn test_decodes_once_per_src() {
        let el = image_element(png_data_url());
        let ElementKind::Image(image) = &el.kind else {
            unreachable!()
        };
        let mut cache = ImageCache::new();
        let decoded = cache.get(el.id, image).cloned().unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 1));
        cache.get(el.id, image);
        assert_eq!(cache.decodes(), 1);

        let mut changed = image.clone();
        changed.src = "not an image".into();
        assert!(cache.get(el.id, &changed).is_none());
        assert_eq!(cache.decodes(), 2);

        cache.retain(|_| false);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_image_painted_with_opacity() {
        let mut el = image_element(png_data_url());
        if let ElementKind::Image(image) = &mut el.kind {
            image.opacity = 0.5;
        }
        let ElementKind::Image(image) = &el.kind else {
            unreachable!()
        };
        let mut ctx = RecordingContext::new(100, 100);
        paint_image(&mut ctx, &el, image, &mut ImageCache::new());

        let DrawCommand::DrawImage { alpha, dest, .. } = &ctx.commands()[0] else {
            panic!("expected an image");
        };
        assert!((alpha - 0.5).abs() < 1e-9);
        assert_eq!(*dest, el.rect());
        assert!((ctx.global_alpha() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_undecodable_image_gets_placeholder() {
        let el = image_element("data:image/png;base64,AAAA".into());
        let ElementKind::Image(image) = &el.kind else {
            unreachable!()
        };
        let mut ctx = RecordingContext::new(100, 100);
        paint_image(&mut ctx, &el, image, &mut ImageCache::new());
        assert_eq!(ctx.commands().len(), 2);
    }
}
