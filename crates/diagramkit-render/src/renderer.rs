//! The canvas renderer: repaints a store snapshot through a [`DrawContext`].

use crate::context::DrawContext;
use crate::frame::FrameScheduler;
use crate::overlay;
use crate::painters::{self, ImageCache};
use diagramkit_core::elements::{Element, SerializableColor};
use diagramkit_core::geometry::rects_intersect;
use diagramkit_core::{CanvasView, ElementId, ElementStore, ToolKind, hit};
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    /// No grid (plain background).
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only dots at intersections.
    Dots,
}

/// Colors and tunables of the renderer and the exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// World units added around the viewport before culling.
    pub cull_margin: f64,
    pub background: SerializableColor,
    pub grid: GridStyle,
    pub selection_color: SerializableColor,
    pub guide_color: SerializableColor,
    pub search_color: SerializableColor,
    /// Opacity of the placement ghost.
    pub preview_alpha: f64,
    pub export_scale: f64,
    /// World units of margin around exported content.
    pub export_padding: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cull_margin: 100.0,
            background: SerializableColor::new(250, 250, 250, 255),
            grid: GridStyle::Lines,
            selection_color: SerializableColor::new(59, 130, 246, 255),
            guide_color: SerializableColor::new(236, 72, 153, 255),
            search_color: SerializableColor::new(245, 158, 11, 255),
            preview_alpha: 0.5,
            export_scale: 2.0,
            export_padding: 20.0,
        }
    }
}

/// Bounds used for culling. Lines use their routed path so elbows and
/// curves are not clipped.
pub(crate) fn paint_bounds(element: &Element) -> Rect {
    match element.line_path() {
        Some(path) => path.bounds(),
        None => element.bounds(),
    }
}

/// Deterministic, idempotent painter of an [`ElementStore`].
///
/// Repaints are pulled: hosts call [`CanvasRenderer::mark_dirty`] (or share
/// [`CanvasRenderer::scheduler`] with a store subscriber) and forward each
/// platform frame to [`CanvasRenderer::on_animation_frame`].
pub struct CanvasRenderer<C: DrawContext> {
    ctx: C,
    config: RendererConfig,
    /// Logical (CSS) viewport size.
    viewport: Size,
    device_pixel_ratio: f64,
    frames: Rc<FrameScheduler>,
    images: ImageCache,
    frames_painted: u64,
}

impl<C: DrawContext> CanvasRenderer<C> {
    pub fn new(ctx: C, config: RendererConfig) -> Self {
        Self::with_scheduler(ctx, config, Rc::new(FrameScheduler::default()))
    }

    pub fn with_scheduler(ctx: C, config: RendererConfig, frames: Rc<FrameScheduler>) -> Self {
        let (w, h) = ctx.backing_size();
        Self {
            ctx,
            config,
            viewport: Size::new(w as f64, h as f64),
            device_pixel_ratio: 1.0,
            frames,
            images: ImageCache::new(),
            frames_painted: 0,
        }
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn into_context(self) -> C {
        self.ctx
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RendererConfig) {
        self.config = config;
        self.frames.mark_dirty();
    }

    /// Shared handle to the repaint scheduler.
    pub fn scheduler(&self) -> Rc<FrameScheduler> {
        Rc::clone(&self.frames)
    }

    /// Logical size and device pixel ratio of the drawing surface. The
    /// backing buffer follows on the next paint.
    pub fn set_viewport(&mut self, css_width: f64, css_height: f64, device_pixel_ratio: f64) {
        self.viewport = Size::new(css_width.max(0.0), css_height.max(0.0));
        self.device_pixel_ratio = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        self.frames.mark_dirty();
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Device-pixel size the backing buffer should have.
    pub fn backing_target(&self) -> (u32, u32) {
        (
            (self.viewport.width * self.device_pixel_ratio).round() as u32,
            (self.viewport.height * self.device_pixel_ratio).round() as u32,
        )
    }

    pub fn mark_dirty(&self) {
        self.frames.mark_dirty();
    }

    /// Frame callback. Repaints when something was marked dirty since the
    /// last paint and returns whether it did.
    pub fn on_animation_frame(&mut self, store: &ElementStore) -> bool {
        if !self.frames.take_frame() {
            return false;
        }
        self.paint(store);
        true
    }

    pub fn frames_painted(&self) -> u64 {
        self.frames_painted
    }

    pub fn screen_to_world(&self, store: &ElementStore, screen: Point) -> Point {
        store.camera().screen_to_world(screen)
    }

    pub fn world_to_screen(&self, store: &ElementStore, world: Point) -> Point {
        store.camera().world_to_screen(world)
    }

    /// World rectangle currently on screen.
    pub fn world_viewport(&self, store: &ElementStore) -> Rect {
        store.camera().visible_world_rect(self.viewport)
    }

    /// Topmost element under a world point.
    pub fn hit_test(&self, store: &ElementStore, world: Point) -> Option<ElementId> {
        let tolerance = store.config().hit_tolerance_px / store.zoom();
        hit::hit_test(store, world, tolerance)
    }

    /// Ids the next paint would draw in step order, after visibility, layer
    /// and viewport culling.
    pub fn paint_set(&self, store: &ElementStore) -> Vec<ElementId> {
        let layers = layer_visibility(store);
        let view = self.culling_rect(store);
        store
            .elements_ordered()
            .filter(|el| is_painted(el, &layers, view, store.editing_element()))
            .map(|el| el.id)
            .collect()
    }

    fn culling_rect(&self, store: &ElementStore) -> Rect {
        let margin = self.config.cull_margin.max(0.0);
        self.world_viewport(store).inflate(margin, margin)
    }

    /// Repaint the whole surface from `store`.
    pub fn paint(&mut self, store: &ElementStore) {
        self.frames.clear_dirty();
        self.frames_painted += 1;

        // Step 1: backing buffer follows the logical size.
        let target = self.backing_target();
        if self.ctx.backing_size() != target {
            log::debug!(
                "resizing backing buffer {:?} -> {:?} (dpr {})",
                self.ctx.backing_size(),
                target,
                self.device_pixel_ratio
            );
            self.ctx.resize_backing(target.0, target.1);
        }

        // Step 2: clear, then device scale, pan and zoom.
        self.ctx.save();
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear(self.config.background.into());
        let camera = store.camera();
        self.ctx
            .set_transform(Affine::scale(self.device_pixel_ratio) * camera.transform());
        let zoom = camera.zoom;
        let world_view = self.world_viewport(store);

        // Step 3: grid.
        if store.grid().visible {
            overlay::paint_grid(&mut self.ctx, self.config.grid, store.grid().size, world_view, zoom);
        }

        // Steps 4 and 5: per-frame layer lookup and the culling rectangle.
        let layers = layer_visibility(store);
        let view = self.culling_rect(store);

        // Step 6: elements in z-order.
        let editing = store.editing_element();
        self.images.retain(|id| store.contains(id));
        for element in store.elements_ordered() {
            if !is_painted(element, &layers, view, editing) {
                continue;
            }
            painters::paint_element(&mut self.ctx, element, &mut self.images);
        }

        // Step 7: transient overlays.
        self.paint_overlays(store, world_view, zoom);

        // Step 8.
        self.ctx.restore();
    }

    fn paint_overlays(&mut self, store: &ElementStore, world_view: Rect, zoom: f64) {
        let overlay = store.overlay();
        let selection_color: Color = self.config.selection_color.into();

        if let Some(preview) = &overlay.preview {
            self.ctx.save();
            self.ctx.set_global_alpha(self.config.preview_alpha);
            painters::paint_element(&mut self.ctx, preview, &mut self.images);
            self.ctx.restore();
        }

        if let Some(stroke) = store.factory().path(&overlay.path_preview) {
            painters::paint_element(&mut self.ctx, &stroke, &mut self.images);
        }

        if store.tool() == ToolKind::Line {
            overlay::paint_connection_points(
                &mut self.ctx,
                store,
                world_view,
                overlay.connection_hint,
                selection_color,
                zoom,
            );
        }

        overlay::paint_search_highlights(
            &mut self.ctx,
            store,
            self.config.search_color.into(),
            zoom,
        );
        overlay::paint_selection(&mut self.ctx, store, selection_color, zoom);
        if let Some(marquee) = overlay.marquee {
            overlay::paint_marquee(&mut self.ctx, marquee, selection_color, zoom);
        }
        overlay::paint_guides(&mut self.ctx, &overlay.guides, self.config.guide_color.into(), zoom);
    }
}

impl<C: DrawContext> CanvasView for CanvasRenderer<C> {
    fn hit_test(&self, store: &ElementStore, point: Point) -> Option<ElementId> {
        CanvasRenderer::hit_test(self, store, point)
    }

    fn mark_dirty(&mut self) {
        self.frames.mark_dirty();
    }
}

/// Layer id to visibility, built once per frame.
fn layer_visibility(store: &ElementStore) -> HashMap<&str, bool> {
    store
        .layers()
        .into_iter()
        .map(|layer| (layer.id.as_str(), layer.visible))
        .collect()
}

fn is_painted(
    element: &Element,
    layers: &HashMap<&str, bool>,
    view: Rect,
    editing: Option<ElementId>,
) -> bool {
    element.visible
        && !element.is_group()
        && layers.get(element.layer_id.as_str()).copied().unwrap_or(true)
        && editing != Some(element.id)
        && rects_intersect(paint_bounds(element), view)
}
