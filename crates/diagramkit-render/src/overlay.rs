//! Interaction chrome painted over the elements: grid, selection, handles,
//! guides, search hits and line-tool connection points.
//!
//! Sizes are in screen pixels and divided by zoom, so the chrome keeps a
//! constant on-screen size.

use crate::context::DrawContext;
use crate::renderer::GridStyle;
use diagramkit_core::elements::{Element, ElementKind};
use diagramkit_core::geometry::{
    self, ConnectionCandidate, HANDLE_SIZE, Handle, HandleKind, rects_intersect,
};
use diagramkit_core::{ElementStore, Guide};
use kurbo::{BezPath, Circle, Point, Rect, Shape, Stroke};
use peniko::Color;

/// Grids denser than this many screen pixels per cell are skipped.
const MIN_GRID_SPACING_PX: f64 = 4.0;

fn dashed(width: f64, zoom: f64) -> Stroke {
    let dash = 4.0 / zoom;
    Stroke::new(width / zoom).with_dashes(0.0, [dash, dash])
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Background grid covering `view`, batched into a single draw call.
pub(crate) fn paint_grid(ctx: &mut dyn DrawContext, style: GridStyle, size: f64, view: Rect, zoom: f64) {
    if style == GridStyle::None || size <= 0.0 || size * zoom < MIN_GRID_SPACING_PX {
        return;
    }
    let start_x = (view.x0 / size).floor() * size;
    let start_y = (view.y0 / size).floor() * size;
    let end_x = (view.x1 / size).ceil() * size;
    let end_y = (view.y1 / size).ceil() * size;

    let mut path = BezPath::new();
    match style {
        GridStyle::None => {}
        GridStyle::Lines => {
            let mut x = start_x;
            while x <= end_x {
                path.move_to((x, start_y));
                path.line_to((x, end_y));
                x += size;
            }
            let mut y = start_y;
            while y <= end_y {
                path.move_to((start_x, y));
                path.line_to((end_x, y));
                y += size;
            }
            ctx.stroke_path(
                &path,
                &Stroke::new(1.0 / zoom),
                Color::from_rgba8(200, 200, 200, 100),
            );
        }
        GridStyle::Dots => {
            let half = 1.5 / zoom;
            let mut x = start_x;
            while x <= end_x {
                let mut y = start_y;
                while y <= end_y {
                    path.extend(Rect::new(x - half, y - half, x + half, y + half).path_elements(0.1));
                    y += size;
                }
                x += size;
            }
            ctx.fill_path(&path, Color::from_rgba8(160, 160, 160, 70));
        }
    }
}

fn paint_handle(ctx: &mut dyn DrawContext, handle: &Handle, color: Color, zoom: f64) {
    let size = HANDLE_SIZE / zoom;
    let path = match handle.kind {
        HandleKind::Endpoint(_) | HandleKind::Rotate => {
            Circle::new(handle.position, size / 2.0 + 1.0 / zoom).to_path(0.1)
        }
        HandleKind::Corner(_) | HandleKind::Edge(_) => {
            Rect::from_center_size(handle.position, (size, size)).to_path(0.1)
        }
    };
    ctx.fill_path(&path, Color::WHITE);
    ctx.stroke_path(&path, &Stroke::new(1.5 / zoom), color);
}

fn paint_element_selection(
    ctx: &mut dyn DrawContext,
    store: &ElementStore,
    element: &Element,
    with_handles: bool,
    color: Color,
    zoom: f64,
) {
    match &element.kind {
        ElementKind::Line(_) => {
            if let Some((start, end)) = element.line_endpoints() {
                for handle in geometry::line_handles(start, end) {
                    paint_handle(ctx, &handle, color, zoom);
                }
            }
        }
        ElementKind::Group(_) => {
            if let Some(bounds) = store.element_bounds(element.id) {
                ctx.stroke_path(&bounds.to_path(0.1), &dashed(1.0, zoom), color);
            }
        }
        _ => {
            let rect = element.rect();
            let rotation = element.effective_rotation();
            let outline = polygon(&geometry::rotated_corners(rect, rotation));
            ctx.stroke_path(&outline, &dashed(1.0, zoom), color);
            if !with_handles {
                return;
            }
            let handles =
                geometry::resize_handles(rect, rotation, zoom, element.supports_rotation());
            let top = handles
                .iter()
                .find(|h| h.kind == HandleKind::Edge(geometry::Side::Top))
                .map(|h| h.position);
            for handle in &handles {
                if let (HandleKind::Rotate, Some(top)) = (handle.kind, top) {
                    let mut stem = BezPath::new();
                    stem.move_to(top);
                    stem.line_to(handle.position);
                    ctx.stroke_path(&stem, &Stroke::new(1.0 / zoom), color);
                }
                paint_handle(ctx, handle, color, zoom);
            }
        }
    }
}

/// Outlines for every selected element. Resize and rotate handles appear
/// only for a single interactive selection, matching what the select tool
/// can grab.
pub(crate) fn paint_selection(ctx: &mut dyn DrawContext, store: &ElementStore, color: Color, zoom: f64) {
    let selection = store.selection();
    let single = selection.len() == 1;
    for id in selection {
        let Some(element) = store.element(*id) else {
            continue;
        };
        if !store.is_displayed(*id) {
            continue;
        }
        let with_handles = single && store.is_interactive(*id);
        paint_element_selection(ctx, store, element, with_handles, color, zoom);
    }
    if selection.len() > 1 {
        if let Some(bounds) = store.selection_bounds() {
            let pad = 4.0 / zoom;
            ctx.stroke_path(
                &bounds.inflate(pad, pad).to_path(0.1),
                &dashed(1.0, zoom),
                color,
            );
        }
    }
}

pub(crate) fn paint_marquee(ctx: &mut dyn DrawContext, rect: Rect, color: Color, zoom: f64) {
    let path = rect.to_path(0.1);
    ctx.fill_path(&path, color.multiply_alpha(0.1));
    ctx.stroke_path(&path, &dashed(1.0, zoom), color);
}

pub(crate) fn paint_guides(ctx: &mut dyn DrawContext, guides: &[Guide], color: Color, zoom: f64) {
    if guides.is_empty() {
        return;
    }
    let mut path = BezPath::new();
    for guide in guides {
        match *guide {
            Guide::Vertical { x, from, to } => {
                path.move_to((x, from));
                path.line_to((x, to));
            }
            Guide::Horizontal { y, from, to } => {
                path.move_to((from, y));
                path.line_to((to, y));
            }
        }
    }
    ctx.stroke_path(&path, &Stroke::new(1.0 / zoom), color);
}

/// Boxes around search hits; the current hit is also tinted.
pub(crate) fn paint_search_highlights(
    ctx: &mut dyn DrawContext,
    store: &ElementStore,
    color: Color,
    zoom: f64,
) {
    let current = store.current_search_result();
    let pad = 4.0 / zoom;
    for id in store.search_results() {
        let Some(bounds) = store.element_bounds(*id) else {
            continue;
        };
        let path = bounds.inflate(pad, pad).to_path(0.1);
        if current == Some(*id) {
            ctx.fill_path(&path, color.multiply_alpha(0.2));
        }
        ctx.stroke_path(&path, &Stroke::new(2.0 / zoom), color);
    }
}

/// Side points of every connectable element in `view`, plus the snap target
/// the line tool is hovering.
pub(crate) fn paint_connection_points(
    ctx: &mut dyn DrawContext,
    store: &ElementStore,
    view: Rect,
    hint: Option<ConnectionCandidate>,
    color: Color,
    zoom: f64,
) {
    let radius = 3.0 / zoom;
    let mut dots = BezPath::new();
    for element in store.elements_ordered() {
        if !element.is_connectable()
            || !store.is_displayed(element.id)
            || !rects_intersect(element.bounds(), view)
        {
            continue;
        }
        for (_, point) in geometry::connection_points(element.rect(), element.effective_rotation()) {
            dots.extend(Circle::new(point, radius).path_elements(0.1));
        }
    }
    if !dots.elements().is_empty() {
        ctx.fill_path(&dots, Color::WHITE);
        ctx.stroke_path(&dots, &Stroke::new(1.0 / zoom), color);
    }
    if let Some(hint) = hint {
        let target = Circle::new(hint.point, 6.0 / zoom).to_path(0.1);
        ctx.fill_path(&target, color);
    }
}
