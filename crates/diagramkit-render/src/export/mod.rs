//! Off-screen export of the document or the current selection.

mod png;
mod svg;

pub use self::png::export_png;
pub use self::svg::export_svg;

use crate::renderer::paint_bounds;
use diagramkit_core::elements::{Element, ElementKind};
use diagramkit_core::geometry::union_rects;
use diagramkit_core::hit::FRAME_LABEL_HEIGHT;
use diagramkit_core::{ElementId, ElementStore};
use kurbo::Rect;
use std::collections::HashSet;
use thiserror::Error;

/// Which elements an export covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportScope {
    #[default]
    All,
    /// Selected elements, group children and frame members.
    Selection,
    /// The given elements, expanded like `Selection`. Locked elements are
    /// allowed here.
    Elements(Vec<ElementId>),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("cannot allocate export surface: {0}")]
    Surface(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("SVG generation failed: {0}")]
    Svg(String),
}

/// Displayed, non-group elements in scope, in z-order.
pub(crate) fn collect_elements<'a>(
    store: &'a ElementStore,
    scope: &ExportScope,
) -> Vec<&'a Element> {
    let wanted: Option<HashSet<ElementId>> = match scope {
        ExportScope::All => None,
        ExportScope::Selection => Some(expand(store, store.selection())),
        ExportScope::Elements(ids) => Some(expand(store, ids)),
    };
    store
        .elements_ordered()
        .filter(|el| !el.is_group() && store.is_displayed(el.id))
        .filter(|el| wanted.as_ref().is_none_or(|ids| ids.contains(&el.id)))
        .collect()
}

fn expand(store: &ElementStore, roots: &[ElementId]) -> HashSet<ElementId> {
    let mut ids = HashSet::new();
    for &id in roots {
        ids.insert(id);
        ids.extend(store.descendants(id));
        for member in store.frame_members(id) {
            ids.insert(member);
            ids.extend(store.descendants(member));
        }
    }
    ids
}

/// Bounds of an element as exported, including a frame's label strip.
pub(crate) fn export_bounds(element: &Element) -> Rect {
    let bounds = paint_bounds(element);
    match &element.kind {
        ElementKind::Frame(frame) if !frame.name.is_empty() => {
            bounds.union(Rect::new(bounds.x0, bounds.y0 - FRAME_LABEL_HEIGHT, bounds.x1, bounds.y0))
        }
        _ => bounds,
    }
}

/// Combined bounds of the exported elements, or `Empty`.
pub(crate) fn content_bounds(elements: &[&Element]) -> Result<Rect, ExportError> {
    union_rects(elements.iter().map(|el| export_bounds(el))).ok_or(ExportError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagramkit_core::elements::{FrameElement, ShapeElement, ShapeVariant};

    fn shape(store: &mut ElementStore, x: f64, y: f64) -> ElementId {
        store.add_element(Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, 50.0, 50.0)),
            x,
            y,
        ))
    }

    #[test]
    fn test_selection_scope_keeps_z_order() {
        let mut store = ElementStore::new();
        let a = shape(&mut store, 0.0, 0.0);
        let b = shape(&mut store, 100.0, 0.0);
        let c = shape(&mut store, 200.0, 0.0);
        store.set_selection(&[c, a]);

        let ids: Vec<_> = collect_elements(&store, &ExportScope::Selection)
            .iter()
            .map(|el| el.id)
            .collect();
        assert_eq!(ids, vec![a, c]);
        assert!(!ids.contains(&b));
        assert_eq!(collect_elements(&store, &ExportScope::All).len(), 3);
    }

    #[test]
    fn test_explicit_ids_include_locked_elements() {
        let mut store = ElementStore::new();
        let mut locked = Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, 10.0, 10.0)),
            0.0,
            0.0,
        );
        locked.locked = true;
        let id = store.add_element(locked);
        shape(&mut store, 100.0, 0.0);

        store.set_selection(&[id]);
        assert!(collect_elements(&store, &ExportScope::Selection).is_empty());
        let ids: Vec<_> = collect_elements(&store, &ExportScope::Elements(vec![id]))
            .iter()
            .map(|el| el.id)
            .collect();
        assert_eq!(ids, vec![id]);
    }

    #[test]
    fn test_hidden_elements_not_exported() {
        let mut store = ElementStore::new();
        let mut hidden = Element::new(
            ElementKind::Shape(ShapeElement::new(ShapeVariant::Rectangle, 10.0, 10.0)),
            0.0,
            0.0,
        );
        hidden.visible = false;
        store.add_element(hidden);
        assert!(matches!(
            content_bounds(&collect_elements(&store, &ExportScope::All)),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn test_frame_bounds_include_label() {
        let el = Element::new(
            ElementKind::Frame(FrameElement::new(100.0, 100.0, "Frame")),
            0.0,
            50.0,
        );
        let bounds = export_bounds(&el);
        assert!((bounds.y0 - (50.0 - FRAME_LABEL_HEIGHT)).abs() < 1e-9);
        assert!((bounds.y1 - 150.0).abs() < 1e-9);
    }
}
