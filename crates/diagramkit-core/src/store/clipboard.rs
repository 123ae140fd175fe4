//! Duplicate, copy and paste with id remapping.

use super::{ElementStore, StoreEvent};
use crate::elements::{Element, ElementId};
use kurbo::Vec2;
use std::collections::HashMap;
use uuid::Uuid;

/// Copied elements, detached from the document.
#[derive(Debug, Clone, Default)]
pub(super) struct Clipboard {
    /// Every copied element (roots plus descendants), in z-order.
    elements: Vec<Element>,
    /// Ids (within `elements`) of the top-level copied elements.
    roots: Vec<ElementId>,
    paste_count: u32,
}

/// Clone `source` with fresh ids, offset by `offset`.
///
/// Every internal reference (`group_id`, `child_ids`, `parent_id`, line
/// connections) is rewritten through the old→new map. References that
/// leave the set are dropped, except `parent_id`, which keeps pointing at
/// the original frame.
pub(crate) fn remap_elements(
    source: &[Element],
    offset: Vec2,
) -> (Vec<Element>, HashMap<ElementId, ElementId>) {
    let map: HashMap<ElementId, ElementId> =
        source.iter().map(|el| (el.id, Uuid::new_v4())).collect();

    let clones = source
        .iter()
        .map(|original| {
            let mut el = original.clone();
            el.id = map[&original.id];
            el.translate(offset);
            el.group_id = el.group_id.and_then(|g| map.get(&g).copied());
            el.parent_id = el.parent_id.map(|p| map.get(&p).copied().unwrap_or(p));
            if let Some(group) = el.as_group_mut() {
                group.child_ids = group
                    .child_ids
                    .iter()
                    .filter_map(|c| map.get(c).copied())
                    .collect();
            }
            if let Some(line) = el.as_line_mut() {
                for conn in [&mut line.start_connection, &mut line.end_connection] {
                    *conn = conn.and_then(|mut c| {
                        c.element_id = *map.get(&c.element_id)?;
                        Some(c)
                    });
                }
            }
            el
        })
        .collect();
    (clones, map)
}

impl ElementStore {
    /// Duplicate the selection (with all descendants) offset by the
    /// configured delta. The copies become the selection.
    pub fn duplicate_elements(&mut self) -> Vec<ElementId> {
        let roots = self.selection_roots();
        if roots.is_empty() {
            return Vec::new();
        }
        let source: Vec<Element> = self
            .expand_ids(&roots, false)
            .iter()
            .filter_map(|id| self.elements.get(id).cloned())
            .collect();
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);

        self.push_history_checkpoint();
        let new_roots = self.insert_remapped(&source, &roots, offset);
        log::debug!("duplicated {} elements", source.len());
        new_roots
    }

    /// Copy the selection (with descendants) to the internal clipboard.
    pub fn copy_elements(&mut self) {
        let roots = self.selection_roots();
        if roots.is_empty() {
            return;
        }
        let elements: Vec<Element> = self
            .expand_ids(&roots, false)
            .iter()
            .filter_map(|id| self.elements.get(id).cloned())
            .collect();
        log::debug!("copied {} elements", elements.len());
        self.clipboard = Clipboard {
            elements,
            roots,
            paste_count: 0,
        };
    }

    /// Paste the clipboard with fresh ids. Each paste is offset one step
    /// further than the previous. Returns the pasted top-level ids.
    pub fn paste_elements(&mut self) -> Vec<ElementId> {
        if self.clipboard.elements.is_empty() {
            return Vec::new();
        }
        self.clipboard.paste_count += 1;
        let step = self.config.paste_offset * f64::from(self.clipboard.paste_count);
        let source = self.clipboard.elements.clone();
        let roots = self.clipboard.roots.clone();

        self.push_history_checkpoint();
        let new_roots = self.insert_remapped(&source, &roots, Vec2::new(step, step));
        log::debug!("pasted {} elements", source.len());
        new_roots
    }

    pub fn has_clipboard(&self) -> bool {
        !self.clipboard.elements.is_empty()
    }

    fn selection_roots(&self) -> Vec<ElementId> {
        let mut roots = Vec::new();
        for id in &self.selection {
            if !self.elements.contains_key(id) {
                continue;
            }
            let root = self.top_level_group(*id);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    fn insert_remapped(
        &mut self,
        source: &[Element],
        roots: &[ElementId],
        offset: Vec2,
    ) -> Vec<ElementId> {
        let (clones, map) = remap_elements(source, offset);
        for mut el in clones {
            if self.layer(&el.layer_id).is_none() {
                el.layer_id = self.active_layer.clone();
            }
            if el
                .parent_id
                .is_some_and(|p| !map.values().any(|v| *v == p) && !self.elements.get(&p).is_some_and(Element::is_frame))
            {
                el.parent_id = None;
            }
            self.element_order.push(el.id);
            self.elements.insert(el.id, el);
        }
        let new_roots: Vec<ElementId> = roots.iter().filter_map(|r| map.get(r).copied()).collect();
        self.selection = new_roots.clone();
        self.prune_selection();
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::SelectionChanged);
        new_roots
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::shape_at;
    use super::*;
    use crate::elements::{Connection, ElementKind, ElementPatch, LineElement};
    use crate::geometry::Side;
    use std::collections::HashSet;

    #[test]
    fn test_remap_rewrites_internal_references() {
        let a = shape_at(0.0, 0.0, 10.0, 10.0);
        let mut line = LineElement::new(50.0, 0.0);
        line.start_connection = Some(Connection::new(a.id, Side::Right));
        line.end_connection = Some(Connection::new(Uuid::new_v4(), Side::Left));
        let l = Element::new(ElementKind::Line(line), 10.0, 5.0);

        let (clones, map) = remap_elements(&[a.clone(), l.clone()], Vec2::new(5.0, 0.0));
        let new_line = clones[1].as_line().unwrap();
        assert_eq!(new_line.start_connection.unwrap().element_id, map[&a.id]);
        assert!(new_line.end_connection.is_none());
        assert!((clones[0].x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_group_is_isolated() {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(shape_at(100.0, 0.0, 50.0, 50.0));
        store.set_selection(&[a, b]);
        let g = store.group_elements().unwrap();

        let copies = store.duplicate_elements();
        assert_eq!(copies.len(), 1);
        let g2 = copies[0];
        assert_ne!(g2, g);
        assert_eq!(store.len(), 6);

        let children = store.element(g2).unwrap().as_group().unwrap().child_ids.clone();
        let originals: HashSet<_> = [a, b, g].into_iter().collect();
        for child in &children {
            assert!(!originals.contains(child));
            assert_eq!(store.element(*child).unwrap().group_id, Some(g2));
        }

        store.update_element(
            children[0],
            &ElementPatch {
                x: Some(999.0),
                ..Default::default()
            },
        );
        assert!((store.element(a).unwrap().x).abs() < f64::EPSILON);
        assert!((store.element(children[0]).unwrap().x - 999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_offsets() {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(10.0, 10.0, 50.0, 50.0));
        store.select_element(a, false);
        let copy = store.duplicate_elements()[0];
        let el = store.element(copy).unwrap();
        assert!((el.x - 30.0).abs() < f64::EPSILON);
        assert_eq!(store.selection(), &[copy]);
    }

    #[test]
    fn test_paste_steps_offset() {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        store.select_element(a, false);
        store.copy_elements();
        store.delete_elements(&[a]);

        let first = store.paste_elements()[0];
        let second = store.paste_elements()[0];
        assert!((store.element(first).unwrap().x - 20.0).abs() < f64::EPSILON);
        assert!((store.element(second).unwrap().x - 40.0).abs() < f64::EPSILON);
        assert_ne!(first, second);
    }

    #[test]
    fn test_paste_empty_clipboard() {
        let mut store = ElementStore::new();
        assert!(store.paste_elements().is_empty());
        assert!(!store.has_clipboard());
    }
}
