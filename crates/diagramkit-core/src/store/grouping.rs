//! Group and ungroup.

use super::{ElementStore, StoreEvent};
use crate::elements::{Element, ElementId, ElementKind, GroupElement};
use crate::layer::DEFAULT_LAYER_ID;
use std::collections::HashSet;

impl ElementStore {
    /// Group the selected top-level elements. Returns the new group's id,
    /// or None if fewer than two elements are selected.
    ///
    /// Children keep their z-order; the group sits just above its
    /// topmost child and becomes the selection.
    pub fn group_elements(&mut self) -> Option<ElementId> {
        let roots: HashSet<ElementId> = self
            .selection
            .iter()
            .filter(|id| self.elements.contains_key(*id))
            .map(|id| self.top_level_group(*id))
            .collect();
        let children: Vec<ElementId> = self
            .element_order
            .iter()
            .copied()
            .filter(|id| roots.contains(id))
            .collect();
        if children.len() < 2 {
            return None;
        }
        self.push_history_checkpoint();

        let origin = crate::geometry::union_rects(
            children.iter().filter_map(|id| self.element_bounds(*id)),
        )
        .map(|r| r.origin())
        .unwrap_or_default();
        let layer_id = self
            .elements
            .get(&children[0])
            .map(|el| el.layer_id.clone())
            .unwrap_or_else(|| DEFAULT_LAYER_ID.to_string());

        let mut group = Element::new(
            ElementKind::Group(GroupElement::new(children.clone())),
            origin.x,
            origin.y,
        );
        group.layer_id = layer_id;
        let group_id = group.id;
        for id in &children {
            if let Some(el) = self.elements.get_mut(id) {
                el.group_id = Some(group_id);
            }
        }

        let insert_at = self
            .element_order
            .iter()
            .rposition(|id| roots.contains(id))
            .map_or(self.element_order.len(), |pos| pos + 1);
        self.elements.insert(group_id, group);
        self.element_order.insert(insert_at, group_id);
        self.selection = vec![group_id];

        log::debug!("grouped {} elements into {group_id}", children.len());
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::SelectionChanged);
        Some(group_id)
    }

    /// Dissolve every selected group. Its children move up one level and
    /// replace it in the selection.
    pub fn ungroup_elements(&mut self) {
        let groups: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| self.elements.get(id).is_some_and(Element::is_group))
            .collect();
        if groups.is_empty() {
            return;
        }
        self.push_history_checkpoint();

        let mut new_selection: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| !groups.contains(id))
            .collect();
        for gid in &groups {
            let Some(group_el) = self.elements.remove(gid) else {
                continue;
            };
            let parent = group_el.group_id;
            let children = group_el
                .as_group()
                .map(|g| g.child_ids.clone())
                .unwrap_or_default();
            for child in &children {
                if let Some(el) = self.elements.get_mut(child) {
                    el.group_id = parent;
                }
            }
            if let Some(parent_group) = parent
                .and_then(|p| self.elements.get_mut(&p))
                .and_then(Element::as_group_mut)
            {
                if let Some(pos) = parent_group.child_ids.iter().position(|c| c == gid) {
                    parent_group.child_ids.splice(pos..=pos, children.iter().copied());
                }
            }
            new_selection.extend(children);
            log::debug!("ungrouped {gid}");
        }
        self.element_order.retain(|id| self.elements.contains_key(id));
        self.selection = new_selection;
        self.prune_selection();
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::SelectionChanged);
    }
}
