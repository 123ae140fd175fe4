//! Cascading delete and group collapse.

use super::{ElementStore, StoreEvent};
use crate::elements::{Element, ElementId};
use std::collections::HashSet;

impl ElementStore {
    /// Delete elements. Groups take all of their descendants with them;
    /// deleted children leave their group's `child_ids`; lines connected to
    /// a deleted element lose that connection; frame members are detached.
    /// A group left with one child is dissolved, an empty one removed.
    /// Unknown ids are ignored.
    pub fn delete_elements(&mut self, ids: &[ElementId]) {
        if ids.iter().any(|id| self.elements.contains_key(id)) {
            self.push_history_checkpoint();
        }
        self.remove_elements(ids);
    }

    /// `delete_elements` without a history checkpoint, for callers that
    /// already took one.
    pub(super) fn remove_elements(&mut self, ids: &[ElementId]) {
        let doomed: HashSet<ElementId> = self.expand_ids(ids, false).into_iter().collect();
        if doomed.is_empty() {
            return;
        }

        let mut affected_groups = Vec::new();
        for id in &doomed {
            if let Some(el) = self.elements.remove(id) {
                if let Some(gid) = el.group_id.filter(|g| !doomed.contains(g)) {
                    affected_groups.push(gid);
                }
            }
        }
        for gid in &affected_groups {
            if let Some(group) = self.elements.get_mut(gid).and_then(Element::as_group_mut) {
                group.child_ids.retain(|c| !doomed.contains(c));
            }
        }

        let mut disconnected = 0;
        for el in self.elements.values_mut() {
            if el.parent_id.is_some_and(|p| doomed.contains(&p)) {
                el.parent_id = None;
            }
            if let Some(line) = el.as_line_mut() {
                for id in &doomed {
                    if line.disconnect(*id) {
                        disconnected += 1;
                    }
                }
            }
        }

        let collapsed = self.collapse_groups(affected_groups);
        self.element_order.retain(|id| self.elements.contains_key(id));
        self.selection.retain(|id| self.elements.contains_key(id));
        if self.editing.is_some_and(|id| !self.elements.contains_key(&id)) {
            self.editing = None;
        }
        self.search.retain_existing(&self.elements);

        log::debug!(
            "deleted {} elements, {collapsed} groups collapsed, {disconnected} connections cleared",
            doomed.len()
        );
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::SelectionChanged);
    }

    /// Delete the current selection.
    pub fn delete_selection(&mut self) {
        let ids = self.selection.clone();
        self.delete_elements(&ids);
    }

    /// Dissolve groups with fewer than two children, walking up the tree as
    /// parents lose members. Returns how many groups were removed.
    pub(super) fn collapse_groups(&mut self, mut pending: Vec<ElementId>) -> usize {
        let mut removed = 0;
        while let Some(gid) = pending.pop() {
            let Some(group_el) = self.elements.get(&gid) else {
                continue;
            };
            let Some(group) = group_el.as_group() else {
                continue;
            };
            if group.child_ids.len() >= 2 {
                continue;
            }
            let parent = group_el.group_id;
            let only_child = group.child_ids.first().copied();

            self.elements.remove(&gid);
            removed += 1;
            if let Some(child) = only_child.and_then(|c| self.elements.get_mut(&c)) {
                child.group_id = parent;
            }
            if let Some(parent_group) = parent
                .and_then(|p| self.elements.get_mut(&p))
                .and_then(Element::as_group_mut)
            {
                match only_child {
                    Some(child) => {
                        for c in parent_group.child_ids.iter_mut().filter(|c| **c == gid) {
                            *c = child;
                        }
                    }
                    None => {
                        parent_group.remove_child(gid);
                    }
                }
            }
            if let Some(pid) = parent {
                pending.push(pid);
            }
            if let Some(pos) = self.selection.iter().position(|&s| s == gid) {
                match only_child {
                    Some(child) if !self.selection.contains(&child) => self.selection[pos] = child,
                    _ => {
                        self.selection.remove(pos);
                    }
                }
            }
        }
        if removed > 0 {
            self.element_order.retain(|id| self.elements.contains_key(id));
        }
        removed
    }
}
