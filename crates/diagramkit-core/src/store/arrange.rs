//! Alignment, distribution and auto-layout of the selection.

use super::ElementStore;
use crate::elements::{Element, ElementId};
use crate::layout::{self, AlignDirection, DistributeAxis, LayoutMode, Move};
use kurbo::Rect;
use std::collections::HashSet;

impl ElementStore {
    /// Top-level selected elements with their bounds. Lines are left out
    /// (they follow their connections), as are frame members whose frame
    /// is selected too (they move with it).
    fn arrange_items(&self) -> Vec<(ElementId, Rect)> {
        let mut roots: Vec<ElementId> = Vec::new();
        for id in &self.selection {
            if !self.elements.contains_key(id) {
                continue;
            }
            let root = self.top_level_group(*id);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        let selected: HashSet<ElementId> = roots.iter().copied().collect();
        roots
            .into_iter()
            .filter_map(|id| {
                let el = self.elements.get(&id)?;
                if el.as_line().is_some() || el.parent_id.is_some_and(|p| selected.contains(&p)) {
                    return None;
                }
                Some((id, self.element_bounds(id)?))
            })
            .collect()
    }

    fn apply_moves(&mut self, moves: Vec<Move>) -> bool {
        if moves.is_empty() {
            return false;
        }
        self.push_history_checkpoint();
        for (id, delta) in moves {
            self.move_elements(&[id], delta);
        }
        true
    }

    /// Align the selection to one edge or centre of its combined bounds.
    /// Returns false when fewer than two elements take part.
    pub fn align_elements(&mut self, direction: AlignDirection) -> bool {
        let moves = layout::align(&self.arrange_items(), direction);
        self.apply_moves(moves)
    }

    /// Space the selection's centres evenly. Needs three or more elements.
    pub fn distribute_elements(&mut self, axis: DistributeAxis) -> bool {
        let moves = layout::distribute(&self.arrange_items(), axis);
        self.apply_moves(moves)
    }

    /// Re-arrange the selection. Tree mode derives its hierarchy from
    /// lines connecting the selected elements.
    pub fn auto_layout(&mut self, mode: LayoutMode) -> bool {
        let items = self.arrange_items();
        let edges = if mode == LayoutMode::Tree {
            self.connection_edges(&items)
        } else {
            Vec::new()
        };
        let moves = layout::auto_layout(&items, mode, &edges, self.config.layout_gap);
        log::debug!("auto layout {mode:?}: {} of {} elements move", moves.len(), items.len());
        self.apply_moves(moves)
    }

    /// Start→end links between the given items, from connected lines.
    fn connection_edges(&self, items: &[(ElementId, Rect)]) -> Vec<(ElementId, ElementId)> {
        let ids: HashSet<ElementId> = items.iter().map(|(id, _)| *id).collect();
        self.elements_ordered()
            .filter_map(Element::as_line)
            .filter_map(|line| {
                let from = self.top_level_group(line.start_connection?.element_id);
                let to = self.top_level_group(line.end_connection?.element_id);
                (ids.contains(&from) && ids.contains(&to)).then_some((from, to))
            })
            .collect()
    }
}
