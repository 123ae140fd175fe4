//! Undo/redo checkpoints.

use super::{ElementStore, StoreEvent};
use crate::elements::{Element, ElementId};
use crate::layer::Layer;
use std::collections::HashMap;

/// A snapshot of document state for undo.
#[derive(Debug, Clone)]
struct Snapshot {
    elements: HashMap<ElementId, Element>,
    element_order: Vec<ElementId>,
    layers: Vec<Layer>,
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub(super) struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl History {
    pub(super) fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub(super) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl ElementStore {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            elements: self.elements.clone(),
            element_order: self.element_order.clone(),
            layers: self.layers.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.elements = snapshot.elements;
        self.element_order = snapshot.element_order;
        self.layers = snapshot.layers;
        if self.layer(&self.active_layer).is_none() {
            self.active_layer = crate::layer::DEFAULT_LAYER_ID.to_string();
        }
        if self.editing.is_some_and(|id| !self.elements.contains_key(&id)) {
            self.editing = None;
        }
        self.prune_selection();
        self.search.retain_existing(&self.elements);
    }

    /// Record the current elements, order and layers as an undo point
    /// (call before making changes). Clears the redo stack.
    pub fn push_history_checkpoint(&mut self) {
        let snapshot = self.snapshot();
        self.history.undo_stack.push(snapshot);
        self.history.redo_stack.clear();
        if self.history.undo_stack.len() > self.history.limit {
            self.history.undo_stack.remove(0);
        }
    }

    /// Returns true if undo was performed.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.history.redo_stack.push(current);
        self.restore(snapshot);
        log::debug!("undo ({} left)", self.history.undo_stack.len());
        self.emit_restored();
        true
    }

    /// Returns true if redo was performed.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.history.undo_stack.push(current);
        self.restore(snapshot);
        log::debug!("redo ({} left)", self.history.redo_stack.len());
        self.emit_restored();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    fn emit_restored(&mut self) {
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::LayersChanged);
        self.emit(StoreEvent::SelectionChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::shape_at;
    use crate::config::EngineConfig;
    use crate::elements::ElementPatch;
    use crate::store::ElementStore;

    #[test]
    fn test_undo_redo() {
        let mut store = ElementStore::new();
        assert!(!store.can_undo());

        store.push_history_checkpoint();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        assert!(store.can_undo());

        assert!(store.undo());
        assert!(store.element(a).is_none());
        assert!(store.can_redo());

        assert!(store.redo());
        assert!(store.element(a).is_some());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_new_checkpoint_clears_redo() {
        let mut store = ElementStore::new();
        store.push_history_checkpoint();
        store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        store.undo();
        assert!(store.can_redo());
        store.push_history_checkpoint();
        assert!(!store.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut store = ElementStore::with_config(EngineConfig {
            history_limit: 3,
            ..Default::default()
        });
        for _ in 0..5 {
            store.push_history_checkpoint();
            store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        }
        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut store = ElementStore::new();
        store.push_history_checkpoint();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        store.select_element(a, false);
        store.undo();
        assert!(store.selection().is_empty());

        store.redo();
        store.push_history_checkpoint();
        store.update_element(
            a,
            &ElementPatch {
                x: Some(99.0),
                ..Default::default()
            },
        );
        store.undo();
        assert!((store.element(a).unwrap().x).abs() < f64::EPSILON);
    }
}
