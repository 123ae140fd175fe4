//! Z-order actions on the current selection.

use super::{ElementStore, StoreEvent};
use crate::elements::ElementId;
use std::collections::HashSet;

impl ElementStore {
    /// Selection plus group descendants, in z-order.
    fn ordered_selection(&self) -> Vec<ElementId> {
        self.expand_ids(&self.selection, false)
    }

    /// Move the selection to the top of the z-order, keeping its internal order.
    pub fn bring_to_front(&mut self) {
        let moving = self.ordered_selection();
        if moving.is_empty() {
            return;
        }
        self.push_history_checkpoint();
        let set: HashSet<ElementId> = moving.iter().copied().collect();
        self.element_order.retain(|id| !set.contains(id));
        self.element_order.extend(moving);
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Move the selection to the bottom of the z-order.
    pub fn send_to_back(&mut self) {
        let moving = self.ordered_selection();
        if moving.is_empty() {
            return;
        }
        self.push_history_checkpoint();
        let set: HashSet<ElementId> = moving.iter().copied().collect();
        self.element_order.retain(|id| !set.contains(id));
        self.element_order.splice(0..0, moving);
        self.emit(StoreEvent::ElementsChanged);
    }

    /// Move each selected element one step towards the front.
    /// Returns true if anything moved.
    pub fn bring_forward(&mut self) -> bool {
        let moving = self.ordered_selection();
        let set: HashSet<ElementId> = moving.iter().copied().collect();
        let can_move = moving.iter().any(|id| {
            self.element_order
                .iter()
                .position(|o| o == id)
                .is_some_and(|pos| {
                    self.element_order[pos + 1..]
                        .iter()
                        .any(|o| !set.contains(o))
                })
        });
        if !can_move {
            return false;
        }
        self.push_history_checkpoint();
        for id in moving.iter().rev() {
            if let Some(pos) = self.element_order.iter().position(|o| o == id) {
                if pos + 1 < self.element_order.len() && !set.contains(&self.element_order[pos + 1]) {
                    self.element_order.swap(pos, pos + 1);
                }
            }
        }
        self.emit(StoreEvent::ElementsChanged);
        true
    }

    /// Move each selected element one step towards the back.
    /// Returns true if anything moved.
    pub fn send_backward(&mut self) -> bool {
        let moving = self.ordered_selection();
        let set: HashSet<ElementId> = moving.iter().copied().collect();
        let can_move = moving.iter().any(|id| {
            self.element_order
                .iter()
                .position(|o| o == id)
                .is_some_and(|pos| self.element_order[..pos].iter().any(|o| !set.contains(o)))
        });
        if !can_move {
            return false;
        }
        self.push_history_checkpoint();
        for id in &moving {
            if let Some(pos) = self.element_order.iter().position(|o| o == id) {
                if pos > 0 && !set.contains(&self.element_order[pos - 1]) {
                    self.element_order.swap(pos, pos - 1);
                }
            }
        }
        self.emit(StoreEvent::ElementsChanged);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::shape_at;
    use crate::store::ElementStore;

    fn three() -> (ElementStore, [uuid::Uuid; 3]) {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(shape_at(10.0, 0.0, 50.0, 50.0));
        let c = store.add_element(shape_at(20.0, 0.0, 50.0, 50.0));
        (store, [a, b, c])
    }

    #[test]
    fn test_bring_to_front_and_back() {
        let (mut store, [a, b, c]) = three();
        store.select_element(a, false);
        store.bring_to_front();
        assert_eq!(store.element_order(), &[b, c, a]);
        store.send_to_back();
        assert_eq!(store.element_order(), &[a, b, c]);
    }

    #[test]
    fn test_bring_forward_one_step() {
        let (mut store, [a, b, c]) = three();
        store.select_element(a, false);
        assert!(store.bring_forward());
        assert_eq!(store.element_order(), &[b, a, c]);
        assert!(store.bring_forward());
        assert!(!store.bring_forward());
        assert_eq!(store.element_order(), &[b, c, a]);
    }

    #[test]
    fn test_send_backward_block() {
        let (mut store, [a, b, c]) = three();
        store.set_selection(&[b, c]);
        assert!(store.send_backward());
        assert_eq!(store.element_order(), &[b, c, a]);
        assert!(!store.send_backward());
    }
}
