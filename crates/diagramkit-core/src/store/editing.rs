//! Inline text editing.
//!
//! While an element is being edited the host draws its own text input over
//! it and the renderer skips painting it.

use super::{ElementStore, StoreEvent};
use crate::elements::{ElementId, ElementKind};

impl ElementStore {
    /// Start editing the text of a shape, text box, line label or frame name.
    /// Returns false (and changes nothing) for other kinds or locked elements.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        let editable = self.elements.get(&id).is_some_and(|el| {
            matches!(
                el.kind,
                ElementKind::Shape(_) | ElementKind::Text(_) | ElementKind::Line(_) | ElementKind::Frame(_)
            )
        });
        if !editable || !self.is_interactive(id) {
            return false;
        }
        self.editing = Some(id);
        self.emit(StoreEvent::OverlayChanged);
        true
    }

    /// Element currently in inline-edit mode.
    pub fn editing_element(&self) -> Option<ElementId> {
        self.editing
    }

    /// Current text of the element being edited.
    pub fn editing_text(&self) -> Option<String> {
        let el = self.elements.get(&self.editing?)?;
        Some(match &el.kind {
            ElementKind::Shape(s) => s.text.clone().unwrap_or_default(),
            ElementKind::Text(t) => t.content.clone(),
            ElementKind::Line(l) => l.label.clone().unwrap_or_default(),
            ElementKind::Frame(f) => f.name.clone(),
            _ => String::new(),
        })
    }

    /// Write `text` into the edited element and leave edit mode.
    ///
    /// A text box committed empty is deleted; an empty shape text or line
    /// label is cleared.
    pub fn commit_text_edit(&mut self, text: &str) {
        let Some(id) = self.editing.take() else {
            return;
        };
        let Some(el) = self.elements.get(&id) else {
            self.emit(StoreEvent::OverlayChanged);
            return;
        };
        let empty = text.trim().is_empty();
        if let (true, ElementKind::Text(existing)) = (empty, &el.kind) {
            log::debug!("empty text box {id} removed on commit");
            // A box that was empty before editing is a fresh placement whose
            // checkpoint the placing tool already took.
            let fresh = existing.content.trim().is_empty();
            if fresh {
                self.remove_elements(&[id]);
            } else {
                self.delete_elements(&[id]);
            }
            self.emit(StoreEvent::OverlayChanged);
            return;
        }

        self.push_history_checkpoint();
        let optional = (!empty).then(|| text.to_string());
        if let Some(el) = self.elements.get_mut(&id) {
            match &mut el.kind {
                ElementKind::Shape(s) => s.text = optional,
                ElementKind::Text(t) => t.content = text.to_string(),
                ElementKind::Line(l) => l.label = optional,
                ElementKind::Frame(f) => f.name = text.to_string(),
                _ => {}
            }
        }
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::OverlayChanged);
    }

    /// Leave edit mode without changing anything.
    pub fn cancel_text_edit(&mut self) {
        if self.editing.take().is_some() {
            self.emit(StoreEvent::OverlayChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::shape_at;
    use crate::store::ElementStore;
    use kurbo::Rect;

    #[test]
    fn test_commit_shape_text() {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(0.0, 0.0, 100.0, 50.0));
        assert!(store.begin_text_edit(a));
        assert_eq!(store.editing_element(), Some(a));
        assert_eq!(store.editing_text().as_deref(), Some(""));

        store.commit_text_edit("Hello");
        assert_eq!(store.editing_element(), None);
        let el = store.element(a).unwrap();
        assert_eq!(el.searchable_text(), vec!["Hello"]);
        assert!(store.can_undo());
    }

    #[test]
    fn test_empty_text_box_is_removed() {
        let mut store = ElementStore::new();
        let t = store.add_element(store.factory().text(Rect::new(0.0, 0.0, 100.0, 40.0), ""));
        store.begin_text_edit(t);
        store.commit_text_edit("   ");
        assert!(store.element(t).is_none());
    }

    #[test]
    fn test_placed_then_abandoned_text_undoes_in_one_step() {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        store.push_history_checkpoint();
        let t = store.add_element(store.factory().text(Rect::new(0.0, 100.0, 100.0, 140.0), ""));
        store.begin_text_edit(t);
        store.commit_text_edit("");
        assert!(store.element(t).is_none());

        assert!(store.undo());
        assert!(store.element(t).is_none());
        assert!(store.contains(a));
        assert!(!store.can_undo());
    }

    #[test]
    fn test_clearing_existing_text_box_is_undoable() {
        let mut store = ElementStore::new();
        let t = store.add_element(store.factory().text(Rect::new(0.0, 0.0, 100.0, 40.0), "note"));
        store.begin_text_edit(t);
        store.commit_text_edit("");
        assert!(store.element(t).is_none());

        assert!(store.undo());
        assert_eq!(store.element(t).unwrap().searchable_text(), vec!["note"]);
    }

    #[test]
    fn test_cancel_keeps_text() {
        let mut store = ElementStore::new();
        let t = store.add_element(store.factory().text(Rect::new(0.0, 0.0, 100.0, 40.0), "keep"));
        store.begin_text_edit(t);
        store.cancel_text_edit();
        assert_eq!(store.editing_element(), None);
        assert_eq!(store.element(t).unwrap().searchable_text(), vec!["keep"]);
        assert!(!store.can_undo());
    }

    #[test]
    fn test_groups_are_not_editable() {
        let mut store = ElementStore::new();
        let a = store.add_element(shape_at(0.0, 0.0, 50.0, 50.0));
        let b = store.add_element(shape_at(100.0, 0.0, 50.0, 50.0));
        store.set_selection(&[a, b]);
        let g = store.group_elements().unwrap();
        assert!(!store.begin_text_edit(g));
    }
}
