//! Layer actions.

use super::{ElementStore, StoreEvent};
use crate::elements::ElementId;
use crate::layer::{DEFAULT_LAYER_ID, Layer, LayerId};
use uuid::Uuid;

impl ElementStore {
    /// Layers sorted by `order`.
    pub fn layers(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.order);
        layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn active_layer(&self) -> &LayerId {
        &self.active_layer
    }

    pub(crate) fn layer_is_visible(&self, id: &str) -> bool {
        self.layer(id).is_none_or(|l| l.visible)
    }

    pub(crate) fn layer_is_interactive(&self, id: &str) -> bool {
        self.layer(id).is_none_or(Layer::is_interactive)
    }

    /// Add a layer above all others and return its id.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let order = self.layers.iter().map(|l| l.order).max().unwrap_or(0) + 1;
        let layer = Layer::new(Uuid::new_v4().to_string(), name, order);
        let id = layer.id.clone();
        self.layers.push(layer);
        self.emit(StoreEvent::LayersChanged);
        id
    }

    /// Delete a layer, moving its elements to the default layer. The
    /// default layer cannot be deleted.
    pub fn delete_layer(&mut self, id: &str) {
        if id == DEFAULT_LAYER_ID || self.layer(id).is_none() {
            return;
        }
        self.push_history_checkpoint();
        self.layers.retain(|l| l.id != id);
        let mut moved = 0;
        for el in self.elements.values_mut() {
            if el.layer_id == id {
                el.layer_id = DEFAULT_LAYER_ID.to_string();
                moved += 1;
            }
        }
        if self.active_layer == id {
            self.active_layer = DEFAULT_LAYER_ID.to_string();
        }
        log::debug!("deleted layer {id}, {moved} elements moved to default");
        self.prune_selection();
        self.emit(StoreEvent::LayersChanged);
        if moved > 0 {
            self.emit(StoreEvent::ElementsChanged);
        }
    }

    pub fn rename_layer(&mut self, id: &str, name: impl Into<String>) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) {
            layer.name = name.into();
            self.emit(StoreEvent::LayersChanged);
        }
    }

    pub fn set_layer_visible(&mut self, id: &str, visible: bool) {
        self.update_layer(id, |l| l.visible = visible);
    }

    /// Locking a layer drops its elements from the selection.
    pub fn set_layer_locked(&mut self, id: &str, locked: bool) {
        self.update_layer(id, |l| l.locked = locked);
    }

    /// Change a layer's sort key.
    pub fn move_layer(&mut self, id: &str, order: i32) {
        self.update_layer(id, |l| l.order = order);
    }

    fn update_layer(&mut self, id: &str, update: impl FnOnce(&mut Layer)) {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return;
        };
        update(layer);
        let before = self.selection.len();
        self.prune_selection();
        self.emit(StoreEvent::LayersChanged);
        if before != self.selection.len() {
            self.emit(StoreEvent::SelectionChanged);
        }
    }

    /// Layer that newly created elements go to.
    pub fn set_active_layer(&mut self, id: &str) {
        if self.layer(id).is_some() {
            self.active_layer = id.to_string();
            self.emit(StoreEvent::LayersChanged);
        }
    }

    /// Move the selection (and group descendants) to another layer.
    pub fn move_selection_to_layer(&mut self, id: &str) {
        if self.layer(id).is_none() || self.selection.is_empty() {
            return;
        }
        self.push_history_checkpoint();
        let ids: Vec<ElementId> = self.expand_ids(&self.selection.clone(), false);
        for el_id in ids {
            if let Some(el) = self.elements.get_mut(&el_id) {
                el.layer_id = id.to_string();
            }
        }
        self.prune_selection();
        self.emit(StoreEvent::ElementsChanged);
        self.emit(StoreEvent::SelectionChanged);
    }
}
