//! Groups own an ordered list of children and draw nothing themselves.

use super::ElementId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupElement {
    #[serde(default)]
    pub child_ids: Vec<ElementId>,
}

impl GroupElement {
    pub fn new(child_ids: Vec<ElementId>) -> Self {
        Self { child_ids }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.child_ids.contains(&id)
    }

    /// Remove `id` from the children. Returns true if it was present.
    pub fn remove_child(&mut self, id: ElementId) -> bool {
        let before = self.child_ids.len();
        self.child_ids.retain(|&c| c != id);
        before != self.child_ids.len()
    }
}
