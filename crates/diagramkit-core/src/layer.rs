//! Named visibility/lock groupings, independent of z-order.

use crate::elements::SerializableColor;
use serde::{Deserialize, Serialize};

pub type LayerId = String;

/// Id of the layer that always exists and can never be deleted.
pub const DEFAULT_LAYER_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Swatch shown next to the layer in a host panel.
    pub color: SerializableColor,
    pub visible: bool,
    pub locked: bool,
    /// Sort key for layer panels. Lower comes first.
    pub order: i32,
}

impl Layer {
    pub fn new(id: impl Into<LayerId>, name: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: SerializableColor::new(0x3b, 0x82, 0xf6, 255),
            visible: true,
            locked: false,
            order,
        }
    }

    pub fn default_layer() -> Self {
        Self::new(DEFAULT_LAYER_ID, "Default", 0)
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_LAYER_ID
    }

    /// Whether elements on this layer respond to the pointer.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layer() {
        let layer = Layer::default_layer();
        assert!(layer.is_default());
        assert!(layer.is_interactive());
        assert_eq!(layer.order, 0);
    }

    #[test]
    fn test_layer_json_shape() {
        let value = serde_json::to_value(Layer::new("l1", "Notes", 2)).unwrap();
        assert_eq!(value["id"], "l1");
        assert_eq!(value["order"], 2);
        assert_eq!(value["color"], "#3b82f6");
    }
}
