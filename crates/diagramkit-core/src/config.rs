//! Engine-wide tunables.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Configuration shared by the store, the tools and the layout services.
///
/// Distances suffixed `_px` are in screen pixels and get divided by the
/// current zoom before use; everything else is in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spacing of the background grid and of grid snapping.
    pub grid_size: f64,
    /// Maximum number of undo checkpoints kept.
    pub history_limit: usize,
    /// Offset applied to duplicated elements.
    pub duplicate_offset: f64,
    /// Offset applied per paste of the clipboard.
    pub paste_offset: f64,
    /// Radius of connection-point snapping for line endpoints.
    pub snap_radius_px: f64,
    /// Pick radius around selection handles.
    pub handle_tolerance_px: f64,
    /// Pick tolerance for hit-testing thin elements.
    pub hit_tolerance_px: f64,
    /// Drags shorter than this count as clicks.
    pub min_drag_distance: f64,
    /// Snap threshold for alignment guides while dragging.
    pub guide_threshold_px: f64,
    /// Size of a shape placed with a click instead of a drag.
    pub default_shape_size: Size,
    /// Size of a text box placed with a click instead of a drag.
    pub default_text_size: Size,
    /// Gap between elements in row, column and tree layouts.
    pub layout_gap: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            history_limit: 50,
            duplicate_offset: 20.0,
            paste_offset: 20.0,
            snap_radius_px: 15.0,
            handle_tolerance_px: 8.0,
            hit_tolerance_px: 4.0,
            min_drag_distance: 4.0,
            guide_threshold_px: 5.0,
            default_shape_size: Size::new(120.0, 80.0),
            default_text_size: Size::new(160.0, 40.0),
            layout_gap: 40.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"grid_size": 10.0}"#).unwrap();
        assert!((config.grid_size - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.history_limit, 50);
    }
}
