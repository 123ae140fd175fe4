//! DiagramKit Core Library
//!
//! Platform-agnostic element model, store, geometry, layout and tools for the
//! DiagramKit whiteboard engine.

pub mod camera;
pub mod config;
pub mod elements;
pub mod geometry;
pub mod hit;
pub mod layer;
pub mod layout;
pub mod routing;
pub mod snap;
pub mod store;
pub mod tools;

pub use camera::Camera;
pub use config::EngineConfig;
pub use elements::{Element, ElementId, ElementKind, ElementPatch};
pub use geometry::{ConnectionCandidate, Side};
pub use layer::{DEFAULT_LAYER_ID, Layer, LayerId};
pub use layout::{AlignDirection, DistributeAxis, LayoutMode};
pub use routing::LinePath;
pub use snap::Guide;
pub use store::{
    DiagramFile, ElementStore, GridSettings, ImportError, ImportOutcome, Overlay, StoreEvent,
    SubscriptionId,
};
pub use tools::{CanvasView, Cursor, HeadlessView, Tool, ToolKind, ToolManager};
