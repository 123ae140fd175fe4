//! DiagramKit Render Library
//!
//! Paints an [`diagramkit_core::ElementStore`] through the [`DrawContext`]
//! abstraction. Backends: a recording display list for tests, a tiny-skia
//! pixmap for off-screen export and, with the default `vello-renderer`
//! feature, a Vello scene for GPU hosts.

mod context;
pub mod export;
mod frame;
mod overlay;
pub mod painters;
mod raster;
mod recording;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use context::{DrawContext, DrawState, FontSpec, RasterImage, StateStack};
pub use export::{ExportError, ExportScope, export_png, export_svg};
pub use frame::{FrameRequester, FrameScheduler};
pub use painters::ImageCache;
pub use raster::RasterContext;
pub use recording::{DrawCommand, RecordingContext};
pub use renderer::{CanvasRenderer, GridStyle, RendererConfig};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloContext;
