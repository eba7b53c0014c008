//! Nebula Render - drawing surfaces for the backdrop engine
//!
//! Particle systems never touch pixels directly. They issue draw calls in
//! logical units against a [`Canvas`], and the [`SurfaceManager`] keeps each
//! canvas's backing size and scale transform in step with the viewport and
//! device pixel ratio.
//!
//! Two canvases ship with the crate:
//! - [`RecordingCanvas`] keeps a log of draw commands (tests, headless stats)
//! - [`RasterCanvas`] rasterizes into an RGBA image for PNG output

mod canvas;
mod raster;
mod recording;
mod surface;

pub use canvas::{BlendMode, Canvas};
pub use raster::{composite_layers, save_image, RasterCanvas};
pub use recording::{DrawCommand, RecordingCanvas};
pub use surface::{
    Surface, SurfaceKind, SurfaceManager, SurfaceMapping, SurfaceSet, SINK_LOGICAL_SIZE,
};
