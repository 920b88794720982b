//! Sandbox View - camera and frame rendering
//!
//! The camera maps between world space (simulation units, Y down) and view
//! space (pixels). The canvas rasterizes a frame in software: background,
//! reference grid, then each sprite scaled by zoom and rotated by its body
//! angle. Finished frames go to a [`FrameSink`] together with HUD text.

pub mod camera;
pub mod canvas;
pub mod error;
pub mod frame;
pub mod rect;

pub use camera::{Camera, CameraConfig};
pub use canvas::{Canvas, GridStyle};
pub use error::ViewError;
pub use frame::{Anchor, Frame, FrameSink, MemorySink, PngSequenceSink, TextOverlay};
pub use rect::Rect;
