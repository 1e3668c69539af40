//! Drawing primitives for the Veil compositor.
//!
//! # Scope
//!
//! This crate provides the two surfaces transparency layers are built from:
//! - **Pixel buffers** - premultiplied RGBA with a recorded device pixel ratio
//! - **Canvases** - drawing sessions with pen, brush, font, transform, clip,
//!   opacity, blend mode and render hints, over either a pixel buffer or a
//!   recorded [`Picture`]
//!
//! Rasterization is done by tiny-skia; glyphs come from fontdue.
//!
//! # Architecture
//!
//! ```text
//! Canvas ──draw──▶ Device::Raster(PixelBuffer)   rasterize now
//!        └─draw──▶ Device::Recording(Picture)    replay later via draw_picture
//! ```

mod canvas;
mod error;
mod picture;
mod pixel_buffer;
mod raster;
mod state;
mod text;

pub use canvas::{Canvas, Device};
pub use error::{CanvasError, Result};
pub use picture::{DrawOp, Picture, Placement, RecordedCommand};
pub use pixel_buffer::PixelBuffer;
pub use state::{Brush, ClipRegion, PaintState, Pen, RenderHints};
pub use text::Font;

pub use tiny_skia::{BlendMode, Color, Path, PathBuilder, Point, Rect, Transform};
