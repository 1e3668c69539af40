//! Common utilities for the Veil compositor.
//!
//! This crate provides shared infrastructure used by the canvas and layer crates:
//! - **Warning System** - colored, deduplicated terminal output for recoverable misuse
//! - **Geometry** - integer rectangles and points for layer bounds

pub mod geometry;
pub mod warning;

pub use geometry::{IntPoint, IntRect};
