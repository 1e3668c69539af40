//! Errors surfaced by the pixel-buffer primitive.

use thiserror::Error;

/// Failure to create or fill a [`PixelBuffer`](crate::PixelBuffer).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    /// The rasterizer refused to allocate a buffer of this physical size.
    #[error("failed to allocate a {width}x{height} pixel buffer")]
    Allocation {
        /// Requested physical width.
        width: u32,
        /// Requested physical height.
        height: u32,
    },

    /// Device pixel ratios must be finite and strictly positive.
    #[error("invalid device pixel ratio {0}")]
    InvalidPixelRatio(f32),

    /// Raw pixel data did not match the declared dimensions.
    #[error("expected {expected} bytes of RGBA data, got {actual}")]
    DataLength {
        /// `width * height * 4`.
        expected: usize,
        /// Length of the slice that was passed in.
        actual: usize,
    },

    /// Font data could not be parsed.
    #[error("invalid font data: {0}")]
    InvalidFont(String),
}

/// Result alias for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;
