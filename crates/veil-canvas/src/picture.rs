//! Picture - a recorded sequence of drawing commands
//!
//! A picture is what a recording canvas produces instead of pixels. Every
//! command keeps the paint state it was issued under, so replaying the
//! picture onto another canvas reproduces the drawing at full vector
//! fidelity, re-expressed through the destination's transform, clip and
//! opacity.

use tiny_skia::{Path, Point};

use crate::pixel_buffer::PixelBuffer;
use crate::state::{Brush, PaintState, Pen};

/// Where a drawn pixel buffer is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Through the current transform, scaled by the buffer's own device
    /// pixel ratio so that it covers its logical size.
    Logical,
    /// In the target's raw physical pixels, ignoring transform and ratio.
    Device,
}

/// A single drawing operation.
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// Fill the interior of a path.
    Fill {
        /// Outline to fill.
        path: Path,
        /// Brush the interior is painted with.
        brush: Brush,
    },

    /// Stroke the outline of a path.
    Stroke {
        /// Outline to stroke.
        path: Path,
        /// Pen the outline is drawn with.
        pen: Pen,
    },

    /// Draw a line of text with the state's font and pen.
    Text {
        /// Start of the baseline.
        origin: Point,
        /// The text content to draw.
        text: String,
    },

    /// Composite a pixel buffer with the state's blend mode.
    Image {
        /// Top-left corner, in logical or device pixels per `placement`.
        origin: Point,
        /// Pixels to draw. Recording keeps its own copy.
        buffer: PixelBuffer,
        /// Coordinate space of `origin`.
        placement: Placement,
    },
}

/// A drawing operation together with the paint state it was issued under.
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    /// The operation.
    pub op: DrawOp,
    /// Paint state snapshot taken when the operation was recorded.
    pub state: PaintState,
}

/// A list of recorded drawing commands in painting order.
///
/// Commands are stored back to front, so replay simply iterates and
/// executes each one.
#[derive(Debug, Clone, Default)]
pub struct Picture {
    commands: Vec<RecordedCommand>,
}

impl Picture {
    /// Create an empty picture.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Add a command to the picture.
    pub fn push(&mut self, command: RecordedCommand) {
        self.commands.push(command);
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the picture is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
