//! Integer device-space geometry.
//!
//! Layer rectangles and offsets are whole pixels in the destination's
//! coordinate space, so they get their own integer types rather than the
//! float rectangles the canvas draws with.

use serde::Serialize;

/// A point with integer coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IntPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl IntPoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with an integer origin and size.
///
/// A rectangle with zero width or height is empty but still has a
/// well-defined origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IntRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl IntRect {
    /// Create a rectangle from its origin and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The top-left corner.
    #[must_use]
    pub const fn top_left(&self) -> IntPoint {
        IntPoint::new(self.x, self.y)
    }

    /// Whether the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `point` lies inside the rectangle (right/bottom edges excluded).
    #[must_use]
    pub fn contains(&self, point: IntPoint) -> bool {
        let dx = i64::from(point.x) - i64::from(self.x);
        let dy = i64::from(point.y) - i64::from(self.y);
        dx >= 0 && dy >= 0 && dx < i64::from(self.width) && dy < i64::from(self.height)
    }
}
