//! Alpha-mask layers: rasterize offscreen, multiply by a mask, composite.
//!
//! The layer covers a rectangle of the destination. Its buffer is allocated
//! at the destination's device pixel ratio so the mask, which is already in
//! physical pixels, lines up 1:1 with the layer content:
//!
//! ```text
//!  dest logical ──translate(-offset) ∘ dest.transform──▶ layer logical
//!  layer logical ──scale(ratio)──▶ layer physical ◀──1:1── mask
//! ```
//!
//! On finalize the buffer is drawn back at `offset` with the destination's
//! transform reset, so the round trip is the identity for anything drawn
//! inside the rectangle.

use veil_canvas::{Canvas, PixelBuffer, Point, Result};
use veil_common::{IntPoint, IntRect};
use veil_common::warning::warn_once;

/// A layer whose rasterized content is clipped by the alpha channel of a
/// mask buffer before being composited.
#[derive(Debug)]
pub struct AlphaMaskLayer<'m> {
    /// Raster session over the layer's own buffer.
    canvas: Canvas,
    /// Top-left corner of the layer rectangle in destination coordinates.
    offset: IntPoint,
    /// Mask applied with destination-in on finalize.
    mask: &'m PixelBuffer,
}

impl<'m> AlphaMaskLayer<'m> {
    /// Open a mask layer over `rect` of `dest`.
    ///
    /// The layer inherits the destination's pen, brush, font, render hints
    /// and transform, so drawing code can keep using destination
    /// coordinates. The destination itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns a [`CanvasError`](veil_canvas::CanvasError) if the layer
    /// buffer cannot be allocated.
    pub fn new(dest: &Canvas, rect: IntRect, mask: &'m PixelBuffer) -> Result<Self> {
        let buffer =
            PixelBuffer::with_logical_size(rect.width, rect.height, dest.device_pixel_ratio())?;

        if mask.width() != buffer.width() || mask.height() != buffer.height() {
            warn_once(
                "alpha-mask",
                &format!(
                    "mask is {}x{} but the layer buffer is {}x{}; only the overlap is masked",
                    mask.width(),
                    mask.height(),
                    buffer.width(),
                    buffer.height()
                ),
            );
        }

        let offset = rect.top_left();
        let mut canvas = Canvas::new(buffer);
        #[allow(clippy::cast_precision_loss)]
        canvas.translate(-(offset.x as f32), -(offset.y as f32));
        canvas.set_render_hints(dest.render_hints());
        canvas.set_pen(dest.pen());
        canvas.set_brush(dest.brush());
        canvas.combine_transform(dest.transform());
        canvas.set_font(dest.font().clone());

        Ok(Self {
            canvas,
            offset,
            mask,
        })
    }

    /// Top-left corner of the layer rectangle in destination coordinates.
    #[must_use]
    pub const fn offset(&self) -> IntPoint {
        self.offset
    }

    /// The mask this layer will apply.
    #[must_use]
    pub const fn mask(&self) -> &'m PixelBuffer {
        self.mask
    }

    /// The layer's buffer as drawn so far.
    #[must_use]
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.canvas.pixel_buffer()
    }

    /// The raster canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The raster canvas, for drawing the layer's content.
    pub const fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Mask the layer's pixels and draw them onto `dest` at `offset`.
    ///
    /// The mask is applied straight to the buffer, so whatever opacity,
    /// clip or blend mode was left on the layer canvas has no effect on it.
    pub(crate) fn finalize(&mut self, dest: &mut Canvas) {
        if self.canvas.is_active() {
            self.canvas.end();
        }
        let Some(buffer) = self.canvas.pixel_buffer_mut() else {
            return;
        };
        if buffer.is_empty() {
            return;
        }
        buffer.apply_mask(self.mask);

        dest.save();
        dest.reset_transform();
        #[allow(clippy::cast_precision_loss)]
        dest.draw_pixel_buffer(
            Point::from_xy(self.offset.x as f32, self.offset.y as f32),
            buffer,
        );
        dest.restore();
    }
}
