//! LayerStack - nested layers over a base canvas
//!
//! The stack routes drawing to the innermost open layer and keeps
//! alpha-mask layers in step with the caller's save/restore calls:
//!
//! ```text
//! save()                 base.save()
//! clip_to_mask(r, m)     push mask layer          (save_counter = 1)
//!   save()               counter 2, layer.save()
//!   restore()            counter 1, layer.restore()
//! restore()              counter 0 → finalize into base, base.restore()
//! ```
//!
//! A mask layer therefore closes exactly at the restore that balances the
//! save preceding it. Opacity layers are closed explicitly with
//! [`LayerStack::end_transparency_layer`].

use veil_canvas::{Canvas, PixelBuffer, Result};
use veil_common::IntRect;
use veil_common::warning::warn_once;

use crate::layer::TransparencyLayer;

/// A base canvas plus the layers currently open on top of it.
#[derive(Debug)]
pub struct LayerStack<'m> {
    base: Canvas,
    layers: Vec<TransparencyLayer<'m>>,
}

impl<'m> LayerStack<'m> {
    /// Create a stack over `base` with no open layers.
    #[must_use]
    pub const fn new(base: Canvas) -> Self {
        Self {
            base,
            layers: Vec::new(),
        }
    }

    /// The canvas drawing currently goes to.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        self.layers
            .last()
            .map_or(&self.base, TransparencyLayer::canvas)
    }

    /// The canvas drawing currently goes to: the innermost layer's, or the
    /// base canvas when no layer is open.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        match self.layers.last_mut() {
            Some(layer) => layer.canvas_mut(),
            None => &mut self.base,
        }
    }

    /// The innermost open layer.
    #[must_use]
    pub fn top(&self) -> Option<&TransparencyLayer<'m>> {
        self.layers.last()
    }

    /// Number of open layers.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is open.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Open an opacity layer on top of the current canvas.
    pub fn begin_transparency_layer(&mut self, opacity: f32) {
        self.layers.push(TransparencyLayer::opacity(opacity));
    }

    /// Open an alpha-mask layer over `rect` of the current canvas.
    ///
    /// # Errors
    ///
    /// Fails if the layer buffer cannot be allocated; the stack is left
    /// unchanged.
    pub fn clip_to_mask(&mut self, rect: IntRect, mask: &'m PixelBuffer) -> Result<()> {
        let layer = TransparencyLayer::alpha_mask(self.canvas(), rect, mask)?;
        self.layers.push(layer);
        Ok(())
    }

    /// Save the current canvas' state.
    pub fn save(&mut self) {
        if let Some(top) = self.layers.last_mut()
            && top.is_alpha_mask_layer()
        {
            top.save_counter += 1;
        }
        self.canvas_mut().save();
    }

    /// Restore the current canvas' state, closing a mask layer whose
    /// balancing restore this is.
    pub fn restore(&mut self) {
        if let Some(top) = self.layers.last_mut()
            && top.is_alpha_mask_layer()
        {
            top.save_counter -= 1;
            if top.save_counter <= 0 {
                self.pop_and_finalize();
            }
        }
        self.canvas_mut().restore();
    }

    /// Close the innermost opacity layer, first closing any mask layers
    /// opened above it.
    ///
    /// Calling this with no open opacity layer is reported and ignored.
    pub fn end_transparency_layer(&mut self) {
        if self.layers.is_empty() {
            warn_once("layers", "end_transparency_layer() with no open layer");
            return;
        }

        while let Some(top) = self.layers.last_mut()
            && top.is_alpha_mask_layer()
        {
            top.save_counter -= 1;
            self.pop_and_finalize();
        }

        if self.layers.is_empty() {
            warn_once(
                "layers",
                "end_transparency_layer() found only mask layers; they were closed",
            );
            return;
        }
        self.pop_and_finalize();
    }

    /// Finalize every open layer, innermost first, and return the base
    /// canvas.
    #[must_use]
    pub fn finish(mut self) -> Canvas {
        while !self.layers.is_empty() {
            self.pop_and_finalize();
        }
        self.base
    }

    /// Pop the innermost layer and merge it into the canvas below it.
    fn pop_and_finalize(&mut self) {
        if let Some(layer) = self.layers.pop() {
            layer.finalize_layer(self.canvas_mut());
        }
    }
}
