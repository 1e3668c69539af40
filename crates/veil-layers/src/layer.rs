//! The shared layer type and its lifecycle.
//!
//! ```text
//! TransparencyLayer::opacity / ::alpha_mask   (Open, save_counter = 1)
//!        │ draw through canvas_mut()
//!        ▼
//! finalize_layer(dest)                         (consumes the layer)
//! ```
//!
//! Finalizing consumes the layer, so it happens at most once. A layer that
//! is dropped without being finalized discards its content; debug builds
//! report that through `warn_once`.

use veil_canvas::{Canvas, PixelBuffer, Result};
use veil_common::IntRect;
use veil_common::warning::warn_once;

use crate::alpha_mask::AlphaMaskLayer;
use crate::opacity::OpacityLayer;

/// Which compositing strategy a layer uses.
#[derive(Debug)]
pub enum LayerKind<'m> {
    /// Recorded content replayed at a group opacity.
    Opacity(OpacityLayer),
    /// Rasterized content multiplied by a mask.
    AlphaMask(AlphaMaskLayer<'m>),
}

/// Lifecycle tag checked when the layer is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerState {
    Open,
    Finalized,
}

/// An offscreen compositing group that is merged into a destination canvas
/// when finalized.
#[derive(Debug)]
pub struct TransparencyLayer<'m> {
    /// Balancing counter for the owner's save/restore calls.
    ///
    /// Starts at 1. The layer never reads or writes it after construction;
    /// [`LayerStack`](crate::LayerStack) uses it to decide when a mask layer
    /// closes.
    pub save_counter: i32,
    kind: LayerKind<'m>,
    state: LayerState,
}

impl<'m> TransparencyLayer<'m> {
    /// Open an opacity layer.
    #[must_use]
    pub fn opacity(opacity: f32) -> Self {
        OpacityLayer::new(opacity).into()
    }

    /// Open an alpha-mask layer over `rect` of `dest`.
    ///
    /// # Errors
    ///
    /// Fails if the layer buffer cannot be allocated.
    pub fn alpha_mask(dest: &Canvas, rect: IntRect, mask: &'m PixelBuffer) -> Result<Self> {
        Ok(AlphaMaskLayer::new(dest, rect, mask)?.into())
    }

    /// Whether this is an alpha-mask layer.
    #[must_use]
    pub const fn is_alpha_mask_layer(&self) -> bool {
        matches!(self.kind, LayerKind::AlphaMask(_))
    }

    /// The variant-specific part of the layer.
    #[must_use]
    pub const fn kind(&self) -> &LayerKind<'m> {
        &self.kind
    }

    /// The intermediate canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        match &self.kind {
            LayerKind::Opacity(layer) => layer.canvas(),
            LayerKind::AlphaMask(layer) => layer.canvas(),
        }
    }

    /// The intermediate canvas the layer's content is drawn into.
    pub const fn canvas_mut(&mut self) -> &mut Canvas {
        match &mut self.kind {
            LayerKind::Opacity(layer) => layer.canvas_mut(),
            LayerKind::AlphaMask(layer) => layer.canvas_mut(),
        }
    }

    /// Merge the layer's content into `dest` and release the intermediate
    /// target.
    ///
    /// Any transient changes to `dest` (opacity, transform) are undone
    /// before this returns.
    pub fn finalize_layer(mut self, dest: &mut Canvas) {
        match &mut self.kind {
            LayerKind::Opacity(layer) => layer.finalize(dest),
            LayerKind::AlphaMask(layer) => layer.finalize(dest),
        }
        self.state = LayerState::Finalized;
    }
}

impl From<OpacityLayer> for TransparencyLayer<'_> {
    fn from(layer: OpacityLayer) -> Self {
        Self::with_kind(LayerKind::Opacity(layer))
    }
}

impl<'m> From<AlphaMaskLayer<'m>> for TransparencyLayer<'m> {
    fn from(layer: AlphaMaskLayer<'m>) -> Self {
        Self::with_kind(LayerKind::AlphaMask(layer))
    }
}

impl<'m> TransparencyLayer<'m> {
    const fn with_kind(kind: LayerKind<'m>) -> Self {
        Self {
            save_counter: 1,
            kind,
            state: LayerState::Open,
        }
    }
}

impl Drop for TransparencyLayer<'_> {
    fn drop(&mut self) {
        if cfg!(debug_assertions) && self.state == LayerState::Open && !std::thread::panicking() {
            warn_once(
                "layers",
                "transparency layer dropped without finalize_layer(); its content was discarded",
            );
        }
    }
}
