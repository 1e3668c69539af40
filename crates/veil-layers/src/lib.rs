//! Transparency layers for the Veil compositor.
//!
//! A layer is an offscreen group: drawing is redirected into an intermediate
//! target and merged into the destination canvas in one step when the layer
//! is finalized. Two variants exist:
//!
//! - [`OpacityLayer`] records commands into a picture and replays them under
//!   `layer opacity × destination opacity`.
//! - [`AlphaMaskLayer`] rasterizes into a pixel buffer at the destination's
//!   device pixel ratio, multiplies it by a mask with destination-in, and
//!   draws the result back at the layer rectangle's origin.
//!
//! [`LayerStack`] is the caller-side manager that nests layers and ties
//! alpha-mask layers to the destination's save/restore calls.
//!
//! ```text
//!              begin_transparency_layer      clip_to_mask
//! base Canvas ─────────────▶ OpacityLayer ─────────────▶ AlphaMaskLayer
//!      ▲         finalize          ▲         finalize          │
//!      └──────────────────────────┘◀──────────────────────────┘
//! ```

mod alpha_mask;
mod layer;
mod opacity;
mod stack;

pub use alpha_mask::AlphaMaskLayer;
pub use layer::{LayerKind, TransparencyLayer};
pub use opacity::OpacityLayer;
pub use stack::LayerStack;
