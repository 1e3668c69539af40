//! Paint state carried by a canvas session.
//!
//! Everything a drawing command depends on besides its geometry lives in
//! [`PaintState`]: the pen and brush, the font, the logical transform, the
//! clip, the group opacity, the blend mode and the render-quality hints.
//! A [`Canvas`](crate::Canvas) keeps one current state plus a save stack,
//! and a [`Picture`](crate::Picture) stores a snapshot next to every command
//! it records.

use serde::Serialize;
use tiny_skia::{BlendMode, Color, Path, Transform};

use crate::text::Font;

/// How outlines are stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pen {
    /// Outlines are not drawn.
    None,
    /// A solid line of the given color and logical width.
    Solid {
        /// Stroke color.
        color: Color,
        /// Stroke width in logical pixels.
        width: f32,
    },
}

impl Pen {
    /// A solid pen.
    #[must_use]
    pub const fn solid(color: Color, width: f32) -> Self {
        Self::Solid { color, width }
    }

    /// The pen color, if it draws anything.
    #[must_use]
    pub const fn color(&self) -> Option<Color> {
        match self {
            Self::None => None,
            Self::Solid { color, .. } => Some(*color),
        }
    }
}

impl Default for Pen {
    /// Black, one logical pixel wide.
    fn default() -> Self {
        Self::solid(Color::BLACK, 1.0)
    }
}

/// How interiors are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Brush {
    /// Interiors are not filled.
    #[default]
    None,
    /// A uniform color.
    Solid(Color),
}

impl Brush {
    /// The brush color, if it fills anything.
    #[must_use]
    pub const fn color(&self) -> Option<Color> {
        match self {
            Self::None => None,
            Self::Solid(color) => Some(*color),
        }
    }
}

/// Render-quality hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderHints {
    /// Anti-alias path edges.
    pub antialiasing: bool,
    /// Anti-alias glyph coverage. When off, coverage is thresholded.
    pub text_antialiasing: bool,
    /// Use bilinear filtering when drawing scaled pixel buffers.
    pub smooth_pixmap_transform: bool,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            antialiasing: true,
            text_antialiasing: true,
            smooth_pixmap_transform: false,
        }
    }
}

/// One clip contribution: a path in the logical space that was current when
/// the clip was set.
///
/// The effective clip of a state is the intersection of all its regions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRegion {
    /// Clip outline.
    pub path: Path,
    /// Logical transform in effect when the clip was applied.
    pub transform: Transform,
}

/// The full paint state of a canvas session.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintState {
    /// Outline pen.
    pub pen: Pen,
    /// Fill brush.
    pub brush: Brush,
    /// Text font.
    pub font: Font,
    /// Logical transform, before the device pixel ratio is applied.
    pub transform: Transform,
    /// Clip regions, intersected.
    pub clip: Vec<ClipRegion>,
    /// Group opacity in `[0, 1]`, multiplied into everything drawn.
    pub opacity: f32,
    /// Compositing operator for subsequent draws.
    pub blend_mode: BlendMode,
    /// Render-quality hints.
    pub hints: RenderHints,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            pen: Pen::default(),
            brush: Brush::default(),
            font: Font::default(),
            transform: Transform::identity(),
            clip: Vec::new(),
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            hints: RenderHints::default(),
        }
    }
}

impl PaintState {
    /// Re-express this state as seen through `outer`: the state of an
    /// enclosing canvas that a recorded command is being replayed onto.
    ///
    /// Transforms compose (outer applied last), opacities multiply and clips
    /// intersect. Pen, brush, font, blend mode and hints stay as recorded.
    #[must_use]
    pub fn nested_in(&self, outer: &Self, base: Transform) -> Self {
        let mut clip = outer.clip.clone();
        clip.extend(self.clip.iter().map(|region| ClipRegion {
            path: region.path.clone(),
            transform: base.pre_concat(region.transform),
        }));

        Self {
            transform: base.pre_concat(self.transform),
            clip,
            opacity: outer.opacity * self.opacity,
            ..self.clone()
        }
    }
}
