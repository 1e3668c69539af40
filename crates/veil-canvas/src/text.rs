//! Fonts and glyph rasterization.
//!
//! Glyphs are rasterized with fontdue at the device scale of the current
//! transform, turned into small premultiplied pixmaps tinted with the pen
//! color, and composited with the canvas' blend mode, clip and opacity.

use std::fmt;
use std::sync::{Arc, OnceLock};

use fontdue::FontSettings;
use tiny_skia::{ColorU8, FilterQuality, Mask, Pixmap, PixmapPaint, Point, Transform};
use veil_common::warning::warn_once;

use crate::error::{CanvasError, Result};
use crate::state::PaintState;

/// Common system font paths to search for a default font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Default pixel size for fonts without an explicit one.
const DEFAULT_PIXEL_SIZE: f32 = 12.0;

static SYSTEM_FACE: OnceLock<Option<Arc<fontdue::Font>>> = OnceLock::new();

/// A font face at a pixel size.
///
/// Faces are shared, so copying a font between paint states is cheap. A
/// font without a face draws nothing.
#[derive(Clone)]
pub struct Font {
    face: Option<Arc<fontdue::Font>>,
    pixel_size: f32,
}

impl Font {
    /// Wrap a parsed fontdue face.
    #[must_use]
    pub fn new(face: fontdue::Font, pixel_size: f32) -> Self {
        Self {
            face: Some(Arc::new(face)),
            pixel_size,
        }
    }

    /// Parse a TrueType/OpenType font from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidFont`] if fontdue rejects the data.
    pub fn from_bytes(data: &[u8], pixel_size: f32) -> Result<Self> {
        let face = fontdue::Font::from_bytes(data, FontSettings::default())
            .map_err(|e| CanvasError::InvalidFont(e.to_string()))?;
        Ok(Self::new(face, pixel_size))
    }

    /// The first system font found on this machine, or a face-less font
    /// (with a one-time warning) if none is installed.
    #[must_use]
    pub fn system(pixel_size: f32) -> Self {
        let face = SYSTEM_FACE.get_or_init(load_system_face).clone();
        if face.is_none() {
            warn_once("text", "no system font found, text will not be rendered");
        }
        Self { face, pixel_size }
    }

    /// The same face at another size.
    #[must_use]
    pub fn with_pixel_size(&self, pixel_size: f32) -> Self {
        Self {
            face: self.face.clone(),
            pixel_size,
        }
    }

    /// Size in logical pixels.
    #[must_use]
    pub const fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    /// Whether the font can draw anything.
    #[must_use]
    pub const fn has_face(&self) -> bool {
        self.face.is_some()
    }

    /// Horizontal advance of `text` in logical pixels.
    #[must_use]
    pub fn advance(&self, text: &str) -> f32 {
        let Some(face) = &self.face else {
            return 0.0;
        };
        text.chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| face.metrics(ch, self.pixel_size).advance_width)
            .sum()
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            face: None,
            pixel_size: DEFAULT_PIXEL_SIZE,
        }
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        let same_face = match (&self.face, &other.face) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_face && self.pixel_size.to_bits() == other.pixel_size.to_bits()
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("has_face", &self.face.is_some())
            .field("pixel_size", &self.pixel_size)
            .finish()
    }
}

fn load_system_face() -> Option<Arc<fontdue::Font>> {
    FONT_SEARCH_PATHS.iter().find_map(|path| {
        let data = std::fs::read(path).ok()?;
        fontdue::Font::from_bytes(data, FontSettings::default())
            .ok()
            .map(Arc::new)
    })
}

/// Draw `text` with its baseline starting at `origin` (logical coordinates).
///
/// `device` maps logical coordinates to physical pixels of `pixmap`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn draw_text(
    pixmap: &mut Pixmap,
    text: &str,
    origin: Point,
    state: &PaintState,
    device: Transform,
    clip: Option<&Mask>,
) {
    let Some(face) = &state.font.face else {
        return;
    };
    let Some(color) = state.pen.color() else {
        return;
    };

    // Rasterize at device resolution, then undo the scale when placing.
    let scale = device.sx.hypot(device.ky).max(f32::EPSILON);
    let raster_size = state.font.pixel_size * scale;
    let alpha = color.alpha() * state.opacity;
    let tint = color.to_color_u8();
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: state.blend_mode,
        quality: FilterQuality::Bilinear,
    };

    let mut cursor_x = origin.x;
    for ch in text.chars().filter(|ch| !ch.is_control()) {
        let (metrics, coverage) = face.rasterize(ch, raster_size);
        let advance = metrics.advance_width / scale;

        if metrics.width > 0
            && metrics.height > 0
            && let Some(mut glyph) = Pixmap::new(metrics.width as u32, metrics.height as u32)
        {
            for (dst, &cov) in glyph.pixels_mut().iter_mut().zip(&coverage) {
                let cov = if state.hints.text_antialiasing {
                    cov
                } else if cov >= 128 {
                    255
                } else {
                    0
                };
                let a = (f32::from(cov) * alpha).round().clamp(0.0, 255.0) as u8;
                *dst = ColorU8::from_rgba(tint.red(), tint.green(), tint.blue(), a).premultiply();
            }

            let placement = device
                .pre_translate(cursor_x, origin.y)
                .pre_scale(1.0 / scale, 1.0 / scale)
                .pre_translate(
                    metrics.xmin as f32,
                    -(metrics.ymin as f32) - metrics.height as f32,
                );
            pixmap.draw_pixmap(0, 0, glyph.as_ref(), &paint, placement, clip);
        }

        cursor_x += advance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_font_has_no_face() {
        let font = Font::default();
        assert!(!font.has_face());
        assert!((font.pixel_size() - DEFAULT_PIXEL_SIZE).abs() < f32::EPSILON);
        assert!(font.advance("hello").abs() < f32::EPSILON);
    }

    #[test]
    fn test_with_pixel_size_keeps_face_identity() {
        let font = Font::default().with_pixel_size(20.0);
        assert_eq!(font, Font::default().with_pixel_size(20.0));
        assert_ne!(font, Font::default());
    }

    #[test]
    fn test_invalid_font_bytes_are_rejected() {
        let result = Font::from_bytes(b"definitely not a font", 12.0);
        assert!(matches!(result, Err(CanvasError::InvalidFont(_))));
    }
}
