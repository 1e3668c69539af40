//! Rasterized pixel buffers with a recorded device pixel ratio.
//!
//! A [`PixelBuffer`] is the raster target of a [`Canvas`](crate::Canvas) and
//! the unit that gets composited between canvases. It stores premultiplied
//! RGBA in a `tiny_skia::Pixmap` and remembers how many physical pixels make
//! up one logical pixel, so that drawing in logical coordinates lands on the
//! right physical pixels.
//!
//! tiny-skia cannot allocate a zero-sized pixmap, so an empty buffer keeps
//! no pixmap at all. Every draw into it is a no-op and drawing it anywhere
//! composites nothing.

use tiny_skia::{
    BlendMode, Color, ColorU8, FilterQuality, Pixmap, PixmapPaint, PremultipliedColorU8, Transform,
};

use crate::error::{CanvasError, Result};

/// A premultiplied RGBA pixel buffer with a device pixel ratio.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    /// Pixel storage. `None` exactly when the buffer has zero area.
    pixmap: Option<Pixmap>,
    /// Physical width in pixels.
    width: u32,
    /// Physical height in pixels.
    height: u32,
    /// Physical pixels per logical pixel.
    device_pixel_ratio: f32,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer of `width × height` physical
    /// pixels with a device pixel ratio of 1.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Allocation`] if the rasterizer cannot allocate
    /// a non-empty buffer of that size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = if width == 0 || height == 0 {
            None
        } else {
            Some(Pixmap::new(width, height).ok_or(CanvasError::Allocation { width, height })?)
        };

        Ok(Self {
            pixmap,
            width,
            height,
            device_pixel_ratio: 1.0,
        })
    }

    /// Allocate a transparent buffer covering `logical_width × logical_height`
    /// logical pixels at the given ratio.
    ///
    /// Physical dimensions are the logical ones multiplied by the ratio and
    /// rounded up, so integral ratios give exact multiples. Fractional ratios
    /// are kept as given rather than truncated to a whole number.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidPixelRatio`] for non-finite or
    /// non-positive ratios, and [`CanvasError::Allocation`] if the buffer
    /// cannot be allocated.
    pub fn with_logical_size(
        logical_width: u32,
        logical_height: u32,
        device_pixel_ratio: f32,
    ) -> Result<Self> {
        validate_ratio(device_pixel_ratio)?;
        let mut buffer = Self::new(
            scale_dimension(logical_width, device_pixel_ratio),
            scale_dimension(logical_height, device_pixel_ratio),
        )?;
        buffer.device_pixel_ratio = device_pixel_ratio;
        Ok(buffer)
    }

    /// Build a buffer from straight (non-premultiplied) RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DataLength`] if `rgba_data` is not exactly
    /// `width * height * 4` bytes, or an allocation error.
    pub fn from_rgba(width: u32, height: u32, rgba_data: &[u8]) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba_data.len() != expected {
            return Err(CanvasError::DataLength {
                expected,
                actual: rgba_data.len(),
            });
        }

        let mut buffer = Self::new(width, height)?;
        if let Some(pixmap) = buffer.pixmap.as_mut() {
            for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba_data.chunks_exact(4)) {
                *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
            }
        }
        Ok(buffer)
    }

    /// Allocate a buffer and fill it with a single color.
    ///
    /// # Errors
    ///
    /// Same as [`PixelBuffer::new`].
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut buffer = Self::new(width, height)?;
        buffer.fill(color);
        Ok(buffer)
    }

    /// Record a new device pixel ratio without touching the pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidPixelRatio`] for non-finite or
    /// non-positive ratios.
    pub fn set_device_pixel_ratio(&mut self, ratio: f32) -> Result<()> {
        validate_ratio(ratio)?;
        self.device_pixel_ratio = ratio;
        Ok(())
    }

    /// Physical pixels per logical pixel.
    #[must_use]
    pub const fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Physical width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Physical height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width in logical pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn logical_width(&self) -> f32 {
        self.width as f32 / self.device_pixel_ratio
    }

    /// Height in logical pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn logical_height(&self) -> f32 {
        self.height as f32 / self.device_pixel_ratio
    }

    /// Whether the buffer has zero area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    /// Fill every pixel with `color`, replacing what was there.
    pub fn fill(&mut self, color: Color) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(color);
        }
    }

    /// Reset every pixel to fully transparent.
    pub fn fill_transparent(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    /// The premultiplied pixel at physical coordinates, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.as_ref()?.pixel(x, y)
    }

    /// The straight-alpha `[r, g, b, a]` pixel at physical coordinates.
    #[must_use]
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Copy the buffer out as straight-alpha RGBA bytes, row-major.
    #[must_use]
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixmap.as_ref().map_or_else(Vec::new, |pixmap| {
            pixmap
                .pixels()
                .iter()
                .flat_map(|pixel| {
                    let color = pixel.demultiply();
                    [color.red(), color.green(), color.blue(), color.alpha()]
                })
                .collect()
        })
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.pixmap
            .as_ref()
            .is_none_or(|pixmap| pixmap.pixels().iter().all(|pixel| pixel.alpha() == 0))
    }

    /// Multiply every pixel by the alpha of the pixel at the same physical
    /// position in `mask` (destination-in).
    ///
    /// The mask is placed 1:1 at the top-left corner. Pixels outside its
    /// extent are left untouched.
    pub fn apply_mask(&mut self, mask: &Self) {
        let (Some(pixmap), Some(source)) = (self.pixmap.as_mut(), mask.pixmap.as_ref()) else {
            return;
        };
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::DestinationIn,
            quality: FilterQuality::Nearest,
        };
        pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, Transform::identity(), None);
    }

    /// The underlying pixmap, absent for empty buffers.
    #[must_use]
    pub const fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Mutable access to the underlying pixmap, absent for empty buffers.
    pub fn pixmap_mut(&mut self) -> Option<&mut Pixmap> {
        self.pixmap.as_mut()
    }
}

fn validate_ratio(ratio: f32) -> Result<()> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(())
    } else {
        Err(CanvasError::InvalidPixelRatio(ratio))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_dimension(logical: u32, ratio: f32) -> u32 {
    (f64::from(logical) * f64::from(ratio)).ceil() as u32
}
