//! The demo scene: nested opacity layers with an alpha-masked panel on top.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use veil_canvas::{Canvas, Color, Font, Pen, PixelBuffer, Point, Rect};
use veil_common::IntRect;
use veil_layers::LayerStack;

/// Fill colors for successive opacity layers and mask stripes.
const PALETTE: [[u8; 3]; 4] = [[231, 76, 60], [46, 204, 113], [52, 152, 219], [241, 196, 15]];

/// Text drawn centred in the masked panel.
const LABEL: &str = "veil";

fn palette(index: usize) -> Color {
    let [r, g, b] = PALETTE[index % PALETTE.len()];
    Color::from_rgba8(r, g, b, 255)
}

/// What to render.
#[derive(Debug, Clone, Copy)]
pub struct SceneConfig {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f32,
    /// Opacity of each nested layer.
    pub opacity: f32,
    /// Number of nested opacity layers.
    pub depth: u32,
}

/// Summary of a render, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RenderReport {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Physical width of the output image.
    pub physical_width: u32,
    /// Physical height of the output image.
    pub physical_height: u32,
    /// Device pixel ratio used for the base canvas.
    pub device_pixel_ratio: f32,
    /// Number of nested opacity layers.
    pub opacity_layers: u32,
    /// Per-layer opacity.
    pub layer_opacity: f32,
    /// Rectangle covered by the mask layer.
    pub mask_rect: IntRect,
    /// Where the mask came from: a file path or `"gradient"`.
    pub mask_source: String,
    /// Pixels in the output with non-zero alpha.
    pub painted_pixels: usize,
}

/// The central half of the canvas, where the mask layer sits.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn mask_rect(config: &SceneConfig) -> IntRect {
    let x = config.width / 4;
    let y = config.height / 4;
    IntRect::new(x as i32, y as i32, config.width / 2, config.height / 2)
}

/// A horizontal alpha ramp covering `rect` at the given ratio, transparent
/// on the left and opaque on the right.
///
/// # Errors
///
/// Fails if the buffer cannot be allocated.
pub fn gradient_mask(rect: IntRect, ratio: f32) -> Result<PixelBuffer> {
    let sized = PixelBuffer::with_logical_size(rect.width, rect.height, ratio)?;
    let (width, height) = (sized.width(), sized.height());
    let span = width.saturating_sub(1).max(1);

    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for _ in 0..height {
        for x in 0..width {
            #[allow(clippy::cast_possible_truncation)]
            let alpha = (u64::from(x) * 255 / u64::from(span)) as u8;
            data.extend_from_slice(&[0, 0, 0, alpha]);
        }
    }
    PixelBuffer::from_rgba(width, height, &data).context("gradient mask has the wrong length")
}

/// Load a mask image; only its alpha channel matters.
///
/// # Errors
///
/// Fails if the file cannot be read or decoded.
pub fn load_mask(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path)
        .with_context(|| format!("failed to load mask image '{}'", path.display()))?
        .to_rgba8();
    PixelBuffer::from_rgba(image.width(), image.height(), image.as_raw())
        .with_context(|| format!("mask image '{}' could not be converted", path.display()))
}

/// Render the scene and return the finished base canvas.
///
/// # Errors
///
/// Fails if any pixel buffer cannot be allocated.
pub fn render(config: &SceneConfig, mask: &PixelBuffer) -> Result<Canvas> {
    let buffer =
        PixelBuffer::with_logical_size(config.width, config.height, config.device_pixel_ratio)?;
    let mut base = Canvas::new(buffer);
    if let Some(full) = logical_rect(0, 0, config.width, config.height) {
        base.fill_rect(full, Color::WHITE);
    }

    let mut stack = LayerStack::new(base);

    // Concentric bands, each one layer deeper than the last.
    for level in 0..config.depth {
        stack.begin_transparency_layer(config.opacity);
        let inset = level * 8;
        if let Some(band) = logical_rect(
            inset,
            inset,
            config.width.saturating_sub(inset * 2),
            config.height.saturating_sub(inset * 2),
        ) {
            stack.canvas_mut().fill_rect(band, palette(level as usize));
        }
    }
    for _ in 0..config.depth {
        stack.end_transparency_layer();
    }

    // Striped panel faded through the mask, with a translucent group inside.
    let panel = mask_rect(config);
    stack.save();
    stack.clip_to_mask(panel, mask)?;
    stack.begin_transparency_layer(config.opacity);
    #[allow(clippy::cast_sign_loss)]
    let (left, top) = (panel.x as u32, panel.y as u32);
    for stripe in 0..panel.height / 4 {
        if let Some(line) = logical_rect(left, top + stripe * 4, panel.width, 2) {
            stack.canvas_mut().fill_rect(line, palette(stripe as usize));
        }
    }
    let font = Font::system(14.0);
    #[allow(clippy::cast_precision_loss)]
    let label_origin = Point::from_xy(
        ((panel.width as f32 - font.advance(LABEL)) / 2.0).max(0.0) + left as f32,
        (top + 16) as f32,
    );
    stack.canvas_mut().set_pen(Pen::solid(Color::BLACK, 1.0));
    stack.canvas_mut().set_font(font);
    stack.canvas_mut().draw_text(label_origin, LABEL);
    stack.end_transparency_layer();
    stack.restore();

    Ok(stack.finish())
}

/// Write the canvas' pixels to a PNG.
///
/// # Errors
///
/// Fails if the canvas is not a raster canvas or the file cannot be written.
pub fn save_png(canvas: &Canvas, path: &Path) -> Result<()> {
    let buffer = canvas
        .pixel_buffer()
        .context("rendered canvas has no pixel buffer")?;
    let image = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgba())
        .context("pixel buffer size does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("failed to save image to '{}'", path.display()))?;
    Ok(())
}

/// Count the pixels with non-zero alpha.
#[must_use]
pub fn painted_pixels(canvas: &Canvas) -> usize {
    canvas.pixel_buffer().map_or(0, |buffer| {
        buffer
            .to_rgba()
            .chunks_exact(4)
            .filter(|pixel| pixel[3] != 0)
            .count()
    })
}

#[allow(clippy::cast_precision_loss)]
fn logical_rect(x: u32, y: u32, width: u32, height: u32) -> Option<Rect> {
    Rect::from_xywh(x as f32, y as f32, width as f32, height as f32)
}
