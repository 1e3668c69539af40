//! Rasterization of drawing operations onto a pixel buffer.
//!
//! This is the final stage for raster devices: it knows nothing about
//! layers or recording, it simply executes one operation under one paint
//! state. Logical coordinates are mapped to physical pixels by prefixing the
//! state's transform with the buffer's device pixel ratio.

use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, Paint, PixmapPaint, Point, Stroke, Transform,
};

use crate::picture::{DrawOp, Placement};
use crate::pixel_buffer::PixelBuffer;
use crate::state::{ClipRegion, PaintState, Pen};
use crate::text;

/// Execute a single operation against `target`.
pub(crate) fn execute(target: &mut PixelBuffer, op: &DrawOp, state: &PaintState) {
    if let DrawOp::Image {
        origin,
        buffer,
        placement,
    } = op
    {
        draw_image(target, *origin, buffer, *placement, state);
        return;
    }

    let ratio = target.device_pixel_ratio();
    let Some(pixmap) = target.pixmap_mut() else {
        return;
    };
    let device = device_transform(ratio, state);
    let clip = clip_mask(
        pixmap.width(),
        pixmap.height(),
        &state.clip,
        ratio,
        state.hints.antialiasing,
    );

    match op {
        DrawOp::Fill { path, brush } => {
            if let Some(paint) = solid_paint(brush.color(), state) {
                pixmap.fill_path(path, &paint, FillRule::Winding, device, clip.as_ref());
            }
        }
        DrawOp::Stroke { path, pen } => {
            let Pen::Solid { color, width } = *pen else {
                return;
            };
            if let Some(paint) = solid_paint(Some(color), state) {
                let stroke = Stroke {
                    width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(path, &paint, &stroke, device, clip.as_ref());
            }
        }
        DrawOp::Text { origin, text } => {
            text::draw_text(pixmap, text, *origin, state, device, clip.as_ref());
        }
        DrawOp::Image { .. } => {}
    }
}

/// Composite `source` onto `target` with the state's opacity, blend mode
/// and clip.
pub(crate) fn draw_image(
    target: &mut PixelBuffer,
    origin: Point,
    source: &PixelBuffer,
    placement: Placement,
    state: &PaintState,
) {
    let ratio = target.device_pixel_ratio();
    let (Some(pixmap), Some(pixels)) = (target.pixmap_mut(), source.pixmap()) else {
        return;
    };
    let clip = clip_mask(
        pixmap.width(),
        pixmap.height(),
        &state.clip,
        ratio,
        state.hints.antialiasing,
    );

    let transform = match placement {
        Placement::Logical => {
            let inverse = 1.0 / source.device_pixel_ratio();
            device_transform(ratio, state)
                .pre_translate(origin.x, origin.y)
                .pre_scale(inverse, inverse)
        }
        Placement::Device => Transform::from_translate(origin.x, origin.y),
    };
    let paint = PixmapPaint {
        opacity: state.opacity,
        blend_mode: state.blend_mode,
        quality: if state.hints.smooth_pixmap_transform {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        },
    };
    pixmap.draw_pixmap(0, 0, pixels.as_ref(), &paint, transform, clip.as_ref());
}

fn device_transform(ratio: f32, state: &PaintState) -> Transform {
    Transform::from_scale(ratio, ratio).pre_concat(state.transform)
}

/// Build a paint for a solid color with the state's opacity, blend mode and
/// anti-aliasing applied. `None` when there is nothing to paint with.
fn solid_paint(color: Option<Color>, state: &PaintState) -> Option<Paint<'static>> {
    let mut color = color?;
    color.set_alpha((color.alpha() * state.opacity).clamp(0.0, 1.0));

    let mut paint = Paint {
        anti_alias: state.hints.antialiasing,
        blend_mode: state.blend_mode,
        ..Paint::default()
    };
    paint.set_color(color);
    Some(paint)
}

/// Intersect all clip regions into a coverage mask in physical pixels.
///
/// `None` means unclipped.
#[allow(clippy::cast_possible_truncation)]
fn clip_mask(
    width: u32,
    height: u32,
    regions: &[ClipRegion],
    ratio: f32,
    anti_alias: bool,
) -> Option<Mask> {
    let (first, rest) = regions.split_first()?;
    let scale = Transform::from_scale(ratio, ratio);

    let mut mask = Mask::new(width, height)?;
    mask.fill_path(
        &first.path,
        FillRule::Winding,
        anti_alias,
        scale.pre_concat(first.transform),
    );

    for region in rest {
        let Some(mut next) = Mask::new(width, height) else {
            break;
        };
        next.fill_path(
            &region.path,
            FillRule::Winding,
            anti_alias,
            scale.pre_concat(region.transform),
        );
        for (coverage, other) in mask.data_mut().iter_mut().zip(next.data()) {
            *coverage = ((u16::from(*coverage) * u16::from(*other) + 127) / 255) as u8;
        }
    }

    Some(mask)
}
