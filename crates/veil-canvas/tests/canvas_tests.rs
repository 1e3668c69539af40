//! Tests for canvas sessions: raster drawing, paint state and device pixel ratio.

use veil_canvas::{
    BlendMode, Brush, Canvas, CanvasError, Color, Pen, PixelBuffer, Point, Rect, RenderHints,
    Transform,
};
use veil_common::warning::has_warned;

/// Transparent raster canvas with anti-aliasing off so edges are exact.
fn raster_canvas(width: u32, height: u32, ratio: f32) -> Canvas {
    let buffer = PixelBuffer::with_logical_size(width, height, ratio).unwrap();
    let mut canvas = Canvas::new(buffer);
    canvas.set_render_hints(RenderHints {
        antialiasing: false,
        ..RenderHints::default()
    });
    canvas
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::from_xywh(x, y, w, h).unwrap()
}

fn red() -> Color {
    Color::from_rgba8(255, 0, 0, 255)
}

fn alpha_at(canvas: &Canvas, x: u32, y: u32) -> u8 {
    canvas.pixel_buffer().unwrap().pixel(x, y).unwrap().alpha()
}

// ========== raster drawing ==========

#[test]
fn test_fill_rect_covers_exact_pixels() {
    let mut canvas = raster_canvas(4, 4, 1.0);
    canvas.fill_rect(rect(1.0, 1.0, 2.0, 2.0), red());

    let buffer = canvas.pixel_buffer().unwrap();
    assert_eq!(buffer.pixel_rgba(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(buffer.pixel_rgba(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(alpha_at(&canvas, 0, 0), 0);
    assert_eq!(alpha_at(&canvas, 3, 3), 0);
}

#[test]
fn test_draw_rect_uses_brush_and_skips_missing_brush() {
    let mut canvas = raster_canvas(4, 4, 1.0);
    canvas.set_pen(Pen::None);
    canvas.draw_rect(rect(0.0, 0.0, 4.0, 4.0));
    assert!(canvas.pixel_buffer().unwrap().is_transparent());

    canvas.set_brush(Brush::Solid(red()));
    canvas.draw_rect(rect(0.0, 0.0, 4.0, 4.0));
    assert_eq!(alpha_at(&canvas, 2, 2), 255);
}

#[test]
fn test_opacity_scales_alpha() {
    let mut canvas = raster_canvas(2, 2, 1.0);
    canvas.set_opacity(0.5);
    canvas.fill_rect(rect(0.0, 0.0, 2.0, 2.0), red());

    let alpha = alpha_at(&canvas, 0, 0);
    assert!((127..=128).contains(&alpha), "alpha was {alpha}");
}

#[test]
fn test_opacity_is_clamped() {
    let mut canvas = raster_canvas(1, 1, 1.0);
    canvas.set_opacity(1.5);
    assert!((canvas.opacity() - 1.0).abs() < f32::EPSILON);
    canvas.set_opacity(-0.5);
    assert!(canvas.opacity().abs() < f32::EPSILON);
}

#[test]
fn test_transform_moves_drawing() {
    let mut canvas = raster_canvas(4, 4, 1.0);
    canvas.translate(2.0, 1.0);
    canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());

    assert_eq!(alpha_at(&canvas, 2, 1), 255);
    assert_eq!(alpha_at(&canvas, 0, 0), 0);
}

#[test]
fn test_clip_rect_limits_drawing() {
    let mut canvas = raster_canvas(4, 4, 1.0);
    canvas.clip_rect(rect(0.0, 0.0, 2.0, 4.0));
    canvas.fill_rect(rect(0.0, 0.0, 4.0, 4.0), red());

    assert_eq!(alpha_at(&canvas, 1, 1), 255);
    assert_eq!(alpha_at(&canvas, 2, 1), 0);
}

#[test]
fn test_scale_enlarges_drawing() {
    let mut canvas = raster_canvas(4, 4, 1.0);
    canvas.scale(2.0, 2.0);
    canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());

    assert_eq!(alpha_at(&canvas, 0, 0), 255);
    assert_eq!(alpha_at(&canvas, 1, 1), 255);
    assert_eq!(alpha_at(&canvas, 2, 2), 0);
    assert_eq!(canvas.transform(), Transform::from_scale(2.0, 2.0));
}

// ========== device pixel ratio ==========

#[test]
fn test_logical_drawing_is_scaled_to_physical_pixels() {
    let mut canvas = raster_canvas(4, 4, 2.0);
    assert_eq!(canvas.pixel_buffer().unwrap().width(), 8);
    canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());

    assert_eq!(alpha_at(&canvas, 0, 0), 255);
    assert_eq!(alpha_at(&canvas, 1, 1), 255);
    assert_eq!(alpha_at(&canvas, 2, 2), 0);
}

#[test]
fn test_fractional_ratio_is_kept() {
    let canvas = raster_canvas(3, 2, 1.5);
    let buffer = canvas.pixel_buffer().unwrap();

    assert_eq!((buffer.width(), buffer.height()), (5, 3));
    assert!((canvas.device_pixel_ratio() - 1.5).abs() < f32::EPSILON);
}

#[test]
fn test_draw_pixel_buffer_uses_logical_size() {
    let mut canvas = raster_canvas(4, 4, 2.0);
    let mut tile = PixelBuffer::filled(2, 2, red()).unwrap();
    tile.set_device_pixel_ratio(2.0).unwrap();

    canvas.draw_pixel_buffer(Point::from_xy(1.0, 1.0), &tile);

    assert_eq!(alpha_at(&canvas, 2, 2), 255);
    assert_eq!(alpha_at(&canvas, 3, 3), 255);
    assert_eq!(alpha_at(&canvas, 1, 1), 0);
    assert_eq!(alpha_at(&canvas, 4, 4), 0);
}

#[test]
fn test_blit_ignores_transform_and_ratio() {
    let mut canvas = raster_canvas(4, 4, 2.0);
    canvas.set_transform(Transform::from_translate(3.0, 3.0));
    let tile = PixelBuffer::filled(1, 1, red()).unwrap();

    canvas.blit_pixel_buffer(Point::from_xy(1.0, 0.0), &tile);

    assert_eq!(alpha_at(&canvas, 1, 0), 255);
    assert_eq!(alpha_at(&canvas, 2, 0), 0);
    assert_eq!(alpha_at(&canvas, 1, 1), 0);
}

#[test]
fn test_destination_in_attenuates_by_mask_alpha() {
    let mut canvas = raster_canvas(2, 2, 1.0);
    canvas.fill_rect(rect(0.0, 0.0, 2.0, 2.0), red());

    let mask = PixelBuffer::from_rgba(2, 2, &[128u8; 16]).unwrap();
    canvas.set_blend_mode(BlendMode::DestinationIn);
    canvas.blit_pixel_buffer(Point::zero(), &mask);

    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        let alpha = alpha_at(&canvas, x, y);
        assert!((127..=129).contains(&alpha), "alpha at ({x}, {y}) was {alpha}");
    }
}

// ========== save / restore ==========

#[test]
fn test_save_restore_round_trips_state() {
    let mut canvas = raster_canvas(4, 4, 1.0);
    canvas.save();
    canvas.set_opacity(0.25);
    canvas.translate(5.0, 5.0);
    canvas.clip_rect(rect(0.0, 0.0, 1.0, 1.0));
    canvas.set_blend_mode(BlendMode::Multiply);
    assert_eq!(canvas.save_depth(), 1);
    canvas.restore();

    assert_eq!(canvas.save_depth(), 0);
    assert!((canvas.opacity() - 1.0).abs() < f32::EPSILON);
    assert_eq!(canvas.transform(), Transform::identity());
    assert!(canvas.clip_regions().is_empty());
    assert_eq!(canvas.blend_mode(), BlendMode::SourceOver);
}

#[test]
fn test_unmatched_restore_is_reported_and_ignored() {
    let mut canvas = raster_canvas(1, 1, 1.0);
    canvas.set_opacity(0.5);
    canvas.restore();

    assert!((canvas.opacity() - 0.5).abs() < f32::EPSILON);
    assert!(has_warned("canvas", "restore() without a matching save()"));
}

// ========== sessions ==========

#[test]
fn test_end_closes_session() {
    let mut canvas = raster_canvas(1, 1, 1.0);
    assert!(canvas.is_active());
    canvas.end();
    assert!(!canvas.is_active());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "session has ended")]
fn test_drawing_after_end_asserts_in_debug() {
    let mut canvas = raster_canvas(1, 1, 1.0);
    canvas.end();
    canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());
}

#[test]
fn test_zero_size_buffer_accepts_drawing() {
    let mut canvas = Canvas::new(PixelBuffer::new(0, 5).unwrap());
    canvas.fill_rect(rect(0.0, 0.0, 5.0, 5.0), red());
    let buffer = canvas.into_pixel_buffer().unwrap();
    assert!(buffer.is_empty());
    assert!(buffer.is_transparent());
    assert!(buffer.to_rgba().is_empty());
}

// ========== pixel buffers ==========

#[test]
fn test_from_rgba_rejects_wrong_length() {
    let result = PixelBuffer::from_rgba(2, 2, &[0u8; 15]);
    assert_eq!(
        result.unwrap_err(),
        CanvasError::DataLength {
            expected: 16,
            actual: 15
        }
    );
}

#[test]
fn test_invalid_ratio_is_rejected() {
    assert_eq!(
        PixelBuffer::with_logical_size(4, 4, 0.0).unwrap_err(),
        CanvasError::InvalidPixelRatio(0.0)
    );
}

#[test]
fn test_from_rgba_round_trips_opaque_pixels() {
    let data = [10, 20, 30, 255, 40, 50, 60, 255];
    let buffer = PixelBuffer::from_rgba(2, 1, &data).unwrap();
    assert_eq!(buffer.to_rgba(), data.to_vec());
}
