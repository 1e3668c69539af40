//! Tests for opacity layers: group opacity, nesting and destination state.

use quickcheck_macros::quickcheck;
use veil_canvas::{Canvas, Color, PixelBuffer, Rect, RenderHints, Transform};
use veil_layers::{LayerKind, TransparencyLayer};

fn raster_canvas(width: u32, height: u32) -> Canvas {
    let mut canvas = Canvas::new(PixelBuffer::new(width, height).unwrap());
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

// ========== compositing ==========

#[test]
fn test_half_opacity_red_rect() {
    let mut dest = raster_canvas(4, 4);
    let mut layer = TransparencyLayer::opacity(0.5);
    layer.canvas_mut().fill_rect(rect(0.0, 0.0, 4.0, 4.0), red());
    layer.finalize_layer(&mut dest);

    let [r, g, b, a] = dest.pixel_buffer().unwrap().pixel_rgba(1, 1).unwrap();
    assert!(r >= 254, "red was {r}");
    assert_eq!((g, b), (0, 0));
    assert!((127..=128).contains(&a), "alpha was {a}");
    assert!((dest.opacity() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_layer_content_is_invisible_until_finalized() {
    let mut dest = raster_canvas(2, 2);
    let mut layer = TransparencyLayer::opacity(1.0);
    layer.canvas_mut().fill_rect(rect(0.0, 0.0, 2.0, 2.0), red());
    assert!(dest.pixel_buffer().unwrap().is_transparent());

    layer.finalize_layer(&mut dest);
    assert!(!dest.pixel_buffer().unwrap().is_transparent());
}

#[test]
fn test_nested_layers_multiply_on_raster() {
    let mut dest = raster_canvas(2, 2);
    let mut outer = TransparencyLayer::opacity(0.5);
    let mut inner = TransparencyLayer::opacity(0.5);
    inner.canvas_mut().fill_rect(rect(0.0, 0.0, 2.0, 2.0), red());
    inner.finalize_layer(outer.canvas_mut());
    outer.finalize_layer(&mut dest);

    let alpha = dest.pixel_buffer().unwrap().pixel(0, 0).unwrap().alpha();
    assert!((63..=65).contains(&alpha), "alpha was {alpha}");
}

#[test]
fn test_replay_follows_destination_transform() {
    let mut dest = raster_canvas(4, 4);
    dest.translate(2.0, 2.0);
    let mut layer = TransparencyLayer::opacity(1.0);
    layer.canvas_mut().fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());
    layer.finalize_layer(&mut dest);

    let buffer = dest.pixel_buffer().unwrap();
    assert_eq!(buffer.pixel(2, 2).unwrap().alpha(), 255);
    assert_eq!(buffer.pixel(0, 0).unwrap().alpha(), 0);
}

#[test]
fn test_empty_layer_changes_nothing() {
    let mut dest = raster_canvas(2, 2);
    dest.fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());
    let before = dest.pixel_buffer().unwrap().to_rgba();

    TransparencyLayer::opacity(0.3).finalize_layer(&mut dest);
    assert_eq!(dest.pixel_buffer().unwrap().to_rgba(), before);
}

#[test]
fn test_content_survives_session_ended_early() {
    let mut dest = raster_canvas(2, 2);
    let mut layer = TransparencyLayer::opacity(1.0);
    layer.canvas_mut().fill_rect(rect(0.0, 0.0, 2.0, 2.0), red());
    layer.canvas_mut().end();
    layer.finalize_layer(&mut dest);

    assert_eq!(dest.pixel_buffer().unwrap().pixel_rgba(1, 1), Some([255, 0, 0, 255]));
}

// ========== destination state ==========

#[test]
fn test_finalize_restores_destination_state() {
    let mut dest = raster_canvas(4, 4);
    dest.set_opacity(0.8);
    dest.translate(1.0, 1.0);
    dest.clip_rect(rect(0.0, 0.0, 2.0, 2.0));

    let mut layer = TransparencyLayer::opacity(0.25);
    layer.canvas_mut().fill_rect(rect(0.0, 0.0, 4.0, 4.0), red());
    layer.finalize_layer(&mut dest);

    assert!((dest.opacity() - 0.8).abs() < f32::EPSILON);
    assert_eq!(dest.transform(), Transform::from_translate(1.0, 1.0));
    assert_eq!(dest.clip_regions().len(), 1);
    assert_eq!(dest.save_depth(), 0);
}

#[test]
fn test_opacity_is_clamped_on_construction() {
    let layer = TransparencyLayer::opacity(2.0);
    let LayerKind::Opacity(inner) = layer.kind() else {
        panic!("expected an opacity layer");
    };
    assert!((inner.opacity() - 1.0).abs() < f32::EPSILON);
    assert!(!layer.is_alpha_mask_layer());
    assert_eq!(layer.save_counter, 1);
    layer.finalize_layer(&mut Canvas::recording());
}

#[test]
#[cfg(debug_assertions)]
fn test_dropping_open_layer_is_reported() {
    drop(TransparencyLayer::opacity(0.5));
    assert!(veil_common::warning::has_warned(
        "layers",
        "dropped without finalize_layer()"
    ));
}

// ========== properties ==========

#[quickcheck]
fn prop_nested_opacities_multiply(o1: u8, o2: u8, o0: u8) -> bool {
    let (o1, o2, o0) = (
        f32::from(o1) / 255.0,
        f32::from(o2) / 255.0,
        f32::from(o0) / 255.0,
    );

    let mut dest = Canvas::recording();
    dest.set_opacity(o0);

    let mut outer = TransparencyLayer::opacity(o1);
    let mut inner = TransparencyLayer::opacity(o2);
    inner.canvas_mut().fill_rect(rect(0.0, 0.0, 1.0, 1.0), red());
    inner.finalize_layer(outer.canvas_mut());
    outer.finalize_layer(&mut dest);

    let picture = dest.picture().unwrap();
    picture.len() == 1
        && (picture.commands()[0].state.opacity - o1 * o2 * o0).abs() < 1e-5
        && (dest.opacity() - o0).abs() < f32::EPSILON
}
