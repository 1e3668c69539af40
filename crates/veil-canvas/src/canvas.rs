//! Canvas - a drawing session over a raster or recording device
//!
//! The canvas is the one drawing surface the layer code talks to. It owns
//! its device for the length of the session:
//!
//! ```text
//! Canvas::new(buffer)      Canvas::recording()
//!        ↓                        ↓
//!  Device::Raster           Device::Recording
//!   (pixels now)          (Picture, pixels later)
//! ```
//!
//! Both devices accept the same operations under the same paint state, so
//! code drawing into a canvas does not need to know which one it has. A
//! session ends with [`Canvas::end`]; drawing after that is a programmer
//! error caught by a debug assertion and ignored in release builds.

use tiny_skia::{BlendMode, Color, Path, PathBuilder, Point, Rect, Transform};
use veil_common::warning::warn_once;

use crate::picture::{DrawOp, Picture, Placement, RecordedCommand};
use crate::pixel_buffer::PixelBuffer;
use crate::raster;
use crate::state::{Brush, ClipRegion, PaintState, Pen, RenderHints};
use crate::text::Font;

/// What a canvas draws into.
#[derive(Debug, Clone)]
pub enum Device {
    /// Operations are rasterized immediately.
    Raster(PixelBuffer),
    /// Operations are recorded for later replay.
    Recording(Picture),
}

/// A drawing session with a save/restore paint-state stack.
#[derive(Debug)]
pub struct Canvas {
    /// The session's target.
    device: Device,
    /// Current paint state.
    state: PaintState,
    /// States pushed by [`Canvas::save`].
    saved: Vec<PaintState>,
    /// Whether the session still accepts drawing.
    active: bool,
}

impl Canvas {
    /// Begin a session that rasterizes into `buffer`.
    #[must_use]
    pub fn new(buffer: PixelBuffer) -> Self {
        Self::on_device(Device::Raster(buffer))
    }

    /// Begin a session that records into an empty [`Picture`].
    #[must_use]
    pub fn recording() -> Self {
        Self::on_device(Device::Recording(Picture::new()))
    }

    fn on_device(device: Device) -> Self {
        Self {
            device,
            state: PaintState::default(),
            saved: Vec::new(),
            active: true,
        }
    }

    /// End the drawing session. The device keeps whatever was drawn.
    ///
    /// Ending twice is a programmer error.
    pub fn end(&mut self) {
        debug_assert!(self.active, "canvas session ended twice");
        if !self.saved.is_empty() {
            warn_once("canvas", "session ended with unbalanced save() calls");
            self.saved.clear();
        }
        self.active = false;
    }

    /// Whether the session still accepts drawing.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The session's device.
    #[must_use]
    pub const fn device(&self) -> &Device {
        &self.device
    }

    /// The raster target, if this is a raster session.
    #[must_use]
    pub const fn pixel_buffer(&self) -> Option<&PixelBuffer> {
        match &self.device {
            Device::Raster(buffer) => Some(buffer),
            Device::Recording(_) => None,
        }
    }

    /// Mutable access to the raster target, if this is a raster session.
    ///
    /// Changes made through it bypass the paint state and work whether or
    /// not the session has ended.
    pub const fn pixel_buffer_mut(&mut self) -> Option<&mut PixelBuffer> {
        match &mut self.device {
            Device::Raster(buffer) => Some(buffer),
            Device::Recording(_) => None,
        }
    }

    /// Consume the canvas and return its raster target, if any.
    #[must_use]
    pub fn into_pixel_buffer(self) -> Option<PixelBuffer> {
        match self.device {
            Device::Raster(buffer) => Some(buffer),
            Device::Recording(_) => None,
        }
    }

    /// The recorded picture, if this is a recording session.
    #[must_use]
    pub const fn picture(&self) -> Option<&Picture> {
        match &self.device {
            Device::Raster(_) => None,
            Device::Recording(picture) => Some(picture),
        }
    }

    /// Consume the canvas and return its picture, if any.
    #[must_use]
    pub fn into_picture(self) -> Option<Picture> {
        match self.device {
            Device::Raster(_) => None,
            Device::Recording(picture) => Some(picture),
        }
    }

    /// Physical pixels per logical pixel of the target. Recordings are
    /// resolution independent and report 1.
    #[must_use]
    pub const fn device_pixel_ratio(&self) -> f32 {
        match &self.device {
            Device::Raster(buffer) => buffer.device_pixel_ratio(),
            Device::Recording(_) => 1.0,
        }
    }

    /// The full current paint state.
    #[must_use]
    pub const fn state(&self) -> &PaintState {
        &self.state
    }

    // ========================================================================
    // State Management
    // ========================================================================

    /// Push a copy of the current paint state.
    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// Pop the most recently saved paint state.
    ///
    /// An unmatched restore is reported once and otherwise ignored.
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.state = state,
            None => warn_once("canvas", "restore() without a matching save()"),
        }
    }

    /// Number of saved states.
    #[must_use]
    pub const fn save_depth(&self) -> usize {
        self.saved.len()
    }

    /// Current opacity.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.state.opacity
    }

    /// Set the opacity applied to everything drawn, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Current logical transform.
    #[must_use]
    pub const fn transform(&self) -> Transform {
        self.state.transform
    }

    /// Replace the logical transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    /// Compose `transform` with the current one; `transform` is applied
    /// first.
    pub fn combine_transform(&mut self, transform: Transform) {
        self.state.transform = self.state.transform.pre_concat(transform);
    }

    /// Reset the logical transform to identity.
    pub fn reset_transform(&mut self) {
        self.state.transform = Transform::identity();
    }

    /// Translate the coordinate system.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.pre_translate(dx, dy);
    }

    /// Scale the coordinate system.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform.pre_scale(sx, sy);
    }

    /// Current pen.
    #[must_use]
    pub const fn pen(&self) -> Pen {
        self.state.pen
    }

    /// Set the pen for outlines and text.
    pub fn set_pen(&mut self, pen: Pen) {
        self.state.pen = pen;
    }

    /// Current brush.
    #[must_use]
    pub const fn brush(&self) -> Brush {
        self.state.brush
    }

    /// Set the brush for interiors.
    pub fn set_brush(&mut self, brush: Brush) {
        self.state.brush = brush;
    }

    /// Current font.
    #[must_use]
    pub const fn font(&self) -> &Font {
        &self.state.font
    }

    /// Set the font for text.
    pub fn set_font(&mut self, font: Font) {
        self.state.font = font;
    }

    /// Current render-quality hints.
    #[must_use]
    pub const fn render_hints(&self) -> RenderHints {
        self.state.hints
    }

    /// Set the render-quality hints.
    pub fn set_render_hints(&mut self, hints: RenderHints) {
        self.state.hints = hints;
    }

    /// Current blend mode.
    #[must_use]
    pub const fn blend_mode(&self) -> BlendMode {
        self.state.blend_mode
    }

    /// Set the blend mode for subsequent drawing.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend_mode = mode;
    }

    /// Intersect the clip with a rectangle in current logical coordinates.
    pub fn clip_rect(&mut self, rect: Rect) {
        self.clip_path(PathBuilder::from_rect(rect));
    }

    /// Intersect the clip with a path in current logical coordinates.
    pub fn clip_path(&mut self, path: Path) {
        self.state.clip.push(ClipRegion {
            path,
            transform: self.state.transform,
        });
    }

    /// Current clip regions; empty means unclipped.
    #[must_use]
    pub fn clip_regions(&self) -> &[ClipRegion] {
        &self.state.clip
    }

    // ========================================================================
    // Drawing Operations
    // ========================================================================

    /// Fill a rectangle with a color, ignoring the brush.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.submit(&DrawOp::Fill {
            path: PathBuilder::from_rect(rect),
            brush: Brush::Solid(color),
        });
    }

    /// Fill a rectangle with the brush and outline it with the pen.
    pub fn draw_rect(&mut self, rect: Rect) {
        self.draw_path(&PathBuilder::from_rect(rect));
    }

    /// Fill a path with the brush and outline it with the pen.
    pub fn draw_path(&mut self, path: &Path) {
        self.fill_path(path);
        self.stroke_path(path);
    }

    /// Fill a path with the brush.
    pub fn fill_path(&mut self, path: &Path) {
        if self.state.brush == Brush::None {
            return;
        }
        self.submit(&DrawOp::Fill {
            path: path.clone(),
            brush: self.state.brush,
        });
    }

    /// Outline a path with the pen.
    pub fn stroke_path(&mut self, path: &Path) {
        if self.state.pen == Pen::None {
            return;
        }
        self.submit(&DrawOp::Stroke {
            path: path.clone(),
            pen: self.state.pen,
        });
    }

    /// Draw text with its baseline starting at `origin`.
    pub fn draw_text(&mut self, origin: Point, text: &str) {
        self.submit(&DrawOp::Text {
            origin,
            text: text.to_string(),
        });
    }

    /// Draw a pixel buffer with its top-left corner at `origin`, covering its
    /// logical size in the current coordinate system.
    pub fn draw_pixel_buffer(&mut self, origin: Point, buffer: &PixelBuffer) {
        self.submit_image(origin, buffer, Placement::Logical);
    }

    /// Composite a pixel buffer 1:1 in the target's physical pixels with
    /// its top-left corner at `origin`, bypassing transform and ratio.
    pub fn blit_pixel_buffer(&mut self, origin: Point, buffer: &PixelBuffer) {
        self.submit_image(origin, buffer, Placement::Device);
    }

    /// Replay a picture with its origin at `origin` in current logical
    /// coordinates.
    ///
    /// Each recorded command is drawn under its own recorded state, seen
    /// through this canvas' transform, clip and opacity.
    pub fn draw_picture(&mut self, origin: Point, picture: &Picture) {
        if !self.accepts_drawing() {
            return;
        }
        let base = self.state.transform.pre_translate(origin.x, origin.y);
        for command in picture.commands() {
            let state = command.state.nested_in(&self.state, base);
            dispatch(&mut self.device, &command.op, &state);
        }
    }

    fn submit(&mut self, op: &DrawOp) {
        if self.accepts_drawing() {
            dispatch(&mut self.device, op, &self.state);
        }
    }

    /// Images are only copied when recording.
    fn submit_image(&mut self, origin: Point, buffer: &PixelBuffer, placement: Placement) {
        if !self.accepts_drawing() {
            return;
        }
        match &mut self.device {
            Device::Raster(target) => {
                raster::draw_image(target, origin, buffer, placement, &self.state);
            }
            Device::Recording(picture) => picture.push(RecordedCommand {
                op: DrawOp::Image {
                    origin,
                    buffer: buffer.clone(),
                    placement,
                },
                state: self.state.clone(),
            }),
        }
    }

    fn accepts_drawing(&self) -> bool {
        debug_assert!(self.active, "drawing into a canvas whose session has ended");
        self.active
    }
}

fn dispatch(device: &mut Device, op: &DrawOp, state: &PaintState) {
    match device {
        Device::Raster(buffer) => raster::execute(buffer, op, state),
        Device::Recording(picture) => picture.push(RecordedCommand {
            op: op.clone(),
            state: state.clone(),
        }),
    }
}
