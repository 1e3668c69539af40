//! Opacity layers: record now, replay translucently later.

use veil_canvas::{Canvas, Point};

/// A layer whose content is captured as a picture and replayed onto the
/// destination with a uniform opacity.
#[derive(Debug)]
pub struct OpacityLayer {
    /// Recording session the layer's content is drawn into.
    canvas: Canvas,
    /// Group opacity in `[0, 1]`.
    opacity: f32,
}

impl OpacityLayer {
    /// Open a layer that will composite its content at `opacity`.
    ///
    /// Values outside `[0, 1]` are clamped.
    #[must_use]
    pub fn new(opacity: f32) -> Self {
        Self {
            canvas: Canvas::recording(),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Group opacity the content will be composited at.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The recording canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The recording canvas, for drawing the layer's content.
    pub const fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// End the recording and replay it onto `dest` at
    /// `self.opacity × dest.opacity()`, leaving `dest`'s opacity as it was.
    pub(crate) fn finalize(&mut self, dest: &mut Canvas) {
        if self.canvas.is_active() {
            self.canvas.end();
        }
        let Some(picture) = self.canvas.picture() else {
            return;
        };

        let ambient = dest.opacity();
        dest.set_opacity(self.opacity * ambient);
        dest.draw_picture(Point::zero(), picture);
        dest.set_opacity(ambient);
    }
}
