//! The drawing canvas: surface, active stroke and input mapping.

use digiteye_core::PixelGrid;
use tracing::{debug, trace};

use crate::geometry::{Point, Viewport};
use crate::input::{PointerInput, StrokeAction};
use crate::stroke::StrokeSession;
use crate::surface::{Brush, Surface};

/// Lifecycle: [`initialize`](Canvas::initialize), then any number of
/// begin/extend/end sequences, then [`clear`](Canvas::clear) or
/// [`capture_pixel_grid`](Canvas::capture_pixel_grid).
#[derive(Debug, Clone)]
pub struct Canvas {
    surface: Surface,
    session: Option<StrokeSession>,
    viewport: Viewport,
    has_drawn: bool,
}

impl Canvas {
    pub fn new(brush: Brush) -> Self {
        Self {
            surface: Surface::new(brush),
            session: None,
            viewport: Viewport::identity(),
            has_drawn: false,
        }
    }

    /// Paint the background, reset stroke settings and drop any drawing.
    pub fn initialize(&mut self, brush: Brush) {
        self.surface.set_brush(brush);
        self.surface.fill_background();
        self.session = None;
        self.has_drawn = false;
        debug!(line_width = brush.line_width(), "Canvas initialized");
    }

    /// Start a new path at `at`. Nothing is painted until it is extended.
    pub fn begin_stroke(&mut self, at: Point) {
        trace!(?at, "Stroke begin");
        self.session = Some(StrokeSession::begin(at));
        self.has_drawn = true;
    }

    /// Draw a segment to `to` if a stroke is active.
    pub fn extend_stroke(&mut self, to: Point) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (from, to) = session.extend(to);
        self.surface.stroke_segment(from, to);
    }

    /// Release the pointer. Safe to call without a matching begin.
    pub fn end_stroke(&mut self) {
        if let Some(session) = self.session.take() {
            trace!(segments = session.segment_count(), "Stroke end");
        }
    }

    /// Repaint the background, discarding every stroke.
    pub fn clear(&mut self) {
        self.surface.fill_background();
        self.session = None;
        self.has_drawn = false;
        debug!("Canvas cleared");
    }

    pub fn capture_pixel_grid(&self) -> PixelGrid {
        self.surface.capture_pixel_grid()
    }

    /// Route a raw input event through the viewport onto the stroke operations.
    pub fn handle_input(&mut self, input: &PointerInput) -> StrokeAction {
        let action = input.action();
        match action {
            StrokeAction::Begin(p) => self.begin_stroke(self.viewport.to_canvas(p.x, p.y)),
            StrokeAction::Extend(p) => self.extend_stroke(self.viewport.to_canvas(p.x, p.y)),
            StrokeAction::End => self.end_stroke(),
            StrokeAction::Ignore => {}
        }
        action
    }

    /// Draw a whole polyline given in canvas coordinates as one stroke.
    pub fn draw_path(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_stroke(*first);
        for p in rest {
            self.extend_stroke(*p);
        }
        self.end_stroke();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a stroke has been started since the last clear.
    pub fn has_drawn(&self) -> bool {
        self.has_drawn
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(Brush::default())
    }
}
