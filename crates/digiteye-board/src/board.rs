//! Board controller.

use digiteye_canvas::{Brush, Canvas, Point, PointerInput, StrokeAction, Viewport};
use digiteye_client::{Classifier, ClientError};
use digiteye_core::config::Config;
use digiteye_core::{PixelGrid, PredictionResult};
use thiserror::Error;
use tracing::{debug, warn};

use crate::display::{Display, failure_message};
use crate::gate::{ClassifyGate, ClassifyPermit};

/// Why the classify control did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClassifyRejected {
    #[error("a prediction is already in progress")]
    Busy,
    #[error("nothing has been drawn")]
    NothingDrawn,
}

/// A captured grid waiting to be sent. Holds the classify permit until the
/// outcome is handed back to [`Board::finish`].
#[derive(Debug)]
pub struct PendingPrediction {
    grid: PixelGrid,
    permit: ClassifyPermit,
}

impl PendingPrediction {
    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Issue the request. Runs to completion or failure; never retried.
    pub async fn run<C: Classifier + ?Sized>(self, classifier: &C) -> PredictionOutcome {
        let result = classifier.predict(&self.grid).await;
        PredictionOutcome {
            result,
            _permit: self.permit,
        }
    }
}

#[derive(Debug)]
pub struct PredictionOutcome {
    pub result: Result<PredictionResult, ClientError>,
    _permit: ClassifyPermit,
}

/// Owns the canvas and everything the user sees around it.
#[derive(Debug)]
pub struct Board {
    canvas: Canvas,
    brush: Brush,
    display: Display,
    gate: ClassifyGate,
}

impl Board {
    pub fn new(brush: Brush) -> Self {
        Self {
            canvas: Canvas::new(brush),
            brush,
            display: Display::default(),
            gate: ClassifyGate::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Brush::new(config.brush_radius()))
    }

    /// Reset the surface and stroke settings, and forget any prediction.
    pub fn initialize(&mut self) {
        self.canvas.initialize(self.brush);
        self.display.clear();
    }

    pub fn begin_stroke(&mut self, at: Point) {
        self.canvas.begin_stroke(at);
        self.display.clear();
    }

    pub fn extend_stroke(&mut self, to: Point) {
        self.canvas.extend_stroke(to);
    }

    pub fn end_stroke(&mut self) {
        self.canvas.end_stroke();
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
        self.display.clear();
    }

    /// Feed a raw pointer/touch event.
    pub fn handle(&mut self, input: &PointerInput) {
        if let StrokeAction::Begin(_) = self.canvas.handle_input(input) {
            self.display.clear();
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.canvas.set_viewport(viewport);
    }

    pub fn capture_pixel_grid(&self) -> PixelGrid {
        self.canvas.capture_pixel_grid()
    }

    /// Whether the classify control is enabled.
    pub fn can_classify(&self) -> bool {
        self.canvas.has_drawn() && !self.gate.is_busy()
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_busy()
    }

    /// Capture the grid and claim the classify trigger.
    pub fn start_classify(&mut self) -> Result<PendingPrediction, ClassifyRejected> {
        if !self.canvas.has_drawn() {
            return Err(ClassifyRejected::NothingDrawn);
        }
        let Some(permit) = self.gate.try_acquire() else {
            debug!("Classify ignored: request outstanding");
            return Err(ClassifyRejected::Busy);
        };
        self.display.error = None;
        Ok(PendingPrediction {
            grid: self.canvas.capture_pixel_grid(),
            permit,
        })
    }

    /// Show the outcome and release the trigger.
    pub fn finish(&mut self, outcome: PredictionOutcome) {
        let PredictionOutcome { result, _permit } = outcome;
        match result {
            Ok(result) => self.display.show_result(result),
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "Prediction failed");
                self.display.show_error(failure_message(&err));
            }
        }
    }

    /// Capture, submit and display in one step.
    pub async fn classify<C: Classifier + ?Sized>(
        &mut self,
        classifier: &C,
    ) -> Result<&Display, ClassifyRejected> {
        let pending = self.start_classify()?;
        let outcome = pending.run(classifier).await;
        self.finish(outcome);
        Ok(&self.display)
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// A handle observing the classify trigger.
    pub fn gate(&self) -> ClassifyGate {
        self.gate.clone()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Brush::default())
    }
}
