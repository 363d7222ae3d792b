//! The drawing board: owns the canvas, the classify trigger and what is shown
//! to the user after a prediction.

pub mod board;
pub mod display;
pub mod gate;

pub use board::{Board, ClassifyRejected, PendingPrediction, PredictionOutcome};
pub use display::Display;
pub use gate::{ClassifyGate, ClassifyPermit};
