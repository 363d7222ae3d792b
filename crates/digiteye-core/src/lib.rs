//! Core types, config, and errors for DigitEye.

pub mod config;
pub mod error;
pub mod grid;
pub mod types;

pub use error::{DigitEyeError, Result};
pub use grid::{CANVAS_SIZE, DOWNSAMPLE_FACTOR, GRID_LEN, GRID_SIZE, PixelGrid};
pub use types::{Ack, DrawingRecord, HealthStatus, NUM_CLASSES, NewDrawing, Page, PredictionResult};
