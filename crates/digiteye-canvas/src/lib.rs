//! Canvas capture: a software drawing surface for a single handwritten digit.
//!
//! Pointer and touch input is mapped into canvas space, rendered as white
//! round-capped strokes on black, and downsampled on demand into the 28×28
//! [`PixelGrid`](digiteye_core::PixelGrid) the classifier expects.

pub mod canvas;
pub mod geometry;
pub mod input;
pub mod replay;
pub mod stroke;
pub mod surface;

pub use canvas::Canvas;
pub use geometry::{Point, Viewport};
pub use input::{ClientPoint, PointerInput, StrokeAction};
pub use replay::StrokeFile;
pub use stroke::StrokeSession;
pub use surface::{Brush, Surface};
