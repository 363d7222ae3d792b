//! Canvas-space points and client-to-canvas coordinate mapping.

use digiteye_core::CANVAS_SIZE;
use serde::{Deserialize, Serialize};

/// A point in canvas pixel space (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Distance from `self` to the segment `a`–`b`.
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f32 {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Where the canvas is displayed, in client (event) coordinates.
///
/// The backing store is always `CANVAS_SIZE` square; the displayed rectangle
/// may be any size, so each axis is scaled independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Displayed at the origin at intrinsic size.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, CANVAS_SIZE as f32, CANVAS_SIZE as f32)
    }

    /// `(intrinsic / displayed)` per axis. Degenerate sizes scale by 1.
    pub fn scale(&self) -> (f32, f32) {
        (axis_scale(self.width), axis_scale(self.height))
    }

    /// Map client coordinates into canvas space.
    pub fn to_canvas(&self, client_x: f32, client_y: f32) -> Point {
        let (sx, sy) = self.scale();
        Point::new((client_x - self.left) * sx, (client_y - self.top) * sy)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

fn axis_scale(displayed: f32) -> f32 {
    if displayed.is_finite() && displayed > 0.0 {
        CANVAS_SIZE as f32 / displayed
    } else {
        1.0
    }
}
