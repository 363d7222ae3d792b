//! Recorded drawings that can be replayed onto a canvas.
//!
//! ```json
//! {
//!   "strokes": [[[50, 50], [230, 230]]],
//!   "viewport": { "left": 0, "top": 0, "width": 560, "height": 560 },
//!   "events": [{ "type": "mouse_down", "x": 10, "y": 10 }, { "type": "mouse_up" }]
//! }
//! ```
//!
//! `strokes` are polylines in canvas pixels. `events` are raw inputs in client
//! coordinates, mapped through `viewport` (identity when absent).

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::Canvas;
use crate::geometry::{Point, Viewport};
use crate::input::PointerInput;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strokes: Vec<Vec<[f32; 2]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<PointerInput>,
}

impl StrokeFile {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid stroke file")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|s| s.is_empty()) && self.events.is_empty()
    }

    /// Replay strokes, then events, onto `canvas`. The canvas keeps its own
    /// viewport afterwards.
    pub fn apply(&self, canvas: &mut Canvas) {
        for stroke in &self.strokes {
            let points: Vec<Point> = stroke.iter().map(|[x, y]| Point::new(*x, *y)).collect();
            canvas.draw_path(&points);
        }

        if !self.events.is_empty() {
            let previous = canvas.viewport();
            canvas.set_viewport(self.viewport.unwrap_or_default());
            for event in &self.events {
                canvas.handle_input(event);
            }
            canvas.end_stroke();
            canvas.set_viewport(previous);
        }

        debug!(
            strokes = self.strokes.len(),
            events = self.events.len(),
            "Replayed stroke file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_apply_strokes() {
        let file = StrokeFile::from_json(r#"{"strokes": [[[50, 50], [230, 230]]]}"#).unwrap();
        assert!(!file.is_empty());

        let mut canvas = Canvas::default();
        file.apply(&mut canvas);
        assert!(canvas.has_drawn());
        assert!(!canvas.is_drawing());
        assert!(canvas.capture_pixel_grid().get(14, 14).unwrap() > 0.5);
    }

    #[test]
    fn test_events_use_file_viewport() {
        let scaled = StrokeFile::from_json(
            r#"{
                "viewport": {"width": 140, "height": 140},
                "events": [
                    {"type": "touch_start", "touches": [{"x": 25, "y": 25}]},
                    {"type": "touch_move", "touches": [{"x": 115, "y": 115}]}
                ]
            }"#,
        )
        .unwrap();
        let native = StrokeFile::from_json(r#"{"strokes": [[[50, 50], [230, 230]]]}"#).unwrap();

        let mut a = Canvas::default();
        scaled.apply(&mut a);
        let mut b = Canvas::default();
        native.apply(&mut b);

        // The missing touch_end is closed by the replay.
        assert!(!a.is_drawing());
        assert_eq!(a.viewport(), Viewport::identity());
        assert_eq!(a.capture_pixel_grid(), b.capture_pixel_grid());
    }

    #[test]
    fn test_empty_and_invalid_files() {
        assert!(StrokeFile::from_json("{}").unwrap().is_empty());
        assert!(StrokeFile::from_json(r#"{"strokes": [[]]}"#).unwrap().is_empty());
        assert!(StrokeFile::from_json(r#"{"strokes": "nope"}"#).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seven.json");
        std::fs::write(&path, r#"{"strokes": [[[60, 60], [220, 60], [120, 240]]]}"#).unwrap();
        let file = StrokeFile::load(&path).unwrap();
        assert_eq!(file.strokes[0].len(), 3);

        assert!(StrokeFile::load(&dir.path().join("missing.json")).is_err());
    }
}
