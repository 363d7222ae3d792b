//! The 28×28 pixel grid exchanged with the classifier.
//!
//! Intensities are `f32` in `[0, 1]`: the red channel of a white-on-black
//! rendering divided by 255. This is the only scale the grid ever carries.

use serde::{Deserialize, Serialize};

use crate::error::{DigitEyeError, Result};

/// Side of the drawing surface's backing store, in pixels.
pub const CANVAS_SIZE: u32 = 280;

/// Side of the downsampled grid.
pub const GRID_SIZE: u32 = 28;

/// Number of values in a flattened grid.
pub const GRID_LEN: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Source pixels per grid cell along each axis.
pub const DOWNSAMPLE_FACTOR: u32 = CANVAS_SIZE / GRID_SIZE;

const _: () = assert!(CANVAS_SIZE % GRID_SIZE == 0);

/// A row-major 28×28 grid of intensities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct PixelGrid(Vec<f32>);

impl PixelGrid {
    /// An all-background grid.
    pub fn blank() -> Self {
        Self(vec![0.0; GRID_LEN])
    }

    /// Validate and wrap externally supplied intensities.
    pub fn from_values(values: Vec<f32>) -> Result<Self> {
        if values.len() != GRID_LEN {
            return Err(DigitEyeError::InvalidGrid(format!(
                "expected {GRID_LEN} values, got {}",
                values.len()
            )));
        }
        if let Some((idx, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
        {
            return Err(DigitEyeError::InvalidGrid(format!(
                "value {v} at index {idx} is outside [0, 1]"
            )));
        }
        Ok(Self(values))
    }

    /// Build a grid from raw 8-bit red-channel samples.
    pub fn from_red_channel(samples: &[u8; GRID_LEN]) -> Self {
        Self(samples.iter().map(|&r| f32::from(r) / 255.0).collect())
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Intensity at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: u32, col: u32) -> Option<f32> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return None;
        }
        self.0.get((row * GRID_SIZE + col) as usize).copied()
    }

    /// True when every cell holds the background value.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn max(&self) -> f32 {
        self.0.iter().copied().fold(0.0, f32::max)
    }

    /// Cells with non-background intensity as `(row, col, value)`.
    pub fn lit_cells(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, v)| (i as u32 / GRID_SIZE, i as u32 % GRID_SIZE, *v))
    }

    /// Text preview, one line per row, darker glyphs for brighter cells.
    pub fn to_ascii(&self) -> String {
        const RAMP: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(GRID_LEN + GRID_SIZE as usize);
        for row in self.0.chunks(GRID_SIZE as usize) {
            for v in row {
                let idx = (v * (RAMP.len() - 1) as f32).round() as usize;
                out.push(RAMP[idx.min(RAMP.len() - 1)] as char);
            }
            out.push('\n');
        }
        out
    }
}

impl TryFrom<Vec<f32>> for PixelGrid {
    type Error = DigitEyeError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::from_values(values)
    }
}

impl From<PixelGrid> for Vec<f32> {
    fn from(grid: PixelGrid) -> Self {
        grid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_grid() {
        let grid = PixelGrid::blank();
        assert_eq!(grid.len(), 784);
        assert!(grid.is_blank());
        assert_eq!(grid.lit_cells().count(), 0);
    }

    #[test]
    fn test_from_values_rejects_wrong_length() {
        let err = PixelGrid::from_values(vec![0.0; 783]).unwrap_err();
        assert!(err.to_string().contains("783"));
    }

    #[test]
    fn test_from_values_rejects_out_of_range() {
        let mut values = vec![0.0; GRID_LEN];
        values[10] = 255.0;
        assert!(PixelGrid::from_values(values.clone()).is_err());

        values[10] = f32::NAN;
        assert!(PixelGrid::from_values(values).is_err());
    }

    #[test]
    fn test_from_red_channel_normalizes() {
        let mut samples = [0u8; GRID_LEN];
        samples[0] = 255;
        samples[29] = 51;
        let grid = PixelGrid::from_red_channel(&samples);
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert!((grid.get(1, 1).unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(grid.get(28, 0), None);
        assert_eq!(grid.max(), 1.0);
    }

    #[test]
    fn test_serde_is_flat_array() {
        let grid = PixelGrid::blank();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 784);

        let bad = serde_json::from_str::<PixelGrid>("[0.0, 0.5]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_ascii_preview_shape() {
        let mut samples = [0u8; GRID_LEN];
        samples[0] = 255;
        let ascii = PixelGrid::from_red_channel(&samples).to_ascii();
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines.len(), 28);
        assert!(lines.iter().all(|l| l.chars().count() == 28));
        assert!(lines[0].starts_with('@'));
    }
}
