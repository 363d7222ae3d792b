//! Full-resolution drawing surface.

use std::io::Cursor;
use std::path::Path;

use digiteye_core::{CANVAS_SIZE, DOWNSAMPLE_FACTOR, GRID_LEN, GRID_SIZE, PixelGrid};
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use tracing::trace;

use crate::geometry::Point;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Stroke settings: white ink, round caps and joins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub radius: f32,
}

impl Brush {
    pub const DEFAULT_RADIUS: f32 = 12.0;

    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn line_width(&self) -> f32 {
        self.radius * 2.0
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

/// A `CANVAS_SIZE`-square RGBA backing store.
///
/// Ink is composited with a lighten rule, so R, G and B always stay equal
/// and overlapping segments never brighten past full coverage.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
    brush: Brush,
}

impl Surface {
    /// A freshly initialized (black) surface.
    pub fn new(brush: Brush) -> Self {
        Self {
            image: RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BACKGROUND),
            brush,
        }
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Repaint the whole surface with the background.
    pub fn fill_background(&mut self) {
        for px in self.image.pixels_mut() {
            *px = BACKGROUND;
        }
    }

    /// Raw red channel value at `(x, y)`.
    pub fn intensity(&self, x: u32, y: u32) -> Option<u8> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0[0])
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Render one round-capped segment with anti-aliased edges.
    pub fn stroke_segment(&mut self, from: Point, to: Point) {
        if !from.is_finite() || !to.is_finite() {
            return;
        }
        let r = self.brush.radius;
        let reach = r + 1.0;
        let Some((x0, x1)) = pixel_span(from.x.min(to.x) - reach, from.x.max(to.x) + reach, self.width())
        else {
            return;
        };
        let Some((y0, y1)) = pixel_span(from.y.min(to.y) - reach, from.y.max(to.y) + reach, self.height())
        else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (r + 0.5 - centre.distance_to_segment(from, to)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let ink = (coverage * 255.0).round() as u8;
                let px = self.image.get_pixel_mut(x, y);
                let value = px.0[0].max(ink);
                *px = Rgba([value, value, value, 255]);
            }
        }
        trace!(?from, ?to, "Stroked segment");
    }

    /// Area-average the surface down to the 28×28 grid, red channel only.
    pub fn capture_pixel_grid(&self) -> PixelGrid {
        let block = DOWNSAMPLE_FACTOR;
        let area = block * block;
        let mut samples = [0u8; GRID_LEN];

        for gy in 0..GRID_SIZE {
            for gx in 0..GRID_SIZE {
                let mut sum = 0u32;
                for y in gy * block..(gy + 1) * block {
                    for x in gx * block..(gx + 1) * block {
                        sum += u32::from(self.image.get_pixel(x, y).0[0]);
                    }
                }
                samples[(gy * GRID_SIZE + gx) as usize] = ((sum + area / 2) / area) as u8;
            }
        }

        PixelGrid::from_red_channel(&samples)
    }

    /// Encode the full-resolution surface as PNG.
    pub fn to_png(&self) -> image::ImageResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    pub fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Brush::default())
    }
}

/// Render a grid as an 8-bit grayscale image, one pixel per cell.
pub fn grid_image(grid: &PixelGrid) -> GrayImage {
    GrayImage::from_fn(GRID_SIZE, GRID_SIZE, |x, y| {
        let v = grid.get(y, x).unwrap_or(0.0);
        Luma([(v * 255.0).round() as u8])
    })
}

/// Clamp a float range to pixel indices `[0, limit)`. `None` when empty.
fn pixel_span(lo: f32, hi: f32, limit: u32) -> Option<(u32, u32)> {
    let max = limit as f32 - 1.0;
    if hi < 0.0 || lo > max {
        return None;
    }
    Some((lo.floor().max(0.0) as u32, hi.ceil().min(max) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_black() {
        let surface = Surface::default();
        assert_eq!(surface.width(), 280);
        assert_eq!(surface.height(), 280);
        assert!(surface.image().pixels().all(|p| *p == BACKGROUND));
        assert!(surface.capture_pixel_grid().is_blank());
    }

    #[test]
    fn test_stroke_is_white_and_achromatic() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(40.0, 140.0), Point::new(240.0, 140.0));

        assert_eq!(surface.intensity(140, 140), Some(255));
        assert_eq!(surface.intensity(140, 100), Some(0));
        assert!(surface.image().pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn test_round_caps_extend_past_endpoints() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(100.0, 100.0), Point::new(150.0, 100.0));
        // Inside the cap radius beyond the end point.
        assert_eq!(surface.intensity(160, 100), Some(255));
        assert_eq!(surface.intensity(170, 100), Some(0));
    }

    #[test]
    fn test_overlapping_segments_do_not_overbrighten() {
        let mut once = Surface::default();
        once.stroke_segment(Point::new(50.0, 50.0), Point::new(200.0, 60.0));

        let mut twice = once.clone();
        twice.stroke_segment(Point::new(50.0, 50.0), Point::new(200.0, 60.0));

        assert_eq!(once.image().as_raw(), twice.image().as_raw());
    }

    #[test]
    fn test_offscreen_and_non_finite_segments_are_ignored() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(-100.0, -100.0), Point::new(-50.0, -60.0));
        surface.stroke_segment(Point::new(f32::NAN, 3.0), Point::new(10.0, 10.0));
        assert!(surface.capture_pixel_grid().is_blank());
    }

    #[test]
    fn test_partially_offscreen_segment_is_clipped() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(-40.0, 20.0), Point::new(400.0, 20.0));
        assert_eq!(surface.intensity(0, 20), Some(255));
        assert_eq!(surface.intensity(279, 20), Some(255));
    }

    #[test]
    fn test_fill_background_clears() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(10.0, 10.0), Point::new(200.0, 200.0));
        surface.fill_background();
        assert!(surface.capture_pixel_grid().is_blank());
    }

    #[test]
    fn test_capture_averages_blocks() {
        let mut surface = Surface::default();
        // A full-width horizontal band covering grid row 14 entirely.
        surface.set_brush(Brush::new(10.0));
        surface.stroke_segment(Point::new(-20.0, 145.0), Point::new(300.0, 145.0));

        let grid = surface.capture_pixel_grid();
        assert_eq!(grid.len(), 784);
        assert_eq!(grid.get(14, 0), Some(1.0));
        assert_eq!(grid.get(14, 27), Some(1.0));
        assert_eq!(grid.get(0, 0), Some(0.0));
        assert!(grid.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_png_export() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(50.0, 50.0), Point::new(230.0, 230.0));
        let png = surface.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), surface.image().as_raw());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digit.png");
        surface.save_png(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_grid_image_matches_grid() {
        let mut surface = Surface::default();
        surface.stroke_segment(Point::new(0.0, 0.0), Point::new(279.0, 279.0));
        let grid = surface.capture_pixel_grid();
        let img = grid_image(&grid);
        assert_eq!(img.dimensions(), (28, 28));
        assert_eq!(img.get_pixel(5, 5).0[0], (grid.get(5, 5).unwrap() * 255.0).round() as u8);
    }
}
