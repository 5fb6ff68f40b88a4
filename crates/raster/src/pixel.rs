//! An RGBA8 pixel buffer that implements [`Surface`].
//!
//! Strokes are rasterized by stamping a square brush along each segment,
//! with segments clipped to the buffer first so far-off points cost nothing.
//! Pixel `(i, j)` covers `[i, i + 1) × [j, j + 1)` in device space, row 0 at
//! the top. Everything is opaque; later drawing overwrites earlier drawing.

use fieldplot_core::config::{Font, Stroke};
use fieldplot_core::error::PlotError;
use fieldplot_core::surface::{FrameStack, Surface};
use fieldplot_core::Srgb;
use glam::DVec2;
use tracing::warn;

use crate::font;

/// A CPU raster surface.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    background: Srgb,
    data: Vec<u8>,
    frames: FrameStack,
}

impl Raster {
    /// Creates a raster filled with `background`.
    ///
    /// Returns `PlotError::InvalidDimensions` if either dimension is zero or
    /// the buffer size overflows `usize`.
    pub fn new(width: usize, height: usize, background: Srgb) -> Result<Self, PlotError> {
        let invalid = || PlotError::InvalidDimensions {
            width: width as f64,
            height: height as f64,
            gap: 0.0,
        };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(invalid)?;
        let mut raster = Self {
            width,
            height,
            background,
            data: vec![0; len],
            frames: FrameStack::default(),
        };
        raster.clear();
        Ok(raster)
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn background(&self) -> Srgb {
        self.background
    }

    /// Row-major RGBA8 bytes, `width * height * 4` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The RGBA bytes of pixel `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Number of pixels exactly equal to `color`.
    pub fn count(&self, color: Srgb) -> usize {
        let rgba = color.to_rgba8();
        self.data.chunks_exact(4).filter(|px| *px == rgba).count()
    }

    /// Fills the whole buffer with the background color.
    pub fn clear(&mut self) {
        let rgba = self.background.to_rgba8();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    fn plot(&mut self, x: i64, y: i64, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Fills the pixels whose centers fall in the axis-aligned square of
    /// side `side` centered on `center`.
    fn fill_square(&mut self, center: DVec2, side: f64, rgba: [u8; 4]) {
        let half = side / 2.0;
        let (w, h) = (self.width as i64, self.height as i64);
        // `as` saturates, so huge or infinite brushes clamp to the raster
        let x0 = ((center.x - half - 0.5).ceil() as i64).max(0);
        let x1 = ((center.x + half - 0.5).ceil() as i64).min(w);
        let y0 = ((center.y - half - 0.5).ceil() as i64).max(0);
        let y1 = ((center.y + half - 0.5).ceil() as i64).min(h);
        for y in y0..y1 {
            for x in x0..x1 {
                self.plot(x, y, rgba);
            }
        }
    }

    /// Stamps the brush along `a → b`, skipping dash gaps.
    ///
    /// `arc` is the distance along the poly-line at `a`.
    fn segment(&mut self, a: DVec2, b: DVec2, arc: f64, side: f64, dash: Option<f64>, rgba: [u8; 4]) {
        let margin = side.min((self.width + self.height) as f64);
        let min = DVec2::splat(-margin);
        let max = DVec2::new(self.width as f64 + margin, self.height as f64 + margin);
        let Some((t0, t1)) = clip(a, b, min, max) else {
            return;
        };
        let length = (b - a).length();
        let (p0, p1) = (a.lerp(b, t0), a.lerp(b, t1));
        let steps = (p1 - p0).abs().max_element().ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = t0 + (t1 - t0) * (i as f64 / steps as f64);
            if let Some(dash) = dash {
                let along = arc + t * length;
                if (along / dash).floor() as i64 % 2 != 0 {
                    continue;
                }
            }
            self.fill_square(a.lerp(b, t), side, rgba);
        }
    }
}

/// Liang–Barsky clip of `a → b` against the box `[min, max]`.
///
/// Returns the parameter interval inside the box, or `None` if the segment misses it.
fn clip(a: DVec2, b: DVec2, min: DVec2, max: DVec2) -> Option<(f64, f64)> {
    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

impl Surface for Raster {
    type Snapshot = Vec<u8>;

    fn width(&self) -> f64 {
        self.width as f64
    }

    fn height(&self) -> f64 {
        self.height as f64
    }

    fn save(&mut self) {
        self.frames.save();
    }

    fn restore(&mut self) {
        self.frames.restore();
    }

    fn translate(&mut self, offset: DVec2) {
        self.frames.translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.frames.rotate(radians);
    }

    fn scale(&mut self, factor: DVec2) {
        self.frames.scale(factor);
    }

    fn stroke(&mut self, path: &[DVec2], stroke: &Stroke) {
        let rgba = stroke.color.to_rgba8();
        let side = stroke.width.max(1.0);
        let dash = stroke.dash.filter(|d| d.is_finite() && *d > 0.0);
        let device: Vec<DVec2> = path.iter().map(|&p| self.frames.apply(p)).collect();

        let mut arc = 0.0;
        for pair in device.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if !(a.is_finite() && b.is_finite()) {
                continue;
            }
            self.segment(a, b, arc, side, dash, rgba);
            arc += (b - a).length();
        }
    }

    fn fill_text(&mut self, text: &str, font: &Font, color: Srgb) {
        let cell = font::cell_size(font.size);
        let side = cell * self.frames.apply_vector(DVec2::X).length();
        let rgba = color.to_rgba8();
        for center in font::layout(text, cell) {
            let device = self.frames.apply(center);
            if device.is_finite() {
                self.fill_square(device, side, rgba);
            }
        }
    }

    fn capture(&self) -> Self::Snapshot {
        self.data.clone()
    }

    fn put(&mut self, snapshot: &Self::Snapshot) {
        if snapshot.len() != self.data.len() {
            warn!(
                expected = self.data.len(),
                got = snapshot.len(),
                "ignoring snapshot of a different size"
            );
            return;
        }
        self.data.copy_from_slice(snapshot);
    }
}
