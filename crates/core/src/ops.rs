//! Pure numeric helpers over vectors, magnitude ranges and axes.
//!
//! Everything here is dimension-agnostic except [`angle`], which reads the
//! first two components.

use glam::DVec2;

use crate::axis::Axis;

/// A directed segment from `base` to `tip`, one coordinate per axis.
///
/// Used for both unit-space and pixel-space vectors; the caller knows which.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub base: Vec<f64>,
    pub tip: Vec<f64>,
}

impl Segment {
    pub fn new(base: Vec<f64>, tip: Vec<f64>) -> Self {
        debug_assert_eq!(base.len(), tip.len());
        Self { base, tip }
    }

    /// Componentwise `tip − base`.
    pub fn delta(&self) -> Vec<f64> {
        self.base
            .iter()
            .zip(&self.tip)
            .map(|(b, t)| t - b)
            .collect()
    }

    /// The segment with base and tip exchanged.
    pub fn reversed(&self) -> Self {
        Self {
            base: self.tip.clone(),
            tip: self.base.clone(),
        }
    }

    /// First two base components as a point.
    pub fn base_point(&self) -> DVec2 {
        point2(&self.base)
    }

    /// First two tip components as a point.
    pub fn tip_point(&self) -> DVec2 {
        point2(&self.tip)
    }
}

fn point2(coords: &[f64]) -> DVec2 {
    DVec2::new(
        coords.first().copied().unwrap_or(0.0),
        coords.get(1).copied().unwrap_or(0.0),
    )
}

/// The span of vector magnitudes used to normalize arrow lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeRange {
    pub min: f64,
    pub max: f64,
}

impl MagnitudeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `{0, max}` over the given magnitudes; an empty input gives `{0, 0}`.
    pub fn from_magnitudes(magnitudes: impl IntoIterator<Item = f64>) -> Self {
        let max = magnitudes
            .into_iter()
            .filter(|m| m.is_finite())
            .fold(0.0_f64, f64::max);
        Self { min: 0.0, max }
    }

    /// True when no magnitude can be told apart from another.
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }
}

/// A pixel segment rescaled into a bounded length.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    pub segment: Segment,
    /// Where the original length falls in the range, in `[lower, 1]`.
    pub rel: f64,
    /// Divisor applied to the original delta.
    pub scalar: f64,
}

impl Scaled {
    pub fn base(&self) -> DVec2 {
        self.segment.base_point()
    }

    pub fn tip(&self) -> DVec2 {
        self.segment.tip_point()
    }
}

/// Euclidean length of `tip − base`.
pub fn distance(segment: &Segment) -> f64 {
    segment
        .delta()
        .iter()
        .map(|d| d * d)
        .sum::<f64>()
        .sqrt()
}

/// Direction of `tip − base` in radians.
///
/// Computed as the arctangent of the slope, plus π when the x component is
/// negative, so the result covers the whole circle in `(−π/2, 3π/2)`.
/// A vertical segment gives ±π/2. Returns `None` for a zero-length segment,
/// which has no direction.
pub fn angle(segment: &Segment) -> Option<f64> {
    let d = segment.tip_point() - segment.base_point();
    if d.x == 0.0 {
        return match d.y.partial_cmp(&0.0)? {
            std::cmp::Ordering::Greater => Some(std::f64::consts::FRAC_PI_2),
            std::cmp::Ordering::Less => Some(-std::f64::consts::FRAC_PI_2),
            std::cmp::Ordering::Equal => None,
        };
    }
    let slope = (d.y / d.x).atan();
    let result = if d.x < 0.0 { slope + std::f64::consts::PI } else { slope };
    result.is_finite().then_some(result)
}

/// Linearly maps `distance` from `range` onto `[lower, 1]`.
///
/// A degenerate range (`max <= min`) maps everything to `1`.
pub fn relative(distance: f64, range: MagnitudeRange, lower: f64) -> f64 {
    if range.is_degenerate() {
        return 1.0;
    }
    (1.0 - lower) * ((distance - range.min) / (range.max - range.min)) + lower
}

/// Rescales a segment so its length falls in `[min_len, max_len]` in
/// proportion to where its current length falls in `range`.
///
/// The returned tip is `(tip − base) / scalar + base`. The relative
/// magnitude is clamped to `[min_len / max_len, 1]`, so a segment longer
/// than `range.max` is capped at `max_len`. Returns `None` when the segment
/// has zero length or the arithmetic does not produce a finite scalar.
pub fn scale(segment: &Segment, range: MagnitudeRange, max_len: f64, min_len: f64) -> Option<Scaled> {
    if !(max_len > 0.0 && (0.0..=max_len).contains(&min_len)) {
        return None;
    }
    let dist = distance(segment);
    let lower = min_len / max_len;
    let rel = relative(dist, range, lower).clamp(lower, 1.0);
    let scalar = dist / (rel * max_len);
    if !(scalar.is_finite() && scalar > 0.0) {
        return None;
    }
    let tip = segment
        .base
        .iter()
        .zip(&segment.tip)
        .map(|(b, t)| (t - b) / scalar + b)
        .collect();
    Some(Scaled {
        segment: Segment::new(segment.base.clone(), tip),
        rel,
        scalar,
    })
}

/// Every combination of sampled unit values across `axes`.
///
/// Each axis is sampled every `density` pixels from its margin to its end
/// and converted to units. The last axis varies fastest, as in nested loops.
/// The result holds `∏ axis.sample_count(density)` points; a non-positive
/// density yields nothing.
pub fn combos(axes: &[Axis], density: f64) -> Vec<Vec<f64>> {
    if !(density.is_finite() && density > 0.0) {
        return Vec::new();
    }
    let columns: Vec<Vec<f64>> = axes
        .iter()
        .map(|axis| {
            axis.pixel_samples(density)
                .map(|p| axis.to_units(p))
                .collect()
        })
        .collect();
    let total: usize = columns.iter().map(Vec::len).product();

    (0..total)
        .map(|mut index| {
            let mut point = vec![0.0; columns.len()];
            for (slot, column) in columns.iter().enumerate().rev() {
                point[slot] = column[index % column.len()];
                index /= column.len();
            }
            point
        })
        .collect()
}

/// Componentwise pixel → unit conversion.
pub fn units(pixels: &[f64], axes: &[Axis]) -> Vec<f64> {
    pixels
        .iter()
        .zip(axes)
        .map(|(&p, axis)| axis.to_units(p))
        .collect()
}

/// Componentwise unit → pixel conversion.
pub fn pixels(units: &[f64], axes: &[Axis]) -> Vec<f64> {
    units
        .iter()
        .zip(axes)
        .map(|(&u, axis)| axis.to_pixels(u))
        .collect()
}
