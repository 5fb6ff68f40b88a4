//! A single graph axis: the only place a unit↔pixel scale lives.
//!
//! An [`Axis`] maps unit values in `[min, max]` onto pixels in
//! `[gap, length]` with a fixed affine scale chosen at construction.

use std::fmt;
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::Stroke;
use crate::error::PlotError;

/// Distance in pixels between a tick and its label anchor.
const LABEL_OFFSET: f64 = 10.0;

/// Tolerance used when deciding whether a tick value is an integer.
const INTEGER_EPS: f64 = 1e-9;

/// Bounds, tick interval and title of an axis, in unit space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub label: String,
}

impl AxisSpec {
    pub fn new(min: f64, max: f64, step: f64, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            step,
            label: label.into(),
        }
    }

    /// Checks `max > min`, `step > 0` and that every bound is finite.
    pub fn validate(&self) -> Result<(), PlotError> {
        let invalid = |reason: &str| {
            Err(PlotError::InvalidAxis {
                label: self.label.clone(),
                reason: reason.to_owned(),
            })
        };
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return invalid("bounds and step must be finite");
        }
        if self.max <= self.min {
            return invalid("max must exceed min");
        }
        if self.step <= 0.0 {
            return invalid("step must be positive");
        }
        Ok(())
    }
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self::new(-10.0, 10.0, 2.0, "X")
    }
}

/// A one-variable function plotted against an axis.
pub type OverlayFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A registered function curve, replayed whenever the graph is redrawn.
///
/// Overlays are identified by name: registering a second overlay with the
/// same name on the same axis is a no-op.
#[derive(Clone)]
pub struct Overlay {
    name: String,
    func: OverlayFn,
    stroke: Stroke,
}

impl Overlay {
    pub fn new(
        name: impl Into<String>,
        stroke: Stroke,
        func: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
            stroke,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stroke(&self) -> Stroke {
        self.stroke
    }

    /// Evaluates the function at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        (self.func)(x)
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("name", &self.name)
            .field("stroke", &self.stroke)
            .finish_non_exhaustive()
    }
}

/// Text placed at a pixel anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: DVec2,
}

impl Label {
    /// Places `text` just outside the axis line at `coords`.
    ///
    /// `coords` are given in the axis's own frame (along-axis, across-axis);
    /// sideways labels belong to the vertical axis and swap the two.
    pub fn placed(text: impl Into<String>, coords: DVec2, sideways: bool) -> Self {
        let anchor = if sideways {
            DVec2::new(coords.y - LABEL_OFFSET, coords.x)
        } else {
            DVec2::new(coords.x, coords.y - LABEL_OFFSET)
        };
        Self {
            text: text.into(),
            anchor,
        }
    }
}

/// Formats a tick value: integers bare, everything else to one decimal.
pub fn format_value(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < INTEGER_EPS {
        // avoid printing "-0"
        if rounded == 0.0 {
            "0".to_owned()
        } else {
            format!("{rounded}")
        }
    } else {
        format!("{value:.1}")
    }
}

/// An axis with a fixed unit↔pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    spec: AxisSpec,
    length: f64,
    gap: f64,
    scale: f64,
    samples: Vec<f64>,
    overlays: Vec<Overlay>,
}

impl Axis {
    /// Creates an axis spanning `length` pixels, the first `gap` of which are margin.
    ///
    /// Returns `PlotError::InvalidAxis` for a malformed spec or when
    /// `length` does not exceed `gap`.
    pub fn new(spec: AxisSpec, length: f64, gap: f64) -> Result<Self, PlotError> {
        spec.validate()?;
        if !(length.is_finite() && gap.is_finite() && gap >= 0.0 && length > gap) {
            return Err(PlotError::InvalidAxis {
                label: spec.label.clone(),
                reason: format!("length {length} must exceed gap {gap}"),
            });
        }
        let scale = (length - gap) / (spec.max - spec.min);
        let mut axis = Self {
            spec,
            length,
            gap,
            scale,
            samples: Vec::new(),
            overlays: Vec::new(),
        };
        let samples: Vec<f64> = axis.pixel_samples(1.0).map(|p| axis.to_units(p)).collect();
        axis.samples = samples;
        Ok(axis)
    }

    pub fn spec(&self) -> &AxisSpec {
        &self.spec
    }

    /// Total pixel length, margin included.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Pixels per unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Converts a unit value to a pixel coordinate.
    pub fn to_pixels(&self, units: f64) -> f64 {
        (units - self.spec.min) * self.scale + self.gap
    }

    /// Converts a pixel coordinate to a unit value.
    pub fn to_units(&self, pixels: f64) -> f64 {
        (pixels - self.gap) / self.scale + self.spec.min
    }

    /// Pixel coordinates from `gap` to `length` inclusive, every `density` pixels.
    pub fn pixel_samples(&self, density: f64) -> impl Iterator<Item = f64> + '_ {
        let count = self.sample_count(density);
        (0..count).map(move |i| self.gap + i as f64 * density)
    }

    /// Number of points [`pixel_samples`](Self::pixel_samples) yields.
    pub fn sample_count(&self, density: f64) -> usize {
        ((self.length - self.gap) / density).floor() as usize + 1
    }

    /// Unit value of every pixel column in the plot area.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Tick positions strictly between `min` and `max`, every `step` units.
    pub fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let AxisSpec { min, max, step, .. } = self.spec;
        let limit = max - step * INTEGER_EPS;
        (1..)
            .map(move |i| min + i as f64 * step)
            .take_while(move |&u| u < limit)
    }

    /// Formats a tick value and positions it relative to the tick at `coords`.
    pub fn label(&self, value: f64, coords: DVec2, sideways: bool) -> Label {
        Label::placed(format_value(value), coords, sideways)
    }

    /// The axis title placed at `coords`.
    pub fn title(&self, coords: DVec2, sideways: bool) -> Label {
        Label::placed(self.spec.label.clone(), coords, sideways)
    }

    /// Registers an overlay unless one with the same name exists.
    ///
    /// Returns `true` if the overlay was added.
    pub fn register(&mut self, overlay: Overlay) -> bool {
        if self.overlays.iter().any(|o| o.name == overlay.name) {
            return false;
        }
        self.overlays.push(overlay);
        true
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }
}
