//! Style and tuning parameters shared by every graph.
//!
//! A [`Config`] is an immutable bag of named, typed options with documented
//! defaults. It deserializes from JSON with every field optional, so a
//! config file only needs the keys it changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::color::Srgb;
use crate::error::PlotError;

/// A font given as pixel size plus family, e.g. `"10px sans-serif"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub size: f64,
    pub family: String,
}

impl Font {
    pub fn new(size: f64, family: impl Into<String>) -> Self {
        Self {
            size,
            family: family.into(),
        }
    }
}

impl FromStr for Font {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (size, family) = s
            .split_once(char::is_whitespace)
            .ok_or_else(|| PlotError::InvalidFont(format!("expected '<size>px <family>', got '{s}'")))?;
        let size: f64 = size
            .strip_suffix("px")
            .ok_or_else(|| PlotError::InvalidFont(format!("size must end in 'px': '{size}'")))?
            .parse()
            .map_err(|e| PlotError::InvalidFont(format!("bad size '{size}': {e}")))?;
        if !(size.is_finite() && size > 0.0) {
            return Err(PlotError::InvalidFont(format!("size must be positive: {size}")));
        }
        Ok(Font::new(size, family.trim()))
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size, self.family)
    }
}

impl Serialize for Font {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Font {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Line style for a single stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Srgb,
    pub width: f64,
    /// Dash and gap length; `None` draws a solid line.
    pub dash: Option<f64>,
}

impl Stroke {
    pub fn new(color: Srgb, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    /// Returns the same stroke dashed with equal `length` dashes and gaps.
    pub fn dashed(mut self, length: f64) -> Self {
        self.dash = Some(length);
        self
    }
}

/// Widest stroke, in pixels, a config may request.
pub const MAX_STROKE_WIDTH: f64 = 100.0;

/// Graph configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Leading pixel margin before the plot area on both axes.
    pub gap: f64,
    /// Tick mark length in pixels.
    pub markers: f64,

    pub vector_color: Srgb,
    pub vector_width: f64,
    /// Upper pixel bound for normalized arrow length; also the field sampling
    /// density and the default trajectory step length.
    pub vector_max: f64,
    /// Lower pixel bound for normalized arrow length.
    pub vector_min: f64,
    /// Arrowhead half-length scalar.
    pub vector_head: f64,

    pub stroke_color: Srgb,
    pub line_width: f64,
    pub fill_color: Srgb,
    /// Length of each dash and each gap in dashed strokes.
    pub dash: f64,

    pub marker_font: Font,
    pub label_font: Font,
    pub axis_color: Srgb,

    pub mouse_vec_scale: f64,
    pub mouse_vec_width: f64,
    pub mouse_vec_color: Srgb,

    pub traj_color: Srgb,
    pub traj_width: f64,
    /// Upper bound on steps drawn by one instant trajectory.
    pub traj_max_steps: usize,
    /// Per-component pixel threshold below which a step counts as an equilibrium.
    pub equilibrium_epsilon: f64,
    /// Arrowhead half-length drawn at the head of a paced trajectory.
    pub traj_head: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gap: 40.0,
            markers: 5.0,
            vector_color: Srgb::YELLOW,
            vector_width: 1.0,
            vector_max: 30.0,
            vector_min: 5.0,
            vector_head: 4.0,
            stroke_color: Srgb::WHITE,
            line_width: 2.0,
            fill_color: Srgb::WHITE,
            dash: 5.0,
            marker_font: Font::new(10.0, "sans-serif"),
            label_font: Font::new(15.0, "sans-serif"),
            axis_color: Srgb::YELLOW,
            mouse_vec_scale: 3.0,
            mouse_vec_width: 3.0,
            mouse_vec_color: Srgb::RED,
            traj_color: Srgb::FUCHSIA,
            traj_width: 1.0,
            traj_max_steps: 10_000,
            equilibrium_epsilon: 0.001,
            traj_head: 4.0,
        }
    }
}

impl Config {
    /// Parses a (possibly partial) JSON config and validates it.
    pub fn from_json(value: &Value) -> Result<Self, PlotError> {
        let config: Config = serde_json::from_value(value.clone())
            .map_err(|e| PlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric options the drawing code divides by or steps with.
    pub fn validate(&self) -> Result<(), PlotError> {
        let invalid = |reason: &str| Err(PlotError::InvalidConfig(reason.to_owned()));
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return invalid("gap must be finite and non-negative");
        }
        if !(self.vector_max.is_finite() && self.vector_max >= 1.0) {
            return invalid("vector_max must be at least 1");
        }
        if !(self.vector_min >= 0.0 && self.vector_min <= self.vector_max) {
            return invalid("vector_min must lie in [0, vector_max]");
        }
        if self.traj_max_steps == 0 {
            return invalid("traj_max_steps must be positive");
        }
        let widths = [
            ("line_width", self.line_width),
            ("vector_width", self.vector_width),
            ("mouse_vec_width", self.mouse_vec_width),
            ("traj_width", self.traj_width),
        ];
        for (name, width) in widths {
            if !(width > 0.0 && width <= MAX_STROKE_WIDTH) {
                return Err(PlotError::InvalidConfig(format!(
                    "{name} must lie in (0, {MAX_STROKE_WIDTH}]"
                )));
            }
        }
        if !(self.dash.is_finite() && self.dash > 0.0) {
            return invalid("dash must be finite and positive");
        }
        if !(self.equilibrium_epsilon.is_finite() && self.equilibrium_epsilon > 0.0) {
            return invalid("equilibrium_epsilon must be finite and positive");
        }
        Ok(())
    }

    /// Stroke for axes and function overlays.
    pub fn line(&self) -> Stroke {
        Stroke::new(self.stroke_color, self.line_width)
    }

    /// Dashed variant of [`line`](Self::line) using the configured dash length.
    pub fn dashed_line(&self) -> Stroke {
        self.line().dashed(self.dash)
    }

    /// Stroke for field arrows.
    pub fn vector(&self) -> Stroke {
        Stroke::new(self.vector_color, self.vector_width)
    }

    /// Stroke for the pointer preview arrow.
    pub fn mouse_vector(&self) -> Stroke {
        Stroke::new(self.mouse_vec_color, self.mouse_vec_width)
    }

    /// Stroke for trajectories and integration curves.
    pub fn trajectory(&self) -> Stroke {
        Stroke::new(self.traj_color, self.traj_width)
    }
}
