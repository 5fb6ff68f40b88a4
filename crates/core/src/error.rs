//! Error types for the fieldplot core.

use thiserror::Error;

/// Errors produced while building graphs, fields and integrations.
///
/// Runtime conditions of the drawing loop (a trajectory leaving the canvas,
/// a zero-length step) are not errors; they surface as
/// [`StopReason`](crate::field::StopReason) values or `draw` booleans.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Width or height was zero, or the plot area vanished behind the margin.
    #[error("invalid dimensions: surface must be larger than the {gap}px margin, got {width}x{height}")]
    InvalidDimensions { width: f64, height: f64, gap: f64 },

    /// An axis spec had `max <= min`, a non-positive step or a non-finite bound,
    /// or its pixel length did not exceed the margin.
    #[error("invalid axis '{label}': {reason}")]
    InvalidAxis { label: String, reason: String },

    /// An integration was bound to an axis index the target graph does not have.
    #[error("axis {index} not found on graph with {count} axes")]
    AxisNotFound { index: usize, count: usize },

    /// A field needs exactly one rate function per axis.
    #[error("expected {expected} rate functions, got {got}")]
    RateCount { expected: usize, got: usize },

    /// An integration time increment must be positive and finite.
    #[error("invalid integration time step: {0}")]
    InvalidTimeStep(f64),

    /// A preset name was not recognized.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A requested parameter name was not found.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was malformed or out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A font string could not be parsed.
    #[error("invalid font: {0}")]
    InvalidFont(String),

    /// An I/O error (file write, image encoding).
    #[error("io error: {0}")]
    Io(String),
}
