#![deny(unsafe_code)]
//! Core types for the fieldplot 2D graphing system.
//!
//! Provides unit↔pixel [`Axis`] mapping, the [`Graph`] with named raster
//! layers, sampled vector [`Field`]s with stepped and instant trajectories,
//! value/time [`Integration`]s, the toolkit-independent [`Explorer`] driver,
//! named [`Preset`] systems, [`Config`], and the [`Surface`] trait every
//! drawing backend implements (with the in-memory [`Recorder`]).

pub mod axis;
pub mod color;
pub mod config;
pub mod error;
pub mod explorer;
pub mod field;
pub mod graph;
pub mod integration;
pub mod ops;
pub mod parameter;
pub mod params;
pub mod presets;
pub mod surface;
pub mod vector;

pub use axis::{Axis, AxisSpec, Label, Overlay};
pub use color::Srgb;
pub use config::{Config, Font, Stroke};
pub use error::PlotError;
pub use explorer::{CancelToken, Explorer, PointerMode, Run, RunStatus};
pub use field::{Field, Step, StopReason, Trajectory, TrajectoryOptions, TrajectorySummary};
pub use graph::{Graph, Layer, Polyline};
pub use integration::{Integration, IntegrationSpec};
pub use parameter::Parameter;
pub use presets::{Preset, System};
pub use surface::{Recorder, Surface};
pub use vector::{rate, RateFn, Vector};
