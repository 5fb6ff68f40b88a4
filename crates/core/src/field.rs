//! Vector fields drawn over a [`Graph`], and trajectories stepped through them.
//!
//! A `Field` samples its rate functions on a regular pixel grid, normalizes
//! every arrow against the largest sampled magnitude, and draws the result
//! once. Trajectories are Euler steps whose pixel length is proportional to
//! the local magnitude, either run to completion in one call or advanced one
//! segment at a time through a [`Trajectory`] state machine.
//!
//! `Field` derefs to its [`Graph`], so axis, layer and drawing operations are
//! available directly on the field.

use std::ops::{Deref, DerefMut};

use glam::DVec2;
use tracing::{debug, trace};

use crate::config::Stroke;
use crate::error::PlotError;
use crate::graph::{Graph, Layer, Polyline};
use crate::ops::{self, MagnitudeRange, Scaled};
use crate::surface::Surface;
use crate::vector::{RateFn, Vector};

/// Why a trajectory stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The last segment ended outside the plot area.
    OutOfBounds,
    /// The step shrank below the equilibrium threshold.
    Equilibrium,
    /// The step could not be scaled: a zero vector with equilibrium stops
    /// disabled, or a rate function produced a non-finite value.
    NumericDegenerate,
    /// The instant loop reached `traj_max_steps`.
    StepLimit,
}

/// Outcome of one trajectory step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A segment was drawn; its tip is where the next step starts.
    Advanced(Scaled),
    Stopped(StopReason),
}

/// Per-trajectory options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryOptions {
    /// Pixel length of a step at the field's largest sampled magnitude.
    pub step_length: f64,
    /// Stop once a step falls below the equilibrium threshold.
    pub stop_at_equilibrium: bool,
}

impl TrajectoryOptions {
    pub fn new(step_length: f64) -> Self {
        Self {
            step_length,
            stop_at_equilibrium: true,
        }
    }

    pub fn stop_at_equilibrium(mut self, stop: bool) -> Self {
        self.stop_at_equilibrium = stop;
        self
    }
}

/// Result of running a trajectory to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySummary {
    /// Segments drawn that did not stop the trajectory.
    pub steps: usize,
    pub stop: StopReason,
    /// Pixel position the final step started from.
    pub end: DVec2,
}

/// A stepped trajectory. Once stopped it never resumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trajectory {
    Active { position: DVec2 },
    Stopped(StopReason),
}

impl Trajectory {
    pub fn start(position: DVec2) -> Self {
        Trajectory::Active { position }
    }

    pub fn position(&self) -> Option<DVec2> {
        match self {
            Trajectory::Active { position } => Some(*position),
            Trajectory::Stopped(_) => None,
        }
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Trajectory::Active { .. } => None,
            Trajectory::Stopped(reason) => Some(*reason),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Trajectory::Active { .. })
    }
}

/// A graph with a sampled vector field drawn on it.
pub struct Field<S: Surface> {
    graph: Graph<S>,
    rates: Vec<RateFn>,
    vectors: Vec<Vector>,
    range: MagnitudeRange,
}

impl<S: Surface> Field<S> {
    /// Samples `rates` over `graph`, draws every arrow and commits the field layer.
    ///
    /// Returns `PlotError::RateCount` unless there is one rate per axis.
    pub fn new(graph: Graph<S>, rates: Vec<RateFn>) -> Result<Self, PlotError> {
        let expected = graph.axes().len();
        if rates.len() != expected {
            return Err(PlotError::RateCount {
                expected,
                got: rates.len(),
            });
        }
        let vectors: Vec<Vector> = ops::combos(graph.axes(), graph.config().vector_max)
            .into_iter()
            .map(|base| Vector::new(base, &rates))
            .collect();

        let mut field = Self {
            graph,
            rates,
            vectors,
            range: MagnitudeRange::new(0.0, 0.0),
        };
        field.range = field.measure();
        debug!(
            vectors = field.vectors.len(),
            max_magnitude = field.range.max,
            "sampled vector field"
        );
        field.draw_vectors();
        field.graph.commit(Layer::Field);
        Ok(field)
    }

    fn measure(&self) -> MagnitudeRange {
        let axes = self.graph.axes();
        MagnitudeRange::from_magnitudes(
            self.vectors
                .iter()
                .map(|v| ops::distance(&v.pixels(axes))),
        )
    }

    fn draw_vectors(&mut self) {
        let stroke = self.graph.config().vector();
        // the vectors are moved out so draw_vector can borrow self mutably
        let vectors = std::mem::take(&mut self.vectors);
        for vector in &vectors {
            self.draw_vector(vector, &stroke, 1.0);
        }
        self.vectors = vectors;
    }

    pub fn graph(&self) -> &Graph<S> {
        &self.graph
    }

    pub fn into_graph(self) -> Graph<S> {
        self.graph
    }

    pub fn rates(&self) -> &[RateFn] {
        &self.rates
    }

    /// The sampled grid vectors.
    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    /// Pixel magnitude range arrows are normalized against.
    pub fn range(&self) -> MagnitudeRange {
        self.range
    }

    /// The field vector whose base is at pixel `position`.
    pub fn vector_at(&self, position: DVec2) -> Vector {
        let base = ops::units(&[position.x, position.y], self.graph.axes());
        Vector::new(base, &self.rates)
    }

    /// Draws `vector` as an arrow with length in
    /// `[vector_min, vector_max] · length_scalar`.
    ///
    /// The head is drawn only when the shaft ends on the canvas. Returns
    /// whether it did; a zero-length vector draws nothing and returns `false`.
    pub fn draw_vector(&mut self, vector: &Vector, stroke: &Stroke, length_scalar: f64) -> bool {
        let config = self.graph.config();
        let (max_len, min_len) = (config.vector_max * length_scalar, config.vector_min * length_scalar);
        let head = config.vector_head;

        let segment = vector.pixels(self.graph.axes());
        let Some(scaled) = ops::scale(&segment, self.range, max_len, min_len) else {
            return false;
        };
        let shaft = Polyline::new(vec![scaled.base(), scaled.tip()]);
        if !self.graph.draw(&shaft, stroke, false) {
            return false;
        }
        self.draw_arrowhead(&scaled, head * scaled.rel * length_scalar, stroke);
        true
    }

    /// Draws a chevron of half-length `half_length` at the tip of `scaled`,
    /// pointing along it. Clipping is off for the head.
    pub fn draw_arrowhead(&mut self, scaled: &Scaled, half_length: f64, stroke: &Stroke) {
        let Some(direction) = ops::angle(&scaled.segment) else {
            return;
        };
        let h = half_length;
        let surface = self.graph.surface_mut();
        surface.save();
        surface.translate(scaled.tip());
        surface.rotate(direction);
        self.graph.draw(
            &Polyline::new(vec![DVec2::new(-h, h), DVec2::ZERO, DVec2::new(-h, -h)]),
            stroke,
            true,
        );
        self.graph.surface_mut().restore();
    }

    /// Draws one trajectory segment starting at pixel `from`.
    pub fn step(&mut self, from: DVec2, options: &TrajectoryOptions) -> Step {
        let segment = self.vector_at(from).pixels(self.graph.axes());
        let Some(scaled) = ops::scale(&segment, self.range, options.step_length, 0.0) else {
            let zero = ops::distance(&segment) == 0.0;
            return Step::Stopped(if zero && options.stop_at_equilibrium {
                StopReason::Equilibrium
            } else {
                StopReason::NumericDegenerate
            });
        };

        let stroke = self.graph.config().trajectory();
        let epsilon = self.graph.config().equilibrium_epsilon;
        if !self
            .graph
            .draw(&Polyline::new(vec![scaled.base(), scaled.tip()]), &stroke, false)
        {
            return Step::Stopped(StopReason::OutOfBounds);
        }
        let delta = scaled.tip() - scaled.base();
        if options.stop_at_equilibrium && delta.x.abs() < epsilon && delta.y.abs() < epsilon {
            return Step::Stopped(StopReason::Equilibrium);
        }
        Step::Advanced(scaled)
    }

    /// Advances a stepped trajectory by one segment.
    ///
    /// A stopped trajectory draws nothing and reports its stop reason again.
    pub fn advance(&mut self, trajectory: &mut Trajectory, options: &TrajectoryOptions) -> Step {
        let position = match *trajectory {
            Trajectory::Active { position } => position,
            Trajectory::Stopped(reason) => return Step::Stopped(reason),
        };
        let step = self.step(position, options);
        *trajectory = match &step {
            Step::Advanced(scaled) => Trajectory::Active {
                position: scaled.tip(),
            },
            Step::Stopped(reason) => {
                trace!(?reason, x = position.x, y = position.y, "trajectory stopped");
                Trajectory::Stopped(*reason)
            }
        };
        step
    }

    /// Draws a whole trajectory from `from`, at most `traj_max_steps` segments.
    pub fn trajectory(&mut self, from: DVec2, options: &TrajectoryOptions) -> TrajectorySummary {
        let limit = self.graph.config().traj_max_steps;
        let mut trajectory = Trajectory::start(from);
        let mut end = from;
        for steps in 0..limit {
            match self.advance(&mut trajectory, options) {
                Step::Advanced(scaled) => end = scaled.tip(),
                Step::Stopped(stop) => {
                    return TrajectorySummary { steps, stop, end };
                }
            }
        }
        debug!(limit, "trajectory hit step limit");
        TrajectorySummary {
            steps: limit,
            stop: StopReason::StepLimit,
            end,
        }
    }

    /// Re-evaluates every vector and the magnitude range, e.g. after a
    /// [`Parameter`](crate::parameter::Parameter) changed.
    pub fn recalculate(&mut self) {
        for vector in &mut self.vectors {
            vector.recalculate(&self.rates);
        }
        self.range = self.measure();
        debug!(max_magnitude = self.range.max, "recalculated field");
    }

    /// Repaints axes, arrows and overlays, then commits the result as the
    /// curves layer (and so the field and trace layers too).
    pub fn redraw(&mut self) {
        self.graph.restore(Layer::Axes);
        self.draw_vectors();
        self.graph.redraw_overlays();
        self.graph.commit(Layer::Curves);
    }
}

impl<S: Surface> Deref for Field<S> {
    type Target = Graph<S>;

    fn deref(&self) -> &Graph<S> {
        &self.graph
    }
}

impl<S: Surface> DerefMut for Field<S> {
    fn deref_mut(&mut self) -> &mut Graph<S> {
        &mut self.graph
    }
}
