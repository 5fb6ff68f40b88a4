//! Value-over-time plots fed by a running trajectory.
//!
//! An [`Integration`] draws onto a companion [`Graph`]: one axis carries a
//! scalar projection of the trajectory's unit position, the other carries
//! time. It holds only the axis index, never the graph itself; callers pass
//! the graph to each operation.

use glam::DVec2;
use tracing::debug;

use crate::color::Srgb;
use crate::config::Stroke;
use crate::error::PlotError;
use crate::graph::{Graph, Layer, Polyline};
use crate::surface::Surface;
use crate::vector::RateFn;

/// A value/time curve in progress.
pub struct Integration {
    axis: usize,
    time: f64,
    function: RateFn,
    color: Srgb,
    /// Last plotted `(value, time)`.
    previous: Option<(f64, f64)>,
    stopped: bool,
}

impl Integration {
    /// Binds a new integration to `axis` of `graph`, advancing `time` per sample.
    ///
    /// Returns `PlotError::AxisNotFound` for an axis the graph lacks and
    /// `PlotError::InvalidTimeStep` unless `time` is positive and finite.
    pub fn new<S: Surface>(
        graph: &Graph<S>,
        axis: usize,
        time: f64,
        function: RateFn,
        color: Srgb,
    ) -> Result<Self, PlotError> {
        graph.axis(axis)?;
        if !(time.is_finite() && time > 0.0) {
            return Err(PlotError::InvalidTimeStep(time));
        }
        Ok(Self {
            axis,
            time,
            function,
            color,
            previous: None,
            stopped: false,
        })
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The last plotted `(value, time)`, if any sample was taken.
    pub fn previous(&self) -> Option<(f64, f64)> {
        self.previous
    }

    /// Plots the value at unit position `input` one time step after the last sample.
    ///
    /// Returns `false` without drawing once stopped. A sample whose segment
    /// ends off the graph stops the integration and returns `false`.
    pub fn sample<S: Surface>(&mut self, graph: &mut Graph<S>, input: &[f64]) -> bool {
        if self.stopped {
            return false;
        }
        let value = (self.function)(input);
        let (last_value, last_time) = *self.previous.get_or_insert((value, -self.time));
        let current = (value, last_time + self.time);

        let flip = self.axis == 1;
        let points = graph.pixels(
            &[DVec2::new(last_value, last_time), DVec2::new(current.0, current.1)],
            flip,
        );
        let stroke = Stroke::new(self.color, graph.config().traj_width);
        if !graph.draw(&Polyline::new(points).flipped(flip), &stroke, false) {
            debug!(axis = self.axis, time = current.1, "integration left its graph");
            self.stopped = true;
            return false;
        }
        self.previous = Some(current);
        true
    }

    /// Erases the curve and rewinds so the next sample lands at time zero.
    pub fn reset<S: Surface>(&mut self, graph: &mut Graph<S>) {
        graph.restore(Layer::Curves);
        if let Some((value, _)) = self.previous {
            self.previous = Some((value, -self.time));
        }
        self.stopped = false;
        debug!(axis = self.axis, "integration reset");
    }
}

/// A reusable description of an integration, instantiated once per run.
#[derive(Clone)]
pub struct IntegrationSpec {
    pub axis: usize,
    pub time: f64,
    pub function: RateFn,
    pub color: Srgb,
    /// Reset and start over when the curve runs off the graph.
    pub repeat: bool,
}

impl IntegrationSpec {
    pub fn new(axis: usize, time: f64, function: RateFn, color: Srgb) -> Self {
        Self {
            axis,
            time,
            function,
            color,
            repeat: false,
        }
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn instantiate<S: Surface>(&self, graph: &Graph<S>) -> Result<Integration, PlotError> {
        Integration::new(graph, self.axis, self.time, self.function.clone(), self.color)
    }
}

impl std::fmt::Debug for IntegrationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationSpec")
            .field("axis", &self.axis)
            .field("time", &self.time)
            .field("color", &self.color)
            .field("repeat", &self.repeat)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisSpec;
    use crate::config::Config;
    use crate::surface::Recorder;
    use crate::vector::rate;

    /// Time on x (0..10), value on y (-5..5).
    fn companion() -> Graph<Recorder> {
        Graph::new(
            Recorder::new(300.0, 200.0),
            AxisSpec::new(0.0, 10.0, 1.0, "t"),
            AxisSpec::new(-5.0, 5.0, 1.0, "x"),
            Config::default(),
        )
        .unwrap()
    }

    fn first_coordinate() -> RateFn {
        rate(|p| p[0])
    }

    #[test]
    fn rejects_missing_axis() {
        let g = companion();
        let result = Integration::new(&g, 2, 1.0, first_coordinate(), Srgb::RED);
        assert!(matches!(result, Err(PlotError::AxisNotFound { index: 2, count: 2 })));
    }

    #[test]
    fn rejects_non_positive_time() {
        let g = companion();
        for time in [0.0, -1.0, f64::NAN] {
            let result = Integration::new(&g, 1, time, first_coordinate(), Srgb::RED);
            assert!(matches!(result, Err(PlotError::InvalidTimeStep(_))));
        }
    }

    #[test]
    fn first_sample_lands_at_time_zero() {
        let mut g = companion();
        let mut int = Integration::new(&g, 1, 1.0, first_coordinate(), Srgb::RED).unwrap();
        assert!(int.sample(&mut g, &[2.0, 0.0]));
        assert_eq!(int.previous(), Some((2.0, 0.0)));
        assert!(int.sample(&mut g, &[3.0, 0.0]));
        assert_eq!(int.previous(), Some((3.0, 1.0)));
    }

    #[test]
    fn stops_when_time_runs_off_graph() {
        let mut g = companion();
        let mut int = Integration::new(&g, 1, 1.0, first_coordinate(), Srgb::RED).unwrap();
        // t = 0..=10 fit the time axis
        for _ in 0..=10 {
            assert!(int.sample(&mut g, &[1.0, 0.0]));
        }
        assert!(!int.sample(&mut g, &[1.0, 0.0]));
        assert!(int.is_stopped());
        let drawn = g.surface().commands().len();
        assert!(!int.sample(&mut g, &[1.0, 0.0]));
        assert_eq!(g.surface().commands().len(), drawn);
    }

    #[test]
    fn value_leaving_y_range_stops_then_reset_rewinds() {
        let mut g = companion();
        let mut int = Integration::new(&g, 1, 1.0, first_coordinate(), Srgb::RED).unwrap();
        // value axis spans -5..5, so 6 is the first sample off the graph
        let drawn: Vec<bool> = [0.0, 2.0, 4.0, 6.0]
            .iter()
            .map(|&v| int.sample(&mut g, &[v, 0.0]))
            .collect();
        assert_eq!(drawn, [true, true, true, false]);
        assert!(int.is_stopped());
        assert_eq!(int.previous(), Some((4.0, 2.0)));

        int.reset(&mut g);
        assert!(!int.is_stopped());
        assert_eq!(int.previous(), Some((4.0, -1.0)));
    }

    #[test]
    fn reset_erases_and_rewinds() {
        let mut g = companion();
        let curves = g.snapshot(Layer::Curves).len();
        let mut int = Integration::new(&g, 1, 1.0, first_coordinate(), Srgb::RED).unwrap();
        while int.sample(&mut g, &[1.0, 0.0]) {}
        int.reset(&mut g);
        assert!(!int.is_stopped());
        assert_eq!(g.surface().commands().len(), curves);
        assert_eq!(int.previous(), Some((1.0, -1.0)));
        assert!(int.sample(&mut g, &[4.0, 0.0]));
        assert_eq!(int.previous(), Some((4.0, 0.0)));
    }

    #[test]
    fn value_axis_zero_draws_flipped() {
        // value on x (-5..5), time on y (0..10)
        let mut g = Graph::new(
            Recorder::new(200.0, 300.0),
            AxisSpec::new(-5.0, 5.0, 1.0, "x"),
            AxisSpec::new(0.0, 10.0, 1.0, "t"),
            Config::default(),
        )
        .unwrap();
        let mut int = Integration::new(&g, 0, 1.0, first_coordinate(), Srgb::RED).unwrap();
        int.sample(&mut g, &[0.0, 0.0]);
        assert!(int.sample(&mut g, &[0.0, 0.0]));
        let (points, _) = g.surface().strokes().last().unwrap();
        // graph (120, 40) -> (120, 66) is device (120, 260) -> (120, 234)
        assert!((points[0] - DVec2::new(120.0, 260.0)).length() < 1e-9);
        assert!((points[1] - DVec2::new(120.0, 234.0)).length() < 1e-9);
    }

    #[test]
    fn spec_instantiates_fresh_integrations() {
        let g = companion();
        let spec = IntegrationSpec::new(1, 0.5, first_coordinate(), Srgb::RED).repeat(true);
        let a = spec.instantiate(&g).unwrap();
        assert!(a.previous().is_none());
        assert!(spec.repeat);
        assert_eq!(a.time(), 0.5);
    }
}
