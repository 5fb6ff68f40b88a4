//! Toolkit-independent interaction driver for a [`Field`].
//!
//! An [`Explorer`] turns pointer and control events into field operations:
//! a preview under the pointer, paced trajectories with attached
//! integrations, clearing, and parameter changes. It knows nothing about
//! event sources; a UI binding calls these methods from its own handlers.
//!
//! Paced runs are driven either by hand with [`Explorer::begin`] and
//! [`Explorer::advance`], sleeping for the returned delay between calls, or
//! by awaiting [`Explorer::trace`] with a caller-supplied sleep function.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use tracing::{debug, info};

use crate::error::PlotError;
use crate::field::{Field, Step, StopReason, Trajectory, TrajectoryOptions};
use crate::graph::{Graph, Layer};
use crate::integration::{Integration, IntegrationSpec};
use crate::ops;
use crate::parameter::Parameter;
use crate::surface::Surface;

/// Base pacing unit; a full-magnitude step waits `rel / scalar` of this.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(10);

/// What the pointer preview draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMode {
    /// An enlarged field arrow at the pointer.
    Arrow,
    /// A whole trajectory from the pointer.
    #[default]
    Trajectory,
}

/// A shared flag that stops paced runs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of one paced step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunStatus {
    /// A segment was drawn; wait this long before the next `advance`.
    Continue(Duration),
    Finished(StopReason),
    Cancelled,
}

/// A paced trajectory in progress.
pub struct Run {
    trajectory: Trajectory,
    /// Live integrations with the index of their companion.
    integrations: Vec<(usize, Integration)>,
    token: CancelToken,
    steps: usize,
}

impl Run {
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Segments drawn so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Integrations still being fed.
    pub fn live_integrations(&self) -> usize {
        self.integrations.len()
    }

    /// A handle that cancels this run from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }
}

struct Companion<S: Surface> {
    graph: Graph<S>,
    spec: IntegrationSpec,
}

/// Interactive driver over a field and its companion integration graphs.
pub struct Explorer<S: Surface> {
    field: Field<S>,
    companions: Vec<Companion<S>>,
    parameters: Vec<Parameter>,
    mode: PointerMode,
    pointer: Option<DVec2>,
    token: CancelToken,
    wait: Duration,
}

impl<S: Surface> Explorer<S> {
    pub fn new(field: Field<S>) -> Self {
        Self {
            field,
            companions: Vec::new(),
            parameters: Vec::new(),
            mode: PointerMode::default(),
            pointer: None,
            token: CancelToken::new(),
            wait: DEFAULT_WAIT,
        }
    }

    /// Registers parameters that [`set_parameter`](Self::set_parameter) can change.
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_mode(mut self, mode: PointerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn field(&self) -> &Field<S> {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field<S> {
        &mut self.field
    }

    pub fn into_field(self) -> Field<S> {
        self.field
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PointerMode) {
        self.mode = mode;
    }

    /// The pointer position, if it is over the plot area.
    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The companion graph at `index`.
    pub fn companion(&self, index: usize) -> Option<&Graph<S>> {
        self.companions.get(index).map(|c| &c.graph)
    }

    pub fn companion_count(&self) -> usize {
        self.companions.len()
    }

    fn options(&self) -> TrajectoryOptions {
        TrajectoryOptions::new(self.field.config().vector_max)
    }

    /// Moves the pointer and redraws the preview.
    ///
    /// `None`, or a position inside the margin, erases the preview.
    pub fn pointer_move(&mut self, position: Option<DVec2>) {
        self.pointer = position.filter(|&p| p.is_finite() && self.field.contains(p));
        self.field.restore(Layer::Trace);
        self.draw_preview();
    }

    fn draw_preview(&mut self) {
        let Some(position) = self.pointer else {
            return;
        };
        match self.mode {
            PointerMode::Arrow => {
                let config = self.field.config();
                let (stroke, scale) = (config.mouse_vector(), config.mouse_vec_scale);
                let vector = self.field.vector_at(position);
                self.field.draw_vector(&vector, &stroke, scale);
            }
            PointerMode::Trajectory => {
                let options = self.options();
                self.field.trajectory(position, &options);
            }
        }
    }

    /// Attaches a companion graph fed by every later run.
    ///
    /// Returns the companion index. `spec` is checked against `graph`
    /// up front, so `AxisNotFound` and `InvalidTimeStep` surface here
    /// rather than at [`begin`](Self::begin).
    pub fn add_integration(&mut self, graph: Graph<S>, spec: IntegrationSpec) -> Result<usize, PlotError> {
        spec.instantiate(&graph)?;
        self.companions.push(Companion { graph, spec });
        Ok(self.companions.len() - 1)
    }

    /// Starts a paced trajectory at pixel `start`.
    pub fn begin(&mut self, start: DVec2) -> Result<Run, PlotError> {
        let integrations = self
            .companions
            .iter()
            .enumerate()
            .map(|(index, c)| Ok((index, c.spec.instantiate(&c.graph)?)))
            .collect::<Result<Vec<_>, PlotError>>()?;
        info!(x = start.x, y = start.y, integrations = integrations.len(), "trajectory run started");
        Ok(Run {
            trajectory: Trajectory::start(start),
            integrations,
            token: self.token.clone(),
            steps: 0,
        })
    }

    /// Draws the next segment of `run`.
    ///
    /// Each segment is committed to the trace layer, then the pointer
    /// preview and a transient arrowhead at the new position are drawn on
    /// top and every integration takes a sample at the segment's start.
    pub fn advance(&mut self, run: &mut Run) -> RunStatus {
        if run.token.is_cancelled() {
            return RunStatus::Cancelled;
        }
        self.field.restore(Layer::Trace);
        let options = self.options();
        let step = self.field.advance(&mut run.trajectory, &options);
        self.field.commit(Layer::Trace);
        self.draw_preview();

        let scaled = match step {
            Step::Advanced(scaled) => scaled,
            Step::Stopped(reason) => {
                info!(?reason, steps = run.steps, "trajectory run finished");
                return RunStatus::Finished(reason);
            }
        };
        run.steps += 1;

        let config = self.field.config();
        let (stroke, head) = (config.trajectory(), config.traj_head);
        self.field.draw_arrowhead(&scaled, head, &stroke);

        let input = ops::units(&scaled.segment.base, self.field.axes());
        let companions = &mut self.companions;
        run.integrations.retain_mut(|(index, integration)| {
            let companion = &mut companions[*index];
            if integration.sample(&mut companion.graph, &input) {
                return true;
            }
            if companion.spec.repeat {
                integration.reset(&mut companion.graph);
                true
            } else {
                false
            }
        });

        let factor = scaled.rel / scaled.scalar;
        let fallback = if factor > 0.0 { Duration::MAX } else { Duration::ZERO };
        let delay = Duration::try_from_secs_f64(self.wait.as_secs_f64() * factor).unwrap_or(fallback);
        RunStatus::Continue(delay)
    }

    /// Runs a paced trajectory to completion, awaiting `sleep(delay)` between steps.
    ///
    /// Returns `RunStatus::Finished` or `RunStatus::Cancelled`.
    pub async fn trace<F, Fut>(&mut self, start: DVec2, mut sleep: F) -> Result<RunStatus, PlotError>
    where
        F: FnMut(Duration) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut run = self.begin(start)?;
        loop {
            match self.advance(&mut run) {
                RunStatus::Continue(delay) => sleep(delay).await,
                done => return Ok(done),
            }
        }
    }

    /// Cancels every run started so far and erases all traces.
    ///
    /// Runs begun after this call are unaffected.
    pub fn clear(&mut self) {
        self.token.cancel();
        self.token = CancelToken::new();
        self.field.restore(Layer::Field);
        self.field.commit(Layer::Trace);
        for companion in &mut self.companions {
            companion.graph.restore(Layer::Curves);
        }
        debug!("cleared traces");
    }

    /// Sets a registered parameter and redraws the field.
    ///
    /// Returns `PlotError::ParamNotFound` for an unknown name.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), PlotError> {
        let parameter = self
            .parameters
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| PlotError::ParamNotFound(name.to_owned()))?;
        parameter.set(value);
        debug!(name, value, "parameter changed");
        self.field.recalculate();
        self.field.redraw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisSpec;
    use crate::color::Srgb;
    use crate::config::Config;
    use crate::surface::Recorder;
    use crate::vector::{rate, RateFn};

    fn graph() -> Graph<Recorder> {
        Graph::new(
            Recorder::new(500.0, 500.0),
            AxisSpec::new(-10.0, 10.0, 2.0, "X"),
            AxisSpec::new(-10.0, 10.0, 2.0, "Y"),
            Config::default(),
        )
        .unwrap()
    }

    fn companion() -> Graph<Recorder> {
        Graph::new(
            Recorder::new(300.0, 200.0),
            AxisSpec::new(0.0, 10.0, 1.0, "t"),
            AxisSpec::new(-10.0, 10.0, 5.0, "x"),
            Config::default(),
        )
        .unwrap()
    }

    fn explorer(rates: Vec<RateFn>) -> Explorer<Recorder> {
        Explorer::new(Field::new(graph(), rates).unwrap())
    }

    fn source() -> Vec<RateFn> {
        vec![rate(|p| p[0]), rate(|p| p[1])]
    }

    fn rotation() -> Vec<RateFn> {
        vec![rate(|p| p[1]), rate(|p| -p[0])]
    }

    fn traj_strokes(e: &Explorer<Recorder>) -> usize {
        e.field().surface().strokes_in(Config::default().traj_color)
    }

    #[test]
    fn arrow_preview_replaces_previous_preview() {
        let mut e = explorer(rotation()).with_mode(PointerMode::Arrow);
        let red = e.field().config().mouse_vec_color;
        e.pointer_move(Some(DVec2::new(300.0, 300.0)));
        assert_eq!(e.field().surface().strokes_in(red), 2);
        e.pointer_move(Some(DVec2::new(350.0, 200.0)));
        assert_eq!(e.field().surface().strokes_in(red), 2);
    }

    #[test]
    fn pointer_leaving_erases_preview() {
        let mut e = explorer(rotation()).with_mode(PointerMode::Arrow);
        let red = e.field().config().mouse_vec_color;
        e.pointer_move(Some(DVec2::new(300.0, 300.0)));
        e.pointer_move(None);
        assert_eq!(e.field().surface().strokes_in(red), 0);
        assert_eq!(e.pointer(), None);
    }

    #[test]
    fn pointer_in_margin_counts_as_absent() {
        let mut e = explorer(rotation());
        e.pointer_move(Some(DVec2::new(20.0, 300.0)));
        assert_eq!(e.pointer(), None);
        assert_eq!(traj_strokes(&e), 0);
    }

    #[test]
    fn trajectory_preview_draws_a_path() {
        let mut e = explorer(rotation()).with_mode(PointerMode::Trajectory);
        e.pointer_move(Some(DVec2::new(320.0, 270.0)));
        assert!(traj_strokes(&e) > 10);
    }

    #[test]
    fn run_continues_then_leaves_canvas() {
        let mut e = explorer(source());
        let mut run = e.begin(DVec2::new(400.0, 270.0)).unwrap();
        let mut finished = None;
        for _ in 0..100 {
            match e.advance(&mut run) {
                RunStatus::Continue(delay) => assert!(delay <= DEFAULT_WAIT),
                other => {
                    finished = Some(other);
                    break;
                }
            }
        }
        assert_eq!(finished, Some(RunStatus::Finished(StopReason::OutOfBounds)));
        assert!(run.steps() > 0);
        // committed segments survive a preview refresh
        e.pointer_move(None);
        assert_eq!(traj_strokes(&e), run.steps() + 1);
    }

    #[test]
    fn arrowhead_is_transient() {
        let mut e = explorer(rotation());
        let mut run = e.begin(DVec2::new(320.0, 270.0)).unwrap();
        assert!(matches!(e.advance(&mut run), RunStatus::Continue(_)));
        // one committed segment plus the arrowhead
        assert_eq!(traj_strokes(&e), 2);
        e.pointer_move(None);
        assert_eq!(traj_strokes(&e), 1);
    }

    #[test]
    fn clear_cancels_runs_and_erases_traces() {
        let mut e = explorer(rotation());
        let mut run = e.begin(DVec2::new(320.0, 270.0)).unwrap();
        e.advance(&mut run);
        e.clear();
        assert_eq!(e.advance(&mut run), RunStatus::Cancelled);
        assert_eq!(traj_strokes(&e), 0);

        let mut fresh = e.begin(DVec2::new(320.0, 270.0)).unwrap();
        assert!(matches!(e.advance(&mut fresh), RunStatus::Continue(_)));
    }

    #[test]
    fn external_cancel_stops_a_run() {
        let mut e = explorer(rotation());
        let mut run = e.begin(DVec2::new(320.0, 270.0)).unwrap();
        run.cancel_token().cancel();
        assert_eq!(e.advance(&mut run), RunStatus::Cancelled);
        assert_eq!(run.steps(), 0);
    }

    #[test]
    fn trace_awaits_each_delay() {
        let mut e = explorer(source());
        let mut delays = Vec::new();
        let status = futures::executor::block_on(e.trace(DVec2::new(400.0, 270.0), |d| {
            delays.push(d);
            std::future::ready(())
        }))
        .unwrap();
        assert_eq!(status, RunStatus::Finished(StopReason::OutOfBounds));
        assert!(!delays.is_empty());
    }

    #[test]
    fn integrations_sample_each_step() {
        let mut e = explorer(rotation());
        let spec = IntegrationSpec::new(1, 1.0, rate(|p| p[0]), Srgb::RED);
        let index = e.add_integration(companion(), spec).unwrap();
        let before = e.companion(index).unwrap().surface().commands().len();
        let mut run = e.begin(DVec2::new(320.0, 270.0)).unwrap();
        for _ in 0..3 {
            e.advance(&mut run);
        }
        // the first sample only seeds the curve
        let after = e.companion(index).unwrap().surface().commands().len();
        assert_eq!(after, before + 2);
        assert_eq!(run.live_integrations(), 1);
    }

    #[test]
    fn exhausted_integration_is_dropped_unless_repeating() {
        let spec = IntegrationSpec::new(1, 5.0, rate(|p| p[0]), Srgb::RED);
        let mut once = explorer(rotation());
        once.add_integration(companion(), spec.clone()).unwrap();
        let mut run = once.begin(DVec2::new(320.0, 270.0)).unwrap();
        for _ in 0..5 {
            once.advance(&mut run);
        }
        assert_eq!(run.live_integrations(), 0);

        let mut repeating = explorer(rotation());
        repeating.add_integration(companion(), spec.repeat(true)).unwrap();
        let mut run = repeating.begin(DVec2::new(320.0, 270.0)).unwrap();
        for _ in 0..5 {
            repeating.advance(&mut run);
        }
        assert_eq!(run.live_integrations(), 1);
    }

    #[test]
    fn add_integration_validates_axis() {
        let mut e = explorer(rotation());
        let spec = IntegrationSpec::new(3, 1.0, rate(|p| p[0]), Srgb::RED);
        assert!(matches!(
            e.add_integration(companion(), spec),
            Err(PlotError::AxisNotFound { index: 3, .. })
        ));
        assert_eq!(e.companion_count(), 0);
    }

    #[test]
    fn set_parameter_recalculates_field() {
        let k = Parameter::new("k", 1.0);
        let (kx, ky) = (k.clone(), k.clone());
        let rates = vec![rate(move |p| kx.get() * p[1]), rate(move |p| -ky.get() * p[0])];
        let mut e = explorer(rates).with_parameters(vec![k.clone()]);
        let before = e.field().range().max;
        e.set_parameter("k", 3.0).unwrap();
        assert_eq!(k.get(), 3.0);
        assert!((e.field().range().max - 3.0 * before).abs() < 1e-6);
    }

    #[test]
    fn set_parameter_rejects_unknown_name() {
        let mut e = explorer(rotation());
        assert!(matches!(
            e.set_parameter("nope", 1.0),
            Err(PlotError::ParamNotFound(name)) if name == "nope"
        ));
    }
}
