//! A two-axis graph drawn onto a [`Surface`].
//!
//! The graph owns its axes and surface, renders the axes once at
//! construction, and keeps named raster layers so transient drawing can be
//! erased by restoring a committed snapshot instead of re-rendering.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use tracing::trace;

use crate::axis::{Axis, AxisSpec, Label, Overlay};
use crate::color::Srgb;
use crate::config::{Config, Font, Stroke};
use crate::error::PlotError;
use crate::surface::Surface;

/// Committed raster layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Axis lines, ticks and labels only.
    Axes,
    /// Axes plus function overlays.
    Curves,
    /// Everything static: axes, overlays and field arrows.
    Field,
    /// Static content plus finished trajectory segments.
    Trace,
}

#[derive(Debug, Clone)]
struct Layers<T> {
    axes: T,
    curves: T,
    field: T,
    trace: T,
}

impl<T: Clone> Layers<T> {
    fn uniform(snapshot: T) -> Self {
        Self {
            axes: snapshot.clone(),
            curves: snapshot.clone(),
            field: snapshot.clone(),
            trace: snapshot,
        }
    }

    fn get(&self, layer: Layer) -> &T {
        match layer {
            Layer::Axes => &self.axes,
            Layer::Curves => &self.curves,
            Layer::Field => &self.field,
            Layer::Trace => &self.trace,
        }
    }

    /// Stores `snapshot` in `layer` and every layer above it.
    fn set_from(&mut self, layer: Layer, snapshot: T) {
        match layer {
            Layer::Axes => *self = Self::uniform(snapshot),
            Layer::Curves => {
                self.curves = snapshot.clone();
                self.field = snapshot.clone();
                self.trace = snapshot;
            }
            Layer::Field => {
                self.field = snapshot.clone();
                self.trace = snapshot;
            }
            Layer::Trace => self.trace = snapshot,
        }
    }
}

/// Pixel points to stroke, optionally with each point's (x, y) swapped.
///
/// Flipping lets code written along "the axis and the other axis" draw on
/// the vertical axis without its own coordinate handling.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<DVec2>,
    pub flip: bool,
}

impl Polyline {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self {
            points,
            flip: false,
        }
    }

    pub fn flipped(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }
}

/// A graph with an x and a y axis.
pub struct Graph<S: Surface> {
    config: Config,
    surface: S,
    axes: [Axis; 2],
    layers: Layers<S::Snapshot>,
}

impl<S: Surface> Graph<S> {
    /// Creates a graph on `surface` and renders both axes.
    ///
    /// The surface frame is flipped so the origin sits at the bottom left.
    /// Returns `PlotError::InvalidAxis` for malformed specs,
    /// `PlotError::InvalidConfig` for a bad config and
    /// `PlotError::InvalidDimensions` when the surface is not larger than the margin.
    pub fn new(mut surface: S, x: AxisSpec, y: AxisSpec, config: Config) -> Result<Self, PlotError> {
        config.validate()?;
        let (width, height) = (surface.width(), surface.height());
        if !(width > config.gap && height > config.gap) {
            return Err(PlotError::InvalidDimensions {
                width,
                height,
                gap: config.gap,
            });
        }
        let axes = [
            Axis::new(x, width, config.gap)?,
            Axis::new(y, height, config.gap)?,
        ];

        surface.translate(DVec2::new(0.0, height));
        surface.scale(DVec2::new(1.0, -1.0));

        let snapshot = surface.capture();
        let mut graph = Self {
            config,
            surface,
            axes,
            layers: Layers::uniform(snapshot),
        };
        graph.render_axes();
        graph.commit(Layer::Axes);
        Ok(graph)
    }

    fn render_axes(&mut self) {
        let gap = self.config.gap;
        let markers = self.config.markers;
        for index in 0..self.axes.len() {
            let sideways = index == 1;
            let axis = &self.axes[index];
            let mut points = vec![DVec2::new(gap, gap)];
            let mut labels = Vec::new();

            for units in axis.ticks() {
                let pixel = axis.to_pixels(units);
                points.extend([
                    DVec2::new(pixel, gap),
                    DVec2::new(pixel, gap + markers),
                    DVec2::new(pixel, gap),
                ]);
                labels.push(axis.label(units, DVec2::new(pixel, gap), sideways));
            }

            let end = axis.length() - 1.0;
            points.extend([
                DVec2::new(end, gap),
                DVec2::new(end, gap + markers),
                DVec2::new(end, gap),
            ]);
            let title = axis.title(
                DVec2::new((axis.length() - gap) / 2.0 + gap, gap / 1.8),
                sideways,
            );

            let marker_font = self.config.marker_font.clone();
            for label in &labels {
                self.text(label, sideways, &marker_font, self.config.fill_color);
            }
            let label_font = self.config.label_font.clone();
            self.text(&title, sideways, &label_font, self.config.axis_color);

            let line = self.config.line();
            self.draw(&Polyline::new(points).flipped(sideways), &line, true);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Both axes, x first.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// The axis at `index`, or `PlotError::AxisNotFound`.
    pub fn axis(&self, index: usize) -> Result<&Axis, PlotError> {
        self.axes.get(index).ok_or(PlotError::AxisNotFound {
            index,
            count: self.axes.len(),
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct surface access for drawing outside the graph's primitives.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// True when `point` lies inside the plot area, margin excluded.
    pub fn contains(&self, point: DVec2) -> bool {
        let gap = self.config.gap;
        point.x >= gap
            && point.y >= gap
            && point.x <= self.surface.width()
            && point.y <= self.surface.height()
    }

    /// Strokes `line` and reports whether its final point is on the canvas.
    ///
    /// Points with a coordinate below the margin are left out of the stroke
    /// unless `allow_outside` is set; non-finite points are always left out.
    /// The returned flag looks at the last point of `line` after flipping,
    /// whether or not it was drawn; an empty line returns `false`.
    pub fn draw(&mut self, line: &Polyline, stroke: &Stroke, allow_outside: bool) -> bool {
        let gap = self.config.gap;
        let oriented: Vec<DVec2> = line
            .points
            .iter()
            .map(|p| if line.flip { DVec2::new(p.y, p.x) } else { *p })
            .collect();

        let visible: Vec<DVec2> = oriented
            .iter()
            .copied()
            .filter(|p| p.is_finite() && (allow_outside || (p.x >= gap && p.y >= gap)))
            .collect();

        if visible.len() >= 2 {
            self.surface.save();
            self.surface.stroke(&visible, stroke);
            self.surface.restore();
        }

        oriented.last().is_some_and(|&last| self.contains(last))
    }

    /// Converts unit points to pixel points through the two axes.
    ///
    /// With `flip`, the first coordinate maps through the y axis and the
    /// second through the x axis.
    pub fn pixels(&self, units: &[DVec2], flip: bool) -> Vec<DVec2> {
        let (first, second) = if flip {
            (&self.axes[1], &self.axes[0])
        } else {
            (&self.axes[0], &self.axes[1])
        };
        units
            .iter()
            .map(|u| DVec2::new(first.to_pixels(u.x), second.to_pixels(u.y)))
            .collect()
    }

    /// Draws `label` centered on its anchor, rotated a quarter turn if `sideways`.
    pub fn text(&mut self, label: &Label, sideways: bool, font: &Font, color: Srgb) {
        self.surface.save();
        self.surface.translate(label.anchor);
        self.surface.scale(DVec2::new(1.0, -1.0));
        if sideways {
            self.surface.rotate(-FRAC_PI_2);
        }
        self.surface.fill_text(&label.text, font, color);
        self.surface.restore();
    }

    /// Plots `overlay` as a function of the axis at `axis` and commits the curves layer.
    ///
    /// The overlay is registered on the axis (once per name) so
    /// [`redraw_overlays`](Self::redraw_overlays) can replay it.
    pub fn plot_function(&mut self, axis: usize, overlay: Overlay) -> Result<(), PlotError> {
        let own = self.axis(axis)?;
        let other = &self.axes[1 - axis];
        let points = own
            .samples()
            .iter()
            .map(|&u| DVec2::new(own.to_pixels(u), other.to_pixels(overlay.eval(u))))
            .collect();

        let stroke = overlay.stroke();
        self.draw(&Polyline::new(points).flipped(axis == 1), &stroke, false);
        trace!(overlay = overlay.name(), axis, "plotted overlay");
        self.axes[axis].register(overlay);
        self.commit(Layer::Curves);
        Ok(())
    }

    /// Plots `func` along `axis` in the configured line style, dashed with
    /// the configured dash length when `dashed` is set.
    pub fn plot_curve(
        &mut self,
        axis: usize,
        name: impl Into<String>,
        dashed: bool,
        func: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Result<(), PlotError> {
        let stroke = if dashed {
            self.config.dashed_line()
        } else {
            self.config.line()
        };
        self.plot_function(axis, Overlay::new(name, stroke, func))
    }

    /// Replays every registered overlay on both axes.
    pub fn redraw_overlays(&mut self) {
        for axis in 0..self.axes.len() {
            let overlays = self.axes[axis].overlays().to_vec();
            for overlay in overlays {
                // index is in range by construction
                let _ = self.plot_function(axis, overlay);
            }
        }
    }

    /// Captures the surface into `layer` and every layer above it.
    pub fn commit(&mut self, layer: Layer) {
        trace!(?layer, "commit layer");
        let snapshot = self.surface.capture();
        self.layers.set_from(layer, snapshot);
    }

    /// Puts the committed raster of `layer` back on the surface.
    pub fn restore(&mut self, layer: Layer) {
        let snapshot = self.layers.get(layer).clone();
        self.surface.put(&snapshot);
    }

    /// The committed raster of `layer`.
    pub fn snapshot(&self, layer: Layer) -> &S::Snapshot {
        self.layers.get(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Command, Recorder};

    fn graph() -> Graph<Recorder> {
        Graph::new(
            Recorder::new(500.0, 300.0),
            AxisSpec::new(-10.0, 10.0, 2.0, "X"),
            AxisSpec::new(0.0, 5.0, 1.0, "Y"),
            Config::default(),
        )
        .unwrap()
    }

    fn to_graph_space(p: DVec2, height: f64) -> DVec2 {
        DVec2::new(p.x, height - p.y)
    }

    #[test]
    fn construction_draws_axes_ticks_and_labels() {
        let g = graph();
        let r = g.surface();
        assert_eq!(r.strokes().count(), 2);
        let texts: Vec<&str> = r.texts().collect();
        // 9 x ticks + title, 4 y ticks + title
        assert_eq!(texts.len(), 9 + 1 + 4 + 1);
        assert!(texts.contains(&"X"));
        assert!(texts.contains(&"Y"));
        assert!(texts.contains(&"-8"));
        assert!(texts.contains(&"4"));
    }

    #[test]
    fn y_axis_is_drawn_flipped() {
        let g = graph();
        let (points, _) = g.surface().strokes().nth(1).unwrap();
        let first = to_graph_space(points[0], 300.0);
        let second = to_graph_space(points[1], 300.0);
        assert!((first - DVec2::new(40.0, 40.0)).length() < 1e-9);
        // first y tick at 1 unit: 40 + 52 px, on the vertical line x = gap
        assert!((second - DVec2::new(40.0, 92.0)).length() < 1e-9);
    }

    #[test]
    fn rejects_surface_inside_margin() {
        let result = Graph::new(
            Recorder::new(30.0, 300.0),
            AxisSpec::default(),
            AxisSpec::default(),
            Config::default(),
        );
        assert!(matches!(result, Err(PlotError::InvalidDimensions { .. })));
    }

    #[test]
    fn rejects_bad_axis() {
        let result = Graph::new(
            Recorder::new(300.0, 300.0),
            AxisSpec::new(1.0, -1.0, 1.0, "X"),
            AxisSpec::default(),
            Config::default(),
        );
        assert!(matches!(result, Err(PlotError::InvalidAxis { .. })));
    }

    #[test]
    fn draw_reports_final_point_in_bounds() {
        let mut g = graph();
        let stroke = g.config().line();
        let inside = Polyline::new(vec![DVec2::new(100.0, 100.0), DVec2::new(200.0, 150.0)]);
        let outside = Polyline::new(vec![DVec2::new(100.0, 100.0), DVec2::new(600.0, 150.0)]);
        assert!(g.draw(&inside, &stroke, false));
        assert!(!g.draw(&outside, &stroke, false));
        assert!(!g.draw(&Polyline::new(vec![]), &stroke, false));
    }

    #[test]
    fn draw_clips_points_inside_margin() {
        let mut g = graph();
        let before = g.surface().strokes().count();
        let stroke = g.config().line();
        let line = Polyline::new(vec![
            DVec2::new(10.0, 100.0),
            DVec2::new(100.0, 100.0),
            DVec2::new(150.0, 120.0),
        ]);
        assert!(g.draw(&line, &stroke, false));
        let (points, _) = g.surface().strokes().nth(before).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn draw_allow_outside_keeps_all_points() {
        let mut g = graph();
        let before = g.surface().strokes().count();
        let stroke = g.config().line();
        let line = Polyline::new(vec![DVec2::new(10.0, 10.0), DVec2::new(20.0, 20.0)]);
        assert!(!g.draw(&line, &stroke, true));
        let (points, _) = g.surface().strokes().nth(before).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn draw_flip_checks_flipped_point() {
        let mut g = graph();
        let stroke = g.config().line();
        // (400, 100) flipped is (100, 400): beyond the 300px height
        let line = Polyline::new(vec![DVec2::new(100.0, 100.0), DVec2::new(400.0, 100.0)]);
        assert!(g.draw(&line.clone(), &stroke, false));
        assert!(!g.draw(&line.flipped(true), &stroke, false));
    }

    #[test]
    fn pixels_flip_swaps_axes() {
        let g = graph();
        let plain = g.pixels(&[DVec2::new(0.0, 5.0)], false);
        assert!((plain[0] - DVec2::new(270.0, 300.0)).length() < 1e-9);
        let flipped = g.pixels(&[DVec2::new(5.0, 0.0)], true);
        assert!((flipped[0] - DVec2::new(300.0, 270.0)).length() < 1e-9);
    }

    #[test]
    fn plot_function_registers_and_commits_curves() {
        let mut g = graph();
        let stroke = g.config().line();
        g.plot_function(0, Overlay::new("half", stroke, |x| x / 2.0)).unwrap();
        assert_eq!(g.axes()[0].overlays().len(), 1);
        assert_eq!(g.snapshot(Layer::Curves).len(), g.surface().commands().len());
        assert_ne!(g.snapshot(Layer::Axes).len(), g.snapshot(Layer::Curves).len());
    }

    #[test]
    fn plot_curve_dashes_with_configured_length() {
        let config = Config {
            dash: 10.0,
            ..Config::default()
        };
        let mut g = Graph::new(
            Recorder::new(500.0, 300.0),
            AxisSpec::new(-10.0, 10.0, 2.0, "x"),
            AxisSpec::new(-5.0, 5.0, 1.0, "y"),
            config,
        )
        .unwrap();
        g.plot_curve(0, "nullcline", true, |_| 0.0).unwrap();
        let (_, stroke) = g.surface().strokes().last().unwrap();
        assert_eq!(stroke.dash, Some(10.0));
        assert_eq!(stroke.width, g.config().line_width);

        g.plot_curve(1, "diagonal", false, |y| y).unwrap();
        let (_, stroke) = g.surface().strokes().last().unwrap();
        assert_eq!(stroke.dash, None);
    }

    #[test]
    fn plot_function_rejects_unknown_axis() {
        let mut g = graph();
        let stroke = g.config().line();
        let result = g.plot_function(2, Overlay::new("f", stroke, |x| x));
        assert!(matches!(result, Err(PlotError::AxisNotFound { index: 2, count: 2 })));
    }

    #[test]
    fn redraw_overlays_does_not_duplicate_registrations() {
        let mut g = graph();
        let stroke = g.config().line();
        g.plot_function(0, Overlay::new("half", stroke, |x| x / 2.0)).unwrap();
        g.plot_function(1, Overlay::new("sq", stroke, |y| y * y)).unwrap();
        g.redraw_overlays();
        assert_eq!(g.axes()[0].overlays().len(), 1);
        assert_eq!(g.axes()[1].overlays().len(), 1);
    }

    #[test]
    fn restore_puts_back_committed_layer() {
        let mut g = graph();
        let axes_len = g.snapshot(Layer::Axes).len();
        let stroke = g.config().trajectory();
        g.draw(
            &Polyline::new(vec![DVec2::new(100.0, 100.0), DVec2::new(120.0, 120.0)]),
            &stroke,
            false,
        );
        assert_eq!(g.surface().commands().len(), axes_len + 1);
        g.restore(Layer::Trace);
        assert_eq!(g.surface().commands().len(), axes_len);
    }

    #[test]
    fn committing_lower_layer_resets_upper_layers() {
        let mut g = graph();
        let stroke = g.config().trajectory();
        g.draw(
            &Polyline::new(vec![DVec2::new(100.0, 100.0), DVec2::new(120.0, 120.0)]),
            &stroke,
            false,
        );
        g.commit(Layer::Trace);
        let trace_len = g.snapshot(Layer::Trace).len();
        g.restore(Layer::Field);
        g.commit(Layer::Field);
        assert!(g.snapshot(Layer::Trace).len() < trace_len);
    }

    #[test]
    fn sideways_text_baseline_points_up() {
        let g = graph();
        let baselines: Vec<DVec2> = g
            .surface()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Text { text, baseline, .. } if text == "Y" => Some(*baseline),
                _ => None,
            })
            .collect();
        // device y grows downward, so upward text runs along -y
        assert!((baselines[0] - DVec2::new(0.0, -1.0)).length() < 1e-9);
    }
}
