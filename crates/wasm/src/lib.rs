#![deny(unsafe_code)]
//! Browser bindings: a [`Surface`] over a 2D canvas context and a
//! [`FieldView`] that wires pointer events to an [`Explorer`].
//!
//! The page owns the event loop. It forwards pointer events, calls
//! [`FieldView::tick`] and schedules the next tick after the returned delay.

use fieldplot_core::params::{param_bool, param_f64, param_string, param_usize};
use fieldplot_core::{
    rate, AxisSpec, Config, Explorer, Field, Font, Graph, IntegrationSpec, PlotError, PointerMode,
    Preset, Run, RunStatus, Srgb, Stroke, Surface,
};
use glam::DVec2;
use serde_json::Value;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Samples shown across an integration's time axis.
const INTEGRATION_SPAN: f64 = 50.0;

fn js_error(e: PlotError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_options(json: &str) -> Result<Value, JsValue> {
    if json.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// A [`Surface`] drawing through a `CanvasRenderingContext2d`.
///
/// Canvas calls that can throw only fail on non-finite input, which the
/// graph never produces, so their results are dropped.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }

    /// Fills the whole canvas, ignoring the current frame.
    pub fn fill(&mut self, color: Srgb) {
        self.ctx.save();
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        self.ctx.restore();
    }
}

impl Surface for CanvasSurface {
    /// `None` when the canvas refused the read (e.g. it is tainted).
    type Snapshot = Option<ImageData>;

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: DVec2) {
        let _ = self.ctx.translate(offset.x, offset.y);
    }

    fn rotate(&mut self, radians: f64) {
        let _ = self.ctx.rotate(radians);
    }

    fn scale(&mut self, factor: DVec2) {
        let _ = self.ctx.scale(factor.x, factor.y);
    }

    fn stroke(&mut self, path: &[DVec2], stroke: &Stroke) {
        let [first, rest @ ..] = path else {
            return;
        };
        let dash = js_sys::Array::new();
        if let Some(length) = stroke.dash {
            dash.push(&JsValue::from_f64(length));
            dash.push(&JsValue::from_f64(length));
        }
        let _ = self.ctx.set_line_dash(&dash);
        self.ctx.set_stroke_style_str(&stroke.color.to_hex());
        self.ctx.set_line_width(stroke.width);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for point in rest {
            self.ctx.line_to(point.x, point.y);
        }
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, font: &Font, color: Srgb) {
        self.ctx.set_font(&format!("{}px {}", font.size, font.family));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&color.to_hex());
        let _ = self.ctx.fill_text(text, 0.0, 0.0);
    }

    fn capture(&self) -> Self::Snapshot {
        self.ctx.get_image_data(0.0, 0.0, self.width, self.height).ok()
    }

    fn put(&mut self, snapshot: &Self::Snapshot) {
        if let Some(image) = snapshot {
            let _ = self.ctx.put_image_data(image, 0.0, 0.0);
        }
    }
}

/// An interactive vector field bound to a canvas.
#[wasm_bindgen]
pub struct FieldView {
    explorer: Explorer<CanvasSurface>,
    axes: (AxisSpec, AxisSpec),
    background: Srgb,
    runs: Vec<Run>,
    max_steps: usize,
}

#[wasm_bindgen]
impl FieldView {
    /// Draws `preset` onto `canvas`.
    ///
    /// `options` is a JSON object; every key is optional:
    /// `params` (preset constants), `config` (partial [`Config`]),
    /// `background` (color), `mode` (`"arrow"` or `"trajectory"`),
    /// `wait_ms` (pacing per full-length step) and `max_steps`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, preset: &str, options: &str) -> Result<FieldView, JsValue> {
        let options = parse_options(options)?;
        let preset = Preset::from_name(preset).map_err(js_error)?;
        let config = match options.get("config") {
            Some(value) => Config::from_json(value).map_err(js_error)?,
            None => Config::default(),
        };
        let background =
            Srgb::parse(&param_string(&options, "background", "black")).map_err(js_error)?;
        let mode = match param_string(&options, "mode", "trajectory").as_str() {
            "arrow" => PointerMode::Arrow,
            "trajectory" => PointerMode::Trajectory,
            other => return Err(JsValue::from_str(&format!("unknown pointer mode '{other}'"))),
        };
        let wait = Duration::from_millis(param_usize(&options, "wait_ms", 10) as u64);
        let max_steps = param_usize(&options, "max_steps", config.traj_max_steps);

        let params = options.get("params").cloned().unwrap_or(Value::Null);
        let system = preset.build(&params);
        let (x, y) = preset.default_axes();

        let mut surface = CanvasSurface::new(&canvas)?;
        surface.fill(background);
        let graph = Graph::new(surface, x.clone(), y.clone(), config).map_err(js_error)?;
        let field = Field::new(graph, system.rates).map_err(js_error)?;
        let explorer = Explorer::new(field)
            .with_parameters(system.parameters)
            .with_mode(mode)
            .with_wait(wait);

        Ok(FieldView {
            explorer,
            axes: (x, y),
            background,
            runs: Vec::new(),
            max_steps,
        })
    }

    /// Converts canvas offset coordinates (origin top left) to graph pixels.
    fn to_pixels(&self, x: f64, y: f64) -> DVec2 {
        DVec2::new(x, self.explorer.field().surface().height() - y)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let position = self.to_pixels(x, y);
        self.explorer.pointer_move(Some(position));
    }

    pub fn pointer_leave(&mut self) {
        self.explorer.pointer_move(None);
    }

    /// Starts a paced trajectory at the pointer position.
    pub fn click(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let start = self.to_pixels(x, y);
        let run = self.explorer.begin(start).map_err(js_error)?;
        self.runs.push(run);
        Ok(())
    }

    /// Advances every live run by one segment.
    ///
    /// Returns the milliseconds to wait before the next tick, or `-1` once
    /// no run is left.
    pub fn tick(&mut self) -> f64 {
        let max_steps = self.max_steps;
        let explorer = &mut self.explorer;
        let mut next: Option<Duration> = None;
        self.runs.retain_mut(|run| {
            if run.steps() >= max_steps {
                return false;
            }
            match explorer.advance(run) {
                RunStatus::Continue(delay) => {
                    next = Some(next.map_or(delay, |d| d.min(delay)));
                    true
                }
                RunStatus::Finished(_) | RunStatus::Cancelled => false,
            }
        });
        next.map_or(-1.0, |d| d.as_secs_f64() * 1000.0)
    }

    /// Stops every run and erases trajectories and integration curves.
    pub fn clear(&mut self) {
        self.explorer.clear();
        self.runs.clear();
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.explorer.set_parameter(name, value).map_err(js_error)
    }

    pub fn set_mode(&mut self, arrow: bool) {
        let mode = if arrow { PointerMode::Arrow } else { PointerMode::Trajectory };
        self.explorer.set_mode(mode);
    }

    /// Registered parameters as a JSON object of current values.
    pub fn parameters(&self) -> String {
        let values: serde_json::Map<String, Value> = self
            .explorer
            .parameters()
            .iter()
            .map(|p| (p.name().to_owned(), Value::from(p.get())))
            .collect();
        Value::Object(values).to_string()
    }

    /// Plots one coordinate of later runs against time on `canvas`.
    ///
    /// `options` keys: `value` (`"x"` or `"y"`), `time` (per step),
    /// `repeat` and `color`. Returns the companion index.
    pub fn add_integration(&mut self, canvas: HtmlCanvasElement, options: &str) -> Result<usize, JsValue> {
        let options = parse_options(options)?;
        let (index, value_axis) = match param_string(&options, "value", "x").as_str() {
            "x" => (0, self.axes.0.clone()),
            "y" => (1, self.axes.1.clone()),
            other => return Err(JsValue::from_str(&format!("unknown coordinate '{other}'"))),
        };
        let time = param_f64(&options, "time", 1.0);
        let config = self.explorer.field().config().clone();
        let color = match options.get("color").and_then(Value::as_str) {
            Some(color) => Srgb::parse(color).map_err(js_error)?,
            None => config.traj_color,
        };
        let span = time * INTEGRATION_SPAN;

        let mut surface = CanvasSurface::new(&canvas)?;
        surface.fill(self.background);
        let graph = Graph::new(surface, AxisSpec::new(0.0, span, span / 5.0, "t"), value_axis, config)
            .map_err(js_error)?;
        let spec = IntegrationSpec::new(1, time, rate(move |p| p[index]), color)
            .repeat(param_bool(&options, "repeat", false));
        self.explorer.add_integration(graph, spec).map_err(js_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_are_null() {
        assert_eq!(parse_options("  ").unwrap(), Value::Null);
    }

    #[test]
    fn options_parse_as_json() {
        let options = parse_options(r#"{"mode": "arrow", "wait_ms": 5}"#).unwrap();
        assert_eq!(param_string(&options, "mode", "trajectory"), "arrow");
        assert_eq!(param_usize(&options, "wait_ms", 10), 5);
    }
}
