//! End-to-end scenarios through the public API.

use fieldplot_core::{
    Axis, AxisSpec, Config, Explorer, Field, Graph, IntegrationSpec, Layer, PointerMode, Preset,
    Recorder, RunStatus, Srgb, StopReason, TrajectoryOptions,
};
use glam::DVec2;
use serde_json::json;

fn field_for(preset: Preset, params: serde_json::Value) -> (Field<Recorder>, Vec<fieldplot_core::Parameter>) {
    let (x, y) = preset.default_axes();
    let graph = Graph::new(Recorder::new(500.0, 500.0), x, y, Config::default()).unwrap();
    let system = preset.build(&params);
    (Field::new(graph, system.rates).unwrap(), system.parameters)
}

#[test]
fn documented_axis_scenario() {
    let axis = Axis::new(AxisSpec::new(-10.0, 10.0, 2.0, "X"), 500.0, 40.0).unwrap();
    assert_eq!(axis.scale(), 23.0);
    assert_eq!(axis.to_pixels(0.0), 270.0);
    assert_eq!(axis.to_pixels(-10.0), 40.0);
    assert_eq!(axis.to_pixels(10.0), 500.0);
    assert_eq!(axis.to_units(270.0), 0.0);
}

#[test]
fn every_preset_renders_a_field() {
    for &name in Preset::list_names() {
        let preset = Preset::from_name(name).unwrap();
        let (field, _) = field_for(preset, json!({}));
        let vectors = field.config().vector_color;
        assert!(field.surface().strokes_in(vectors) > 0, "{name} drew no arrows");
    }
}

#[test]
fn spiral_sink_converges() {
    let (mut field, _) = field_for(Preset::Spiral, json!({"a": -0.5}));
    let summary = field.trajectory(DVec2::new(400.0, 350.0), &TrajectoryOptions::new(30.0));
    assert_eq!(summary.stop, StopReason::Equilibrium);
}

#[test]
fn paced_run_feeds_integration_until_it_leaves_its_graph() {
    let (field, _) = field_for(Preset::Rotation, json!({}));
    let mut explorer = Explorer::new(field).with_mode(PointerMode::Arrow);
    let companion = Graph::new(
        Recorder::new(200.0, 200.0),
        AxisSpec::new(0.0, 4.0, 1.0, "t"),
        AxisSpec::new(-10.0, 10.0, 5.0, "x"),
        Config::default(),
    )
    .unwrap();
    let spec = IntegrationSpec::new(1, 1.0, fieldplot_core::rate(|p| p[0]), Srgb::RED);
    let index = explorer.add_integration(companion, spec).unwrap();

    let mut run = explorer.begin(DVec2::new(320.0, 270.0)).unwrap();
    for _ in 0..10 {
        assert!(matches!(explorer.advance(&mut run), RunStatus::Continue(_)));
    }
    // samples at t = 0..=4 fit; the segment to t = 5 is drawn and stops it
    assert_eq!(run.live_integrations(), 0);
    let companion = explorer.companion(index).unwrap();
    assert_eq!(companion.surface().strokes_in(Srgb::RED), 5);

    explorer.clear();
    let companion = explorer.companion(index).unwrap();
    assert_eq!(companion.surface().strokes_in(Srgb::RED), 0);
    assert_eq!(
        explorer.field().snapshot(Layer::Trace),
        explorer.field().snapshot(Layer::Field)
    );
}

#[test]
fn slider_change_redraws_with_new_range() {
    let (field, parameters) = field_for(Preset::Sink, json!({}));
    let mut explorer = Explorer::new(field).with_parameters(parameters);
    let before = explorer.field().range().max;
    explorer.set_parameter("k", 0.5).unwrap();
    let after = explorer.field().range().max;
    assert!((after - before * 0.5).abs() < 1e-6);
    // arrows are renormalized, so the longest is still full length
    let longest = explorer
        .field()
        .surface()
        .strokes()
        .filter(|(_, s)| s.color == Config::default().vector_color && s.width == 1.0)
        .map(|(points, _)| (points[points.len() - 1] - points[0]).length())
        .fold(0.0, f64::max);
    assert!((longest - 30.0).abs() < 1e-6);
}

#[test]
fn config_file_overrides_apply_to_graph() {
    let config = Config::from_json(&json!({"gap": 20, "vector_max": 25})).unwrap();
    let graph = Graph::new(
        Recorder::new(220.0, 220.0),
        AxisSpec::default(),
        AxisSpec::default(),
        config,
    )
    .unwrap();
    assert_eq!(graph.axes()[0].to_pixels(-10.0), 20.0);
    let field = Field::new(graph, Preset::Rotation.build(&json!({})).rates).unwrap();
    // floor(200 / 25) + 1 samples per axis
    assert_eq!(field.vectors().len(), 81);
}
