#![deny(unsafe_code)]
//! CLI binary for the fieldplot vector field plotter.
//!
//! Subcommands:
//! - `render <preset>`: draw a preset's field, plus optional instant trajectories, to PNG
//! - `trace <preset>`: run a paced trajectory headlessly, optionally plotting one
//!   coordinate over time on a second PNG
//! - `list`: print available presets and their parameters

mod error;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use error::CliError;
use fieldplot_core::{
    rate, AxisSpec, Config, Explorer, Field, Graph, IntegrationSpec, Parameter, Preset, RunStatus,
    Srgb, StopReason, TrajectoryOptions,
};
use fieldplot_raster::snapshot::write_png;
use fieldplot_raster::Raster;
use glam::DVec2;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Companion graph size for `trace --integrate`.
const INTEGRATION_SIZE: (usize, usize) = (500, 250);
/// Samples shown across the integration time axis.
const INTEGRATION_SPAN: f64 = 50.0;

#[derive(Parser)]
#[command(name = "fieldplot", about = "Vector field and trajectory plotter")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that draws a field.
#[derive(Args)]
struct FieldArgs {
    /// Preset name (see `fieldplot list`).
    preset: String,

    /// Canvas width in pixels.
    #[arg(short = 'W', long, default_value_t = 500)]
    width: usize,

    /// Canvas height in pixels.
    #[arg(short = 'H', long, default_value_t = 500)]
    height: usize,

    /// X axis as `min,max,step`; defaults to the preset's range.
    #[arg(long, allow_hyphen_values = true)]
    x_range: Option<String>,

    /// Y axis as `min,max,step`; defaults to the preset's range.
    #[arg(long, allow_hyphen_values = true)]
    y_range: Option<String>,

    /// Preset parameter override as `key=value`; repeatable.
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// JSON config file; keys it omits keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas background color (hex or CSS keyword).
    #[arg(long, default_value = "black")]
    background: String,
}

#[derive(Subcommand)]
enum Command {
    /// Draw a vector field and write a PNG.
    Render {
        #[command(flatten)]
        field: FieldArgs,

        /// Start pixel `x,y` (origin bottom left) of an instant trajectory; repeatable.
        #[arg(long, allow_hyphen_values = true)]
        start: Vec<String>,

        /// Output file path.
        #[arg(short, long, default_value = "field.png")]
        output: PathBuf,
    },
    /// Run a paced trajectory step by step and write the result as PNG.
    Trace {
        #[command(flatten)]
        field: FieldArgs,

        /// Start pixel `x,y` (origin bottom left).
        #[arg(long, allow_hyphen_values = true)]
        start: String,

        /// Step limit; defaults to the config's `traj_max_steps`.
        #[arg(long)]
        max_steps: Option<usize>,

        /// Output file path for the field.
        #[arg(short, long, default_value = "trace.png")]
        output: PathBuf,

        /// Plot this coordinate against time on a second graph.
        #[arg(long, value_enum)]
        integrate: Option<Coordinate>,

        /// Time advanced per trajectory step on the integration graph.
        #[arg(long, default_value_t = 1.0)]
        time: f64,

        /// Restart the integration curve when it runs off its graph.
        #[arg(long)]
        repeat: bool,

        /// Output file path for the integration graph.
        #[arg(long, default_value = "integration.png")]
        integration_output: PathBuf,
    },
    /// List available presets and their parameters.
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Coordinate {
    X,
    Y,
}

impl Coordinate {
    fn index(self) -> usize {
        match self {
            Coordinate::X => 0,
            Coordinate::Y => 1,
        }
    }
}

/// A field drawn from command-line options.
struct Setup {
    field: Field<Raster>,
    parameters: Vec<Parameter>,
    axes: (AxisSpec, AxisSpec),
    background: Srgb,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let presets: Vec<Value> = Preset::list_names()
                .iter()
                .filter_map(|&name| Preset::from_name(name).ok())
                .map(|preset| {
                    let params: Map<String, Value> = preset
                        .build(&Value::Null)
                        .parameters
                        .iter()
                        .map(|p| (p.name().to_owned(), json!(p.get())))
                        .collect();
                    json!({"name": preset.name(), "params": params})
                })
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json!({"presets": presets}))?);
            } else {
                println!("Presets:");
                for preset in &presets {
                    let params = preset["params"]
                        .as_object()
                        .map(|m| {
                            m.iter()
                                .map(|(k, v)| format!("{k}={v}"))
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .unwrap_or_default();
                    println!("  {:<16}{params}", preset["name"].as_str().unwrap_or_default());
                }
            }
        }
        Command::Render {
            field,
            start,
            output,
        } => {
            let starts = start
                .iter()
                .map(|s| parse_point(s))
                .collect::<Result<Vec<_>, _>>()?;
            let preset_name = field.preset.clone();
            let mut setup = build(&field)?;
            let options = TrajectoryOptions::new(setup.field.config().vector_max);

            let trajectories: Vec<Value> = starts
                .iter()
                .map(|&p| {
                    let summary = setup.field.trajectory(p, &options);
                    debug!(x = p.x, y = p.y, steps = summary.steps, "instant trajectory");
                    json!({
                        "start": [p.x, p.y],
                        "steps": summary.steps,
                        "stop": stop_name(summary.stop),
                    })
                })
                .collect();

            write_png(setup.field.surface(), &output)?;

            if cli.json {
                let info = json!({
                    "preset": preset_name,
                    "width": field.width,
                    "height": field.height,
                    "vectors": setup.field.vectors().len(),
                    "trajectories": trajectories,
                    "background": setup.background.to_hex(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {preset_name} ({}x{}, {} vectors, {} trajectories) -> {}",
                    field.width,
                    field.height,
                    setup.field.vectors().len(),
                    trajectories.len(),
                    output.display()
                );
            }
        }
        Command::Trace {
            field,
            start,
            max_steps,
            output,
            integrate,
            time,
            repeat,
            integration_output,
        } => {
            let start = parse_point(&start)?;
            let preset_name = field.preset.clone();
            let setup = build(&field)?;
            let config = setup.field.config().clone();
            let limit = max_steps.unwrap_or(config.traj_max_steps);

            let mut explorer = Explorer::new(setup.field).with_parameters(setup.parameters);
            if let Some(coordinate) = integrate {
                let index = coordinate.index();
                let value_axis = match coordinate {
                    Coordinate::X => setup.axes.0.clone(),
                    Coordinate::Y => setup.axes.1.clone(),
                };
                let span = time * INTEGRATION_SPAN;
                let companion = Graph::new(
                    Raster::new(INTEGRATION_SIZE.0, INTEGRATION_SIZE.1, setup.background)?,
                    AxisSpec::new(0.0, span, span / 5.0, "t"),
                    value_axis,
                    config.clone(),
                )?;
                let spec = IntegrationSpec::new(1, time, rate(move |p| p[index]), config.traj_color)
                    .repeat(repeat);
                explorer.add_integration(companion, spec)?;
            }

            let mut run = explorer.begin(start)?;
            let mut elapsed = Duration::ZERO;
            let stop = loop {
                if run.steps() >= limit {
                    break StopReason::StepLimit;
                }
                match explorer.advance(&mut run) {
                    RunStatus::Continue(delay) => elapsed = elapsed.saturating_add(delay),
                    RunStatus::Finished(reason) => break reason,
                    // nothing else holds the token
                    RunStatus::Cancelled => break StopReason::StepLimit,
                }
            };
            // drop the transient arrowhead
            explorer.pointer_move(None);
            info!(steps = run.steps(), stop = stop_name(stop), "trace finished");

            write_png(explorer.field().surface(), &output)?;
            let integration = match explorer.companion(0) {
                Some(graph) => {
                    write_png(graph.surface(), &integration_output)?;
                    Some(integration_output.display().to_string())
                }
                None => None,
            };

            if cli.json {
                let info = json!({
                    "preset": preset_name,
                    "start": [start.x, start.y],
                    "steps": run.steps(),
                    "stop": stop_name(stop),
                    "paced_ms": elapsed.as_secs_f64() * 1000.0,
                    "output": output.display().to_string(),
                    "integration_output": integration,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "traced {preset_name} from ({}, {}): {} steps, {} -> {}",
                    start.x,
                    start.y,
                    run.steps(),
                    stop_name(stop),
                    output.display()
                );
                if let Some(path) = integration {
                    eprintln!("integration -> {path}");
                }
            }
        }
    }

    Ok(())
}

fn build(args: &FieldArgs) -> Result<Setup, CliError> {
    let preset = Preset::from_name(&args.preset)?;
    let config = load_config(args.config.as_deref())?;
    let background = Srgb::parse(&args.background)?;

    let (default_x, default_y) = preset.default_axes();
    let x = match &args.x_range {
        Some(range) => parse_range(range, &default_x.label)?,
        None => default_x,
    };
    let y = match &args.y_range {
        Some(range) => parse_range(range, &default_y.label)?,
        None => default_y,
    };

    let system = preset.build(&parse_params(&args.params)?);
    let surface = Raster::new(args.width, args.height, background)?;
    let graph = Graph::new(surface, x.clone(), y.clone(), config)?;
    let field = Field::new(graph, system.rates)?;
    Ok(Setup {
        field,
        parameters: system.parameters,
        axes: (x, y),
        background,
    })
}

fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    let value: Value = serde_json::from_str(&text)?;
    Ok(Config::from_json(&value)?)
}

/// Parses `x,y`.
fn parse_point(s: &str) -> Result<DVec2, CliError> {
    match parse_floats(s)?.as_slice() {
        &[x, y] => Ok(DVec2::new(x, y)),
        _ => Err(CliError::Input(format!("expected 'x,y', got '{s}'"))),
    }
}

/// Parses `min,max,step` into an axis spec labelled `label`.
fn parse_range(s: &str, label: &str) -> Result<AxisSpec, CliError> {
    match parse_floats(s)?.as_slice() {
        &[min, max, step] => {
            let spec = AxisSpec::new(min, max, step, label);
            spec.validate()?;
            Ok(spec)
        }
        _ => Err(CliError::Input(format!("expected 'min,max,step', got '{s}'"))),
    }
}

fn parse_floats(s: &str) -> Result<Vec<f64>, CliError> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| CliError::Input(format!("invalid number '{part}' in '{s}': {e}")))
        })
        .collect()
}

/// Collects `key=value` pairs into a JSON object of numbers.
fn parse_params(pairs: &[String]) -> Result<Value, CliError> {
    let mut params = Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CliError::Input(format!("expected 'key=value', got '{pair}'")))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|e| CliError::Input(format!("invalid value for '{key}': {e}")))?;
        params.insert(key.trim().to_owned(), json!(value));
    }
    Ok(Value::Object(params))
}

fn stop_name(reason: StopReason) -> &'static str {
    match reason {
        StopReason::OutOfBounds => "out-of-bounds",
        StopReason::Equilibrium => "equilibrium",
        StopReason::NumericDegenerate => "numeric-degenerate",
        StopReason::StepLimit => "step-limit",
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_points_with_negatives() {
        assert_eq!(parse_point("100,-5.5").unwrap(), DVec2::new(100.0, -5.5));
        assert!(matches!(parse_point("1,2,3"), Err(CliError::Input(_))));
        assert!(matches!(parse_point("a,b"), Err(CliError::Input(_))));
    }

    #[test]
    fn parses_ranges_and_validates_them() {
        let spec = parse_range("-5,5,1", "X").unwrap();
        assert_eq!((spec.min, spec.max, spec.step), (-5.0, 5.0, 1.0));
        assert_eq!(spec.label, "X");
        assert_eq!(parse_range("5,-5,1", "X").unwrap_err().exit_code(), 10);
        assert_eq!(parse_range("5,1", "X").unwrap_err().exit_code(), 12);
    }

    #[test]
    fn parses_params_into_numbers() {
        let params = parse_params(&["k=2.5".to_owned(), " mu = 3 ".to_owned()]).unwrap();
        assert_eq!(params["k"], json!(2.5));
        assert_eq!(params["mu"], json!(3.0));
        assert!(parse_params(&["k".to_owned()]).is_err());
        assert!(parse_params(&["k=fast".to_owned()]).is_err());
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/fieldplot.json"))).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn trace_args_parse() {
        let cli = Cli::try_parse_from([
            "fieldplot", "trace", "sink", "--start", "-10,200", "--integrate", "x", "-p", "k=2",
        ])
        .unwrap();
        match cli.command {
            Command::Trace { field, start, integrate, .. } => {
                assert_eq!(field.preset, "sink");
                assert_eq!(start, "-10,200");
                assert!(matches!(integrate, Some(Coordinate::X)));
                assert_eq!(field.params, vec!["k=2".to_owned()]);
            }
            _ => panic!("expected trace"),
        }
    }

    #[test]
    fn build_rejects_unknown_preset() {
        let cli = Cli::try_parse_from(["fieldplot", "render", "lorenz"]).unwrap();
        let Command::Render { field, .. } = cli.command else {
            panic!("expected render");
        };
        assert!(matches!(build(&field), Err(CliError::Plot(_))));
    }

    #[test]
    fn build_draws_requested_size() {
        let cli = Cli::try_parse_from(["fieldplot", "render", "rotation", "-W", "200", "-H", "150"]).unwrap();
        let Command::Render { field, .. } = cli.command else {
            panic!("expected render");
        };
        let setup = build(&field).unwrap();
        assert_eq!(setup.field.surface().dimensions(), (200, 150));
        assert_eq!(setup.parameters.len(), 1);
    }
}
