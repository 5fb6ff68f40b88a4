//! Named two-dimensional systems ready to hand to a [`Field`](crate::field::Field).
//!
//! Each preset builds its rate functions over shared [`Parameter`]s, so a
//! caller can expose the constants as controls and redraw after changing
//! them. Parameters are read from a JSON object; missing or mistyped keys
//! fall back to the preset's defaults.

use std::f64::consts::PI;

use noise::{NoiseFn, Perlin};
use serde_json::Value;

use crate::axis::AxisSpec;
use crate::error::PlotError;
use crate::parameter::Parameter;
use crate::params::{param_f64, param_u32};
use crate::vector::{rate, RateFn};

const PRESET_NAMES: &[&str] = &[
    "rotation",
    "saddle",
    "sink",
    "source",
    "spiral",
    "pendulum",
    "van-der-pol",
    "lotka-volterra",
    "curl-noise",
];

/// Finite-difference step for the curl, in noise space.
const CURL_EPS: f64 = 1e-3;

/// The built-in systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// `dx = k·y, dy = −k·x`: closed orbits around the origin.
    Rotation,
    /// `dx = k·x, dy = −k·y`.
    Saddle,
    /// `dx = −k·x, dy = −k·y`: a stable node.
    Sink,
    /// `dx = k·x, dy = k·y`: an unstable node.
    Source,
    /// `dx = a·x − y, dy = x + a·y`: a focus, stable for negative `a`.
    Spiral,
    /// Damped pendulum: `dθ = ω, dω = −sin θ − damping·ω`.
    Pendulum,
    /// `dx = y, dy = mu·(1 − x²)·y − x`: a limit cycle.
    VanDerPol,
    /// Predator/prey: `dx = alpha·x − beta·x·y, dy = delta·x·y − gamma·y`.
    LotkaVolterra,
    /// The curl of 2D Perlin noise: swirling, divergence-free flow.
    CurlNoise,
}

/// Rate functions plus the parameters they read.
pub struct System {
    pub rates: Vec<RateFn>,
    pub parameters: Vec<Parameter>,
}

impl System {
    /// The parameter called `name`, or `PlotError::ParamNotFound`.
    pub fn parameter(&self, name: &str) -> Result<&Parameter, PlotError> {
        self.parameters
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| PlotError::ParamNotFound(name.to_owned()))
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("rates", &self.rates.len())
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl Preset {
    /// Looks a preset up by name.
    ///
    /// Returns `PlotError::UnknownPreset` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, PlotError> {
        match name {
            "rotation" => Ok(Preset::Rotation),
            "saddle" => Ok(Preset::Saddle),
            "sink" => Ok(Preset::Sink),
            "source" => Ok(Preset::Source),
            "spiral" => Ok(Preset::Spiral),
            "pendulum" => Ok(Preset::Pendulum),
            "van-der-pol" => Ok(Preset::VanDerPol),
            "lotka-volterra" => Ok(Preset::LotkaVolterra),
            "curl-noise" => Ok(Preset::CurlNoise),
            _ => Err(PlotError::UnknownPreset(name.to_string())),
        }
    }

    /// Returns a slice of all recognized preset names.
    pub fn list_names() -> &'static [&'static str] {
        PRESET_NAMES
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Rotation => "rotation",
            Preset::Saddle => "saddle",
            Preset::Sink => "sink",
            Preset::Source => "source",
            Preset::Spiral => "spiral",
            Preset::Pendulum => "pendulum",
            Preset::VanDerPol => "van-der-pol",
            Preset::LotkaVolterra => "lotka-volterra",
            Preset::CurlNoise => "curl-noise",
        }
    }

    /// Axis ranges that frame the interesting part of the system.
    pub fn default_axes(self) -> (AxisSpec, AxisSpec) {
        match self {
            Preset::Pendulum => (
                AxisSpec::new(-2.0 * PI, 2.0 * PI, PI / 2.0, "θ"),
                AxisSpec::new(-4.0, 4.0, 1.0, "ω"),
            ),
            Preset::VanDerPol => (
                AxisSpec::new(-4.0, 4.0, 1.0, "X"),
                AxisSpec::new(-4.0, 4.0, 1.0, "Y"),
            ),
            Preset::LotkaVolterra => (
                AxisSpec::new(0.0, 20.0, 5.0, "Prey"),
                AxisSpec::new(0.0, 20.0, 5.0, "Predators"),
            ),
            _ => (
                AxisSpec::new(-10.0, 10.0, 2.0, "X"),
                AxisSpec::new(-10.0, 10.0, 2.0, "Y"),
            ),
        }
    }

    /// Builds the rate functions, reading constants from `params`.
    pub fn build(self, params: &Value) -> System {
        let p = |name: &str, default: f64| Parameter::new(name, param_f64(params, name, default));
        match self {
            Preset::Rotation => {
                let k = p("k", 1.0);
                let (kx, ky) = (k.clone(), k.clone());
                System {
                    rates: vec![rate(move |v| kx.get() * v[1]), rate(move |v| -ky.get() * v[0])],
                    parameters: vec![k],
                }
            }
            Preset::Saddle => linear(p("k", 1.0), 1.0, -1.0),
            Preset::Sink => linear(p("k", 1.0), -1.0, -1.0),
            Preset::Source => linear(p("k", 1.0), 1.0, 1.0),
            Preset::Spiral => {
                let a = p("a", -0.2);
                let (ax, ay) = (a.clone(), a.clone());
                System {
                    rates: vec![
                        rate(move |v| ax.get() * v[0] - v[1]),
                        rate(move |v| v[0] + ay.get() * v[1]),
                    ],
                    parameters: vec![a],
                }
            }
            Preset::Pendulum => {
                let damping = p("damping", 0.3);
                let d = damping.clone();
                System {
                    rates: vec![rate(|v| v[1]), rate(move |v| -v[0].sin() - d.get() * v[1])],
                    parameters: vec![damping],
                }
            }
            Preset::VanDerPol => {
                let mu = p("mu", 1.0);
                let m = mu.clone();
                System {
                    rates: vec![
                        rate(|v| v[1]),
                        rate(move |v| m.get() * (1.0 - v[0] * v[0]) * v[1] - v[0]),
                    ],
                    parameters: vec![mu],
                }
            }
            Preset::LotkaVolterra => {
                let alpha = p("alpha", 1.1);
                let beta = p("beta", 0.4);
                let gamma = p("gamma", 0.4);
                let delta = p("delta", 0.1);
                let (a, b, g, d) = (alpha.clone(), beta.clone(), gamma.clone(), delta.clone());
                System {
                    rates: vec![
                        rate(move |v| a.get() * v[0] - b.get() * v[0] * v[1]),
                        rate(move |v| d.get() * v[0] * v[1] - g.get() * v[1]),
                    ],
                    parameters: vec![alpha, beta, gamma, delta],
                }
            }
            Preset::CurlNoise => {
                let scale = p("scale", 0.3);
                let strength = p("strength", 5.0);
                let noise = Perlin::new(param_u32(params, "seed", 0));
                let (sx, tx) = (scale.clone(), strength.clone());
                let (sy, ty) = (scale.clone(), strength.clone());
                let nx = noise.clone();
                System {
                    rates: vec![
                        rate(move |v| curl(&nx, v[0], v[1], sx.get()).0 * tx.get()),
                        rate(move |v| curl(&noise, v[0], v[1], sy.get()).1 * ty.get()),
                    ],
                    parameters: vec![scale, strength],
                }
            }
        }
    }
}

/// `dx = sx·k·x, dy = sy·k·y`.
fn linear(k: Parameter, sx: f64, sy: f64) -> System {
    let (kx, ky) = (k.clone(), k.clone());
    System {
        rates: vec![
            rate(move |v| sx * kx.get() * v[0]),
            rate(move |v| sy * ky.get() * v[1]),
        ],
        parameters: vec![k],
    }
}

/// Curl of the noise potential at `(x, y)`: `(∂F/∂y, −∂F/∂x)`.
fn curl(noise: &Perlin, x: f64, y: f64, scale: f64) -> (f64, f64) {
    let (sx, sy) = (x * scale, y * scale);
    let df_dy = (noise.get([sx, sy + CURL_EPS]) - noise.get([sx, sy - CURL_EPS])) / (2.0 * CURL_EPS);
    let df_dx = (noise.get([sx + CURL_EPS, sy]) - noise.get([sx - CURL_EPS, sy])) / (2.0 * CURL_EPS);
    (df_dy, -df_dx)
}
