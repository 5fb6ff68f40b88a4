//! Stroke and text colors.
//!
//! Colors are sRGB with `f64` components in [0, 1]. They parse from
//! `"#rrggbb"` hex strings or from the handful of CSS color keywords the
//! default [`Config`](crate::config::Config) uses, and serialize as hex.

use crate::error::PlotError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip has 8-bit
/// quantization (1/255 precision loss).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// CSS keywords accepted by [`Srgb::parse`].
const NAMED: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("lime", "#00ff00"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("aqua", "#00ffff"),
    ("fuchsia", "#ff00ff"),
    ("magenta", "#ff00ff"),
    ("orange", "#ffa500"),
    ("gray", "#808080"),
    ("grey", "#808080"),
];

impl Srgb {
    pub const BLACK: Srgb = Srgb::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Srgb = Srgb::rgb(1.0, 1.0, 1.0);
    pub const RED: Srgb = Srgb::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Srgb = Srgb::rgb(1.0, 1.0, 0.0);
    pub const FUCHSIA: Srgb = Srgb::rgb(1.0, 0.0, 1.0);

    /// Builds a color from components in [0, 1].
    pub const fn rgb(r: f64, g: f64, b: f64) -> Srgb {
        Srgb { r, g, b }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `PlotError::InvalidColor` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Srgb, PlotError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(PlotError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let r = u8::from_str_radix(&hex[0..2], 16)
            .map_err(|e| PlotError::InvalidColor(format!("invalid red component: {e}")))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .map_err(|e| PlotError::InvalidColor(format!("invalid green component: {e}")))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .map_err(|e| PlotError::InvalidColor(format!("invalid blue component: {e}")))?;
        Ok(Srgb::from_rgba8([r, g, b, 255]))
    }

    /// Parses either a CSS keyword (`"fuchsia"`) or a hex string.
    pub fn parse(s: &str) -> Result<Srgb, PlotError> {
        let lower = s.trim().to_ascii_lowercase();
        match NAMED.iter().find(|(name, _)| *name == lower) {
            Some((_, hex)) => Srgb::from_hex(hex),
            None => Srgb::from_hex(&lower),
        }
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to opaque RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), 255]
    }

    /// Builds a color from RGBA8 bytes, ignoring alpha.
    pub fn from_rgba8(bytes: [u8; 4]) -> Srgb {
        Srgb {
            r: bytes[0] as f64 / 255.0,
            g: bytes[1] as f64 / 255.0,
            b: bytes[2] as f64 / 255.0,
        }
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::parse(&s).map_err(serde::de::Error::custom)
    }
}
