#![deny(unsafe_code)]
//! CPU rendering backend for fieldplot.
//!
//! [`Raster`] implements the core `Surface` trait over an RGBA8 pixel
//! buffer, so graphs, fields and integrations can be rendered without a
//! browser. Text uses a small built-in bitmap font ([`font`]). PNG export
//! lives behind the `png` feature (default on) so WASM builds can use the
//! raster without pulling in the `image` crate.

pub mod font;
pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::Raster;
