//! PNG export of a [`Raster`].
//!
//! Feature-gated behind `png` (default on) so WASM builds can depend on
//! this crate without pulling in the `image` crate.

use std::path::Path;

use fieldplot_core::error::PlotError;
use tracing::debug;

use crate::pixel::Raster;

/// Writes the raster as a PNG image.
///
/// Returns `PlotError::InvalidDimensions` if the raster dimensions overflow
/// `u32`, or `PlotError::Io` on encode or write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), PlotError> {
    let (width, height) = raster.dimensions();
    let invalid = || PlotError::InvalidDimensions {
        width: width as f64,
        height: height as f64,
        gap: 0.0,
    };
    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;
    let img = image::RgbaImage::from_raw(w, h, raster.data().to_vec())
        .ok_or_else(|| PlotError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| PlotError::Io(e.to_string()))?;
    debug!(path = %path.display(), width, height, "wrote png");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldplot_core::config::Stroke;
    use fieldplot_core::surface::Surface;
    use fieldplot_core::Srgb;
    use glam::DVec2;

    #[test]
    fn write_png_round_trip() {
        let mut raster = Raster::new(16, 12, Srgb::BLACK).unwrap();
        raster.stroke(
            &[DVec2::new(0.5, 3.5), DVec2::new(15.5, 3.5)],
            &Stroke::new(Srgb::RED, 1.0),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.png");

        write_png(&raster, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(8, 3).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(8, 6).0, [0, 0, 0, 255]);
    }

    #[test]
    fn write_png_into_missing_directory_is_io_error() {
        let raster = Raster::new(4, 4, Srgb::BLACK).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_png(&raster, &path), Err(PlotError::Io(_))));
    }
}
