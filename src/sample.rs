use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::CanvasError;

const GRID_STEP: u32 = 16;

/// Generates a pattern image for trying out the magnifier without a file.
///
/// The background is a two-axis colour gradient so every crop looks
/// different, overlaid with a grid every 16 pixels and a filled disc in the
/// centre.
pub fn sample_pattern(width: u32, height: u32) -> RgbaImage {
    let grid = Rgba([40, 40, 40, 255]);
    let disc = Rgba([250, 200, 40, 255]);

    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = width.min(height) as f32 / 2.0;

    RgbaImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        if dx * dx + dy * dy <= radius * radius * 0.25 {
            return disc;
        }
        if x % GRID_STEP == 0 || y % GRID_STEP == 0 {
            return grid;
        }
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 160, 255])
    })
}

/// Writes [`sample_pattern`] to `path`.
pub fn write_sample(path: &Path, width: u32, height: u32) -> Result<(), CanvasError> {
    sample_pattern(width, height).save(path)?;
    Ok(())
}
