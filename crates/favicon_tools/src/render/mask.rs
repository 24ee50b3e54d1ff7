//! Rounded-corner alpha masking

use crate::{FaviconError, Result};
use image::RgbaImage;
use resvg::tiny_skia::{FillRule, Mask, Path, PathBuilder, Transform};

/// Control-point distance for approximating a quarter circle with one cubic
const KAPPA: f32 = 0.552_284_75;

/// Rounded rectangle covering `width x height`, radius capped at half the short edge
pub fn rounded_rect_path(width: f32, height: f32, radius: f32) -> Option<Path> {
    let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(width - r, 0.0);
    pb.cubic_to(width - r + k, 0.0, width, r - k, width, r);
    pb.line_to(width, height - r);
    pb.cubic_to(width, height - r + k, width - r + k, height, width - r, height);
    pb.line_to(r, height);
    pb.cubic_to(r - k, height, 0.0, height - r + k, 0.0, height - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

/// Clip the frame to a rounded rectangle of `radius` pixels.
///
/// Destination-in: each pixel keeps its color and has its alpha scaled by
/// the mask coverage, so everything outside the shape ends up fully
/// transparent whatever the background was.
pub fn apply_rounded_corners(frame: &mut RgbaImage, radius: u32) -> Result<()> {
    if radius == 0 {
        return Ok(());
    }

    let (width, height) = frame.dimensions();
    let path = rounded_rect_path(width as f32, height as f32, radius as f32)
        .ok_or_else(|| FaviconError::encode_error("Failed to build corner mask path"))?;

    let mut mask = Mask::new(width, height)
        .ok_or_else(|| FaviconError::encode_error("Failed to allocate corner mask"))?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

    for (pixel, &coverage) in frame.pixels_mut().zip(mask.data()) {
        pixel[3] = ((pixel[3] as u16 * coverage as u16 + 127) / 255) as u8;
    }

    Ok(())
}
