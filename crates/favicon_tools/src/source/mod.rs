//! Source image intake: raster decoding and vector rasterization

mod svg;

pub use svg::*;

use crate::{FaviconError, Result, SourceImage};
use image::DynamicImage;
use tracing::debug;

pub const SVG_MIME: &str = "image/svg+xml";

/// Whether the upload should go through the SVG rasterizer.
///
/// The declared MIME type wins. When the client sent none (or the generic
/// octet-stream type) the file name extension decides.
pub fn is_svg(source: &SourceImage) -> bool {
    let declared = source
        .mime
        .as_deref()
        .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != "application/octet-stream");

    match declared {
        Some(mime) => mime == SVG_MIME,
        None => source
            .file_name
            .as_deref()
            .map(|name| name.to_ascii_lowercase().ends_with(".svg"))
            .unwrap_or(false),
    }
}

/// Decode the upload into a bitmap. Vector inputs are rasterized at
/// `svg_raster_size` first so small targets are downsampled from a large render.
pub fn load_source(source: &SourceImage, svg_raster_size: u32) -> Result<DynamicImage> {
    if source.bytes.is_empty() {
        return Err(FaviconError::invalid_input("Source image is empty"));
    }

    if is_svg(source) {
        debug!(size = svg_raster_size, "favicon_tools.rasterize_svg");
        return rasterize_svg(&source.bytes, svg_raster_size);
    }

    debug!(bytes = source.bytes.len(), "favicon_tools.decode_raster");
    image::load_from_memory(&source.bytes)
        .map_err(|e| FaviconError::decode_error(format!("Failed to load image: {}", e)))
}
