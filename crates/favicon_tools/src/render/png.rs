//! PNG encoding and inspection

use crate::{FaviconError, Result};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Basic facts about an encoded PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngInfo {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
}

/// Encode an RGBA frame as PNG bytes
pub fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| FaviconError::encode_error(format!("Failed to encode PNG: {}", e)))?;
    Ok(buffer)
}

/// Read dimensions and alpha presence from PNG bytes
pub fn png_info(data: &[u8]) -> Result<PngInfo> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(|e| FaviconError::decode_error(format!("Failed to load PNG: {}", e)))?;

    Ok(PngInfo {
        width: img.width(),
        height: img.height(),
        has_alpha: img.color().has_alpha(),
    })
}
