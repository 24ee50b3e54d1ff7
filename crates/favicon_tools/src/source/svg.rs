//! SVG rasterization to a fixed-size intermediate bitmap

use crate::{FaviconError, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use once_cell::sync::Lazy;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::fontdb::Database;
use resvg::usvg::{Options, Tree};
use std::sync::Arc;
use tracing::debug;

static SYSTEM_FONTS: Lazy<Arc<Database>> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "favicon_tools.system_fonts");
    Arc::new(db)
});

/// Font database shared by every SVG parse, loaded from the system on first use
pub fn system_fonts() -> Arc<Database> {
    Arc::clone(&SYSTEM_FONTS)
}

/// Parse SVG bytes into a render tree. `<text>` resolves against the system fonts.
pub fn load_svg(svg_data: &[u8]) -> Result<Tree> {
    let options = Options {
        fontdb: system_fonts(),
        ..Options::default()
    };
    Tree::from_data(svg_data, &options)
        .map_err(|e| FaviconError::decode_error(format!("Failed to parse SVG: {}", e)))
}

/// Render an SVG onto a transparent `target x target` canvas.
///
/// The drawing is scaled uniformly to fit and centered (contain semantics),
/// so non-square documents are letterboxed rather than stretched.
pub fn rasterize_svg(svg_data: &[u8], target: u32) -> Result<DynamicImage> {
    if target == 0 {
        return Err(FaviconError::invalid_input("SVG raster size must be positive"));
    }

    let tree = load_svg(svg_data)?;
    let size = tree.size();
    let (svg_width, svg_height) = (size.width(), size.height());
    if svg_width <= 0.0 || svg_height <= 0.0 {
        return Err(FaviconError::decode_error(format!(
            "SVG has empty dimensions {}x{}",
            svg_width, svg_height
        )));
    }

    let mut pixmap = Pixmap::new(target, target)
        .ok_or_else(|| FaviconError::decode_error("Failed to create pixmap"))?;

    let edge = target as f32;
    let scale = (edge / svg_width).min(edge / svg_height);
    let dx = (edge - svg_width * scale) / 2.0;
    let dy = (edge - svg_height * scale) / 2.0;
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, dx, dy);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied pixels; the image crate expects straight alpha
    let mut img = RgbaImage::new(target, target);
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Ok(DynamicImage::ImageRgba8(img))
}
