//! Square frame resampling with padding, background and corner rounding

use super::{apply_rounded_corners, encode_png};
use crate::{CancelFlag, FaviconError, GenerationParams, Result};
use image::{imageops, imageops::FilterType, DynamicImage, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

/// Padding in pixels for one side of a `size` frame
pub fn pixel_padding(size: u32, padding_percent: f64) -> u32 {
    (size as f64 * padding_percent / 100.0).round() as u32
}

/// Edge of the box the source is fitted into. Never collapses below 1px.
pub fn content_size(size: u32, padding_percent: f64) -> u32 {
    size.saturating_sub(2 * pixel_padding(size, padding_percent)).max(1)
}

/// Corner radius in pixels for a `size` frame
pub fn corner_radius_px(size: u32, radius_percent: f64) -> u32 {
    (size as f64 * radius_percent / 100.0).round() as u32
}

/// Largest `(w, h)` with the source aspect ratio that fits in `bounds x bounds`
pub fn fit_dimensions(width: u32, height: u32, bounds: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (bounds.max(1), bounds.max(1));
    }

    let scale = (bounds as f64 / width as f64).min(bounds as f64 / height as f64);
    let fit = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, bounds.max(1));
    (fit(width), fit(height))
}

/// Render one `size x size` frame from the source.
///
/// The source is letterboxed into the padded content box, centered on a
/// canvas filled with the background (or left transparent), then clipped to
/// a rounded rectangle when a corner radius is set.
pub fn render_frame(
    source: &DynamicImage,
    size: u32,
    params: &GenerationParams,
) -> Result<RgbaImage> {
    if size == 0 {
        return Err(FaviconError::invalid_input("Frame size must be positive"));
    }

    let content = content_size(size, params.padding());
    let (width, height) = fit_dimensions(source.width(), source.height(), content);
    let scaled = source
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(size, size, params.canvas_fill().to_pixel());
    let x = (size - width) / 2;
    let y = (size - height) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);

    let radius = corner_radius_px(size, params.corner_radius());
    apply_rounded_corners(&mut canvas, radius)?;

    debug!(size, content, width, height, radius, "favicon_tools.render_frame");
    Ok(canvas)
}

/// Render one frame and encode it as PNG
pub fn render_png(source: &DynamicImage, size: u32, params: &GenerationParams) -> Result<Vec<u8>> {
    let frame = render_frame(source, size, params)?;
    encode_png(&frame)
}

/// Render every size on the rayon pool and return `(size, png)` in input order.
///
/// Frames share nothing but the read-only source. `cancel` is checked before
/// each frame starts; frames already in progress run to completion.
pub fn render_all(
    source: &DynamicImage,
    sizes: &[u32],
    params: &GenerationParams,
    cancel: &CancelFlag,
) -> Result<Vec<(u32, Vec<u8>)>> {
    sizes
        .par_iter()
        .map(|&size| {
            cancel.check()?;
            render_png(source, size, params).map(|png| (size, png))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::HexColor;

    fn source(data: &[u8]) -> DynamicImage {
        image::load_from_memory(data).unwrap()
    }

    #[test]
    fn test_content_size_formula() {
        for size in [1u32, 2, 15, 16, 32, 48, 64, 180, 192, 256, 512] {
            for p in 0..=50 {
                let padding = p as f64;
                let expected = std::cmp::max(
                    1i64,
                    size as i64 - 2 * (size as f64 * padding / 100.0).round() as i64,
                );
                assert_eq!(content_size(size, padding) as i64, expected, "s={} p={}", size, p);
            }
        }
    }

    #[test]
    fn test_corner_radius_px() {
        assert_eq!(corner_radius_px(16, 25.0), 4);
        assert_eq!(corner_radius_px(180, 50.0), 90);
        assert_eq!(corner_radius_px(32, 0.0), 0);
        assert_eq!(corner_radius_px(16, 3.0), 0);
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(64, 64, 16), (16, 16));
        assert_eq!(fit_dimensions(32, 64, 16), (8, 16));
        assert_eq!(fit_dimensions(200, 100, 50), (50, 25));
        assert_eq!(fit_dimensions(1000, 1, 16), (16, 1));
        assert_eq!(fit_dimensions(10, 10, 100), (100, 100));
    }

    #[test]
    fn test_frame_is_exact_size() {
        let img = source(&png_rgba_32x64());
        for size in [16, 32, 48, 64, 180, 192, 256, 512] {
            for padding in [0.0, 10.0, 33.0, 50.0] {
                let params = GenerationParams::new(padding, 20.0, false, HexColor::WHITE);
                let frame = render_frame(&img, size, &params).unwrap();
                assert_eq!(frame.dimensions(), (size, size));
            }
        }
    }

    #[test]
    fn test_opaque_background_fills_padding() {
        let img = source(&png_rgba_64x64());
        let red = HexColor::parse("#ff0000").unwrap();
        let params = GenerationParams::new(25.0, 0.0, false, red);
        let frame = render_frame(&img, 64, &params).unwrap();

        assert_eq!(frame.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(frame.get_pixel(63, 63).0, [255, 0, 0, 255]);
        assert!(frame.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_transparent_background_outside_content() {
        let img = source(&png_rgba_64x64());
        let params = GenerationParams::new(25.0, 0.0, true, HexColor::WHITE);
        let frame = render_frame(&img, 64, &params).unwrap();

        // 16px padding on each side; content occupies 16..48
        for (x, y, pixel) in frame.enumerate_pixels() {
            let inside = (16..48).contains(&x) && (16..48).contains(&y);
            if !inside {
                assert_eq!(pixel[3], 0, "pixel ({}, {})", x, y);
            }
        }
        assert_eq!(frame.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn test_transparent_source_keeps_transparency() {
        let img = source(&png_rgba_256x256_icon());
        let params = GenerationParams::new(0.0, 0.0, true, HexColor::WHITE);
        let frame = render_frame(&img, 64, &params).unwrap();
        assert_eq!(frame.get_pixel(0, 0)[3], 0);
        assert_eq!(frame.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn test_non_square_source_is_letterboxed() {
        let img = source(&png_rgba_32x64());
        let params = GenerationParams::new(0.0, 0.0, true, HexColor::WHITE);
        let frame = render_frame(&img, 64, &params).unwrap();

        // 32x64 fits as 32x64, centered horizontally at 16..48
        assert_eq!(frame.get_pixel(4, 32)[3], 0);
        assert_eq!(frame.get_pixel(60, 32)[3], 0);
        assert_eq!(frame.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn test_rounded_corners_ignore_transparent_flag() {
        let img = source(&png_rgba_64x64());
        for transparent in [false, true] {
            let params = GenerationParams::new(0.0, 25.0, transparent, HexColor::WHITE);
            let frame = render_frame(&img, 64, &params).unwrap();
            assert_eq!(frame.get_pixel(0, 0)[3], 0);
            assert_eq!(frame.get_pixel(63, 0)[3], 0);
            assert_eq!(frame.get_pixel(0, 63)[3], 0);
            assert_eq!(frame.get_pixel(63, 63)[3], 0);
            assert_eq!(frame.get_pixel(32, 32)[3], 255);
        }
    }

    #[test]
    fn test_max_padding_collapses_content() {
        let img = source(&png_rgba_64x64());
        let params = GenerationParams::new(50.0, 0.0, true, HexColor::WHITE);

        for size in [16, 32, 180] {
            assert_eq!(content_size(size, 50.0), 1);
            let frame = render_frame(&img, size, &params).unwrap();
            assert_eq!(frame.dimensions(), (size, size));
            let covered = frame.pixels().filter(|p| p[3] > 0).count();
            assert_eq!(covered, 1);
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        let img = source(&png_rgba_4x4());
        let result = render_frame(&img, 0, &GenerationParams::default());
        assert!(matches!(result, Err(FaviconError::InvalidInput { .. })));
    }

    #[test]
    fn test_render_all_preserves_order() {
        let img = source(&png_rgba_64x64());
        let frames = render_all(&img, &[48, 16, 32], &GenerationParams::default(), &CancelFlag::new()).unwrap();
        let sizes: Vec<u32> = frames.iter().map(|(size, _)| *size).collect();
        assert_eq!(sizes, vec![48, 16, 32]);

        for (size, png) in &frames {
            let info = crate::render::png_info(png).unwrap();
            assert_eq!((info.width, info.height), (*size, *size));
        }
    }

    #[test]
    fn test_render_all_propagates_errors() {
        let img = source(&png_rgba_64x64());
        let result = render_all(&img, &[16, 0, 32], &GenerationParams::default(), &CancelFlag::new());
        assert!(matches!(result, Err(FaviconError::InvalidInput { .. })));
    }

    #[test]
    fn test_render_all_large_size_list_keeps_order() {
        let img = source(&png_rgba_4x4());
        let sizes: Vec<u32> = (1..=40).rev().collect();
        let frames = render_all(&img, &sizes, &GenerationParams::default(), &CancelFlag::new()).unwrap();
        let rendered: Vec<u32> = frames.iter().map(|(size, _)| *size).collect();
        assert_eq!(rendered, sizes);
    }

    #[test]
    fn test_render_all_stops_when_cancelled() {
        let img = source(&png_rgba_64x64());
        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = render_all(&img, &[16, 32, 48], &GenerationParams::default(), &cancel);
        assert!(matches!(result, Err(FaviconError::Cancelled { .. })));
    }
}
