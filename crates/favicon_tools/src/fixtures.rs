//! Test fixtures for favicon_tools
//!
//! Provides generated source images for unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Fixture sizes
pub mod sizes {
    pub const TINY: u32 = 4;
    pub const MEDIUM: u32 = 64;
    pub const LARGE: u32 = 256;
    pub const WEB_MAX: u32 = 512;
}

/// Create a minimal 4x4 opaque red PNG
pub fn png_rgba_4x4() -> Vec<u8> {
    let img = RgbaImage::from_pixel(sizes::TINY, sizes::TINY, Rgba([255, 0, 0, 255]));
    encode_png_rgba(&img)
}

/// Create a 64x64 opaque gradient PNG with an alpha channel
pub fn png_rgba_64x64() -> Vec<u8> {
    let mut img = RgbaImage::new(sizes::MEDIUM, sizes::MEDIUM);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255]);
    }
    encode_png_rgba(&img)
}

/// Create a 256x256 PNG: blue disc on a transparent background
pub fn png_rgba_256x256_icon() -> Vec<u8> {
    let mut img = RgbaImage::new(sizes::LARGE, sizes::LARGE);
    let center = (sizes::LARGE / 2) as i32;
    let radius = 100i32;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = x as i32 - center;
        let dy = y as i32 - center;
        let in_circle = dx * dx + dy * dy < radius * radius;

        *pixel = if in_circle {
            Rgba([0, 120, 255, 255])
        } else {
            Rgba([255, 255, 255, 0])
        };
    }
    encode_png_rgba(&img)
}

/// Create a PNG without alpha channel (RGB only)
pub fn png_rgb_64x64() -> Vec<u8> {
    encode_png_rgb(gradient_rgb(sizes::MEDIUM))
}

/// Create a 512x512 opaque RGB PNG, the typical upload
pub fn png_rgb_512x512() -> Vec<u8> {
    encode_png_rgb(gradient_rgb(sizes::WEB_MAX))
}

/// Create a non-square PNG for testing aspect ratio handling
pub fn png_rgba_32x64() -> Vec<u8> {
    let mut img = RgbaImage::new(32, 64);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([(x * 8) as u8, (y * 4) as u8, 200, 255]);
    }
    encode_png_rgba(&img)
}

/// Standard SVG fixture - 100x100 with a blue rectangle at 10..90
pub fn svg_100x100() -> String {
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100">
        <rect x="10" y="10" width="80" height="80" fill="blue"/>
    </svg>"#
        .to_string()
}

/// 100x100 SVG with a small centered mark at 30..70, leaving a wide empty margin
pub fn svg_centered_mark() -> String {
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100">
        <rect x="30" y="30" width="40" height="40" rx="6" fill="#7f13ec"/>
    </svg>"##
        .to_string()
}

/// Wide SVG, fully filled, for letterbox checks
pub fn svg_wide_200x100() -> String {
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 200 100">
        <rect x="0" y="0" width="200" height="100" fill="green"/>
    </svg>"#
        .to_string()
}

/// Invalid/malformed SVG for error testing
pub fn svg_invalid() -> String {
    "not valid svg content".to_string()
}

/// Invalid image data for error testing
pub fn invalid_image_data() -> Vec<u8> {
    vec![0, 1, 2, 3, 4, 5]
}

fn gradient_rgb(size: u32) -> RgbImage {
    let step = (256 / size).max(1);
    let mut img = RgbImage::new(size, size);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([(x * step) as u8, (y * step) as u8, 128]);
    }
    img
}

// Helper to encode RGB image to PNG bytes
fn encode_png_rgb(img: RgbImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer
}

// Helper to encode RGBA image to PNG bytes
fn encode_png_rgba(img: &RgbaImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid_png() {
        let fixtures = [
            ("png_rgba_4x4", png_rgba_4x4()),
            ("png_rgba_64x64", png_rgba_64x64()),
            ("png_rgba_256x256_icon", png_rgba_256x256_icon()),
            ("png_rgb_64x64", png_rgb_64x64()),
            ("png_rgb_512x512", png_rgb_512x512()),
            ("png_rgba_32x64", png_rgba_32x64()),
        ];

        for (name, data) in fixtures {
            let result = image::load_from_memory(&data);
            assert!(result.is_ok(), "Fixture {} failed to load", name);
        }
    }

    #[test]
    fn test_fixtures_have_correct_dimensions() {
        let img = image::load_from_memory(&png_rgba_4x4()).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));

        let img = image::load_from_memory(&png_rgb_512x512()).unwrap();
        assert_eq!((img.width(), img.height()), (512, 512));

        let img = image::load_from_memory(&png_rgba_32x64()).unwrap();
        assert_eq!((img.width(), img.height()), (32, 64));
    }
}
