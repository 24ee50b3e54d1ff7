//! favicon_tools - favicon package generation
//!
//! Turns one uploaded image into a complete icon package:
//! - Render: pad, letterbox, compose on a background, round the corners
//! - Convert: web icon set, PNG-in-ICO container, site.webmanifest
//! - Archive: bundle every artifact into a single zip
//!
//! Everything is computed per call. Nothing is cached between packages.

use image::DynamicImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub mod archive;
pub mod convert;
pub mod render;
pub mod source;

// Test fixtures
#[cfg(test)]
pub mod fixtures;

// ============================================================================
// Error Types
// ============================================================================

/// Error code range: 9200-9299
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FaviconErrorCode {
    DecodeError = 9200,
    EncodeError = 9201,
    IcoError = 9202,
    ArchiveError = 9203,
    InvalidInput = 9204,
    Cancelled = 9205,
}

#[derive(Debug, thiserror::Error)]
pub enum FaviconError {
    #[error("[{code}] Decode error: {message}")]
    DecodeError { code: u32, message: String },

    #[error("[{code}] Encode error: {message}")]
    EncodeError { code: u32, message: String },

    #[error("[{code}] ICO error: {message}")]
    IcoError { code: u32, message: String },

    #[error("[{code}] Archive error: {message}")]
    ArchiveError { code: u32, message: String },

    #[error("[{code}] Invalid input: {message}")]
    InvalidInput { code: u32, message: String },

    #[error("[{code}] Cancelled: {message}")]
    Cancelled { code: u32, message: String },
}

impl FaviconError {
    pub fn decode_error(message: impl Into<String>) -> Self {
        Self::DecodeError {
            code: FaviconErrorCode::DecodeError as u32,
            message: message.into(),
        }
    }

    pub fn encode_error(message: impl Into<String>) -> Self {
        Self::EncodeError {
            code: FaviconErrorCode::EncodeError as u32,
            message: message.into(),
        }
    }

    pub fn ico_error(message: impl Into<String>) -> Self {
        Self::IcoError {
            code: FaviconErrorCode::IcoError as u32,
            message: message.into(),
        }
    }

    pub fn archive_error(message: impl Into<String>) -> Self {
        Self::ArchiveError {
            code: FaviconErrorCode::ArchiveError as u32,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            code: FaviconErrorCode::InvalidInput as u32,
            message: message.into(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            code: FaviconErrorCode::Cancelled as u32,
            message: message.into(),
        }
    }

    /// Numeric code carried by every variant
    pub fn code(&self) -> u32 {
        match self {
            Self::DecodeError { code, .. }
            | Self::EncodeError { code, .. }
            | Self::IcoError { code, .. }
            | Self::ArchiveError { code, .. }
            | Self::InvalidInput { code, .. }
            | Self::Cancelled { code, .. } => *code,
        }
    }
}

pub type Result<T> = std::result::Result<T, FaviconError>;

// ============================================================================
// Types
// ============================================================================

/// User-uploaded image: raw bytes plus the MIME type the client declared.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
    pub file_name: Option<String>,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime: Option<String>) -> Self {
        Self {
            bytes,
            mime,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// A named file destined for the output archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl IconArtifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Straight-alpha RGBA color parsed from a CSS-style hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    pub const TRANSPARENT: HexColor = HexColor {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self {
                    r: digits.next()??,
                    g: digits.next()??,
                    b: digits.next()??,
                    a: 255,
                })
            }
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: 255,
            }),
            8 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: channel(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    /// Normalized lowercase hex, `#rrggbb` when opaque and `#rrggbbaa` otherwise
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_pixel(&self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Upper bound for both padding and corner radius, in percent of the icon edge
pub const MAX_PERCENT: f64 = 50.0;

/// Per-request generation knobs. Percentages are clamped on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    padding: f64,
    corner_radius: f64,
    transparent_background: bool,
    background_color: HexColor,
    background_text: Option<String>,
}

impl GenerationParams {
    pub fn new(
        padding: f64,
        corner_radius: f64,
        transparent_background: bool,
        background_color: HexColor,
    ) -> Self {
        Self {
            padding: clamp_percent(padding),
            corner_radius: clamp_percent(corner_radius),
            transparent_background,
            background_color,
            background_text: None,
        }
    }

    /// Keep the background color as the client wrote it, for the manifest
    pub fn with_background_text(mut self, text: impl Into<String>) -> Self {
        self.background_text = Some(text.into());
        self
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn corner_radius(&self) -> f64 {
        self.corner_radius
    }

    pub fn transparent_background(&self) -> bool {
        self.transparent_background
    }

    pub fn background_color(&self) -> HexColor {
        self.background_color
    }

    /// Background color as submitted, or its normalized hex when none was kept
    pub fn background_text(&self) -> String {
        self.background_text
            .clone()
            .unwrap_or_else(|| self.background_color.to_hex())
    }

    /// Canvas fill: fully transparent when requested, the background color otherwise
    pub fn canvas_fill(&self) -> HexColor {
        if self.transparent_background {
            HexColor::TRANSPARENT
        } else {
            self.background_color
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new(0.0, 0.0, false, HexColor::WHITE)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_PERCENT)
    } else {
        0.0
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Shared flag a caller raises to stop a generation job between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once the flag is raised
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(FaviconError::cancelled("Generation cancelled"));
        }
        Ok(())
    }

    /// Guard that raises the flag when dropped
    pub fn drop_guard(&self) -> CancelGuard {
        CancelGuard(self.clone())
    }
}

/// Raises its [`CancelFlag`] on drop. Held by whoever waits on the job, so
/// abandoning the wait stops the work.
#[derive(Debug)]
pub struct CancelGuard(CancelFlag);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Web icon sizes, rendered as individual PNG files
pub const ICON_SET_SIZES: &[u32] = &[16, 32, 180, 192, 512];

/// Frame sizes embedded in favicon.ico, in directory order
pub const ICO_SIZES: &[u32] = &[16, 32, 48, 64, 256];

/// Edge length of the intermediate bitmap vector sources are rasterized to
pub const SVG_RASTER_SIZE: u32 = 1024;

pub const MANIFEST_FILE_NAME: &str = "site.webmanifest";
pub const ICO_FILE_NAME: &str = "favicon.ico";

/// Size lists and raster settings used by [`FaviconGenerator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub icon_sizes: Vec<u32>,
    pub ico_sizes: Vec<u32>,
    pub svg_raster_size: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            icon_sizes: ICON_SET_SIZES.to_vec(),
            ico_sizes: ICO_SIZES.to_vec(),
            svg_raster_size: SVG_RASTER_SIZE,
        }
    }
}

/// Drives the whole pipeline for one source image.
#[derive(Debug, Clone, Default)]
pub struct FaviconGenerator {
    config: GeneratorConfig,
}

impl FaviconGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Decode (or rasterize) the upload into a bitmap ready for resampling
    pub fn load_source(&self, source: &SourceImage) -> Result<DynamicImage> {
        source::load_source(source, self.config.svg_raster_size)
    }

    /// Every artifact of the package in archive order:
    /// icon PNGs, then site.webmanifest, then favicon.ico.
    pub fn generate_artifacts(
        &self,
        source: &SourceImage,
        params: &GenerationParams,
    ) -> Result<Vec<IconArtifact>> {
        self.generate_artifacts_cancellable(source, params, &CancelFlag::new())
    }

    /// [`generate_artifacts`](Self::generate_artifacts), checking `cancel`
    /// between stages and before every frame.
    pub fn generate_artifacts_cancellable(
        &self,
        source: &SourceImage,
        params: &GenerationParams,
        cancel: &CancelFlag,
    ) -> Result<Vec<IconArtifact>> {
        let image = self.load_source(source)?;
        debug!(
            width = image.width(),
            height = image.height(),
            "favicon_tools.source_loaded"
        );

        let icon_sizes = &self.config.icon_sizes;
        let mut artifacts = convert::generate_icon_set(&image, params, icon_sizes, cancel)?;

        let manifest = convert::build_manifest(params, icon_sizes);
        artifacts.push(IconArtifact::new(
            MANIFEST_FILE_NAME,
            convert::manifest_to_json(&manifest)?.into_bytes(),
        ));

        let ico = convert::build_ico(&image, params, &self.config.ico_sizes, cancel)?;
        artifacts.push(IconArtifact::new(ICO_FILE_NAME, ico));

        Ok(artifacts)
    }

    /// Generate all artifacts and bundle them into zip bytes
    pub fn generate_package(&self, source: &SourceImage, params: &GenerationParams) -> Result<Vec<u8>> {
        self.generate_package_cancellable(source, params, &CancelFlag::new())
    }

    pub fn generate_package_cancellable(
        &self,
        source: &SourceImage,
        params: &GenerationParams,
        cancel: &CancelFlag,
    ) -> Result<Vec<u8>> {
        let artifacts = self.generate_artifacts_cancellable(source, params, cancel)?;
        cancel.check()?;
        debug!(count = artifacts.len(), "favicon_tools.package");
        archive::build_archive(&artifacts)
    }
}

// ============================================================================
// Tests
// ============================================================================
