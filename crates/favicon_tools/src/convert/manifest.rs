//! site.webmanifest synthesis

use super::icon_file_name;
use crate::{FaviconError, GenerationParams, Result};
use serde::Serialize;

const APP_NAME: &str = "Favicon Package";
const APP_SHORT_NAME: &str = "Favicon";
const MASKABLE_PURPOSE: &str = "any maskable";

/// Preferred manifest order for the well-known sizes; the first two are maskable
const MANIFEST_ICONS: &[(u32, bool)] = &[(192, true), (512, true), (32, false), (16, false), (180, false)];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebManifest {
    pub name: &'static str,
    pub short_name: &'static str,
    pub start_url: &'static str,
    pub display: &'static str,
    pub icons: Vec<ManifestIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    pub categories: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<&'static str>,
}

/// Build the manifest for a package holding `icon_sizes`.
///
/// Well-known sizes come first in their fixed order, any other configured
/// size follows in configuration order. Colors carry the submitted
/// background string and are omitted (not null) for transparent packages.
pub fn build_manifest(params: &GenerationParams, icon_sizes: &[u32]) -> WebManifest {
    let color = (!params.transparent_background()).then(|| params.background_text());

    let known = MANIFEST_ICONS
        .iter()
        .copied()
        .filter(|(size, _)| icon_sizes.contains(size));
    let extra = icon_sizes
        .iter()
        .filter(|size| !MANIFEST_ICONS.iter().any(|(k, _)| k == *size))
        .map(|&size| (size, false));

    let mut seen = Vec::new();
    let icons = known
        .chain(extra)
        .filter(|(size, _)| {
            let fresh = !seen.contains(size);
            seen.push(*size);
            fresh
        })
        .map(|(size, maskable)| ManifestIcon {
            src: icon_file_name(size),
            sizes: format!("{}x{}", size, size),
            mime: "image/png",
            purpose: maskable.then_some(MASKABLE_PURPOSE),
        })
        .collect();

    WebManifest {
        name: APP_NAME,
        short_name: APP_SHORT_NAME,
        start_url: "/",
        display: "standalone",
        icons,
        background_color: color.clone(),
        theme_color: color,
        categories: vec!["utilities"],
    }
}

/// Pretty-printed JSON, two-space indented
pub fn manifest_to_json(manifest: &WebManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest)
        .map_err(|e| FaviconError::encode_error(format!("Failed to serialize manifest: {}", e)))
}
