//! Web icon set: one named PNG per size

use crate::render::render_all;
use crate::{CancelFlag, GenerationParams, IconArtifact, Result};
use image::DynamicImage;
use tracing::debug;

/// Archive file name for a web icon of edge `size`
pub fn icon_file_name(size: u32) -> String {
    match size {
        16 => "favicon-16x16.png".to_string(),
        32 => "favicon-32x32.png".to_string(),
        180 => "apple-touch-icon.png".to_string(),
        192 => "android-chrome-192x192.png".to_string(),
        512 => "android-chrome-512x512.png".to_string(),
        other => format!("{}.png", other),
    }
}

/// Render every size and name the results. Any frame failure fails the set.
pub fn generate_icon_set(
    source: &DynamicImage,
    params: &GenerationParams,
    sizes: &[u32],
    cancel: &CancelFlag,
) -> Result<Vec<IconArtifact>> {
    let artifacts: Vec<IconArtifact> = render_all(source, sizes, params, cancel)?
        .into_iter()
        .map(|(size, png)| IconArtifact::new(icon_file_name(size), png))
        .collect();

    debug!(count = artifacts.len(), "favicon_tools.icon_set");
    Ok(artifacts)
}
