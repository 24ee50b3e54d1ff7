//! Zip bundling of generated artifacts

use crate::{FaviconError, IconArtifact, Result};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

pub const ARCHIVE_FILE_NAME: &str = "favicon-package.zip";
pub const ARCHIVE_MIME: &str = "application/zip";

/// Write all artifacts, in order, into an in-memory Deflate zip.
///
/// Entry timestamps are pinned to the zip epoch so identical inputs give
/// identical archives.
pub fn build_archive(artifacts: &[IconArtifact]) -> Result<Vec<u8>> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = artifacts.iter().find(|a| !seen.insert(a.file_name.as_str())) {
        return Err(FaviconError::archive_error(format!(
            "Duplicate archive entry: {}",
            duplicate.file_name
        )));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    for artifact in artifacts {
        zip.start_file(artifact.file_name.as_str(), options)
            .map_err(|e| {
                FaviconError::archive_error(format!("Failed to start {}: {}", artifact.file_name, e))
            })?;
        zip.write_all(&artifact.bytes).map_err(|e| {
            FaviconError::archive_error(format!("Failed to write {}: {}", artifact.file_name, e))
        })?;
    }

    let bytes = zip
        .finish()
        .map_err(|e| FaviconError::archive_error(format!("Failed to finish archive: {}", e)))?
        .into_inner();

    debug!(entries = artifacts.len(), bytes = bytes.len(), "favicon_tools.archive");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample() -> Vec<IconArtifact> {
        vec![
            IconArtifact::new("a.png", vec![1, 2, 3]),
            IconArtifact::new("site.webmanifest", b"{}".to_vec()),
        ]
    }

    #[test]
    fn test_archive_contains_entries_in_order() {
        let bytes = build_archive(&sample()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "a.png");
        assert_eq!(first.compression(), CompressionMethod::Deflated);
        let mut data = Vec::new();
        first.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        drop(first);

        let mut second = archive.by_name("site.webmanifest").unwrap();
        let mut text = String::new();
        second.read_to_string(&mut text).unwrap();
        assert_eq!(text, "{}");
    }

    #[test]
    fn test_archive_is_deterministic() {
        assert_eq!(build_archive(&sample()).unwrap(), build_archive(&sample()).unwrap());
    }

    #[test]
    fn test_archive_rejects_duplicates() {
        let artifacts = vec![
            IconArtifact::new("a.png", vec![1]),
            IconArtifact::new("a.png", vec![2]),
        ];
        assert!(matches!(
            build_archive(&artifacts),
            Err(FaviconError::ArchiveError { .. })
        ));
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let bytes = build_archive(&[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
