//! PNG-in-ICO container assembly
//!
//! Layout, little-endian throughout:
//!
//! | Part      | Bytes | Fields                                                         |
//! |-----------|-------|----------------------------------------------------------------|
//! | ICONDIR   | 6     | reserved=0 (u16), type=1 (u16), count (u16)                    |
//! | entry × n | 16    | width, height (u8, 0 = 256), colors=0, reserved=0 (u8),        |
//! |           |       | planes=1 (u16), bit count=32 (u16), length (u32), offset (u32) |
//! | payloads  | ...   | PNG files, same order as the entries                           |

use crate::render::render_all;
use crate::{CancelFlag, FaviconError, GenerationParams, Result};
use image::DynamicImage;
use tracing::debug;

pub const ICO_HEADER_LEN: usize = 6;
pub const ICO_ENTRY_LEN: usize = 16;

const ICO_RESOURCE_ICON: u16 = 1;
const ICO_PLANES: u16 = 1;
const ICO_BIT_COUNT: u16 = 32;
const MAX_ICO_DIMENSION: u32 = 256;

/// Accumulates PNG frames and writes the container in insertion order
#[derive(Debug, Default)]
pub struct IcoWriter {
    frames: Vec<(u32, Vec<u8>)>,
}

impl IcoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a square PNG frame of edge `size`
    pub fn add_png(&mut self, size: u32, png: Vec<u8>) -> Result<()> {
        if size == 0 || size > MAX_ICO_DIMENSION {
            return Err(FaviconError::ico_error(format!(
                "ICO frame size must be within 1..={}, got {}",
                MAX_ICO_DIMENSION, size
            )));
        }
        self.frames.push((size, png));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Serialize header, directory and payloads
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.frames.is_empty() {
            return Err(FaviconError::ico_error("ICO needs at least one frame"));
        }

        let count = u16::try_from(self.frames.len())
            .map_err(|_| FaviconError::ico_error("Too many ICO frames"))?;
        let directory_len = ICO_HEADER_LEN + ICO_ENTRY_LEN * self.frames.len();
        let payload_len: usize = self.frames.iter().map(|(_, png)| png.len()).sum();

        let mut out = Vec::with_capacity(directory_len + payload_len);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&ICO_RESOURCE_ICON.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());

        let mut offset = u32::try_from(directory_len)
            .map_err(|_| FaviconError::ico_error("ICO directory too large"))?;
        for (size, png) in &self.frames {
            let length = u32::try_from(png.len())
                .map_err(|_| FaviconError::ico_error("ICO frame payload too large"))?;

            out.push(dimension_byte(*size));
            out.push(dimension_byte(*size));
            out.push(0); // color count
            out.push(0); // reserved
            out.extend_from_slice(&ICO_PLANES.to_le_bytes());
            out.extend_from_slice(&ICO_BIT_COUNT.to_le_bytes());
            out.extend_from_slice(&length.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());

            offset = offset
                .checked_add(length)
                .ok_or_else(|| FaviconError::ico_error("ICO exceeds 4 GiB"))?;
        }

        for (_, png) in &self.frames {
            out.extend_from_slice(png);
        }

        debug!(count, bytes = out.len(), "favicon_tools.ico_finish");
        Ok(out)
    }
}

/// 256 does not fit the u8 field; 0 stands for it
fn dimension_byte(size: u32) -> u8 {
    if size >= MAX_ICO_DIMENSION {
        0
    } else {
        size as u8
    }
}

/// Render each size and pack the frames into a favicon.ico
pub fn build_ico(
    source: &DynamicImage,
    params: &GenerationParams,
    sizes: &[u32],
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let mut writer = IcoWriter::new();
    for (size, png) in render_all(source, sizes, params, cancel)? {
        writer.add_png(size, png)?;
    }
    writer.finish()
}

/// One parsed directory entry; dimensions already map 0 back to 256
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcoEntry {
    pub width: u32,
    pub height: u32,
    pub color_count: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub byte_len: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcoDirectory {
    pub resource_type: u16,
    pub entries: Vec<IcoEntry>,
}

impl IcoDirectory {
    /// Payload bytes of entry `index`, if they lie inside `data`
    pub fn payload<'a>(&self, data: &'a [u8], index: usize) -> Option<&'a [u8]> {
        let entry = self.entries.get(index)?;
        let start = entry.offset as usize;
        let end = start.checked_add(entry.byte_len as usize)?;
        data.get(start..end)
    }
}

/// Read back the header and directory of an ICO/CUR file
pub fn parse_ico_directory(data: &[u8]) -> Result<IcoDirectory> {
    let u16_at = |at: usize| u16::from_le_bytes([data[at], data[at + 1]]);
    let u32_at = |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

    if data.len() < ICO_HEADER_LEN {
        return Err(FaviconError::ico_error("ICO header truncated"));
    }
    if u16_at(0) != 0 {
        return Err(FaviconError::ico_error("ICO reserved field must be zero"));
    }

    let resource_type = u16_at(2);
    let count = u16_at(4) as usize;
    if data.len() < ICO_HEADER_LEN + ICO_ENTRY_LEN * count {
        return Err(FaviconError::ico_error(format!(
            "ICO directory truncated: {} entries declared",
            count
        )));
    }

    let as_dimension = |byte: u8| if byte == 0 { MAX_ICO_DIMENSION } else { byte as u32 };
    let entries = (0..count)
        .map(|i| {
            let at = ICO_HEADER_LEN + i * ICO_ENTRY_LEN;
            IcoEntry {
                width: as_dimension(data[at]),
                height: as_dimension(data[at + 1]),
                color_count: data[at + 2],
                planes: u16_at(at + 4),
                bit_count: u16_at(at + 6),
                byte_len: u32_at(at + 8),
                offset: u32_at(at + 12),
            }
        })
        .collect();

    Ok(IcoDirectory {
        resource_type,
        entries,
    })
}
