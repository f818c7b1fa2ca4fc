//! PNG output and export scaling

use std::io::{self, Cursor};
use std::path::Path;

use image::imageops::FilterType;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Export scale outside 1, 2, 4 or 8
    #[error("unsupported export scale {0} (expected 1, 2, 4 or 8)")]
    InvalidScale(u32),
}

/// Integer upscale factor applied on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ExportScale {
    #[default]
    X1,
    X2,
    X4,
    X8,
}

impl ExportScale {
    pub fn factor(self) -> u32 {
        match self {
            ExportScale::X1 => 1,
            ExportScale::X2 => 2,
            ExportScale::X4 => 4,
            ExportScale::X8 => 8,
        }
    }
}

impl TryFrom<u32> for ExportScale {
    type Error = OutputError;

    fn try_from(factor: u32) -> Result<Self, Self::Error> {
        match factor {
            1 => Ok(ExportScale::X1),
            2 => Ok(ExportScale::X2),
            4 => Ok(ExportScale::X4),
            8 => Ok(ExportScale::X8),
            other => Err(OutputError::InvalidScale(other)),
        }
    }
}

impl From<ExportScale> for u32 {
    fn from(scale: ExportScale) -> u32 {
        scale.factor()
    }
}

/// Scale a buffer by an export factor using nearest-neighbor sampling.
///
/// This preserves crisp pixel edges for pixel art.
pub fn scale_buffer(buffer: &PixelBuffer, scale: ExportScale) -> PixelBuffer {
    let factor = scale.factor();
    if factor == 1 {
        return buffer.clone();
    }
    let (w, h) = buffer.dimensions();
    PixelBuffer::from_image(image::imageops::resize(
        buffer.image(),
        w * factor,
        h * factor,
        FilterType::Nearest,
    ))
}

/// Encode a buffer as PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Vec::new();
    buffer.image().write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Scale and encode `image`, then hand the PNG bytes to `save` exactly once.
///
/// `save` is not called when encoding fails.
#[tracing::instrument(level = "debug", skip(image, save), fields(size = ?image.dimensions()))]
pub fn export_png(
    image: &PixelBuffer,
    scale: ExportScale,
    save: impl FnOnce(Vec<u8>),
) -> Result<(), OutputError> {
    let bytes = encode_png(&scale_buffer(image, scale))?;
    save(bytes);
    Ok(())
}

/// Write bytes to a file, creating parent directories as needed.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Save a buffer to a PNG file.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<(), OutputError> {
    write_file(path, &encode_png(buffer)?)
}
