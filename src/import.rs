//! Bringing externally supplied images into a document.
//!
//! Decoding happens before any pixel becomes usable: a failed decode is an
//! error for that action only and never leaves a half-built layer behind.

use std::io;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::DynamicImage;
use thiserror::Error;
use tracing::debug;

use crate::buffer::PixelBuffer;

/// Error type for image import
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be read
    #[error("failed to read image: {0}")]
    Io(#[from] io::Error),
    /// The bytes are not a supported or intact image
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// The image has no pixels
    #[error("image has zero width or height")]
    Empty,
}

/// Decode an encoded image (PNG, GIF, ...) held in memory.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, ImportError> {
    let image = image::load_from_memory(bytes)?;
    to_buffer(image)
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImportError> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "decoding image");
    decode_image(&bytes)
}

fn to_buffer(image: DynamicImage) -> Result<PixelBuffer, ImportError> {
    let rgba = image.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ImportError::Empty);
    }
    Ok(PixelBuffer::from_image(rgba))
}

/// Resample `image` to exactly `width x height` with nearest-neighbor.
///
/// Images already at the canvas size are returned unchanged.
pub fn fit_to_canvas(image: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    debug!(from = ?image.dimensions(), to = ?(width, height), "resampling import");
    PixelBuffer::from_image(imageops::resize(image.image(), width, height, FilterType::Nearest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(2, 1, Rgba([10, 20, 30, 255]));
        let buffer = decode_image(&png_bytes(&image)).unwrap();
        assert_eq!(buffer.dimensions(), (3, 2));
        assert_eq!(buffer.get(2, 1), Some(Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImportError::Decode(_)));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_image(Path::new("/nonexistent/pxed/missing.png")).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn test_fit_same_size_is_identity() {
        let buffer = PixelBuffer::filled(4, 4, Rgba([1, 2, 3, 4]));
        assert_eq!(fit_to_canvas(&buffer, 4, 4), buffer);
    }

    #[test]
    fn test_fit_upscales_without_interpolation() {
        let mut buffer = PixelBuffer::new(2, 1);
        buffer.set(0, 0, Rgba([255, 0, 0, 255]));
        buffer.set(1, 0, Rgba([0, 0, 255, 255]));
        let fitted = fit_to_canvas(&buffer, 4, 2);
        assert_eq!(fitted.dimensions(), (4, 2));
        for pixel in fitted.image().pixels() {
            assert!(*pixel == Rgba([255, 0, 0, 255]) || *pixel == Rgba([0, 0, 255, 255]));
        }
        assert_eq!(fitted.get(0, 1), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(fitted.get(3, 0), Some(Rgba([0, 0, 255, 255])));
    }
}
