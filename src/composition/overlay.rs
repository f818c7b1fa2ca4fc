//! View overlays drawn around the composited layers.
//!
//! Onion skinning draws the previous frame faintly beneath the current one so
//! motion can be judged while drawing. The pixel grid is drawn over a zoomed
//! preview. Neither is ever written back into a layer.

use image::imageops::{self, FilterType};
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::buffer::{BlitOp, PixelBuffer};
use crate::composition::{blend_pixels, BlendMode};

/// Configuration for onion skin rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnionConfig {
    /// Opacity of the ghost frame (0.0-1.0)
    pub opacity: f32,
    /// Optional tint multiplied into the ghost colors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<[u8; 3]>,
}

impl Default for OnionConfig {
    fn default() -> Self {
        Self { opacity: 0.3, tint: None }
    }
}

/// Multiply every visible pixel's color by a tint.
fn apply_tint(image: &PixelBuffer, tint: [u8; 3]) -> PixelBuffer {
    let mut result = image.clone().into_image();

    for pixel in result.pixels_mut() {
        if pixel[3] > 0 {
            let r = ((pixel[0] as u16 * tint[0] as u16) / 255) as u8;
            let g = ((pixel[1] as u16 * tint[1] as u16) / 255) as u8;
            let b = ((pixel[2] as u16 * tint[2] as u16) / 255) as u8;
            *pixel = Rgba([r, g, b, pixel[3]]);
        }
    }

    PixelBuffer::from_image(result)
}

/// Draw a ghost frame onto `canvas` at the configured opacity.
pub fn draw_onion_underlay(canvas: &mut PixelBuffer, ghost: &PixelBuffer, config: &OnionConfig) {
    let op = BlitOp::Blend { mode: BlendMode::Normal, opacity: config.opacity };
    match config.tint {
        Some(tint) => canvas.blit(&apply_tint(ghost, tint), 0, 0, op),
        None => canvas.blit(ghost, 0, 0, op),
    }
}

/// Upscale `image` by `zoom` and draw a one-pixel grid line along the left
/// and top edge of every source pixel.
///
/// A zoom below 2 leaves no room for grid lines and returns a plain copy.
pub fn draw_pixel_grid(image: &PixelBuffer, zoom: u32, color: Rgba<u8>) -> PixelBuffer {
    if zoom < 2 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let mut zoomed = imageops::resize(image.image(), w * zoom, h * zoom, FilterType::Nearest);
    for (x, y, pixel) in zoomed.enumerate_pixels_mut() {
        if x % zoom == 0 || y % zoom == 0 {
            *pixel = blend_pixels(color, *pixel, BlendMode::Normal, 1.0);
        }
    }
    PixelBuffer::from_image(zoomed)
}
