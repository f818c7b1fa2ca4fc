//! Owned RGBA8 pixel grids
//!
//! A [`PixelBuffer`] wraps an [`RgbaImage`] with signed, bounds-tolerant
//! accessors. Writes outside the grid are silently dropped so that brush
//! squares, mirrored strokes and offset blits can run off the canvas edge.

use image::{Rgba, RgbaImage};

use crate::color::TRANSPARENT;
use crate::composition::blend::{blend_pixels, BlendMode};

/// How source pixels combine with destination pixels during a blit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlitOp {
    /// Copy source pixels verbatim, including transparent ones
    Replace,
    /// Straight alpha "source over" compositing
    SourceOver,
    /// Full blend-mode math with a layer opacity
    Blend { mode: BlendMode, opacity: f32 },
}

/// An axis-aligned pixel rectangle. May extend past the buffer edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The smallest rectangle containing both corner points (inclusive).
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));
        // The span of two i32 values always fits in u32; only the +1 can overflow
        let span = |lo: i32, hi: i32| ((hi as i64 - lo as i64) as u32).saturating_add(1);
        Self { x: min_x, y: min_y, width: span(min_x, max_x), height: span(min_y, max_y) }
    }
}

/// A fixed-size grid of RGBA8 pixels.
///
/// The raw byte length is always `width * height * 4`; dimensions never change
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Create a buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, color) }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Read a pixel. Returns `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if self.in_bounds(x, y) {
            Some(*self.image.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Write a pixel. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    /// Make the part of `region` that lies inside the grid transparent.
    pub fn clear(&mut self, region: Rect) {
        let (x0, x1) = clip_span(region.x, region.width, self.width());
        let (y0, y1) = clip_span(region.y, region.height, self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x, y, TRANSPARENT);
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.fill(TRANSPARENT);
    }

    /// Draw `source` onto this buffer with its top-left corner at `(dx, dy)`.
    ///
    /// Source pixels that land outside this buffer are dropped.
    pub fn blit(&mut self, source: &PixelBuffer, dx: i32, dy: i32, op: BlitOp) {
        // Intersect the destination grid with the shifted source rectangle
        let (x_start, x_end) = clip_span(dx, source.width(), self.width());
        let (y_start, y_end) = clip_span(dy, source.height(), self.height());

        for ty in y_start..y_end {
            for tx in x_start..x_end {
                let sx = (tx as i64 - dx as i64) as u32;
                let sy = (ty as i64 - dy as i64) as u32;
                let src = *source.image.get_pixel(sx, sy);

                let out = match op {
                    BlitOp::Replace => src,
                    BlitOp::SourceOver => {
                        if src[3] == 0 {
                            continue;
                        }
                        let dst = *self.image.get_pixel(tx, ty);
                        blend_pixels(src, dst, BlendMode::Normal, src[3] as f32 / 255.0)
                    }
                    BlitOp::Blend { mode, opacity } => {
                        let src_alpha = (src[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
                        if src_alpha == 0.0 {
                            continue;
                        }
                        let dst = *self.image.get_pixel(tx, ty);
                        blend_pixels(src, dst, mode, src_alpha)
                    }
                };
                self.image.put_pixel(tx, ty, out);
            }
        }
    }

    /// A same-size copy with contents shifted by `(dx, dy)`.
    ///
    /// Pixels shifted past the edge are lost; uncovered pixels are transparent.
    pub fn translated(&self, dx: i32, dy: i32) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width(), self.height());
        out.blit(self, dx, dy, BlitOp::Replace);
        out
    }
}

/// The part of `[start, start + len)` inside `[0, limit)`, as a half-open range.
///
/// Computed in `i64` so extreme offsets cannot overflow; empty spans come back
/// with `from >= to`.
pub(crate) fn clip_span(start: i32, len: u32, limit: u32) -> (u32, u32) {
    let from = (start as i64).clamp(0, limit as i64);
    let to = (start as i64 + len as i64).clamp(0, limit as i64);
    (from as u32, to as u32)
}
