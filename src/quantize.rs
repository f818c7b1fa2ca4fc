//! Palette extraction using median cut.
//!
//! The splitting order is fixed so that identical input buffers always yield
//! identical palettes:
//! - only pixels with alpha above [`ALPHA_THRESHOLD`] take part
//! - the bucket with the widest single-channel range is split next, the
//!   earliest one on ties, and its halves take its place
//! - it is sorted along its widest channel and cut at `len / 2`
//! - each bucket is represented by its rounded mean color

use std::collections::HashSet;

use crate::buffer::PixelBuffer;
use crate::color::rgb_hex;

/// Pixels at or below this alpha never contribute to a palette.
pub const ALPHA_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// A box of pixels for the median cut.
#[derive(Debug, Clone)]
struct Bucket {
    pixels: Vec<[u8; 3]>,
}

impl Bucket {
    /// Per-channel (max - min) over the bucket.
    fn ranges(&self) -> [u8; 3] {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        for p in &self.pixels {
            for c in 0..3 {
                min[c] = min[c].min(p[c]);
                max[c] = max[c].max(p[c]);
            }
        }
        [
            max[0].saturating_sub(min[0]),
            max[1].saturating_sub(min[1]),
            max[2].saturating_sub(min[2]),
        ]
    }

    fn widest_range(&self) -> u8 {
        let [r, g, b] = self.ranges();
        r.max(g).max(b)
    }

    /// Channel with the largest range. Green is checked first, then blue,
    /// and red only wins when strictly wider than both.
    fn widest_channel(&self) -> Channel {
        let [r, g, b] = self.ranges();
        if g >= r && g >= b {
            Channel::Green
        } else if b >= r && b >= g {
            Channel::Blue
        } else {
            Channel::Red
        }
    }

    /// Sort along the widest channel and cut at the midpoint index.
    fn split(mut self) -> (Bucket, Bucket) {
        let channel = self.widest_channel().index();
        self.pixels.sort_by_key(|p| p[channel]);
        let right = self.pixels.split_off(self.pixels.len() / 2);
        (Bucket { pixels: self.pixels }, Bucket { pixels: right })
    }

    /// Rounded arithmetic mean of the bucket.
    fn average(&self) -> [u8; 3] {
        let n = self.pixels.len() as f64;
        let mut sums = [0u64; 3];
        for p in &self.pixels {
            for c in 0..3 {
                sums[c] += p[c] as u64;
            }
        }
        sums.map(|s| (s as f64 / n).round() as u8)
    }
}

/// Opaque-enough pixels of a buffer as RGB triples, in scan order.
fn opaque_pixels(buffer: &PixelBuffer) -> Vec<[u8; 3]> {
    buffer
        .image()
        .pixels()
        .filter(|p| p[3] > ALPHA_THRESHOLD)
        .map(|p| [p[0], p[1], p[2]])
        .collect()
}

/// Extract up to `max_colors` representative colors as `#RRGGBB` strings.
///
/// When the buffer has no more than `max_colors` distinct opaque colors they
/// are returned directly in order of first appearance. A fully transparent
/// buffer or `max_colors == 0` yields an empty palette. Buckets whose averages
/// coincide collapse to one entry, so fewer than `max_colors` may come back.
///
/// # Examples
///
/// ```
/// use pxed::buffer::PixelBuffer;
/// use pxed::quantize::extract_palette;
/// use image::Rgba;
///
/// let buf = PixelBuffer::filled(4, 4, Rgba([255, 0, 0, 255]));
/// assert_eq!(extract_palette(&buf, 1), vec!["#FF0000".to_string()]);
/// ```
pub fn extract_palette(buffer: &PixelBuffer, max_colors: usize) -> Vec<String> {
    if max_colors == 0 {
        return Vec::new();
    }

    let pixels = opaque_pixels(buffer);
    if pixels.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let distinct: Vec<[u8; 3]> = pixels.iter().copied().filter(|p| seen.insert(*p)).collect();
    if distinct.len() <= max_colors {
        return distinct.iter().map(|p| rgb_hex(p[0], p[1], p[2])).collect();
    }

    let mut buckets = vec![Bucket { pixels }];
    while buckets.len() < max_colors {
        // First bucket with the strictly largest non-zero range
        let mut best: Option<(usize, u8)> = None;
        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.pixels.len() < 2 {
                continue;
            }
            let range = bucket.widest_range();
            if range > best.map_or(0, |(_, r)| r) {
                best = Some((i, range));
            }
        }

        let Some((index, _)) = best else {
            break;
        };
        // The halves take the split bucket's place, keeping scan order stable
        let (left, right) = buckets.remove(index).split();
        buckets.insert(index, right);
        buckets.insert(index, left);
    }

    let mut seen = HashSet::new();
    buckets
        .iter()
        .map(Bucket::average)
        .filter(|c| seen.insert(*c))
        .map(|c| rgb_hex(c[0], c[1], c[2]))
        .collect()
}
