//! Raster drawing primitives for pixel-exact editing.
//!
//! Every function takes its paint mode and symmetry explicitly; nothing is
//! remembered between calls. Coordinates are signed canvas pixels and anything
//! that falls off the buffer is ignored.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::buffer::{clip_span, PixelBuffer};
use crate::color::TRANSPARENT;
use crate::composition::blend::{blend_pixels, BlendMode};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Mirroring constraint applied to brush strokes and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    #[default]
    None,
    /// Mirror across the vertical center column: `x -> width - 1 - x`
    Horizontal,
    /// Mirror across the horizontal center row: `y -> height - 1 - y`
    Vertical,
}

impl Symmetry {
    /// The mirror image of `(x, y)` on a `width x height` canvas, if any.
    ///
    /// Points whose mirror falls outside the `i32` range have none; they are
    /// far off the canvas either way.
    pub fn mirror(self, x: i32, y: i32, width: u32, height: u32) -> Option<(i32, i32)> {
        let flip = |v: i32, extent: u32| i32::try_from(extent as i64 - 1 - v as i64).ok();
        match self {
            Symmetry::None => None,
            Symmetry::Horizontal => Some((flip(x, width)?, y)),
            Symmetry::Vertical => Some((x, flip(y, height)?)),
        }
    }
}

/// How brush pixels are written into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PaintMode {
    /// Write the brush color verbatim
    #[default]
    Replace,
    /// Clear pixels to full transparency
    Erase,
    /// Airbrush toward white at the given opacity (0.0-1.0)
    Lighten(f32),
    /// Airbrush toward black at the given opacity (0.0-1.0)
    Darken(f32),
}

/// Everything a brush call needs, passed explicitly on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba<u8>,
    /// Side length of the square brush; 0 is treated as 1
    pub size: u32,
    pub mode: PaintMode,
    pub symmetry: Symmetry,
}

impl Stroke {
    /// A 1px replace stroke with no symmetry.
    pub fn new(color: Rgba<u8>) -> Self {
        Self { color, size: 1, mode: PaintMode::Replace, symmetry: Symmetry::None }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_mode(mut self, mode: PaintMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }
}

/// Write a single pixel according to a paint mode.
fn paint(buffer: &mut PixelBuffer, x: i32, y: i32, color: Rgba<u8>, mode: PaintMode) {
    match mode {
        PaintMode::Replace => buffer.set(x, y, color),
        PaintMode::Erase => buffer.set(x, y, TRANSPARENT),
        PaintMode::Lighten(amount) | PaintMode::Darken(amount) => {
            let Some(dst) = buffer.get(x, y) else {
                return;
            };
            let tone = if matches!(mode, PaintMode::Lighten(_)) { WHITE } else { BLACK };
            buffer.set(x, y, blend_pixels(tone, dst, BlendMode::Normal, amount));
        }
    }
}

/// Fill a `size x size` square whose center (rounded down) is `(cx, cy)`.
fn fill_square(buffer: &mut PixelBuffer, cx: i32, cy: i32, stroke: &Stroke) {
    let size = stroke.size.max(1);
    let half = (size / 2) as i64;
    let left = saturate(cx as i64 - half);
    let top = saturate(cy as i64 - half);

    let (x0, x1) = clip_span(left, size, buffer.width());
    let (y0, y1) = clip_span(top, size, buffer.height());
    for y in y0..y1 {
        for x in x0..x1 {
            paint(buffer, x as i32, y as i32, stroke.color, stroke.mode);
        }
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Stamp the brush at `(x, y)`, plus its mirror when symmetry is active.
///
/// The mirrored square is skipped only when its center coincides with the
/// original, so a brush sitting on the axis is not painted twice.
///
/// # Examples
///
/// ```
/// use pxed::buffer::PixelBuffer;
/// use pxed::raster::{draw_pixel, Stroke, Symmetry};
/// use image::Rgba;
///
/// let red = Rgba([255, 0, 0, 255]);
/// let mut buf = PixelBuffer::new(8, 8);
/// draw_pixel(&mut buf, 1, 2, &Stroke::new(red).with_symmetry(Symmetry::Horizontal));
/// assert_eq!(buf.get(1, 2), Some(red));
/// assert_eq!(buf.get(6, 2), Some(red));
/// ```
pub fn draw_pixel(buffer: &mut PixelBuffer, x: i32, y: i32, stroke: &Stroke) {
    fill_square(buffer, x, y, stroke);

    if let Some((mx, my)) = stroke.symmetry.mirror(x, y, buffer.width(), buffer.height()) {
        if (mx, my) != (x, y) {
            fill_square(buffer, mx, my, stroke);
        }
    }
}

/// Draw a line with Bresenham's algorithm, stamping the brush at every step
/// including both endpoints.
///
/// Only the part of the line that can touch the canvas is stepped: endpoints
/// beyond the canvas (grown by the brush radius) are first clipped onto it.
pub fn draw_line(buffer: &mut PixelBuffer, x0: i32, y0: i32, x1: i32, y1: i32, stroke: &Stroke) {
    let margin = (stroke.size.max(1) / 2) as i64 + 1;
    let max_x = buffer.width() as i64 - 1 + margin;
    let max_y = buffer.height() as i64 - 1 + margin;
    let bounds = (-margin, -margin, max_x, max_y);
    let Some((x0, y0, x1, y1)) = clip_line((x0 as i64, y0 as i64), (x1 as i64, y1 as i64), bounds)
    else {
        return;
    };

    let (mut x, mut y) = (x0, y0);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_pixel(buffer, saturate(x), saturate(y), stroke);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang-Barsky clip of a segment against the inclusive box
/// `(min_x, min_y, max_x, max_y)`.
///
/// Segments already inside are returned untouched so on-canvas lines keep
/// their exact Bresenham pixels. Clipped endpoints are rounded to the nearest
/// pixel and kept inside the box.
fn clip_line(
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
    (min_x, min_y, max_x, max_y): (i64, i64, i64, i64),
) -> Option<(i64, i64, i64, i64)> {
    let inside = |x: i64, y: i64| x >= min_x && x <= max_x && y >= min_y && y <= max_y;
    if inside(x0, y0) && inside(x1, y1) {
        return Some((x0, y0, x1, y1));
    }

    let (dx, dy) = ((x1 - x0) as f64, (y1 - y0) as f64);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, (x0 - min_x) as f64),
        (dx, (max_x - x0) as f64),
        (-dy, (y0 - min_y) as f64),
        (dy, (max_y - y0) as f64),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| {
        let x = (x0 as f64 + t * dx).round() as i64;
        let y = (y0 as f64 + t * dy).round() as i64;
        (x.clamp(min_x, max_x), y.clamp(min_y, max_y))
    };
    let (cx0, cy0) = if inside(x0, y0) { (x0, y0) } else { at(t0) };
    let (cx1, cy1) = if inside(x1, y1) { (x1, y1) } else { at(t1) };
    Some((cx0, cy0, cx1, cy1))
}

/// Draw the outline of the axis-aligned rectangle spanned by two corners.
pub fn draw_rectangle_outline(
    buffer: &mut PixelBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    stroke: &Stroke,
) {
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));

    draw_line(buffer, left, top, right, top, stroke);
    draw_line(buffer, right, top, right, bottom, stroke);
    draw_line(buffer, right, bottom, left, bottom, stroke);
    draw_line(buffer, left, bottom, left, top, stroke);
}

/// Flood fill the 4-connected region of exactly matching pixels at `(x, y)`.
///
/// Returns the number of pixels recolored. Filling with the color already at
/// the seed, or from a seed outside the buffer, changes nothing.
///
/// With symmetry active the mirrored seed is filled as an independent second
/// fill once the first completes. The mirrored region is whatever is connected
/// to the mirrored seed at that point, not a reflection of the first region.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    x: i32,
    y: i32,
    fill: Rgba<u8>,
    symmetry: Symmetry,
) -> usize {
    flood_fill_from(buffer, x, y, fill, symmetry, false)
}

fn flood_fill_from(
    buffer: &mut PixelBuffer,
    x: i32,
    y: i32,
    fill: Rgba<u8>,
    symmetry: Symmetry,
    is_mirror_call: bool,
) -> usize {
    let mut filled = 0;

    if let Some(original) = buffer.get(x, y) {
        if original != fill {
            // Iterative DFS; recoloring doubles as the visited marker
            let mut stack = vec![(x, y)];
            while let Some((cx, cy)) = stack.pop() {
                if buffer.get(cx, cy) != Some(original) {
                    continue;
                }
                buffer.set(cx, cy, fill);
                filled += 1;
                stack.push((cx + 1, cy));
                stack.push((cx - 1, cy));
                stack.push((cx, cy + 1));
                stack.push((cx, cy - 1));
            }
        }
    }

    if !is_mirror_call {
        if let Some((mx, my)) = symmetry.mirror(x, y, buffer.width(), buffer.height()) {
            if (mx, my) != (x, y) {
                filled += flood_fill_from(buffer, mx, my, fill, symmetry, true);
            }
        }
    }

    filled
}

/// Recolor every pixel exactly matching `target`, connected or not.
///
/// Returns the number of pixels changed.
pub fn replace_color(buffer: &mut PixelBuffer, target: Rgba<u8>, replacement: Rgba<u8>) -> usize {
    if target == replacement {
        return 0;
    }

    let mut replaced = 0;
    for y in 0..buffer.height() as i32 {
        for x in 0..buffer.width() as i32 {
            if buffer.get(x, y) == Some(target) {
                buffer.set(x, y, replacement);
                replaced += 1;
            }
        }
    }
    replaced
}
