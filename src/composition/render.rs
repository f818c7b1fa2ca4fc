//! Frame flattening

use crate::buffer::{BlitOp, PixelBuffer};
use crate::composition::overlay::{draw_onion_underlay, OnionConfig};
use crate::frame::Frame;
use crate::layer::Layer;

/// Draw one layer onto `canvas` with its blend mode, opacity and offset.
///
/// Visibility is not checked here; callers decide which layers take part.
pub fn draw_layer(canvas: &mut PixelBuffer, layer: &Layer) {
    let (dx, dy) = layer.offset();
    let op = BlitOp::Blend { mode: layer.blend_mode(), opacity: layer.opacity() };
    canvas.blit(layer.buffer(), dx, dy, op);
}

/// Flatten a frame's visible layers, bottom to top, into a new buffer.
///
/// The result is a fresh buffer; no layer is modified.
///
/// # Examples
///
/// ```
/// use pxed::document::Document;
/// use pxed::composition::flatten_frame;
///
/// let doc = Document::new(4, 4);
/// let flat = flatten_frame(doc.current_frame(), doc.width(), doc.height());
/// assert_eq!(flat.dimensions(), (4, 4));
/// ```
pub fn flatten_frame(frame: &Frame, width: u32, height: u32) -> PixelBuffer {
    let mut canvas = PixelBuffer::new(width, height);
    draw_frame(&mut canvas, frame);
    canvas
}

/// Flatten a frame on top of an onion-skin rendering of `previous`.
///
/// With no previous frame this is the same as [`flatten_frame`].
#[tracing::instrument(level = "trace", skip_all, fields(frame = %frame.id()))]
pub fn render_frame(
    frame: &Frame,
    previous: Option<&Frame>,
    width: u32,
    height: u32,
    onion: &OnionConfig,
) -> PixelBuffer {
    let mut canvas = PixelBuffer::new(width, height);
    if let Some(previous) = previous {
        let ghost = flatten_frame(previous, width, height);
        draw_onion_underlay(&mut canvas, &ghost, onion);
    }
    draw_frame(&mut canvas, frame);
    canvas
}

fn draw_frame(canvas: &mut PixelBuffer, frame: &Frame) {
    for layer in frame.layers().iter().filter(|l| l.is_visible()) {
        draw_layer(canvas, layer);
    }
}
