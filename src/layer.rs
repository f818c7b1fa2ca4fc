//! Layers: named pixel buffers with compositing properties

use std::fmt;

use crate::buffer::PixelBuffer;
use crate::composition::blend::BlendMode;

/// Stable identity of a layer within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// A pixel buffer plus the properties that control how it composites.
///
/// `offset` is a translation applied only while compositing; it is baked into
/// the buffer when a move is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    id: LayerId,
    name: String,
    buffer: PixelBuffer,
    visible: bool,
    opacity: f32,
    blend_mode: BlendMode,
    offset: (i32, i32),
}

impl Layer {
    /// A blank, fully transparent layer.
    pub fn new(id: LayerId, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::from_buffer(id, name, PixelBuffer::new(width, height))
    }

    pub fn from_buffer(id: LayerId, name: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            id,
            name: name.into(),
            buffer,
            visible: true,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            offset: (0, 0),
        }
    }

    /// A deep copy under a new identity, named "<name> copy".
    pub fn duplicate(&self, id: LayerId) -> Self {
        Self { id, name: format!("{} copy", self.name), ..self.clone() }
    }

    /// A deep copy under a new identity, keeping the name.
    pub(crate) fn with_id(&self, id: LayerId) -> Self {
        Self { id, ..self.clone() }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to `[0, 1]`. NaN becomes fully opaque.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn set_offset(&mut self, dx: i32, dy: i32) {
        self.offset = (dx, dy);
    }

    /// Bake the current offset into the buffer and reset it.
    ///
    /// Returns `false` when there was no offset to apply.
    pub fn commit_offset(&mut self) -> bool {
        let (dx, dy) = self.offset;
        if (dx, dy) == (0, 0) {
            return false;
        }
        self.buffer = self.buffer.translated(dx, dy);
        self.offset = (0, 0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_new_layer_defaults() {
        let layer = Layer::new(LayerId(1), "Layer 1", 4, 3);
        assert!(layer.is_visible());
        assert_eq!(layer.opacity(), 1.0);
        assert_eq!(layer.blend_mode(), BlendMode::Normal);
        assert_eq!(layer.offset(), (0, 0));
        assert_eq!(layer.buffer().dimensions(), (4, 3));
    }

    #[test]
    fn test_opacity_clamped() {
        let mut layer = Layer::new(LayerId(1), "a", 1, 1);
        layer.set_opacity(1.5);
        assert_eq!(layer.opacity(), 1.0);
        layer.set_opacity(-0.5);
        assert_eq!(layer.opacity(), 0.0);
        layer.set_opacity(f32::NAN);
        assert_eq!(layer.opacity(), 1.0);
    }

    #[test]
    fn test_duplicate_is_deep_copy() {
        let mut layer = Layer::new(LayerId(1), "Ink", 2, 2);
        layer.buffer_mut().set(0, 0, Rgba([1, 2, 3, 255]));
        let mut copy = layer.duplicate(LayerId(2));
        assert_eq!(copy.id(), LayerId(2));
        assert_eq!(copy.name(), "Ink copy");
        copy.buffer_mut().set(0, 0, Rgba([9, 9, 9, 255]));
        assert_eq!(layer.buffer().get(0, 0), Some(Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_commit_offset_bakes_translation() {
        let red = Rgba([255, 0, 0, 255]);
        let mut layer = Layer::new(LayerId(1), "a", 3, 3);
        layer.buffer_mut().set(0, 0, red);
        layer.set_offset(2, 1);
        assert!(layer.commit_offset());
        assert_eq!(layer.offset(), (0, 0));
        assert_eq!(layer.buffer().get(2, 1), Some(red));
        assert_eq!(layer.buffer().get(0, 0), Some(Rgba([0, 0, 0, 0])));
        assert!(!layer.commit_offset());
    }

    #[test]
    fn test_display_id() {
        assert_eq!(LayerId(7).to_string(), "layer#7");
    }
}
