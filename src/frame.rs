//! Frames: ordered layer stacks, one per animation step

use std::fmt;

use crate::composition::render::draw_layer;
use crate::layer::{Layer, LayerId};

/// Display time used for frames created without an explicit duration.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Stable identity of a frame within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// One still image of the animation: layers ordered bottom to top.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    id: FrameId,
    layers: Vec<Layer>,
    duration_ms: u32,
}

impl Frame {
    pub fn new(id: FrameId, layers: Vec<Layer>, duration_ms: u32) -> Self {
        Self { id, layers, duration_ms }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Layers, first = bottom.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut Vec<Layer> {
        &mut self.layers
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn set_duration_ms(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    /// The topmost layer, if the frame has any.
    pub fn top_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }

    /// Deep copy with a new frame id and fresh layer ids from `next_id`.
    pub(crate) fn duplicate(&self, id: FrameId, mut next_id: impl FnMut() -> LayerId) -> Frame {
        Frame {
            id,
            layers: self.layers.iter().map(|l| l.with_id(next_id())).collect(),
            duration_ms: self.duration_ms,
        }
    }

    /// Composite the layer at `index` into the one below it and remove it.
    ///
    /// The merged result keeps the lower layer's identity and properties. The
    /// upper layer's visibility is ignored: merging bakes its pixels as they
    /// would appear if shown.
    pub(crate) fn merge_down(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.layers.len() {
            return false;
        }
        let upper = self.layers.remove(index);
        draw_layer(self.layers[index - 1].buffer_mut(), &upper);
        true
    }
}
