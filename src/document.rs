//! The editable document: frames, selection and history.
//!
//! Structural invariants hold after every public call:
//! - there is at least one frame, and every frame has at least one layer
//! - the current frame index is in range
//! - the current layer id resolves inside the current frame
//! - every layer buffer has the document's dimensions
//!
//! Operations that would break an invariant are rejected as no-ops (they
//! return `false` or `None`) and logged at debug level. Every accepted edit
//! records one history snapshot of the whole document; selection changes and
//! transient layer offsets are not recorded.

use std::collections::HashSet;

use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::composition::{flatten_frame, render_frame, BlendMode, OnionConfig};
use crate::frame::{Frame, FrameId, DEFAULT_FRAME_DURATION_MS};
use crate::history::History;
use crate::import::fit_to_canvas;
use crate::layer::{Layer, LayerId};

/// Construction options for a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Maximum undo entries kept; 0 means unbounded
    pub history_limit: usize,
    /// Duration given to newly created frames
    pub frame_duration_ms: u32,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self { history_limit: 0, frame_duration_ms: DEFAULT_FRAME_DURATION_MS }
    }
}

/// Everything a history snapshot restores.
#[derive(Debug, Clone, PartialEq)]
struct DocumentState {
    frames: Vec<Frame>,
    current_frame: usize,
    current_layer: LayerId,
}

/// A layered, multi-frame pixel document.
#[derive(Debug, Clone)]
pub struct Document {
    width: u32,
    height: u32,
    state: DocumentState,
    history: History<DocumentState>,
    next_id: u64,
    frame_duration_ms: u32,
}

impl Document {
    /// A blank, transparent document with one frame holding one layer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_buffer(PixelBuffer::new(width, height))
    }

    /// A document whose single layer starts with `buffer`'s pixels.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self::with_options(buffer, DocumentOptions::default())
    }

    pub fn with_options(buffer: PixelBuffer, options: DocumentOptions) -> Self {
        let (width, height) = buffer.dimensions();
        let layer = Layer::from_buffer(LayerId(1), "Layer 1", buffer);
        let frame = Frame::new(FrameId(2), vec![layer], options.frame_duration_ms);
        let state =
            DocumentState { frames: vec![frame], current_frame: 0, current_layer: LayerId(1) };

        Self {
            width,
            height,
            history: History::with_limit(state.clone(), options.history_limit),
            state,
            next_id: 3,
            frame_duration_ms: options.frame_duration_ms,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frames(&self) -> &[Frame] {
        &self.state.frames
    }

    pub fn frame_count(&self) -> usize {
        self.state.frames.len()
    }

    pub fn current_frame_index(&self) -> usize {
        self.state.current_frame
    }

    pub fn current_frame(&self) -> &Frame {
        &self.state.frames[self.state.current_frame]
    }

    pub fn current_layer_id(&self) -> LayerId {
        self.state.current_layer
    }

    pub fn current_layer(&self) -> &Layer {
        let id = self.state.current_layer;
        // The selection invariant guarantees the lookup succeeds
        match self.current_frame().layer(id) {
            Some(layer) => layer,
            None => &self.current_frame().layers()[0],
        }
    }

    /// Mutable access to the active layer for in-progress tool gestures.
    ///
    /// Changes made here are not recorded until [`Document::commit`].
    pub fn current_layer_mut(&mut self) -> &mut Layer {
        let id = self.state.current_layer;
        let frame = &mut self.state.frames[self.state.current_frame];
        let index = frame.index_of(id).unwrap_or(0);
        &mut frame.layers_mut()[index]
    }

    /// A layer of the current frame by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.current_frame().layer(id)
    }

    /// Mutable access to a layer of the current frame, unrecorded like
    /// [`Document::current_layer_mut`].
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.current_frame_mut().layer_mut(id)
    }

    // ------------------------------------------------------------------
    // Selection (not recorded)
    // ------------------------------------------------------------------

    pub fn select_layer(&mut self, id: LayerId) -> bool {
        if !self.current_frame().contains(id) {
            debug!(%id, "select_layer rejected: not in current frame");
            return false;
        }
        self.state.current_layer = id;
        true
    }

    /// Switch frames, keeping the same layer position where possible.
    pub fn select_frame(&mut self, index: usize) -> bool {
        if index >= self.frame_count() {
            debug!(index, "select_frame rejected: out of range");
            return false;
        }
        let position = self.current_frame().index_of(self.state.current_layer).unwrap_or(0);
        self.state.current_frame = index;
        let layers = self.current_frame().layers();
        self.state.current_layer = layers[position.min(layers.len() - 1)].id();
        true
    }

    // ------------------------------------------------------------------
    // Layer operations
    // ------------------------------------------------------------------

    /// Add a blank layer directly above the current one and select it.
    pub fn add_layer(&mut self) -> LayerId {
        let buffer = PixelBuffer::new(self.width, self.height);
        let name = format!("Layer {}", self.current_frame().layers().len() + 1);
        self.insert_layer_above_current(name, buffer)
    }

    /// Add a layer holding `buffer` above the current one and select it.
    ///
    /// Rejected when the buffer size differs from the document's.
    pub fn add_layer_from_buffer(
        &mut self,
        name: impl Into<String>,
        buffer: PixelBuffer,
    ) -> Option<LayerId> {
        if buffer.dimensions() != (self.width, self.height) {
            debug!(
                got = ?buffer.dimensions(),
                expected = ?(self.width, self.height),
                "add_layer_from_buffer rejected: size mismatch"
            );
            return None;
        }
        Some(self.insert_layer_above_current(name.into(), buffer))
    }

    /// Add an imported image as a new layer, resampled to the canvas size.
    pub fn import_layer(&mut self, name: impl Into<String>, image: &PixelBuffer) -> LayerId {
        let fitted = fit_to_canvas(image, self.width, self.height);
        self.insert_layer_above_current(name.into(), fitted)
    }

    fn insert_layer_above_current(&mut self, name: String, buffer: PixelBuffer) -> LayerId {
        let id = self.alloc_layer_id();
        let current = self.state.current_layer;
        let frame = self.current_frame_mut();
        let index = frame.index_of(current).map_or(frame.layers().len(), |i| i + 1);
        frame.layers_mut().insert(index, Layer::from_buffer(id, name, buffer));
        self.state.current_layer = id;
        self.record();
        id
    }

    /// Copy a layer of the current frame directly above itself and select the copy.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let Some(index) = self.current_frame().index_of(id) else {
            debug!(%id, "duplicate_layer rejected: not in current frame");
            return None;
        };
        let new_id = self.alloc_layer_id();
        let frame = self.current_frame_mut();
        let copy = frame.layers()[index].duplicate(new_id);
        frame.layers_mut().insert(index + 1, copy);
        self.state.current_layer = new_id;
        self.record();
        Some(new_id)
    }

    /// Remove a layer. The last layer of a frame cannot be deleted.
    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        let Some(index) = self.current_frame().index_of(id) else {
            debug!(%id, "delete_layer rejected: not in current frame");
            return false;
        };
        if self.current_frame().layers().len() <= 1 {
            debug!(%id, "delete_layer rejected: last layer in frame");
            return false;
        }

        let frame = self.current_frame_mut();
        frame.layers_mut().remove(index);
        if self.state.current_layer == id {
            let layers = self.current_frame().layers();
            self.state.current_layer = layers[index.saturating_sub(1).min(layers.len() - 1)].id();
        }
        self.record();
        true
    }

    /// Composite a layer into the one below it and remove it.
    pub fn merge_down(&mut self, id: LayerId) -> bool {
        let Some(index) = self.current_frame().index_of(id) else {
            debug!(%id, "merge_down rejected: not in current frame");
            return false;
        };
        if !self.current_frame_mut().merge_down(index) {
            debug!(%id, "merge_down rejected: no layer below");
            return false;
        }
        if self.state.current_layer == id {
            self.state.current_layer = self.current_frame().layers()[index - 1].id();
        }
        self.record();
        true
    }

    /// Move a layer one step toward the top of the stack.
    pub fn move_layer_up(&mut self, id: LayerId) -> bool {
        let count = self.current_frame().layers().len();
        match self.current_frame().index_of(id) {
            Some(index) if index + 1 < count => {
                self.current_frame_mut().layers_mut().swap(index, index + 1);
                self.record();
                true
            }
            _ => {
                debug!(%id, "move_layer_up rejected");
                false
            }
        }
    }

    /// Move a layer one step toward the bottom of the stack.
    pub fn move_layer_down(&mut self, id: LayerId) -> bool {
        match self.current_frame().index_of(id) {
            Some(index) if index > 0 => {
                self.current_frame_mut().layers_mut().swap(index, index - 1);
                self.record();
                true
            }
            _ => {
                debug!(%id, "move_layer_down rejected");
                false
            }
        }
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.edit_layer(id, "rename_layer", |layer| layer.set_name(name))
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        self.edit_layer(id, "set_layer_visible", |layer| layer.set_visible(visible))
    }

    /// Set a layer's opacity, clamped to `[0, 1]`.
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        self.edit_layer(id, "set_layer_opacity", |layer| layer.set_opacity(opacity))
    }

    pub fn set_layer_blend_mode(&mut self, id: LayerId, mode: BlendMode) -> bool {
        self.edit_layer(id, "set_layer_blend_mode", |layer| layer.set_blend_mode(mode))
    }

    /// Set a layer's composite-time translation. Not recorded.
    pub fn set_layer_offset(&mut self, id: LayerId, dx: i32, dy: i32) -> bool {
        match self.current_frame_mut().layer_mut(id) {
            Some(layer) => {
                layer.set_offset(dx, dy);
                true
            }
            None => {
                debug!(%id, "set_layer_offset rejected: not in current frame");
                false
            }
        }
    }

    /// Bake a layer's offset into its pixels and record the move.
    pub fn commit_layer_offset(&mut self, id: LayerId) -> bool {
        let committed = match self.current_frame_mut().layer_mut(id) {
            Some(layer) => layer.commit_offset(),
            None => false,
        };
        if committed {
            self.record();
        }
        committed
    }

    fn edit_layer(&mut self, id: LayerId, op: &str, edit: impl FnOnce(&mut Layer)) -> bool {
        match self.current_frame_mut().layer_mut(id) {
            Some(layer) => {
                edit(layer);
                self.record();
                true
            }
            None => {
                debug!(%id, op, "layer edit rejected: not in current frame");
                false
            }
        }
    }

    /// Replace the layer list of a frame.
    ///
    /// Rejected when the list is empty, reuses a layer id (within the list or
    /// from another frame), or holds a buffer of the wrong size.
    pub fn replace_layers(&mut self, frame_index: usize, layers: Vec<Layer>) -> bool {
        if frame_index >= self.frame_count() {
            debug!(frame_index, "replace_layers rejected: no such frame");
            return false;
        }
        let mut taken: HashSet<LayerId> = self
            .state
            .frames
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != frame_index)
            .flat_map(|(_, f)| f.layers().iter().map(Layer::id))
            .collect();
        if !self.layers_valid(&layers, &mut taken) {
            debug!(frame_index, "replace_layers rejected");
            return false;
        }
        self.reserve_ids(layers.iter().map(|l| l.id().0));
        *self.state.frames[frame_index].layers_mut() = layers;
        self.repair_selection();
        self.record();
        true
    }

    /// Checks a layer list, adding its ids to `taken`. Ids already in `taken`
    /// fail the check.
    fn layers_valid(&self, layers: &[Layer], taken: &mut HashSet<LayerId>) -> bool {
        !layers.is_empty()
            && layers.iter().all(|l| {
                taken.insert(l.id()) && l.buffer().dimensions() == (self.width, self.height)
            })
    }

    // ------------------------------------------------------------------
    // Frame operations
    // ------------------------------------------------------------------

    /// Insert a frame with one blank layer after the current one and select it.
    pub fn add_frame(&mut self) -> FrameId {
        let frame_id = self.alloc_frame_id();
        let layer_id = self.alloc_layer_id();
        let layer = Layer::new(layer_id, "Layer 1", self.width, self.height);
        let frame = Frame::new(frame_id, vec![layer], self.frame_duration_ms);

        let index = self.state.current_frame + 1;
        self.state.frames.insert(index, frame);
        self.state.current_frame = index;
        self.state.current_layer = layer_id;
        self.record();
        frame_id
    }

    /// Deep-copy a frame, insert the copy after it and select the copy.
    pub fn duplicate_frame(&mut self, index: usize) -> Option<FrameId> {
        if index >= self.frame_count() {
            debug!(index, "duplicate_frame rejected: out of range");
            return None;
        }
        let frame_id = self.alloc_frame_id();
        let mut next_id = self.next_id;
        let copy = self.state.frames[index].duplicate(frame_id, || {
            next_id += 1;
            LayerId(next_id - 1)
        });
        self.next_id = next_id;

        let position = self.state.frames[index].index_of(self.state.current_layer);
        self.state.frames.insert(index + 1, copy);
        self.state.current_frame = index + 1;
        let layers = self.current_frame().layers();
        self.state.current_layer = layers[position.unwrap_or(layers.len() - 1)].id();
        self.record();
        Some(frame_id)
    }

    /// Remove a frame. The only frame of a document cannot be deleted.
    pub fn delete_frame(&mut self, index: usize) -> bool {
        if index >= self.frame_count() {
            debug!(index, "delete_frame rejected: out of range");
            return false;
        }
        if self.frame_count() <= 1 {
            debug!(index, "delete_frame rejected: only frame");
            return false;
        }

        self.state.frames.remove(index);
        if self.state.current_frame > index || self.state.current_frame >= self.frame_count() {
            self.state.current_frame = self.state.current_frame.saturating_sub(1);
        }
        self.repair_selection();
        self.record();
        true
    }

    pub fn set_frame_duration(&mut self, index: usize, duration_ms: u32) -> bool {
        match self.state.frames.get_mut(index) {
            Some(frame) => {
                frame.set_duration_ms(duration_ms);
                self.record();
                true
            }
            None => {
                debug!(index, "set_frame_duration rejected: out of range");
                false
            }
        }
    }

    /// Replace the whole frame list.
    ///
    /// Rejected when the list is empty or any frame fails the layer checks of
    /// [`Document::replace_layers`]. Layer ids must be unique across all frames.
    pub fn replace_frames(&mut self, frames: Vec<Frame>) -> bool {
        let mut taken = HashSet::new();
        if frames.is_empty() || !frames.iter().all(|f| self.layers_valid(f.layers(), &mut taken)) {
            debug!("replace_frames rejected");
            return false;
        }
        self.reserve_ids(frames.iter().map(|f| f.id().0));
        self.reserve_ids(frames.iter().flat_map(|f| f.layers().iter().map(|l| l.id().0)));
        self.state.frames = frames;
        self.repair_selection();
        self.record();
        true
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Record the current state as one history entry.
    ///
    /// Tool gestures edit through [`Document::layer_mut`] and call this once
    /// when the gesture ends.
    pub fn commit(&mut self) {
        self.record();
    }

    fn record(&mut self) {
        self.history.record(self.state.clone());
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.state = snapshot.clone();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.state = snapshot.clone();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ------------------------------------------------------------------
    // Compositing
    // ------------------------------------------------------------------

    /// Flatten the frame at `index`.
    pub fn flatten(&self, index: usize) -> Option<PixelBuffer> {
        self.state.frames.get(index).map(|f| flatten_frame(f, self.width, self.height))
    }

    pub fn flatten_current(&self) -> PixelBuffer {
        flatten_frame(self.current_frame(), self.width, self.height)
    }

    /// Flatten the current frame, with the previous frame as an onion skin
    /// underlay when `onion` is given and this is not the first frame.
    pub fn render_current(&self, onion: Option<&OnionConfig>) -> PixelBuffer {
        let index = self.state.current_frame;
        match onion {
            Some(config) if index > 0 => render_frame(
                self.current_frame(),
                self.state.frames.get(index - 1),
                self.width,
                self.height,
                config,
            ),
            _ => self.flatten_current(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn current_frame_mut(&mut self) -> &mut Frame {
        &mut self.state.frames[self.state.current_frame]
    }

    fn alloc_layer_id(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id - 1)
    }

    fn alloc_frame_id(&mut self) -> FrameId {
        self.next_id += 1;
        FrameId(self.next_id - 1)
    }

    /// Keep freshly allocated ids clear of externally supplied ones.
    fn reserve_ids(&mut self, ids: impl Iterator<Item = u64>) {
        if let Some(max) = ids.max() {
            self.next_id = self.next_id.max(max + 1);
        }
    }

    fn repair_selection(&mut self) {
        self.state.current_frame = self.state.current_frame.min(self.frame_count() - 1);
        if !self.current_frame().contains(self.state.current_layer) {
            let top = self.current_frame().layers().len() - 1;
            self.state.current_layer = self.current_frame().layers()[top].id();
        }
    }
}
