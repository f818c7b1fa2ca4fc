//! Drawing tools and the pointer gesture state machine.
//!
//! A gesture is pointer-down, any number of pointer-moves, then pointer-up,
//! processed synchronously. Pixels change immediately on every step; the
//! document records one history entry when the gesture ends, and none when
//! the gesture changed nothing.

use image::Rgba;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::buffer::PixelBuffer;
use crate::document::Document;
use crate::layer::LayerId;
use crate::raster::{
    draw_line, draw_pixel, draw_rectangle_outline, flood_fill, replace_color, PaintMode, Stroke,
    Symmetry,
};

pub const DEFAULT_LIGHTEN_AMOUNT: f32 = 0.1;
pub const DEFAULT_DARKEN_AMOUNT: f32 = 0.1;

/// The active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Lighten,
    Darken,
    Line,
    Rectangle,
    Fill,
    ReplaceColor,
    Move,
    /// Eyedropper; samples the flattened frame
    Picker,
}

impl Tool {
    /// Whether the tool paints freehand along the pointer path.
    pub fn is_brush(self) -> bool {
        matches!(self, Tool::Pencil | Tool::Eraser | Tool::Lighten | Tool::Darken)
    }
}

/// Tool selection and brush parameters shared by all gestures.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: Tool,
    pub color: Rgba<u8>,
    pub brush_size: u32,
    pub symmetry: Symmetry,
    pub lighten_amount: f32,
    pub darken_amount: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            color: Rgba([0, 0, 0, 255]),
            brush_size: 1,
            symmetry: Symmetry::None,
            lighten_amount: DEFAULT_LIGHTEN_AMOUNT,
            darken_amount: DEFAULT_DARKEN_AMOUNT,
        }
    }
}

impl ToolSettings {
    /// The stroke the current tool paints with.
    pub fn stroke(&self) -> Stroke {
        let mode = match self.tool {
            Tool::Eraser => PaintMode::Erase,
            Tool::Lighten => PaintMode::Lighten(self.lighten_amount),
            Tool::Darken => PaintMode::Darken(self.darken_amount),
            _ => PaintMode::Replace,
        };
        Stroke::new(self.color)
            .with_size(self.brush_size.max(1))
            .with_mode(mode)
            .with_symmetry(self.symmetry)
    }
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    tool: Tool,
    layer: LayerId,
    origin: (i32, i32),
    last: (i32, i32),
    /// Layer pixels at pointer-down, for shape previews and change detection
    before: PixelBuffer,
    /// Layer offset at pointer-down, for the move tool
    start_offset: (i32, i32),
}

/// Tracks the gesture in progress, if any.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    active: Option<ActiveGesture>,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin a gesture with the current tool at `(x, y)`.
    ///
    /// A gesture still in progress is finished first at its last position.
    pub fn pointer_down(
        &mut self,
        doc: &mut Document,
        settings: &mut ToolSettings,
        x: i32,
        y: i32,
    ) {
        self.finish(doc, settings);
        trace!(tool = ?settings.tool, x, y, "pointer down");

        let layer = doc.current_layer();
        let gesture = ActiveGesture {
            tool: settings.tool,
            layer: layer.id(),
            origin: (x, y),
            last: (x, y),
            before: layer.buffer().clone(),
            start_offset: layer.offset(),
        };

        let stroke = settings.stroke();
        if let Some(buffer) = target(doc, gesture.layer) {
            match gesture.tool {
                Tool::Pencil | Tool::Eraser | Tool::Lighten | Tool::Darken | Tool::Line => {
                    draw_pixel(buffer, x, y, &stroke);
                }
                Tool::Rectangle => draw_rectangle_outline(buffer, x, y, x, y, &stroke),
                Tool::Fill => {
                    flood_fill(buffer, x, y, settings.color, settings.symmetry);
                }
                Tool::ReplaceColor => {
                    if let Some(found) = buffer.get(x, y) {
                        replace_color(buffer, found, settings.color);
                    }
                }
                Tool::Picker | Tool::Move => {}
            }
        }
        if gesture.tool == Tool::Picker {
            pick(doc, settings, x, y);
        }
        self.active = Some(gesture);
    }

    /// Continue the gesture at `(x, y)`. Ignored when no gesture is active.
    ///
    /// The gesture keeps drawing into the layer it started on. If that layer
    /// is no longer in the current frame the gesture is dropped unrecorded.
    pub fn pointer_move(
        &mut self,
        doc: &mut Document,
        settings: &mut ToolSettings,
        x: i32,
        y: i32,
    ) {
        let Some(gesture) = self.active.as_mut() else {
            return;
        };
        if gesture.last == (x, y) {
            return;
        }
        if doc.layer(gesture.layer).is_none() {
            debug!(layer = %gesture.layer, "gesture layer left the current frame, dropping");
            self.active = None;
            return;
        }
        trace!(tool = ?gesture.tool, x, y, "pointer move");

        let stroke = settings.stroke();
        let (ox, oy) = gesture.origin;
        let (lx, ly) = gesture.last;
        match gesture.tool {
            Tool::Pencil | Tool::Eraser | Tool::Lighten | Tool::Darken => {
                if let Some(buffer) = target(doc, gesture.layer) {
                    draw_line(buffer, lx, ly, x, y, &stroke);
                }
            }
            Tool::Line => {
                if let Some(buffer) = target(doc, gesture.layer) {
                    buffer.clone_from(&gesture.before);
                    draw_line(buffer, ox, oy, x, y, &stroke);
                }
            }
            Tool::Rectangle => {
                if let Some(buffer) = target(doc, gesture.layer) {
                    buffer.clone_from(&gesture.before);
                    draw_rectangle_outline(buffer, ox, oy, x, y, &stroke);
                }
            }
            Tool::Move => {
                let (sx, sy) = gesture.start_offset;
                let dx = sx.saturating_add(x.saturating_sub(ox));
                let dy = sy.saturating_add(y.saturating_sub(oy));
                doc.set_layer_offset(gesture.layer, dx, dy);
            }
            Tool::Picker => pick(doc, settings, x, y),
            Tool::Fill | Tool::ReplaceColor => {}
        }
        gesture.last = (x, y);
    }

    /// Finish the gesture at `(x, y)` and record it.
    ///
    /// Returns `true` when a history entry was recorded.
    pub fn pointer_up(
        &mut self,
        doc: &mut Document,
        settings: &mut ToolSettings,
        x: i32,
        y: i32,
    ) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.pointer_move(doc, settings, x, y);
        let Some(gesture) = self.active.take() else {
            return false;
        };
        trace!(tool = ?gesture.tool, x, y, "pointer up");

        match gesture.tool {
            Tool::Picker => false,
            Tool::Move => doc.commit_layer_offset(gesture.layer),
            _ => {
                let changed =
                    doc.layer(gesture.layer).is_some_and(|l| l.buffer() != &gesture.before);
                if changed {
                    doc.commit();
                }
                changed
            }
        }
    }

    /// End any gesture in progress where the pointer last was.
    ///
    /// Returns `true` when a history entry was recorded.
    pub fn finish(&mut self, doc: &mut Document, settings: &mut ToolSettings) -> bool {
        match self.active.as_ref().map(|g| g.last) {
            Some((x, y)) => self.pointer_up(doc, settings, x, y),
            None => false,
        }
    }
}

/// The pixels of the gesture's layer, when it is still in the current frame.
fn target(doc: &mut Document, layer: LayerId) -> Option<&mut PixelBuffer> {
    doc.layer_mut(layer).map(|l| l.buffer_mut())
}

/// Sample the flattened frame into the tool color. Transparent pixels are skipped.
fn pick(doc: &Document, settings: &mut ToolSettings, x: i32, y: i32) {
    if let Some(color) = doc.flatten_current().get(x, y) {
        if color[3] > 0 {
            settings.color = color;
        }
    }
}
