//! The editor facade.
//!
//! [`Editor`] owns one [`Document`] plus everything around it that is not
//! document state: the tool settings, the gesture in progress, the playback
//! timer, the palette panel and view options. Front ends talk to this type.

use std::time::Duration;

use image::Rgba;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::composition::{draw_pixel_grid, OnionConfig};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::gif::{self, GifOptions};
use crate::import::{decode_image, ImportError};
use crate::layer::LayerId;
use crate::output::{self, ExportScale, OutputError};
use crate::palette::{Palette, PaletteError, PalettePanel, PaletteSource};
use crate::quantize::extract_palette;
use crate::timeline::Playback;
use crate::tools::{GestureState, Tool, ToolSettings};

/// Display-only options; none of these change pixels in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub onion_skin: bool,
    pub onion: OnionConfig,
    pub show_grid: bool,
    pub grid_color: Rgba<u8>,
    /// Preview magnification used when the grid is shown
    pub zoom: u32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            onion_skin: true,
            onion: OnionConfig::default(),
            show_grid: false,
            grid_color: Rgba([0, 0, 0, 64]),
            zoom: 8,
        }
    }
}

#[derive(Debug)]
pub struct Editor {
    document: Document,
    settings: ToolSettings,
    gesture: GestureState,
    playback: Playback,
    palette: PalettePanel,
    view: ViewOptions,
    export_scale: ExportScale,
    gif_options: GifOptions,
    palette_size: usize,
}

impl Editor {
    /// A blank editor with default settings.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_document(Document::new(width, height), &EditorConfig::default())
    }

    /// A blank editor sized and configured from `config`.
    pub fn from_config(config: &EditorConfig) -> Self {
        let buffer = PixelBuffer::new(config.canvas.width, config.canvas.height);
        Self::with_document(Document::with_options(buffer, config.document_options()), config)
    }

    /// An editor over a source bitmap, configured from `config`.
    pub fn from_buffer(buffer: PixelBuffer, config: &EditorConfig) -> Self {
        Self::with_document(Document::with_options(buffer, config.document_options()), config)
    }

    /// Wrap an existing document, taking tool, view and export settings from `config`.
    pub fn with_document(document: Document, config: &EditorConfig) -> Self {
        Self {
            document,
            settings: config.tool_settings(),
            gesture: GestureState::new(),
            playback: Playback::new(config.animation.fps),
            palette: PalettePanel::new(),
            view: ViewOptions {
                onion_skin: config.animation.onion_skin,
                onion: config.onion_config(),
                ..ViewOptions::default()
            },
            export_scale: config.export_scale(),
            gif_options: config.gif_options(),
            palette_size: config.palette.colors,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access for structural edits (layers, frames).
    ///
    /// An open gesture is finished and recorded first.
    pub fn document_mut(&mut self) -> &mut Document {
        self.finish_gesture();
        &mut self.document
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.finish_gesture();
        self.settings.tool = tool;
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    pub fn palette(&self) -> &PalettePanel {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut PalettePanel {
        &mut self.palette
    }

    pub fn view(&self) -> &ViewOptions {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewOptions {
        &mut self.view
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, x: i32, y: i32) {
        self.gesture.pointer_down(&mut self.document, &mut self.settings, x, y);
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) {
        self.gesture.pointer_move(&mut self.document, &mut self.settings, x, y);
    }

    /// End the gesture; returns `true` when it was recorded in history.
    pub fn pointer_up(&mut self, x: i32, y: i32) -> bool {
        self.gesture.pointer_up(&mut self.document, &mut self.settings, x, y)
    }

    fn finish_gesture(&mut self) {
        if self.gesture.is_active() {
            debug!("finishing open gesture");
            self.gesture.finish(&mut self.document, &mut self.settings);
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        self.document.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        self.document.redo()
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    pub fn toggle_playback(&mut self) {
        self.finish_gesture();
        self.playback.toggle();
    }

    /// Advance playback by `elapsed`; returns `true` when the frame changed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let current = self.document.current_frame_index();
        let next = self.playback.advance(elapsed, current, self.document.frame_count());
        if next == current {
            return false;
        }
        self.finish_gesture();
        self.document.select_frame(next)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// The image to display: the current frame, with the onion skin while
    /// editing and the pixel grid when enabled.
    pub fn render_preview(&self) -> PixelBuffer {
        let show_onion = self.view.onion_skin && !self.playback.is_playing();
        let onion = show_onion.then_some(&self.view.onion);
        let frame = self.document.render_current(onion);
        if self.view.show_grid {
            draw_pixel_grid(&frame, self.view.zoom, self.view.grid_color)
        } else {
            frame
        }
    }

    // ------------------------------------------------------------------
    // Import and export
    // ------------------------------------------------------------------

    /// Decode an image and add it as a new layer on the current frame.
    ///
    /// Nothing changes when decoding fails.
    pub fn import_image(&mut self, name: &str, bytes: &[u8]) -> Result<LayerId, ImportError> {
        let image = decode_image(bytes)?;
        self.finish_gesture();
        Ok(self.document.import_layer(name, &image))
    }

    /// Export the current frame as PNG with the given scale.
    pub fn export_png(
        &self,
        scale: ExportScale,
        save: impl FnOnce(Vec<u8>),
    ) -> Result<(), OutputError> {
        output::export_png(&self.document.flatten_current(), scale, save)
    }

    /// Export the current frame as PNG at the configured scale.
    pub fn export_png_default(&self, save: impl FnOnce(Vec<u8>)) -> Result<(), OutputError> {
        self.export_png(self.export_scale, save)
    }

    /// Export every frame as one animated GIF.
    pub fn export_gif(
        &self,
        options: &GifOptions,
        save: impl FnOnce(Vec<u8>),
    ) -> Result<(), OutputError> {
        gif::export_gif(&self.document, options, save)
    }

    /// Export an animated GIF with the configured rate, scale and looping.
    pub fn export_gif_default(&self, save: impl FnOnce(Vec<u8>)) -> Result<(), OutputError> {
        self.export_gif(&self.gif_options, save)
    }

    // ------------------------------------------------------------------
    // Palettes
    // ------------------------------------------------------------------

    /// Run median-cut over the current frame and show the result.
    pub fn extract_palette(&mut self) -> &Palette {
        self.extract_palette_with(self.palette_size)
    }

    pub fn extract_palette_with(&mut self, max_colors: usize) -> &Palette {
        let colors = extract_palette(&self.document.flatten_current(), max_colors);
        self.palette.set_colors(Palette::from_hex(colors));
        self.palette.colors()
    }

    /// Ask an external source for a themed palette.
    ///
    /// On failure the previously shown colors are kept.
    pub fn request_palette(
        &mut self,
        source: &mut dyn PaletteSource,
        theme: &str,
    ) -> Result<&Palette, PaletteError> {
        self.palette.request(source, theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Symmetry;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_from_config() {
        let config: EditorConfig =
            toml::from_str("[canvas]\nwidth = 10\nheight = 6\n\n[brush]\nsymmetry = \"vertical\"")
                .unwrap();
        let editor = Editor::from_config(&config);
        assert_eq!((editor.document().width(), editor.document().height()), (10, 6));
        assert_eq!(editor.settings().symmetry, Symmetry::Vertical);
        assert_eq!(editor.playback().fps(), 8);
    }

    #[test]
    fn test_draw_then_undo_redo() {
        let mut editor = Editor::new(4, 4);
        editor.settings_mut().color = RED;
        editor.pointer_down(0, 0);
        editor.pointer_move(3, 0);
        assert!(editor.pointer_up(3, 0));

        assert_eq!(editor.render_preview().get(3, 0), Some(RED));
        assert!(editor.undo());
        assert_eq!(editor.render_preview().get(3, 0), Some(Rgba([0, 0, 0, 0])));
        assert!(editor.redo());
        assert_eq!(editor.render_preview().get(3, 0), Some(RED));
    }

    #[test]
    fn test_structural_edit_mid_gesture_finishes_it_first() {
        let mut editor = Editor::new(4, 4);
        editor.set_tool(Tool::Line);
        editor.settings_mut().color = RED;
        let first = editor.document().current_layer_id();

        editor.pointer_down(0, 0);
        editor.pointer_move(3, 0);
        let second = editor.document_mut().add_layer();
        assert_eq!(editor.document().history_len(), 3);

        // The gesture ended with the structural edit
        editor.pointer_move(0, 3);
        assert!(!editor.pointer_up(0, 3));
        assert_eq!(editor.document().history_len(), 3);

        let doc = editor.document();
        let line = doc.layer(first).unwrap().buffer();
        for x in 0..=3 {
            assert_eq!(line.get(x, 0), Some(RED));
        }
        assert_eq!(line.get(0, 3), Some(Rgba([0, 0, 0, 0])));
        let added = doc.layer(second).unwrap().buffer();
        assert!(added.image().pixels().all(|p| p[3] == 0));

        // One undo removes the layer, the next the line
        editor.undo();
        assert!(editor.document().layer(second).is_none());
        editor.undo();
        let restored = editor.document().layer(first).unwrap().buffer();
        assert_eq!(restored.get(3, 0), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_undo_mid_gesture_finishes_it_first() {
        let mut editor = Editor::new(4, 4);
        editor.settings_mut().color = RED;
        editor.pointer_down(1, 1);
        assert!(editor.undo());
        assert_eq!(editor.document().current_layer().buffer().get(1, 1), Some(Rgba([0, 0, 0, 0])));
        assert!(editor.redo());
        assert_eq!(editor.document().current_layer().buffer().get(1, 1), Some(RED));
    }

    #[test]
    fn test_tick_cycles_frames() {
        let mut editor = Editor::new(2, 2);
        editor.document_mut().add_frame();
        editor.document_mut().select_frame(0);
        editor.playback_mut().set_fps(10);

        assert!(!editor.tick(Duration::from_millis(500)));
        editor.toggle_playback();
        assert!(editor.tick(Duration::from_millis(100)));
        assert_eq!(editor.document().current_frame_index(), 1);
        assert!(editor.tick(Duration::from_millis(100)));
        assert_eq!(editor.document().current_frame_index(), 0);
        editor.toggle_playback();
        assert!(!editor.tick(Duration::from_millis(100)));
        assert_eq!(editor.document().current_frame_index(), 0);
    }

    #[test]
    fn test_onion_skin_only_while_editing() {
        let config = EditorConfig::default();
        let mut editor = Editor::from_buffer(PixelBuffer::filled(2, 2, BLUE), &config);
        editor.document_mut().add_frame();
        assert!(editor.render_preview().get(0, 0).unwrap()[3] > 0);

        editor.view_mut().onion_skin = false;
        assert_eq!(editor.render_preview().get(0, 0), Some(Rgba([0, 0, 0, 0])));

        editor.view_mut().onion_skin = true;
        editor.toggle_playback();
        assert_eq!(editor.render_preview().get(0, 0), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_grid_preview_is_zoomed() {
        let mut editor = Editor::new(3, 2);
        editor.view_mut().show_grid = true;
        editor.view_mut().zoom = 4;
        assert_eq!(editor.render_preview().dimensions(), (12, 8));
    }

    #[test]
    fn test_import_image_failure_changes_nothing() {
        let mut editor = Editor::new(2, 2);
        assert!(editor.import_image("bad", b"nope").is_err());
        assert_eq!(editor.document().current_frame().layers().len(), 1);
        assert_eq!(editor.document().history_len(), 1);
    }

    #[test]
    fn test_export_png_scaled() {
        let editor = Editor::from_buffer(PixelBuffer::filled(2, 2, RED), &EditorConfig::default());
        let mut saved = None;
        editor.export_png(ExportScale::X8, |bytes| saved = Some(bytes)).unwrap();
        let decoded = image::load_from_memory(&saved.unwrap()).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (16, 16));
        assert!(decoded.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_extract_palette_shows_colors() {
        let mut buffer = PixelBuffer::filled(2, 2, RED);
        buffer.set(1, 1, BLUE);
        let mut editor = Editor::from_buffer(buffer, &EditorConfig::default());
        let palette = editor.extract_palette().clone();
        assert_eq!(palette.len(), 2);
        assert!(palette.colors().contains(&"#FF0000".to_string()));
        assert!(palette.colors().contains(&"#0000FF".to_string()));
        assert_eq!(editor.palette().colors(), &palette);

        editor.palette_mut().set_colors(Palette::default());
        assert!(editor.palette().colors().is_empty());
    }
}
