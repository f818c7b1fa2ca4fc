//! End-to-end editing scenarios driven through the public `Editor` API
//!
//! Each test plays a short user session (gestures, layer edits, history,
//! playback, export) and checks the resulting pixels.

use std::collections::HashSet;
use std::time::Duration;

use image::Rgba;
use pxed::buffer::PixelBuffer;
use pxed::config::EditorConfig;
use pxed::editor::Editor;
use pxed::output::ExportScale;
use pxed::palette::{parse_palette_response, PaletteError, PalettePanel, PaletteSource};
use pxed::quantize::extract_palette;
use pxed::raster::Symmetry;
use pxed::tools::Tool;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn click(editor: &mut Editor, x: i32, y: i32) -> bool {
    editor.pointer_down(x, y);
    editor.pointer_up(x, y)
}

fn layer_pixels(editor: &Editor) -> PixelBuffer {
    editor.document().current_layer().buffer().clone()
}

// ============================================================================
// Raster scenarios
// ============================================================================

#[test]
fn test_fill_tool_on_empty_canvas() {
    let mut editor = Editor::new(4, 4);
    editor.set_tool(Tool::Fill);
    editor.settings_mut().color = RED;

    assert!(click(&mut editor, 1, 1));

    let pixels = layer_pixels(&editor);
    assert_eq!(pixels.dimensions(), (4, 4));
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(pixels.get(x, y), Some(RED), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_fill_with_existing_color_records_nothing() {
    let mut editor = Editor::new(4, 4);
    editor.set_tool(Tool::Fill);
    editor.settings_mut().color = CLEAR;
    let history_before = editor.document().history_len();

    assert!(!click(&mut editor, 0, 0));
    assert_eq!(editor.document().history_len(), history_before);
    assert!(!editor.document().can_undo());
}

#[test]
fn test_horizontal_symmetry_pencil() {
    let mut editor = Editor::new(5, 3);
    editor.settings_mut().color = BLUE;
    editor.settings_mut().symmetry = Symmetry::Horizontal;

    click(&mut editor, 1, 1);
    let pixels = layer_pixels(&editor);
    assert_eq!(pixels.get(1, 1), Some(BLUE));
    assert_eq!(pixels.get(3, 1), Some(BLUE));

    // The center column mirrors onto itself
    click(&mut editor, 2, 0);
    let pixels = layer_pixels(&editor);
    assert_eq!(pixels.get(2, 0), Some(BLUE));
    let painted = (0..5).filter(|&x| pixels.get(x, 0) == Some(BLUE)).count();
    assert_eq!(painted, 1);
}

#[test]
fn test_pencil_drag_is_one_history_entry() {
    let mut editor = Editor::new(8, 8);
    editor.settings_mut().color = RED;

    editor.pointer_down(0, 0);
    editor.pointer_move(3, 0);
    editor.pointer_move(3, 3);
    assert!(editor.pointer_up(3, 3));

    let pixels = layer_pixels(&editor);
    for i in 0..4 {
        assert_eq!(pixels.get(i, 0), Some(RED));
        assert_eq!(pixels.get(3, i), Some(RED));
    }

    assert!(editor.undo());
    assert_eq!(layer_pixels(&editor), PixelBuffer::new(8, 8));
    assert!(!editor.document().can_undo());
}

#[test]
fn test_line_tool_previews_against_start() {
    let mut editor = Editor::new(6, 6);
    editor.set_tool(Tool::Line);
    editor.settings_mut().color = RED;

    editor.pointer_down(0, 0);
    editor.pointer_move(5, 0);
    editor.pointer_move(0, 5);
    editor.pointer_up(0, 5);

    let pixels = layer_pixels(&editor);
    assert_eq!(pixels.get(0, 3), Some(RED));
    // The abandoned horizontal preview is gone
    assert_eq!(pixels.get(5, 0), Some(CLEAR));
}

// ============================================================================
// Layer scenarios
// ============================================================================

#[test]
fn test_merge_down_red_over_blue() {
    let mut editor =
        Editor::from_buffer(PixelBuffer::filled(3, 3, BLUE), &EditorConfig::default());
    let bottom = editor.document().current_layer_id();
    let top = editor.document_mut().add_layer();
    editor.document_mut().current_layer_mut().buffer_mut().fill(RED);
    editor.document_mut().commit();

    assert!(editor.document_mut().merge_down(top));

    let frame = editor.document().current_frame();
    assert_eq!(frame.layers().len(), 1);
    assert_eq!(frame.layers()[0].id(), bottom);
    assert_eq!(frame.layers()[0].buffer(), &PixelBuffer::filled(3, 3, RED));
    assert_eq!(editor.document().current_layer_id(), bottom);
}

#[test]
fn test_hidden_layer_not_flattened() {
    let mut editor =
        Editor::from_buffer(PixelBuffer::filled(2, 2, BLUE), &EditorConfig::default());
    let top = editor.document_mut().add_layer();
    editor.document_mut().current_layer_mut().buffer_mut().fill(RED);
    editor.document_mut().commit();

    assert_eq!(editor.document().flatten_current().get(0, 0), Some(RED));
    editor.document_mut().set_layer_visible(top, false);
    assert_eq!(editor.document().flatten_current().get(0, 0), Some(BLUE));

    assert!(editor.undo());
    assert_eq!(editor.document().flatten_current().get(0, 0), Some(RED));
}

#[test]
fn test_move_tool_bakes_offset() {
    let mut editor = Editor::new(4, 4);
    editor.settings_mut().color = RED;
    click(&mut editor, 0, 0);

    editor.set_tool(Tool::Move);
    editor.pointer_down(1, 1);
    editor.pointer_move(2, 2);
    assert!(editor.pointer_up(3, 2));

    let layer = editor.document().current_layer();
    assert_eq!(layer.offset(), (0, 0));
    assert_eq!(layer.buffer().get(2, 1), Some(RED));
    assert_eq!(layer.buffer().get(0, 0), Some(CLEAR));
}

#[test]
fn test_picker_sets_color_without_history() {
    let mut editor =
        Editor::from_buffer(PixelBuffer::filled(2, 2, BLUE), &EditorConfig::default());
    editor.set_tool(Tool::Picker);
    let history_before = editor.document().history_len();

    assert!(!click(&mut editor, 1, 1));
    assert_eq!(editor.settings().color, BLUE);
    assert_eq!(editor.document().history_len(), history_before);
}

// ============================================================================
// History scenarios
// ============================================================================

#[test]
fn test_undo_redo_restore_exact_bytes() {
    let mut editor = Editor::new(4, 4);
    editor.settings_mut().color = RED;
    let before = layer_pixels(&editor);

    click(&mut editor, 2, 2);
    let after = layer_pixels(&editor);
    assert_ne!(before, after);

    assert!(editor.undo());
    assert_eq!(layer_pixels(&editor).as_raw(), before.as_raw());
    assert!(editor.redo());
    assert_eq!(layer_pixels(&editor).as_raw(), after.as_raw());
}

#[test]
fn test_new_action_discards_redo() {
    let mut editor = Editor::new(4, 4);
    editor.settings_mut().color = RED;
    click(&mut editor, 0, 0);
    click(&mut editor, 1, 1);

    assert!(editor.undo());
    assert!(editor.document().can_redo());

    click(&mut editor, 3, 3);
    assert!(!editor.document().can_redo());
    assert!(!editor.redo());
    assert_eq!(layer_pixels(&editor).get(1, 1), Some(CLEAR));
}

#[test]
fn test_bounded_history_drops_oldest() {
    let config: EditorConfig =
        toml::from_str("[canvas]\nwidth = 4\nheight = 4\n\n[history]\nmax_entries = 2").unwrap();
    let mut editor = Editor::from_config(&config);
    editor.settings_mut().color = RED;
    for x in 0..4 {
        click(&mut editor, x, 0);
    }

    assert!(editor.undo());
    assert!(!editor.undo());
    let pixels = layer_pixels(&editor);
    assert_eq!(pixels.get(2, 0), Some(RED));
    assert_eq!(pixels.get(3, 0), Some(CLEAR));
}

// ============================================================================
// Animation scenarios
// ============================================================================

#[test]
fn test_playback_cycles_frames() {
    let mut editor = Editor::new(2, 2);
    editor.document_mut().add_frame();
    editor.document_mut().add_frame();
    editor.document_mut().select_frame(0);
    editor.playback_mut().set_fps(10);
    editor.toggle_playback();

    assert!(!editor.tick(Duration::from_millis(50)));
    assert!(editor.tick(Duration::from_millis(50)));
    assert_eq!(editor.document().current_frame_index(), 1);
    assert!(editor.tick(Duration::from_millis(200)));
    assert_eq!(editor.document().current_frame_index(), 0);

    editor.toggle_playback();
    assert!(!editor.tick(Duration::from_secs(1)));
}

#[test]
fn test_onion_skin_only_in_preview() {
    let mut editor =
        Editor::from_buffer(PixelBuffer::filled(2, 2, BLUE), &EditorConfig::default());
    editor.document_mut().add_frame();

    let preview = editor.render_preview();
    let flat = editor.document().flatten_current();
    assert_eq!(flat.get(0, 0), Some(CLEAR));
    assert_ne!(preview.get(0, 0), Some(CLEAR));

    editor.view_mut().onion_skin = false;
    assert_eq!(editor.render_preview(), flat);
}

#[test]
fn test_export_png_scaled_once() {
    let mut editor = Editor::new(3, 2);
    editor.settings_mut().color = RED;
    click(&mut editor, 0, 0);

    let mut saved = Vec::new();
    editor.export_png(ExportScale::X4, |bytes| saved.push(bytes)).unwrap();
    assert_eq!(saved.len(), 1);

    let image = image::load_from_memory(&saved[0]).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (12, 8));
    assert_eq!(*image.get_pixel(3, 3), RED);
    assert_eq!(*image.get_pixel(4, 0), CLEAR);
}

#[test]
fn test_import_image_as_layer() {
    let mut editor = Editor::new(4, 4);
    let mut encoded = Vec::new();
    image::RgbaImage::from_pixel(2, 2, BLUE)
        .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
        .unwrap();

    let id = editor.import_image("sprite", &encoded).unwrap();
    let layer = editor.document().layer(id).unwrap();
    assert_eq!(layer.name(), "sprite");
    assert_eq!(layer.buffer(), &PixelBuffer::filled(4, 4, BLUE));

    let layers = editor.document().current_frame().layers().len();
    assert!(editor.import_image("broken", b"not an image").is_err());
    assert_eq!(editor.document().current_frame().layers().len(), layers);
}

// ============================================================================
// Palette scenarios
// ============================================================================

struct CannedSource(Result<String, PaletteError>);

impl PaletteSource for CannedSource {
    fn request_palette(&mut self, _theme: &str) -> Result<Vec<String>, PaletteError> {
        let text = self.0.clone()?;
        Ok(parse_palette_response(&text)?.colors().to_vec())
    }
}

#[test]
fn test_quantizer_returns_exact_small_set() {
    let mut buffer = PixelBuffer::filled(4, 4, RED);
    buffer.set(0, 0, BLUE);
    buffer.set(1, 0, CLEAR);

    let palette: HashSet<String> = extract_palette(&buffer, 8).into_iter().collect();
    let expected: HashSet<String> = ["#FF0000", "#0000FF"].iter().map(|s| s.to_string()).collect();
    assert_eq!(palette, expected);

    assert!(extract_palette(&PixelBuffer::new(4, 4), 8).is_empty());
    assert_eq!(extract_palette(&PixelBuffer::filled(2, 2, RED), 1), vec!["#FF0000"]);
}

#[test]
fn test_requested_palette_replaces_extracted() {
    let mut editor =
        Editor::from_buffer(PixelBuffer::filled(2, 2, BLUE), &EditorConfig::default());
    assert_eq!(editor.extract_palette().colors(), ["#0000FF"]);

    let mut source = CannedSource(Ok(r##"["#112233", "#aabbcc"]"##.to_string()));
    let palette = editor.request_palette(&mut source, "ocean").unwrap();
    assert_eq!(palette.colors(), ["#112233", "#AABBCC"]);

    let mut failing = CannedSource(Err(PaletteError::Unavailable("offline".into())));
    assert!(editor.request_palette(&mut failing, "forest").is_err());
    assert_eq!(editor.palette().colors().colors(), ["#112233", "#AABBCC"]);
}

#[test]
fn test_stale_palette_response_ignored() {
    let mut panel = PalettePanel::new();
    let first = panel.begin_request();
    let second = panel.begin_request();

    let late = parse_palette_response("#FF0000 #00FF00").unwrap();
    let fresh = parse_palette_response("[\"#000000\"]").unwrap();

    assert!(panel.complete(second, Ok(fresh)));
    assert!(!panel.complete(first, Ok(late)));
    assert_eq!(panel.colors().colors(), ["#000000"]);
}
