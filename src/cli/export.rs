//! Export and animate command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{CliOverrides, EditorConfig};
use crate::document::Document;
use crate::editor::Editor;
use crate::import::{fit_to_canvas, load_image, ImportError};
use crate::output::{write_file, OutputError};

use super::{expand_inputs, resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Run an exporter that reports through a save callback and write the bytes
/// it produced to `output`.
fn save_to(
    output: &Path,
    export: impl FnOnce(&mut dyn FnMut(Vec<u8>)) -> Result<(), OutputError>,
) -> Result<(), ExitCode> {
    let mut encoded = None;
    if let Err(e) = export(&mut |bytes| encoded = Some(bytes)) {
        eprintln!("Error: {}", e);
        return Err(ExitCode::from(EXIT_ERROR));
    }
    let Some(bytes) = encoded else {
        eprintln!("Error: exporter produced no output");
        return Err(ExitCode::from(EXIT_ERROR));
    };
    if let Err(e) = write_file(output, &bytes) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return Err(ExitCode::from(EXIT_ERROR));
    }
    Ok(())
}

/// Execute the export command
pub fn run_export(
    input: &Path,
    output: &Path,
    scale: Option<u32>,
    config_path: Option<&Path>,
) -> ExitCode {
    let overrides = CliOverrides { scale, ..Default::default() };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let image = match load_image(input) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: Failed to load '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let editor = Editor::from_buffer(image, &config);
    if let Err(code) = save_to(output, |save| editor.export_png_default(save)) {
        return code;
    }

    let (width, height) = (editor.document().width(), editor.document().height());
    let factor = config.export_scale().factor();
    println!("Exported: {} ({}x{})", output.display(), width * factor, height * factor);
    ExitCode::from(EXIT_SUCCESS)
}

/// Build a document with one frame per image.
///
/// The first image sets the canvas size; later images are fitted to it.
fn build_animation(paths: &[PathBuf], config: &EditorConfig) -> Result<Document, ImportError> {
    let mut images = paths.iter().map(|path| load_image(path));
    let first = images.next().ok_or(ImportError::Empty)??;

    let mut document = Document::with_options(first, config.document_options());
    let (width, height) = (document.width(), document.height());
    for image in images {
        let image = image?;
        document.add_frame();
        *document.current_layer_mut().buffer_mut() = fit_to_canvas(&image, width, height);
        document.commit();
    }
    Ok(document)
}

/// Execute the animate command
pub fn run_animate(
    frames: &[String],
    output: &Path,
    overrides: &CliOverrides,
    config_path: Option<&Path>,
) -> ExitCode {
    let config = match resolve_config(config_path, overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let paths = match expand_inputs(frames) {
        Ok(paths) if !paths.is_empty() => paths,
        Ok(_) => {
            eprintln!("Error: no frame images given");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let document = match build_animation(&paths, &config) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: Failed to load frames: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let frame_count = document.frame_count();
    let editor = Editor::with_document(document, &config);
    if let Err(code) = save_to(output, |save| editor.export_gif_default(save)) {
        return code;
    }

    println!(
        "Animated: {} ({} frames at {} fps)",
        output.display(),
        frame_count,
        config.animation.fps
    );
    ExitCode::from(EXIT_SUCCESS)
}
