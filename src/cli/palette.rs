//! Palette command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::editor::Editor;
use crate::import::load_image;

use super::{resolve_config, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the palette command
pub fn run_palette(input: &Path, colors: Option<usize>, config_path: Option<&Path>) -> ExitCode {
    let overrides = CliOverrides { palette_colors: colors, ..Default::default() };
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

    let mut editor = Editor::from_buffer(image, &config);
    let palette = editor.extract_palette();
    if palette.is_empty() {
        eprintln!("Warning: '{}' has no opaque pixels", input.display());
    }
    for color in palette.colors() {
        println!("{}", color);
    }
    ExitCode::from(EXIT_SUCCESS)
}
