//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod export;
mod palette;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;
use tracing::Level;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, EditorConfig};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Expand file arguments that contain glob patterns.
///
/// Plain paths pass through untouched, even when they do not exist, so the
/// loader can report them. Matches of one pattern are sorted by path.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }

        let paths = glob(pattern).map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;
        let mut matched: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
        if matched.is_empty() {
            return Err(format!("no files match '{}'", pattern));
        }
        matched.sort();
        files.extend(matched);
    }
    Ok(files)
}

/// pxed - Layered, frame-based pixel art editing engine
#[derive(Parser)]
#[command(name = "pxed")]
#[command(about = "pxed - Extract palettes, export and animate pixel art")]
#[command(version)]
pub struct Cli {
    /// Path to pxed.toml (default: search upward from the working directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the median-cut palette of an image, one hex color per line
    Palette {
        /// Input image (PNG, GIF, ...)
        input: PathBuf,

        /// Maximum number of colors (default: [palette] colors from pxed.toml)
        #[arg(short = 'k', long, value_name = "N")]
        colors: Option<usize>,
    },

    /// Import an image into a document and export it as PNG
    Export {
        /// Input image
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Nearest-neighbor scale factor (1, 2, 4 or 8)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=8))]
        scale: Option<u32>,
    },

    /// Build one frame per image and export an animated GIF
    Animate {
        /// Frame images in order (glob patterns are expanded)
        #[arg(required = true)]
        frames: Vec<String>,

        /// Output GIF path
        #[arg(short, long)]
        output: PathBuf,

        /// Playback rate in frames per second
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
        fps: Option<u32>,

        /// Nearest-neighbor scale factor (1, 2, 4 or 8)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=8))]
        scale: Option<u32>,

        /// Play the animation once instead of looping
        #[arg(long)]
        no_loop: bool,
    },
}

/// Load pxed.toml (explicit path or discovered), apply CLI overrides and
/// validate the merged result.
///
/// Failures are reported on stderr and mapped to an exit code.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<EditorConfig, ExitCode> {
    let mut config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };

    merge_cli_overrides(&mut config, overrides);
    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // A subscriber may already be installed when run() is embedded.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Palette { input, colors } => {
            palette::run_palette(&input, colors, config_path)
        }
        Commands::Export { input, output, scale } => {
            export::run_export(&input, &output, scale, config_path)
        }
        Commands::Animate { frames, output, fps, scale, no_loop } => {
            let overrides = CliOverrides {
                scale,
                fps,
                loop_animation: no_loop.then_some(false),
                ..Default::default()
            };
            export::run_animate(&frames, &output, &overrides, config_path)
        }
    }
}
