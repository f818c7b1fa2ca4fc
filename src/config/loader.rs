//! Configuration loading and discovery for `pxed.toml`
//!
//! Provides functions to find, load, and merge configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::schema::EditorConfig;

/// Name of the configuration file searched for
pub const CONFIG_FILE_NAME: &str = "pxed.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pxed.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override export scale factor
    pub scale: Option<u32>,
    /// Override playback rate
    pub fps: Option<u32>,
    /// Override palette color count
    pub palette_colors: Option<usize>,
    /// Override animation looping
    pub loop_animation: Option<bool>,
}

/// Find pxed.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for pxed.toml
/// 2. Check XDG_CONFIG_HOME/pxed/pxed.toml (or ~/.config/pxed/pxed.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pxed.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pxed").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find pxed.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a pxed.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            debug!("no pxed.toml found, using defaults");
            Ok(EditorConfig::default())
        }
    }
}

/// Load and validate configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<EditorConfig, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. Call
/// [`EditorConfig::validate`] afterwards to check the merged values.
pub fn merge_cli_overrides(config: &mut EditorConfig, overrides: &CliOverrides) {
    if let Some(scale) = overrides.scale {
        config.export.scale = scale;
    }
    if let Some(fps) = overrides.fps {
        config.animation.fps = fps;
    }
    if let Some(colors) = overrides.palette_colors {
        config.palette.colors = colors;
    }
    if let Some(loop_animation) = overrides.loop_animation {
        config.export.loop_animation = loop_animation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[canvas]\nwidth = 16");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[canvas]\nwidth = 16");

        let subdir = temp.path().join("art").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let contents = "[canvas]\nwidth = 16\nheight = 24\n\n[export]\nscale = 2";
        let path = write_config(temp.path(), contents);

        let config = load_config(Some(&path)).expect("should load config");
        assert_eq!(config.canvas.width, 16);
        assert_eq!(config.canvas.height, 24);
        assert_eq!(config.export.scale, 2);
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join(CONFIG_FILE_NAME)));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[canvas\nwidth = ");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[brush]\nsize = 0\n\n[palette]\ncolors = 0");

        match load_config(Some(&path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("brush.size"));
                assert!(errors[1].contains("palette.colors"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_message_lists_fields() {
        let err = parse_config("[animation]\nfps = 0").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Config validation failed:"));
        assert!(message.contains("  - pxed.toml: 'animation.fps'"));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = EditorConfig::default();
        let overrides = CliOverrides {
            scale: Some(8),
            fps: Some(24),
            palette_colors: Some(4),
            loop_animation: Some(false),
        };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.export.scale, 8);
        assert_eq!(config.animation.fps, 24);
        assert_eq!(config.palette.colors, 4);
        assert!(!config.export.loop_animation);
    }

    #[test]
    fn test_merge_empty_overrides_keeps_config() {
        let mut config = EditorConfig::default();
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config, EditorConfig::default());
    }
}
