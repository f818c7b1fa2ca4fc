//! Configuration schema types for `pxed.toml`
//!
//! Every section is optional; missing keys take the defaults below.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::parse_color;
use crate::composition::OnionConfig;
use crate::document::DocumentOptions;
use crate::frame::DEFAULT_FRAME_DURATION_MS;
use crate::gif::GifOptions;
use crate::output::ExportScale;
use crate::raster::Symmetry;
use crate::timeline::{DEFAULT_FPS, MAX_FPS, MIN_FPS};
use crate::tools::{ToolSettings, DEFAULT_DARKEN_AMOUNT, DEFAULT_LIGHTEN_AMOUNT};

/// Largest accepted canvas side
pub const MAX_CANVAS_SIZE: u32 = 4096;
/// Largest accepted brush side
pub const MAX_BRUSH_SIZE: u32 = 64;

/// Size of new blank documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_size")]
    pub width: u32,
    #[serde(default = "default_canvas_size")]
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: default_canvas_size(), height: default_canvas_size() }
    }
}

fn default_canvas_size() -> u32 {
    32
}

/// Initial brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    #[serde(default = "default_brush_size")]
    pub size: u32,
    /// Any color `parse_color` accepts
    #[serde(default = "default_brush_color")]
    pub color: String,
    #[serde(default)]
    pub symmetry: Symmetry,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self { size: default_brush_size(), color: default_brush_color(), symmetry: Symmetry::None }
    }
}

fn default_brush_size() -> u32 {
    1
}

fn default_brush_color() -> String {
    "#000000".to_string()
}

/// Airbrush strengths for the lighten and darken tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_lighten_amount")]
    pub lighten_amount: f32,
    #[serde(default = "default_darken_amount")]
    pub darken_amount: f32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self { lighten_amount: DEFAULT_LIGHTEN_AMOUNT, darken_amount: DEFAULT_DARKEN_AMOUNT }
    }
}

fn default_lighten_amount() -> f32 {
    DEFAULT_LIGHTEN_AMOUNT
}

fn default_darken_amount() -> f32 {
    DEFAULT_DARKEN_AMOUNT
}

/// Playback and onion skin settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Duration of newly created frames
    #[serde(default = "default_frame_duration")]
    pub frame_duration_ms: u32,
    #[serde(default = "default_true")]
    pub onion_skin: bool,
    #[serde(default = "default_onion_opacity")]
    pub onion_opacity: f32,
    /// Optional tint color for the onion skin ghost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onion_tint: Option<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            frame_duration_ms: DEFAULT_FRAME_DURATION_MS,
            onion_skin: true,
            onion_opacity: default_onion_opacity(),
            onion_tint: None,
        }
    }
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_frame_duration() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

fn default_true() -> bool {
    true
}

fn default_onion_opacity() -> f32 {
    OnionConfig::default().opacity
}

/// Export defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Upscale factor: 1, 2, 4 or 8
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default = "default_true")]
    pub loop_animation: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { scale: default_scale(), loop_animation: true }
    }
}

fn default_scale() -> u32 {
    1
}

/// Undo history bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum undo entries; 0 means unbounded
    #[serde(default)]
    pub max_entries: usize,
}

/// Palette extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Target color count for median-cut extraction
    #[serde(default = "default_palette_colors")]
    pub colors: usize,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self { colors: default_palette_colors() }
    }
}

fn default_palette_colors() -> usize {
    8
}

/// Root configuration structure for `pxed.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
}

/// A validation error in the config
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "brush.size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pxed.toml: '{}' {}", self.field, self.message)
    }
}

fn in_unit_range(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl EditorConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: message.to_string(),
                });
            }
        };

        let size_msg = format!("must be between 1 and {}", MAX_CANVAS_SIZE);
        check((1..=MAX_CANVAS_SIZE).contains(&self.canvas.width), "canvas.width", &size_msg);
        check((1..=MAX_CANVAS_SIZE).contains(&self.canvas.height), "canvas.height", &size_msg);

        check(
            (1..=MAX_BRUSH_SIZE).contains(&self.brush.size),
            "brush.size",
            &format!("must be between 1 and {}", MAX_BRUSH_SIZE),
        );
        check(parse_color(&self.brush.color).is_ok(), "brush.color", "is not a valid color");

        let unit_msg = "must be between 0.0 and 1.0";
        check(in_unit_range(self.tools.lighten_amount), "tools.lighten_amount", unit_msg);
        check(in_unit_range(self.tools.darken_amount), "tools.darken_amount", unit_msg);

        check(
            (MIN_FPS..=MAX_FPS).contains(&self.animation.fps),
            "animation.fps",
            &format!("must be between {} and {}", MIN_FPS, MAX_FPS),
        );
        check(
            self.animation.frame_duration_ms > 0,
            "animation.frame_duration_ms",
            "must be a positive integer",
        );
        check(in_unit_range(self.animation.onion_opacity), "animation.onion_opacity", unit_msg);
        if let Some(tint) = &self.animation.onion_tint {
            check(parse_color(tint).is_ok(), "animation.onion_tint", "is not a valid color");
        }

        check(
            ExportScale::try_from(self.export.scale).is_ok(),
            "export.scale",
            "must be 1, 2, 4 or 8",
        );
        check(self.palette.colors > 0, "palette.colors", "must be a positive integer");

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Brush color, black when the configured value does not parse.
    pub fn brush_color(&self) -> Rgba<u8> {
        parse_color(&self.brush.color).unwrap_or(Rgba([0, 0, 0, 255]))
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            color: self.brush_color(),
            brush_size: self.brush.size,
            symmetry: self.brush.symmetry,
            lighten_amount: self.tools.lighten_amount,
            darken_amount: self.tools.darken_amount,
            ..ToolSettings::default()
        }
    }

    pub fn onion_config(&self) -> OnionConfig {
        let tint = self
            .animation
            .onion_tint
            .as_deref()
            .and_then(|t| parse_color(t).ok())
            .map(|c| [c[0], c[1], c[2]]);
        OnionConfig { opacity: self.animation.onion_opacity, tint }
    }

    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            history_limit: self.history.max_entries,
            frame_duration_ms: self.animation.frame_duration_ms,
        }
    }

    /// Export scale, 1x when the configured factor is unsupported.
    pub fn export_scale(&self) -> ExportScale {
        ExportScale::try_from(self.export.scale).unwrap_or_default()
    }

    pub fn gif_options(&self) -> GifOptions {
        GifOptions {
            fps: Some(self.animation.fps),
            scale: self.export_scale(),
            loop_animation: self.export.loop_animation,
        }
    }
}
