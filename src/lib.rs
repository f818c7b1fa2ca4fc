//! pxed - Library for layered, frame-based pixel art editing
//!
//! This library provides functionality to:
//! - Paint on layered RGBA buffers with pencil, shape, fill and move tools
//! - Composite layers with opacity, blend modes and onion skinning
//! - Undo and redo every edit through snapshot history
//! - Extract palettes, import images and export PNG or animated GIF

pub mod buffer;
pub mod cli;
pub mod color;
pub mod composition;
pub mod config;
pub mod document;
pub mod editor;
pub mod frame;
pub mod gif;
pub mod history;
pub mod import;
pub mod layer;
pub mod output;
pub mod palette;
pub mod quantize;
pub mod raster;
pub mod timeline;
pub mod tools;

pub use buffer::PixelBuffer;
pub use document::Document;
pub use editor::Editor;
