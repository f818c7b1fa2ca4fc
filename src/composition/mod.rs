//! Layer compositing - flattening frames for display and export

pub mod blend;
pub mod overlay;
pub mod render;

// Re-export public API
pub use blend::{blend_pixels, BlendMode};
pub use overlay::{draw_onion_underlay, draw_pixel_grid, OnionConfig};
pub use render::{draw_layer, flatten_frame, render_frame};
