//! Configuration module for the pxed editor
//!
//! Provides types and parsing for `pxed.toml` editor configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
