//! Library exports for rendering agent portrayals onto a raster canvas.
//!
//! Exposes the coordinate mapper, portrayal records and the layered renderer
//! alongside the configuration types, so other tools can render frames
//! without going through the command line.

pub mod config;
pub mod draw;
pub mod util;

pub use config::Config;
