//! Rendering of portrayal frames (Cairo-based).
//!
//! This module defines the core types for painting agent portrayals:
//! - [`CoordinateMapper`]: Logical-to-device coordinate mapping
//! - [`PortrayalRecord`]: One agent's visual description as received
//! - [`Frame`]: Portrayals grouped into ordered layers
//! - [`LayerRenderer`]: Paints frames onto an owned [`Surface`]

pub mod color;
pub mod error;
pub mod font;
pub mod frame;
pub mod image;
pub mod mapper;
pub mod portrayal;
pub mod render;
pub mod surface;

pub use color::Color;
pub use error::{ImageError, RenderError};
pub use font::FontDescriptor;
pub use frame::{Frame, Layer};
pub use image::ImageLoader;
pub use mapper::{Bounds, CoordinateMapper};
pub use portrayal::{Portrayal, PortrayalRecord, ShapeKind};
pub use render::{LayerRenderer, RenderOptions};
pub use surface::Surface;
pub use color::{BLACK, BLUE, GREEN, RED, TRANSPARENT, WHITE};
