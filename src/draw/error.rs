//! Error types for surface handling and custom image loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while creating, drawing on or exporting the surface.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Failed to encode PNG: {0}")]
    Png(#[from] cairo::IoError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image '{key}' could not be drawn: {source}")]
    Image {
        key: String,
        #[source]
        source: ImageError,
    },
}

/// Errors that can occur while resolving a custom shape image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image key '{0}' does not name a file inside the image directory")]
    InvalidKey(String),

    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode PNG: {0}")]
    Decode(#[from] cairo::IoError),

    #[error("Image has no drawable area")]
    Empty,
}
