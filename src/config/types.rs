//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canvas geometry and stroke settings.
///
/// The logical bounds are the model's coordinate space; width and height are
/// the raster size in pixels. Logical y grows upward and is flipped onto the
/// surface, so `min_y` lands on the bottom edge.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Logical x mapped to the left edge
    #[serde(default = "default_min")]
    pub min_x: f64,

    /// Logical x mapped to the right edge
    #[serde(default = "default_max")]
    pub max_x: f64,

    /// Logical y mapped to the bottom edge
    #[serde(default = "default_min")]
    pub min_y: f64,

    /// Logical y mapped to the top edge
    #[serde(default = "default_max")]
    pub max_y: f64,

    /// Surface width in pixels (valid range: 1 - 16384)
    #[serde(default = "default_canvas_size")]
    pub width: u32,

    /// Surface height in pixels (valid range: 1 - 16384)
    #[serde(default = "default_canvas_size")]
    pub height: u32,

    /// Outline width in pixels (valid range: 0.1 - 50.0)
    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Color painted behind every frame, as any CSS color string.
    /// Leave unset for a transparent canvas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_x: default_min(),
            max_x: default_max(),
            min_y: default_min(),
            max_y: default_max(),
            width: default_canvas_size(),
            height: default_canvas_size(),
            line_width: default_line_width(),
            background: None,
        }
    }
}

/// Font used for portrayal labels.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LabelConfig {
    /// Font family name (e.g., "Sans", "Monospace", "DejaVu Serif")
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font weight (e.g., "normal", "bold", "light", 400, 700)
    #[serde(default = "default_font_weight")]
    pub font_weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    #[serde(default = "default_font_style")]
    pub font_style: String,

    /// Label size in pixels (valid range: 4.0 - 200.0)
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_weight: default_font_weight(),
            font_style: default_font_style(),
            font_size: default_font_size(),
        }
    }
}

/// Where custom shape images are looked up.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageConfig {
    /// Directory image keys are resolved against. Relative paths are taken
    /// from the working directory
    #[serde(default = "default_image_directory")]
    pub directory: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            directory: default_image_directory(),
        }
    }
}

fn default_min() -> f64 {
    0.0
}

fn default_max() -> f64 {
    1.0
}

fn default_canvas_size() -> u32 {
    500
}

fn default_line_width() -> f64 {
    1.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_weight() -> String {
    "normal".to_string()
}

fn default_font_style() -> String {
    "normal".to_string()
}

fn default_font_size() -> f64 {
    10.0
}

fn default_image_directory() -> PathBuf {
    PathBuf::from(crate::draw::render::DEFAULT_IMAGE_DIR)
}
