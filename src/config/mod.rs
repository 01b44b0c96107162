//! Configuration file support for continuous-canvas.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/continuous-canvas/config.toml`. Settings include the logical
//! canvas bounds, raster size, label font and the custom image directory.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod types;

// Re-export commonly used types at module level
pub use types::{CanvasConfig, ImageConfig, LabelConfig};

use crate::draw::{Bounds, Color, CoordinateMapper, FontDescriptor, RenderOptions};
use crate::draw::surface::MAX_SURFACE_EDGE;
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [canvas]
/// min_x = 0.0
/// max_x = 100.0
/// min_y = 0.0
/// max_y = 100.0
/// width = 800
/// height = 800
///
/// [labels]
/// font_family = "Monospace"
/// font_size = 12.0
///
/// [images]
/// directory = "assets/agents"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Logical bounds, raster size and stroke settings
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Label font settings
    #[serde(default)]
    pub labels: LabelConfig,

    /// Custom shape image lookup
    #[serde(default)]
    pub images: ImageConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value (or replaced by a
    /// fallback) and a warning is logged.
    ///
    /// Validated ranges:
    /// - `canvas.width`, `canvas.height`: 1 - 16384
    /// - `canvas.line_width`: 0.1 - 50.0
    /// - `labels.font_size`: 4.0 - 200.0
    ///
    /// Inverted or empty bounds are reported but left alone. An empty span
    /// maps to non-finite device coordinates and nothing gets drawn.
    pub fn validate_and_clamp(&mut self) {
        let max_edge = MAX_SURFACE_EDGE;

        // Surface size: 1 - 16384
        if !(1..=max_edge).contains(&self.canvas.width) {
            log::warn!(
                "Invalid canvas width {}, clamping to 1-{} range",
                self.canvas.width,
                max_edge
            );
            self.canvas.width = self.canvas.width.clamp(1, max_edge);
        }
        if !(1..=max_edge).contains(&self.canvas.height) {
            log::warn!(
                "Invalid canvas height {}, clamping to 1-{} range",
                self.canvas.height,
                max_edge
            );
            self.canvas.height = self.canvas.height.clamp(1, max_edge);
        }

        // Line width: 0.1 - 50.0
        if !(0.1..=50.0).contains(&self.canvas.line_width) {
            log::warn!(
                "Invalid line_width {:.2}, clamping to 0.1-50.0 range",
                self.canvas.line_width
            );
            self.canvas.line_width = if self.canvas.line_width.is_nan() {
                1.0
            } else {
                self.canvas.line_width.clamp(0.1, 50.0)
            };
        }

        if !self.bounds().is_valid() {
            log::warn!(
                "Canvas bounds x {}..{}, y {}..{} are empty or inverted",
                self.canvas.min_x,
                self.canvas.max_x,
                self.canvas.min_y,
                self.canvas.max_y
            );
        }

        if let Some(background) = &self.canvas.background {
            if Color::parse(background).is_none() {
                log::warn!(
                    "Invalid background color '{}', using a transparent canvas",
                    background
                );
                self.canvas.background = None;
            }
        }

        // Font size: 4.0 - 200.0
        if !(4.0..=200.0).contains(&self.labels.font_size) {
            log::warn!(
                "Invalid font_size {:.1}, clamping to 4.0-200.0 range",
                self.labels.font_size
            );
            self.labels.font_size = if self.labels.font_size.is_nan() {
                10.0
            } else {
                self.labels.font_size.clamp(4.0, 200.0)
            };
        }

        // Validate font weight is reasonable
        let valid_weight = matches!(
            self.labels.font_weight.to_lowercase().as_str(),
            "normal" | "bold" | "light" | "ultralight" | "thin" | "medium" | "semibold" | "heavy" | "ultrabold"
        ) || self
            .labels
            .font_weight
            .parse::<u32>()
            .is_ok_and(|w| (100..=900).contains(&w));

        if !valid_weight {
            log::warn!(
                "Invalid font_weight '{}', falling back to 'normal'",
                self.labels.font_weight
            );
            self.labels.font_weight = "normal".to_string();
        }

        // Validate font style
        if !matches!(
            self.labels.font_style.to_lowercase().as_str(),
            "normal" | "italic" | "oblique"
        ) {
            log::warn!(
                "Invalid font_style '{}', falling back to 'normal'",
                self.labels.font_style
            );
            self.labels.font_style = "normal".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/continuous-canvas/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("continuous-canvas");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// Unlike [`load`](Self::load), a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// Writes the example config from `config.example.toml` to the user's config
    /// directory and returns the path written.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A config file already exists at the target path
    /// - The config directory cannot be created
    /// - The file cannot be written
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        // Create directory
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(&config_path, Self::example_toml())
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// The documented example configuration shipped with the crate.
    pub fn example_toml() -> &'static str {
        include_str!("../../config.example.toml")
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Logical bounds of the canvas.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.canvas.min_x,
            self.canvas.max_x,
            self.canvas.min_y,
            self.canvas.max_y,
        )
    }

    /// Coordinate mapper for the configured bounds and raster size.
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.bounds(), self.canvas.width, self.canvas.height)
    }

    /// Renderer options for the configured font, stroke, background and images.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            font: FontDescriptor::new(
                self.labels.font_family.clone(),
                self.labels.font_weight.clone(),
                self.labels.font_style.clone(),
                self.labels.font_size,
            ),
            line_width: self.canvas.line_width,
            background: self.canvas.background.as_deref().and_then(Color::parse),
            image_dir: self.images.directory.clone(),
        }
    }
}
