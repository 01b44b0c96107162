//! Portrayal records as sent by the simulation backend, and their normalized form.
//!
//! A [`PortrayalRecord`] mirrors the loosely-typed JSON object the backend emits
//! (Mesa-style keys such as `Shape`, `Color` and `Filled` are accepted alongside
//! snake_case names). [`PortrayalRecord::normalize`] resolves every default once
//! and produces a [`Portrayal`] whose [`ShapeKind`] carries exactly the fields
//! its drawing routine needs.

use super::color::{BLACK, Color};
use super::mapper::Bounds;
use log::warn;
use serde::Deserialize;
use std::fmt;

/// One color or an ordered list of colors (a multi-stop gradient).
///
/// `null` entries in a list are dropped during normalization.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorField {
    One(String),
    Many(Vec<Option<String>>),
}

/// Label content; numbers and booleans are drawn as their JSON text.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LabelText {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl fmt::Display for LabelText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelText::Text(text) => f.write_str(text),
            LabelText::Number(number) => write!(f, "{number}"),
            LabelText::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Layer identifier as found on a record (Mesa uses integers).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LayerId {
    Index(i64),
    Name(String),
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerId::Index(index) => write!(f, "{index}"),
            LayerId::Name(name) => f.write_str(name),
        }
    }
}

/// A drawable unit exactly as received on the wire.
///
/// Only `x` and `y` are required. Everything else is optional and resolved by
/// [`PortrayalRecord::normalize`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PortrayalRecord {
    /// `"rect"`/`"rectangle"`, `"circle"`, `"arrow"`; any other value names an image
    #[serde(alias = "Shape")]
    pub shape: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(alias = "Color")]
    pub color: Option<ColorField>,
    pub stroke_color: Option<String>,
    #[serde(alias = "xAlign")]
    pub x_align: Option<f64>,
    #[serde(alias = "yAlign")]
    pub y_align: Option<f64>,
    /// `null` reads as not filled
    #[serde(alias = "Filled")]
    pub filled: Option<bool>,
    pub text: Option<LabelText>,
    pub text_color: Option<String>,
    /// Rectangle width, or arrow width when `width` is absent
    pub w: Option<f64>,
    /// Rectangle height, or arrow length when `length` is absent
    pub h: Option<f64>,
    pub r: Option<f64>,
    /// Arrow direction in radians, counter-clockwise from +x in logical space
    pub angle: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    #[serde(alias = "vector_origin")]
    pub origin_offset: Option<f64>,
    /// Side length of a custom image in logical units
    pub size: Option<f64>,
    #[serde(alias = "Layer")]
    pub layer: Option<LayerId>,
}

/// Arrow parameters after defaulting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowSpec {
    /// Logical angle in radians (not yet negated for the device frame)
    pub angle: f64,
    pub length: f64,
    pub width: f64,
    pub origin_offset: f64,
}

/// Shape-specific parameters of a normalized portrayal.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    Rect { w: f64, h: f64 },
    Circle { r: f64 },
    Arrow(ArrowSpec),
    /// External image; `key` is used verbatim to locate the asset
    Image { key: String, size: f64 },
}

/// Centered text drawn after a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: Color,
}

/// Appearance shared by all shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Gradient stops in order; never empty
    pub colors: Vec<Color>,
    pub stroke: Color,
    pub x_align: f64,
    pub y_align: f64,
    pub filled: bool,
    pub label: Option<Label>,
}

/// A record with every default resolved and y already inverted.
#[derive(Clone, Debug, PartialEq)]
pub struct Portrayal {
    pub x: f64,
    /// Inverted y (`min_y + max_y - y`), ready for mapping
    pub y: f64,
    pub kind: ShapeKind,
    pub style: Style,
}

impl PortrayalRecord {
    /// Resolves defaults, applies the y-inversion and picks the shape variant.
    ///
    /// Returns `None` only when the record carries no shape at all.
    pub fn normalize(&self, bounds: &Bounds) -> Option<Portrayal> {
        let Some(shape) = self.shape.as_deref() else {
            warn!(
                "Skipping portrayal at ({}, {}) without a shape",
                self.x, self.y
            );
            return None;
        };

        let mut colors: Vec<Color> = match &self.color {
            Some(ColorField::One(spec)) => vec![color_or_black(spec)],
            Some(ColorField::Many(specs)) => specs
                .iter()
                .flatten()
                .map(|spec| color_or_black(spec))
                .collect(),
            None => Vec::new(),
        };
        if colors.is_empty() {
            colors.push(BLACK);
        }

        let y = bounds.invert_y(self.y);

        let stroke = non_blank(self.stroke_color.as_deref())
            .map(color_or_black)
            .unwrap_or(colors[0]);

        let label = self.text.as_ref().map(|text| Label {
            text: text.to_string(),
            color: non_blank(self.text_color.as_deref())
                .map(color_or_black)
                .unwrap_or(BLACK),
        });

        let style = Style {
            colors,
            stroke,
            x_align: self.x_align.unwrap_or(0.0),
            y_align: self.y_align.unwrap_or(0.0),
            filled: self.filled.unwrap_or(false),
            label,
        };

        let kind = match shape {
            "rect" | "rectangle" => ShapeKind::Rect {
                w: self.w.unwrap_or(0.0),
                h: self.h.unwrap_or(0.0),
            },
            "circle" => ShapeKind::Circle {
                r: self.r.unwrap_or(0.0),
            },
            "arrow" => {
                let length = self.length.or(self.h).unwrap_or(1.0);
                ShapeKind::Arrow(ArrowSpec {
                    angle: self.angle.unwrap_or(0.0),
                    length,
                    width: self.width.or(self.w).unwrap_or(length / 3.0),
                    origin_offset: self.origin_offset.unwrap_or(0.0),
                })
            }
            key => ShapeKind::Image {
                key: key.to_string(),
                size: self.size.unwrap_or(1.0),
            },
        };

        Some(Portrayal {
            x: self.x,
            y,
            kind,
            style,
        })
    }
}

/// Empty or whitespace-only color strings count as unset.
fn non_blank(spec: Option<&str>) -> Option<&str> {
    spec.filter(|spec| !spec.trim().is_empty())
}

fn color_or_black(spec: &str) -> Color {
    Color::parse(spec).unwrap_or_else(|| {
        warn!("Unknown color '{}', using black", spec);
        BLACK
    })
}
