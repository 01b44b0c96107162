//! Font descriptor for portrayal labels.

/// Font configuration for label rendering.
///
/// The size is in device pixels, not points, so labels keep the same height
/// regardless of the resolution Pango assumes for the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "DejaVu Serif")
    pub family: String,

    /// Font weight: a name ("normal", "bold", "light", ...) or 100-900
    pub weight: String,

    /// "normal", "italic" or "oblique"
    pub style: String,

    /// Pixel size of the label text
    pub size: f64,
}

impl Default for FontDescriptor {
    /// Matches the canvas default of `10px sans-serif`.
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "normal".to_string(),
            style: "normal".to_string(),
            size: 10.0,
        }
    }
}

impl FontDescriptor {
    pub fn new(family: String, weight: String, style: String, size: f64) -> Self {
        Self {
            family,
            weight,
            style,
            size,
        }
    }

    /// Builds the Pango description with an absolute pixel size.
    ///
    /// Unrecognized weights and styles fall back to normal.
    pub fn to_pango(&self) -> pango::FontDescription {
        let mut desc = pango::FontDescription::new();
        desc.set_family(&self.family);
        desc.set_weight(parse_weight(&self.weight));
        desc.set_style(parse_style(&self.style));
        desc.set_absolute_size(self.size * pango::SCALE as f64);
        desc
    }
}

fn parse_weight(weight: &str) -> pango::Weight {
    if let Ok(numeric) = weight.trim().parse::<u32>() {
        return match numeric {
            0..=149 => pango::Weight::Thin,
            150..=249 => pango::Weight::Ultralight,
            250..=349 => pango::Weight::Light,
            350..=449 => pango::Weight::Normal,
            450..=549 => pango::Weight::Medium,
            550..=649 => pango::Weight::Semibold,
            650..=749 => pango::Weight::Bold,
            750..=849 => pango::Weight::Ultrabold,
            _ => pango::Weight::Heavy,
        };
    }

    match weight.trim().to_ascii_lowercase().as_str() {
        "thin" => pango::Weight::Thin,
        "ultralight" => pango::Weight::Ultralight,
        "light" => pango::Weight::Light,
        "medium" => pango::Weight::Medium,
        "semibold" => pango::Weight::Semibold,
        "bold" => pango::Weight::Bold,
        "ultrabold" => pango::Weight::Ultrabold,
        "heavy" => pango::Weight::Heavy,
        _ => pango::Weight::Normal,
    }
}

fn parse_style(style: &str) -> pango::Style {
    match style.trim().to_ascii_lowercase().as_str() {
        "italic" => pango::Style::Italic,
        "oblique" => pango::Style::Oblique,
        _ => pango::Style::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_descriptor_is_plain_sans() {
        let desc = FontDescriptor::default().to_pango();
        assert_eq!(desc.family().as_deref(), Some("Sans"));
        assert_eq!(desc.weight(), pango::Weight::Normal);
        assert_eq!(desc.style(), pango::Style::Normal);
        assert_eq!(desc.size(), 10 * pango::SCALE);
    }

    #[test]
    fn named_weight_and_style_are_applied() {
        let font = FontDescriptor::new(
            "DejaVu Sans Mono".to_string(),
            "Bold".to_string(),
            "italic".to_string(),
            14.0,
        );
        let desc = font.to_pango();
        assert_eq!(desc.family().as_deref(), Some("DejaVu Sans Mono"));
        assert_eq!(desc.weight(), pango::Weight::Bold);
        assert_eq!(desc.style(), pango::Style::Italic);
    }

    #[test]
    fn numeric_weights_snap_to_named_ones() {
        assert_eq!(parse_weight("400"), pango::Weight::Normal);
        assert_eq!(parse_weight("700"), pango::Weight::Bold);
        assert_eq!(parse_weight("300"), pango::Weight::Light);
        assert_eq!(parse_weight("900"), pango::Weight::Heavy);
    }

    #[test]
    fn unknown_values_fall_back_to_normal() {
        assert_eq!(parse_weight("chunky"), pango::Weight::Normal);
        assert_eq!(parse_style("slanted"), pango::Style::Normal);
    }

    #[test]
    fn size_is_absolute_pixels() {
        let font = FontDescriptor::new(
            "Monospace".to_string(),
            "light".to_string(),
            "normal".to_string(),
            16.0,
        );
        let desc = font.to_pango();
        assert!(desc.is_size_absolute());
        assert_eq!(desc.size(), 16 * pango::SCALE);
        assert_eq!(desc.weight(), pango::Weight::Light);
    }
}
