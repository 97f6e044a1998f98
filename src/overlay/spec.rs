use clap::ValueEnum;

use crate::error::{CompositorError, Result};

pub const MIN_FONT_SIZE: u32 = 16;
pub const MAX_FONT_SIZE: u32 = 48;
pub const MAX_BACKGROUND_OPACITY: u8 = 100;

/// Font families offered for the poem text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum FontFamily {
    Serif,
    SansSerif,
    Arial,
    Times,
    Helvetica,
}

impl FontFamily {
    pub const ALL: [FontFamily; 5] = [
        FontFamily::Serif,
        FontFamily::SansSerif,
        FontFamily::Arial,
        FontFamily::Times,
        FontFamily::Helvetica,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Serif => "serif",
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Arial => "arial",
            FontFamily::Times => "times",
            FontFamily::Helvetica => "helvetica",
        }
    }

    /// Whether the family belongs to the serif group (drives the generic fallback query)
    pub fn is_serif(&self) -> bool {
        matches!(self, FontFamily::Serif | FontFamily::Times)
    }
}

/// Fixed text color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TextColor {
    White,
    Black,
    LightGray,
    DarkGray,
}

impl TextColor {
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            TextColor::White => [255, 255, 255],
            TextColor::Black => [0, 0, 0],
            TextColor::LightGray => [200, 200, 200],
            TextColor::DarkGray => [80, 80, 80],
        }
    }
}

/// Where the text block sits on the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TextPosition {
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

/// Horizontal alignment of each line inside the text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Everything needed to composite poem text onto an image
///
/// Built with [`TextOverlaySpec::new`] plus the `with_*` methods; the numeric
/// setters reject out-of-range values so a spec that exists is always renderable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextOverlaySpec {
    text: String,
    font: FontFamily,
    font_size: u32,
    color: TextColor,
    position: TextPosition,
    alignment: TextAlignment,
    background_opacity: u8,
    enabled: bool,
}

impl Default for TextOverlaySpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: FontFamily::Serif,
            font_size: 24,
            color: TextColor::White,
            position: TextPosition::Center,
            alignment: TextAlignment::Center,
            background_opacity: 70,
            enabled: false,
        }
    }
}

impl TextOverlaySpec {
    /// An enabled overlay of `text` with default styling
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            enabled: true,
            ..Self::default()
        }
    }

    /// An overlay that leaves images untouched
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: FontFamily) -> Self {
        self.font = font;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Result<Self> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size) {
            return Err(CompositorError::invalid_parameters(format!(
                "font size {} outside {}-{}",
                font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
            ))
            .into());
        }
        self.font_size = font_size;
        Ok(self)
    }

    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_position(mut self, position: TextPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_background_opacity(mut self, percent: u8) -> Result<Self> {
        if percent > MAX_BACKGROUND_OPACITY {
            return Err(CompositorError::invalid_parameters(format!(
                "background opacity {}% above {}%",
                percent, MAX_BACKGROUND_OPACITY
            ))
            .into());
        }
        self.background_opacity = percent;
        Ok(self)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> FontFamily {
        self.font
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn color(&self) -> TextColor {
        self.color
    }

    pub fn position(&self) -> TextPosition {
        self.position
    }

    pub fn alignment(&self) -> TextAlignment {
        self.alignment
    }

    pub fn background_opacity(&self) -> u8 {
        self.background_opacity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True when rendering would draw nothing
    pub fn is_noop(&self) -> bool {
        !self.enabled || self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let spec = TextOverlaySpec::default();
        assert!(!spec.is_enabled());
        assert!(spec.is_noop());
        assert_eq!(spec.font_size(), 24);
        assert_eq!(spec.background_opacity(), 70);
    }

    #[test]
    fn test_builder_validates_ranges() {
        let spec = TextOverlaySpec::new("Petals fall gently");
        assert!(spec.clone().with_font_size(16).is_ok());
        assert!(spec.clone().with_font_size(48).is_ok());
        assert!(spec.clone().with_font_size(15).is_err());
        assert!(spec.clone().with_font_size(49).is_err());
        assert!(spec.clone().with_background_opacity(100).is_ok());
        assert!(spec.with_background_opacity(101).is_err());
    }

    #[test]
    fn test_blank_text_is_noop() {
        assert!(TextOverlaySpec::new("   \n ").is_noop());
        assert!(!TextOverlaySpec::new("Ocean").is_noop());
        assert!(TextOverlaySpec::new("Ocean").with_enabled(false).is_noop());
    }

    #[test]
    fn test_palette() {
        assert_eq!(TextColor::LightGray.rgb(), [200, 200, 200]);
        assert_eq!(TextColor::DarkGray.rgb(), [80, 80, 80]);
    }

    #[test]
    fn test_choices_parse_from_cli_names() {
        for family in FontFamily::ALL {
            assert_eq!(FontFamily::from_str(family.name(), false), Ok(family));
        }
        assert_eq!(TextColor::from_str("light-gray", false), Ok(TextColor::LightGray));
        assert_eq!(TextPosition::from_str("bottom", false), Ok(TextPosition::Bottom));
        assert_eq!(TextAlignment::from_str("right", false), Ok(TextAlignment::Right));
        assert!(TextColor::from_str("purple", false).is_err());
    }

    #[test]
    fn test_family_names_are_unique() {
        let mut names: Vec<&str> = FontFamily::ALL.iter().map(|f| f.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FontFamily::ALL.len());
    }
}
