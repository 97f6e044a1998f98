use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    overlay::spec::FontFamily,
};

/// Main configuration for VerseCanvas
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text overlay layout settings
    pub overlay: OverlayConfig,

    /// Font discovery and family mapping
    pub fonts: FontConfig,

    /// Render memoization settings
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.overlay.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

/// Text overlay layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Distance from the image edges in pixels (capped at a tenth of the shorter side)
    pub margin: u32,

    /// Extra pixels between wrapped lines
    pub line_spacing: u32,

    /// Widest a line may get, as a fraction of the image width
    pub max_width_ratio: f32,

    /// Color of the box drawn behind the text
    pub background_color: [u8; 3],

    /// Substitute another face when a font family is not installed
    pub font_fallback: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            margin: 50,
            line_spacing: 10,
            max_width_ratio: 0.8,
            background_color: [0, 0, 0],
            font_fallback: false,
        }
    }
}

impl OverlayConfig {
    fn validate(&self) -> Result<()> {
        if !(self.max_width_ratio > 0.0 && self.max_width_ratio <= 1.0) {
            return Err(ConfigError::InvalidValue {
                key: "overlay.max_width_ratio".to_string(),
                value: self.max_width_ratio.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Where a font family's face comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// Font file that takes precedence over the font database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Family names to look up, in order of preference
    pub names: Vec<String>,
}

impl FaceConfig {
    fn named(names: &[&str]) -> Self {
        Self {
            file: None,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Font discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Load the operating system's installed fonts
    pub system_fonts: bool,

    /// Extra directories scanned for .ttf/.otf/.ttc files
    pub font_dirs: Vec<PathBuf>,

    pub serif: FaceConfig,
    pub sans_serif: FaceConfig,
    pub arial: FaceConfig,
    pub times: FaceConfig,
    pub helvetica: FaceConfig,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            system_fonts: true,
            font_dirs: Vec::new(),
            serif: FaceConfig::named(&["Times New Roman", "Times", "Liberation Serif", "DejaVu Serif"]),
            sans_serif: FaceConfig::named(&["Arial", "Helvetica", "Liberation Sans", "DejaVu Sans"]),
            arial: FaceConfig::named(&["Arial", "Liberation Sans", "Arimo"]),
            times: FaceConfig::named(&["Times New Roman", "Times", "Liberation Serif", "Tinos"]),
            helvetica: FaceConfig::named(&["Helvetica", "Helvetica Neue", "Nimbus Sans", "Liberation Sans"]),
        }
    }
}

impl FontConfig {
    /// Face settings for one family
    pub fn face(&self, family: FontFamily) -> &FaceConfig {
        match family {
            FontFamily::Serif => &self.serif,
            FontFamily::SansSerif => &self.sans_serif,
            FontFamily::Arial => &self.arial,
            FontFamily::Times => &self.times,
            FontFamily::Helvetica => &self.helvetica,
        }
    }
}

/// Render cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Rendered images kept per editor
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 8 }
    }
}

impl CacheConfig {
    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.capacity".to_string(),
                value: self.capacity.to_string(),
            }
            .into());
        }

        Ok(())
    }
}
