use anyhow::{Context, Result};
use fontfield_core::AtlasOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FILE_NAME: &str = "fontfield.toml";

/// Contents of fontfield.toml. Every field is optional.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FontfieldConfig {
    #[serde(default)]
    pub atlas: AtlasSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Distance field generation settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AtlasSection {
    /// Field resolution in pixels per em
    #[serde(default = "default_px_per_em")]
    pub px_per_em: f64,

    /// Distance range in pixels, also used as the padding around each glyph
    #[serde(default = "default_px_range")]
    pub px_range: u32,

    /// Corner detection threshold in radians
    #[serde(default = "default_angle_threshold")]
    pub angle_threshold: f64,

    /// Characters to include in the atlas
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Pixels added to the atlas edge each time packing fails
    #[serde(default = "default_growth_step")]
    pub growth_step: u32,

    /// Largest atlas edge length before giving up
    #[serde(default = "default_max_atlas_size")]
    pub max_atlas_size: u32,
}

impl Default for AtlasSection {
    fn default() -> Self {
        Self {
            px_per_em: default_px_per_em(),
            px_range: default_px_range(),
            angle_threshold: default_angle_threshold(),
            charset: default_charset(),
            growth_step: default_growth_step(),
            max_atlas_size: default_max_atlas_size(),
        }
    }
}

/// Which metadata files to write next to the atlas image
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputSection {
    /// Write a Luau module describing the atlas
    #[serde(default)]
    pub luau: bool,

    /// Write a JSON file describing the atlas
    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            luau: false,
            json: true,
        }
    }
}

fn default_px_per_em() -> f64 {
    32.0
}

fn default_px_range() -> u32 {
    4
}

fn default_angle_threshold() -> f64 {
    3.0
}

fn default_charset() -> String {
    fontfield_core::atlas::printable_ascii().into_iter().collect()
}

fn default_growth_step() -> u32 {
    16
}

fn default_max_atlas_size() -> u32 {
    8192
}

fn default_true() -> bool {
    true
}

impl FontfieldConfig {
    /// Read fontfield.toml from the current directory
    pub fn read() -> Result<Self> {
        Self::read_from(FILE_NAME)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs_err::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&config_str).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// The explicit `path` if given, otherwise fontfield.toml when it
    /// exists, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read_from(path),
            None if Path::new(FILE_NAME).is_file() => Self::read(),
            None => Ok(Self::default()),
        }
    }

    pub fn atlas_options(&self) -> AtlasOptions {
        AtlasOptions {
            px_per_em: self.atlas.px_per_em,
            px_range: self.atlas.px_range,
            angle_threshold: self.atlas.angle_threshold,
            charset: self.atlas.charset.chars().collect(),
            growth_step: self.atlas.growth_step,
            max_atlas_size: self.atlas.max_atlas_size,
        }
    }
}
