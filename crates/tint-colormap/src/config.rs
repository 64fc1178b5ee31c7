//! Runtime configuration.
//!
//! Blend radius, lightmap tuning and reload policy. Loaded from and saved
//! to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

use tint_common::ConfigError;

use crate::blend::{BlendShape, MAX_BLEND_RADIUS};
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::colormap::BuildOptions;
use crate::columns::ColumnLayout;
use crate::lightmap::LightmapParams;

/// Configuration file name.
pub const CONFIG_FILE: &str = "tint.toml";

/// Colormap configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintConfig {
    // === Blending ===
    /// Biome blend radius in blocks (0 = no blending)
    pub blend_radius: u32,
    /// Neighborhood shape used when blending
    pub blend_shape: BlendShape,
    /// Maximum number of blended block colors cached
    pub cache_capacity: usize,

    // === Lightmap ===
    /// Interpolate between sky light columns
    pub sky_light_blending: bool,
    /// How fast block light fades under bright sky (0 = never)
    pub block_light_exponent: f32,
    /// Brightness option (0.0 - 1.0)
    pub gamma: f32,

    // === Loading ===
    /// Layout for grid colormaps that do not name one
    pub default_layout: ColumnLayout,
    /// Reject vanilla palettes that are not 256x256
    pub strict_vanilla_dimensions: bool,
    /// Log when a later definition replaces an earlier one
    pub warn_on_overlap: bool,
}

impl Default for TintConfig {
    fn default() -> Self {
        Self {
            // Blending
            blend_radius: 2,
            blend_shape: BlendShape::Square,
            cache_capacity: DEFAULT_CACHE_CAPACITY,

            // Lightmap
            sky_light_blending: true,
            block_light_exponent: 0.0,
            gamma: 0.5,

            // Loading
            default_layout: ColumnLayout::Default,
            strict_vanilla_dimensions: true,
            warn_on_overlap: true,
        }
    }
}

impl TintConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("{e}");
                Self::default()
            },
        }
    }

    /// Load configuration, reporting read and parse failures.
    ///
    /// The loaded values are validated.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let parse_error = |message: String| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        };

        let contents = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        let mut config: Self = toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?;
        config.validate();
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self
            .to_toml()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Serializes to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.blend_radius = self.blend_radius.min(MAX_BLEND_RADIUS);
        self.cache_capacity = self.cache_capacity.max(1);

        self.gamma = self.gamma.clamp(0.0, 1.0);
        self.block_light_exponent = self.block_light_exponent.clamp(0.0, 32.0);
    }

    /// Options for building colormaps from definitions.
    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            strict_vanilla_dimensions: self.strict_vanilla_dimensions,
            default_layout: self.default_layout,
        }
    }

    /// Lightmap parameters for a frame, with the configured tuning applied.
    #[must_use]
    pub fn lightmap_params(&self, ambience: f32, flicker: f32, night_vision: f32) -> LightmapParams {
        LightmapParams {
            ambience,
            flicker,
            night_vision,
            gamma: self.gamma,
            block_light_exponent: self.block_light_exponent,
        }
    }
}
