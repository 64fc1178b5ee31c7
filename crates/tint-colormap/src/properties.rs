//! Parsed colormap properties.
//!
//! The host's resource layer turns each properties file into one of these;
//! the fields mirror what a pack author writes. Serde keeps the shape usable
//! from TOML manifests as well.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use tint_common::{parse_hex, ColormapError, ColormapResult, Identifier};

use crate::biome::BiomeContext;
use crate::columns::{ColumnBounds, ColumnLayout};

/// Addressing format named in a properties file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// One color everywhere
    Fixed,
    /// 256x256 temperature/downfall gradient
    #[default]
    Vanilla,
    /// Column per biome, row per height
    Grid,
}

impl FormatKind {
    /// Lowercase name used in files and messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Vanilla => "vanilla",
            Self::Grid => "grid",
        }
    }
}

/// One authored run of grid columns shared by a set of biomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridEntry {
    /// Biome identifiers assigned to this run
    pub biomes: Vec<String>,
    /// First column; omitted means "right after the previous entry"
    pub column: Option<u32>,
    /// Number of columns in the run
    pub width: u32,
}

impl Default for GridEntry {
    fn default() -> Self {
        Self {
            biomes: Vec::new(),
            column: None,
            width: 1,
        }
    }
}

/// Properties of one colormap definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColormapProperties {
    /// Addressing format
    pub format: FormatKind,
    /// Authored hex color (fixed format)
    pub color: Option<String>,
    /// Height subtracted before indexing grid rows
    pub y_offset: i32,
    /// Vertical jitter amplitude for grid rows
    pub y_variance: i32,
    /// Column layout; falls back to the configured default
    pub layout: Option<ColumnLayout>,
    /// Biomes this colormap is restricted to; empty means all biomes
    pub biomes: Vec<String>,
    /// Explicit column assignment (grid format)
    pub grid: Vec<GridEntry>,
}

impl ColormapProperties {
    /// Parses the authored color, if any.
    pub fn parsed_color(&self) -> ColormapResult<Option<u32>> {
        self.color.as_deref().map(parse_hex).transpose()
    }

    /// Parses the biome restriction list.
    pub fn parsed_biomes(&self) -> ColormapResult<Vec<Identifier>> {
        self.biomes.iter().map(|b| Identifier::parse(b)).collect()
    }

    /// Builds the explicit biome-to-column map from the grid entries.
    ///
    /// Every biome must be known either to the built-in table or to the
    /// context's registry.
    pub fn explicit_columns(
        &self,
        ctx: &BiomeContext,
    ) -> ColormapResult<AHashMap<Identifier, ColumnBounds>> {
        let mut explicit = AHashMap::new();
        let mut cursor = 0u32;

        for entry in &self.grid {
            let column = entry.column.unwrap_or(cursor);
            let bounds = ColumnBounds::new(column, entry.width);
            cursor = column.saturating_add(bounds.count);

            for raw in &entry.biomes {
                let key = Identifier::parse(raw)?;
                if !ctx.columns().is_builtin(&key) && ctx.registry().get(&key).is_none() {
                    return Err(ColormapError::UnknownBiome(key.to_string()));
                }
                explicit.insert(key, bounds);
            }
        }

        Ok(explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_properties() {
        let props: ColormapProperties = toml::from_str(
            r#"
            format = "grid"
            y_offset = 60
            y_variance = 2
            layout = "legacy"
            biomes = ["plains", "minecraft:desert"]

            [[grid]]
            biomes = ["plains"]
            width = 3

            [[grid]]
            biomes = ["desert"]
            "#,
        )
        .expect("valid toml");

        assert_eq!(props.format, FormatKind::Grid);
        assert_eq!(props.layout, Some(ColumnLayout::Legacy));
        assert_eq!(props.grid.len(), 2);
        assert_eq!(props.grid[1].width, 1);
        assert_eq!(props.parsed_biomes().expect("valid").len(), 2);
    }

    #[test]
    fn test_explicit_columns_cursor() {
        let props = ColormapProperties {
            format: FormatKind::Grid,
            grid: vec![
                GridEntry {
                    biomes: vec!["plains".into()],
                    column: Some(4),
                    width: 3,
                },
                GridEntry {
                    biomes: vec!["desert".into(), "badlands".into()],
                    column: None,
                    width: 1,
                },
            ],
            ..Default::default()
        };
        let explicit = props
            .explicit_columns(&BiomeContext::default())
            .expect("known biomes");

        assert_eq!(explicit[&Identifier::vanilla("plains")], ColumnBounds::new(4, 3));
        assert_eq!(explicit[&Identifier::vanilla("desert")], ColumnBounds::single(7));
        assert_eq!(explicit[&Identifier::vanilla("badlands")], ColumnBounds::single(7));
    }

    #[test]
    fn test_explicit_columns_unknown_biome() {
        let props = ColormapProperties {
            grid: vec![GridEntry {
                biomes: vec!["mymod:nowhere".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = props
            .explicit_columns(&BiomeContext::default())
            .expect_err("unknown biome");
        assert!(matches!(err, ColormapError::UnknownBiome(_)));
    }

    #[test]
    fn test_parsed_color() {
        let props = ColormapProperties {
            color: Some("#3F76E4".into()),
            ..Default::default()
        };
        assert_eq!(props.parsed_color().expect("valid"), Some(0xFF3F_76E4));
        assert_eq!(ColormapProperties::default().parsed_color().expect("none"), None);
    }
}
