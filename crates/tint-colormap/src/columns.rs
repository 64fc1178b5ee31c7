//! Biome column assignment for grid-format colormaps.
//!
//! A grid colormap gives every biome its own column (or a run of columns for
//! smoothing). Which column a biome gets depends on the layout the pack was
//! authored against. Biomes the built-in table does not know (modded or
//! data-pack biomes) borrow the column of the built-in biome with the closest
//! climate; that dynamic table is rebuilt from scratch whenever the host's
//! biome registry changes.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tint_common::Identifier;

use crate::biome::BiomeRegistry;

/// Starting column and width assigned to a biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnBounds {
    /// First column
    pub column: u32,
    /// Number of adjacent columns (at least 1)
    pub count: u32,
}

impl ColumnBounds {
    /// Creates bounds; a zero count is widened to 1.
    #[must_use]
    pub const fn new(column: u32, count: u32) -> Self {
        Self {
            column,
            count: if count == 0 { 1 } else { count },
        }
    }

    /// Single-column bounds.
    #[must_use]
    pub const fn single(column: u32) -> Self {
        Self::new(column, 1)
    }
}

/// Column layout policy a grid colormap was authored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    /// Modern identifiers on their historical numeric columns
    #[default]
    Default,
    /// Raw registry id is the column
    Optifine,
    /// Pre-1.18 palettes; newer biomes fold onto a legacy ancestor
    Legacy,
    /// Dense append-only column order
    Stable,
}

/// One entry of the built-in biome table.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinColumn {
    /// Biome identifier
    pub key: Identifier,
    /// Column under [`ColumnLayout::Default`]
    pub column: u32,
    /// Column under [`ColumnLayout::Legacy`]
    pub legacy_column: u32,
    /// Column under [`ColumnLayout::Stable`]
    pub stable_column: u32,
    /// Climate temperature
    pub temperature: f32,
    /// Climate downfall
    pub downfall: f32,
}

/// `(path, default column, legacy column, temperature, downfall)`.
///
/// Order is append-only: the position of an entry is its stable column.
const BUILTIN_BIOMES: &[(&str, u32, u32, f32, f32)] = &[
    ("ocean", 0, 0, 0.5, 0.5),
    ("plains", 1, 1, 0.8, 0.4),
    ("desert", 2, 2, 2.0, 0.0),
    ("windswept_hills", 3, 3, 0.2, 0.3),
    ("forest", 4, 4, 0.7, 0.8),
    ("taiga", 5, 5, 0.25, 0.8),
    ("swamp", 6, 6, 0.8, 0.9),
    ("river", 7, 7, 0.5, 0.5),
    ("nether_wastes", 8, 8, 2.0, 0.0),
    ("the_end", 9, 9, 0.5, 0.5),
    ("frozen_ocean", 10, 10, 0.0, 0.5),
    ("frozen_river", 11, 11, 0.0, 0.5),
    ("snowy_plains", 12, 12, 0.0, 0.5),
    ("mushroom_fields", 14, 14, 0.9, 1.0),
    ("beach", 16, 16, 0.8, 0.4),
    ("jungle", 21, 21, 0.95, 0.9),
    ("sparse_jungle", 23, 23, 0.95, 0.8),
    ("deep_ocean", 24, 24, 0.5, 0.5),
    ("stony_shore", 25, 25, 0.2, 0.3),
    ("snowy_beach", 26, 26, 0.05, 0.3),
    ("birch_forest", 27, 27, 0.6, 0.6),
    ("dark_forest", 29, 29, 0.7, 0.8),
    ("snowy_taiga", 30, 30, -0.5, 0.4),
    ("old_growth_pine_taiga", 32, 32, 0.3, 0.8),
    ("windswept_forest", 34, 34, 0.2, 0.3),
    ("savanna", 35, 35, 2.0, 0.0),
    ("savanna_plateau", 36, 36, 2.0, 0.0),
    ("badlands", 37, 37, 2.0, 0.0),
    ("wooded_badlands", 38, 38, 2.0, 0.0),
    ("small_end_islands", 40, 40, 0.5, 0.5),
    ("end_midlands", 41, 41, 0.5, 0.5),
    ("end_highlands", 42, 42, 0.5, 0.5),
    ("end_barrens", 43, 43, 0.5, 0.5),
    ("warm_ocean", 44, 44, 0.5, 0.5),
    ("lukewarm_ocean", 45, 45, 0.5, 0.5),
    ("cold_ocean", 46, 46, 0.5, 0.5),
    ("deep_lukewarm_ocean", 48, 48, 0.5, 0.5),
    ("deep_cold_ocean", 49, 49, 0.5, 0.5),
    ("deep_frozen_ocean", 50, 50, 0.5, 0.5),
    ("the_void", 127, 127, 0.5, 0.5),
    ("sunflower_plains", 129, 129, 0.8, 0.4),
    ("windswept_gravelly_hills", 131, 131, 0.2, 0.3),
    ("flower_forest", 132, 132, 0.7, 0.8),
    ("ice_spikes", 140, 140, 0.0, 0.5),
    ("old_growth_birch_forest", 155, 155, 0.6, 0.6),
    ("old_growth_spruce_taiga", 160, 160, 0.25, 0.8),
    ("windswept_savanna", 163, 163, 2.0, 0.0),
    ("eroded_badlands", 165, 165, 2.0, 0.0),
    ("bamboo_jungle", 168, 168, 0.95, 0.9),
    ("soul_sand_valley", 170, 170, 2.0, 0.0),
    ("crimson_forest", 171, 171, 2.0, 0.0),
    ("warped_forest", 172, 172, 2.0, 0.0),
    ("basalt_deltas", 173, 173, 2.0, 0.0),
    ("dripstone_caves", 174, 174, 0.8, 0.4),
    ("lush_caves", 175, 175, 0.5, 0.5),
    ("meadow", 177, 1, 0.5, 0.8),
    ("grove", 178, 30, -0.2, 0.8),
    ("snowy_slopes", 179, 13, -0.3, 0.9),
    ("jagged_peaks", 180, 13, -0.7, 0.9),
    ("frozen_peaks", 181, 140, -0.7, 0.9),
    ("stony_peaks", 182, 3, 1.0, 0.3),
    ("deep_dark", 183, 174, 0.8, 0.4),
    ("mangrove_swamp", 184, 6, 0.8, 0.9),
    ("cherry_grove", 185, 132, 0.5, 0.8),
    ("pale_garden", 186, 29, 0.7, 0.8),
];

/// Built-in biome table with the vanilla biome set.
#[must_use]
pub fn builtin_columns() -> Vec<BuiltinColumn> {
    BUILTIN_BIOMES
        .iter()
        .enumerate()
        .map(
            |(stable, &(path, column, legacy_column, temperature, downfall))| BuiltinColumn {
                key: Identifier::vanilla(path),
                column,
                legacy_column,
                stable_column: stable as u32,
                temperature,
                downfall,
            },
        )
        .collect()
}

/// Biome-to-column lookup for every layout.
///
/// Built once from the static table, then refreshed with
/// [`ColumnMapping::for_registry`] whenever the active registry changes.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Built-in entries sorted by default column, lowest first.
    builtins: Vec<BuiltinColumn>,
    index: AHashMap<Identifier, usize>,
    /// Unknown biome -> index of the nearest built-in entry.
    dynamic: AHashMap<Identifier, usize>,
    /// Raw registry ids, for the Optifine layout.
    raw_ids: AHashMap<Identifier, u32>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::with_builtins(builtin_columns())
    }
}

impl ColumnMapping {
    /// Creates a mapping over a custom built-in table and no registry.
    #[must_use]
    pub fn with_builtins(mut builtins: Vec<BuiltinColumn>) -> Self {
        builtins.sort_by_key(|b| b.column);
        let index = builtins
            .iter()
            .enumerate()
            .map(|(i, b)| (b.key.clone(), i))
            .collect();
        Self {
            builtins,
            index,
            dynamic: AHashMap::new(),
            raw_ids: AHashMap::new(),
        }
    }

    /// Returns a copy of this mapping with the dynamic table recomputed for
    /// `registry`. The previous dynamic table is discarded, not merged.
    #[must_use]
    pub fn for_registry(&self, registry: &BiomeRegistry) -> Self {
        let mut dynamic = AHashMap::new();
        let mut raw_ids = AHashMap::with_capacity(registry.len());

        for biome in registry.iter() {
            raw_ids.insert(biome.key.clone(), biome.raw_id);
            if self.index.contains_key(&biome.key) {
                continue;
            }
            if let Some(nearest) = self.nearest(biome.temperature, biome.downfall) {
                debug!(
                    "Biome {} has no built-in column, borrowing {}",
                    biome.key, self.builtins[nearest].key
                );
                dynamic.insert(biome.key.clone(), nearest);
            }
        }

        Self {
            builtins: self.builtins.clone(),
            index: self.index.clone(),
            dynamic,
            raw_ids,
        }
    }

    /// Index of the built-in entry closest in (temperature, downfall) space.
    ///
    /// Downfall is clamped to `[0, 1]` before measuring. On ties the entry
    /// with the lowest default column wins.
    fn nearest(&self, temperature: f32, downfall: f32) -> Option<usize> {
        let downfall = downfall.clamp(0.0, 1.0);
        let mut best: Option<(usize, f32)> = None;

        for (i, entry) in self.builtins.iter().enumerate() {
            let dt = entry.temperature - temperature;
            let dd = entry.downfall.clamp(0.0, 1.0) - downfall;
            let distance = (dt * dt + dd * dd).sqrt();
            match best {
                Some((_, d)) if distance >= d => {},
                _ => best = Some((i, distance)),
            }
        }

        best.map(|(i, _)| i)
    }

    /// Built-in entry closest to the given climate.
    #[must_use]
    pub fn nearest_builtin(&self, temperature: f32, downfall: f32) -> Option<&BuiltinColumn> {
        self.nearest(temperature, downfall).map(|i| &self.builtins[i])
    }

    /// Built-in entry for a key, looking through the dynamic table.
    fn builtin_for(&self, key: &Identifier) -> Option<&BuiltinColumn> {
        self.index
            .get(key)
            .or_else(|| self.dynamic.get(key))
            .map(|&i| &self.builtins[i])
    }

    /// Column bounds for a biome, or `None` if neither the built-in nor the
    /// dynamic table knows it.
    #[must_use]
    pub fn try_bounds(&self, key: &Identifier, layout: ColumnLayout) -> Option<ColumnBounds> {
        match layout {
            ColumnLayout::Optifine => self
                .raw_ids
                .get(key)
                .copied()
                .or_else(|| self.builtin_for(key).map(|b| b.legacy_column))
                .map(ColumnBounds::single),
            ColumnLayout::Default => self.builtin_for(key).map(|b| ColumnBounds::single(b.column)),
            ColumnLayout::Legacy => self
                .builtin_for(key)
                .map(|b| ColumnBounds::single(b.legacy_column)),
            ColumnLayout::Stable => self
                .builtin_for(key)
                .map(|b| ColumnBounds::single(b.stable_column)),
        }
    }

    /// Column bounds for a biome.
    ///
    /// # Panics
    ///
    /// Panics if the biome is in neither table. The dynamic table is
    /// refreshed on every registry change, so this means the caller queried
    /// a biome from a registry that was never installed.
    #[must_use]
    pub fn bounds(&self, key: &Identifier, layout: ColumnLayout) -> ColumnBounds {
        match self.try_bounds(key, layout) {
            Some(bounds) => bounds,
            None => panic!("biome {key} has no column under the {layout:?} layout; registry out of date"),
        }
    }

    /// Whether the key is part of the built-in table.
    #[must_use]
    pub fn is_builtin(&self, key: &Identifier) -> bool {
        self.index.contains_key(key)
    }

    /// Number of registry biomes that borrowed a built-in column.
    #[must_use]
    pub fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use std::sync::Arc;

    fn custom(path: &str, raw_id: u32, temperature: f32, downfall: f32) -> Arc<Biome> {
        Arc::new(Biome::new(
            Identifier::parse(&format!("mymod:{path}")).expect("valid"),
            raw_id,
            temperature,
            downfall,
        ))
    }

    fn entry(path: &str, column: u32, temperature: f32, downfall: f32) -> BuiltinColumn {
        BuiltinColumn {
            key: Identifier::vanilla(path),
            column,
            legacy_column: column,
            stable_column: column,
            temperature,
            downfall,
        }
    }

    #[test]
    fn test_builtin_table_unique() {
        let columns = builtin_columns();
        let mut keys: Vec<_> = columns.iter().map(|c| c.key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), columns.len());

        let mut defaults: Vec<_> = columns.iter().map(|c| c.column).collect();
        defaults.sort_unstable();
        defaults.dedup();
        assert_eq!(defaults.len(), columns.len());
    }

    #[test]
    fn test_default_and_legacy_layouts() {
        let mapping = ColumnMapping::default();
        let meadow = Identifier::vanilla("meadow");
        assert_eq!(mapping.bounds(&meadow, ColumnLayout::Default), ColumnBounds::single(177));
        assert_eq!(mapping.bounds(&meadow, ColumnLayout::Legacy), ColumnBounds::single(1));

        let plains = Identifier::vanilla("plains");
        assert_eq!(mapping.bounds(&plains, ColumnLayout::Stable), ColumnBounds::single(1));
        assert_eq!(mapping.bounds(&plains, ColumnLayout::Optifine), ColumnBounds::single(1));
    }

    #[test]
    fn test_optifine_uses_raw_id() {
        let registry = BiomeRegistry::from_biomes([Arc::new(Biome::new(
            Identifier::vanilla("plains"),
            42,
            0.8,
            0.4,
        ))]);
        let mapping = ColumnMapping::default().for_registry(&registry);
        assert_eq!(
            mapping.bounds(&Identifier::vanilla("plains"), ColumnLayout::Optifine),
            ColumnBounds::single(42)
        );
    }

    #[test]
    fn test_nearest_neighbor_stability() {
        let base = ColumnMapping::with_builtins(vec![
            entry("cold", 3, 0.0, 0.0),
            entry("hot", 9, 1.0, 1.0),
        ]);
        let biome = custom("near_cold", 100, 0.1, 0.1);
        let mapping = base.for_registry(&BiomeRegistry::from_biomes([Arc::clone(&biome)]));

        assert_eq!(mapping.dynamic_len(), 1);
        assert_eq!(
            mapping.bounds(&biome.key, ColumnLayout::Default),
            ColumnBounds::single(3)
        );
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_column() {
        let base = ColumnMapping::with_builtins(vec![
            entry("b", 20, 1.0, 0.5),
            entry("a", 5, 0.0, 0.5),
        ]);
        let nearest = base.nearest_builtin(0.5, 0.5).expect("non-empty table");
        assert_eq!(nearest.column, 5);
    }

    #[test]
    fn test_downfall_clamped() {
        let base = ColumnMapping::with_builtins(vec![
            entry("dry", 1, 0.5, 0.0),
            entry("wet", 2, 0.5, 1.0),
        ]);
        // Downfall 5.0 clamps to 1.0, an exact match for "wet".
        assert_eq!(base.nearest_builtin(0.5, 5.0).map(|b| b.column), Some(2));
    }

    #[test]
    fn test_dynamic_table_replaced_on_refresh() {
        let base = ColumnMapping::default();
        let first = base.for_registry(&BiomeRegistry::from_biomes([custom("a", 200, 0.8, 0.4)]));
        assert_eq!(first.dynamic_len(), 1);

        let second = first.for_registry(&BiomeRegistry::from_biomes([custom("b", 201, 2.0, 0.0)]));
        assert_eq!(second.dynamic_len(), 1);
        let stale = Identifier::parse("mymod:a").expect("valid");
        assert!(second.try_bounds(&stale, ColumnLayout::Default).is_none());
    }

    #[test]
    #[should_panic(expected = "registry out of date")]
    fn test_unknown_biome_panics() {
        let mapping = ColumnMapping::default();
        let unknown = Identifier::parse("mymod:nowhere").expect("valid");
        let _ = mapping.bounds(&unknown, ColumnLayout::Default);
    }
}
