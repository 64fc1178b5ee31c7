//! Subject-indexed colormap tables.
//!
//! Each category (blocks, block states, dimensions, fluids) gets one
//! [`ColormapStorage`] keyed by its own subject type. A storage is built in
//! bulk by a [`StorageBuilder`] during reload and is read-only afterwards;
//! the next reload builds a fresh one.

use ahash::AHashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::warn;

use tint_common::Identifier;

use crate::biome::Biome;
use crate::colormap::Colormap;
use crate::resolver::Resolver;

/// The two data tables shared by a storage and its resolvers.
#[derive(Debug)]
pub struct ColormapTable<K> {
    /// subject -> biome -> colormap
    qualified: AHashMap<K, AHashMap<Identifier, Arc<Colormap>>>,
    /// subject -> colormap for every biome
    fallback: AHashMap<K, Arc<Colormap>>,
}

impl<K> Default for ColormapTable<K> {
    fn default() -> Self {
        Self {
            qualified: AHashMap::new(),
            fallback: AHashMap::new(),
        }
    }
}

impl<K: Hash + Eq> ColormapTable<K> {
    /// Biome-qualified entry first, then the biome-agnostic one.
    #[must_use]
    pub fn get(&self, subject: &K, biome: &Identifier) -> Option<&Arc<Colormap>> {
        self.qualified
            .get(subject)
            .and_then(|by_biome| by_biome.get(biome))
            .or_else(|| self.fallback.get(subject))
    }

    /// Biome-agnostic entry, or any qualified entry when there is none.
    /// Used where no biome is available.
    #[must_use]
    pub fn any(&self, subject: &K) -> Option<&Arc<Colormap>> {
        self.fallback.get(subject).or_else(|| {
            self.qualified
                .get(subject)
                .and_then(|by_biome| by_biome.values().next())
        })
    }
}

/// Collects colormaps during a reload.
#[derive(Debug)]
pub struct StorageBuilder<K> {
    table: ColormapTable<K>,
    warn_on_overlap: bool,
    overlaps: usize,
}

impl<K> Default for StorageBuilder<K> {
    fn default() -> Self {
        Self {
            table: ColormapTable::default(),
            warn_on_overlap: true,
            overlaps: 0,
        }
    }
}

impl<K> StorageBuilder<K>
where
    K: Hash + Eq + Clone + std::fmt::Display,
{
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether replaced entries are logged.
    #[must_use]
    pub fn warn_on_overlap(mut self, warn: bool) -> Self {
        self.warn_on_overlap = warn;
        self
    }

    /// Registers `colormap` for every subject.
    ///
    /// With no biomes it applies to all biomes; otherwise it is installed
    /// once per `(subject, biome)` pair. A later registration for the same
    /// key replaces the earlier one.
    pub fn add_colormap(
        &mut self,
        colormap: &Arc<Colormap>,
        subjects: impl IntoIterator<Item = K>,
        biomes: &[Identifier],
    ) {
        for subject in subjects {
            if biomes.is_empty() {
                let replaced = self
                    .table
                    .fallback
                    .insert(subject.clone(), Arc::clone(colormap));
                if replaced.is_some() {
                    self.overlaps += 1;
                    if self.warn_on_overlap {
                        warn!("Colormap for {subject} replaced by a later definition");
                    }
                }
                continue;
            }

            let by_biome = self.table.qualified.entry(subject.clone()).or_default();
            for biome in biomes {
                if by_biome
                    .insert(biome.clone(), Arc::clone(colormap))
                    .is_some()
                {
                    self.overlaps += 1;
                    if self.warn_on_overlap {
                        warn!("Colormap for {subject} in biome {biome} replaced by a later definition");
                    }
                }
            }
        }
    }

    /// Number of replaced registrations so far.
    #[must_use]
    pub const fn overlaps(&self) -> usize {
        self.overlaps
    }

    /// Freezes the tables and creates one resolver per subject.
    #[must_use]
    pub fn build(self) -> ColormapStorage<K> {
        let table = Arc::new(self.table);

        let mut resolvers = AHashMap::new();
        let subjects = table.qualified.keys().chain(table.fallback.keys());
        for subject in subjects {
            if !resolvers.contains_key(subject) {
                resolvers.insert(
                    subject.clone(),
                    Arc::new(Resolver::new(subject.clone(), Arc::clone(&table))),
                );
            }
        }

        ColormapStorage { table, resolvers }
    }
}

/// Read-only colormap tables for one category, plus memoized resolvers.
#[derive(Debug)]
pub struct ColormapStorage<K> {
    table: Arc<ColormapTable<K>>,
    resolvers: AHashMap<K, Arc<Resolver<K>>>,
}

impl<K> Default for ColormapStorage<K> {
    fn default() -> Self {
        Self {
            table: Arc::new(ColormapTable::default()),
            resolvers: AHashMap::new(),
        }
    }
}

impl<K: Hash + Eq> ColormapStorage<K> {
    /// Colormap for a subject in a biome.
    #[must_use]
    pub fn get(&self, subject: &K, biome: &Biome) -> Option<&Arc<Colormap>> {
        self.table.get(subject, &biome.key)
    }

    /// Resolver for a subject; `None` means the subject keeps its default
    /// coloring.
    #[must_use]
    pub fn resolver(&self, subject: &K) -> Option<&Arc<Resolver<K>>> {
        self.resolvers.get(subject)
    }

    /// Whether any colormap targets this subject.
    #[must_use]
    pub fn contains(&self, subject: &K) -> bool {
        self.resolvers.contains_key(subject)
    }

    /// Default color for a subject when no position is known.
    #[must_use]
    pub fn default_color(&self, subject: &K) -> Option<u32> {
        self.table.any(subject).map(|c| c.default_color())
    }

    /// Number of subjects with colormaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the storage has no colormaps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Iterates subjects with colormaps.
    pub fn subjects(&self) -> impl Iterator<Item = &K> {
        self.resolvers.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tint_common::BlockKey;

    fn block(path: &str) -> BlockKey {
        BlockKey(Identifier::vanilla(path))
    }

    fn biome(path: &str) -> Biome {
        Biome::new(Identifier::vanilla(path), 0, 0.5, 0.5)
    }

    #[test]
    fn test_fallback_precedence() {
        let generic = Arc::new(Colormap::fixed(0xFF00_0001));
        let swampy = Arc::new(Colormap::fixed(0xFF00_0002));

        let mut builder = StorageBuilder::new();
        builder.add_colormap(&generic, [block("vine")], &[]);
        builder.add_colormap(&swampy, [block("vine")], &[Identifier::vanilla("swamp")]);
        let storage = builder.build();

        let in_swamp = storage.get(&block("vine"), &biome("swamp")).expect("qualified");
        assert!(Arc::ptr_eq(in_swamp, &swampy));
        let in_plains = storage.get(&block("vine"), &biome("plains")).expect("fallback");
        assert!(Arc::ptr_eq(in_plains, &generic));
        assert!(storage.get(&block("oak_leaves"), &biome("plains")).is_none());
    }

    #[test]
    fn test_resolver_iff_entry() {
        let colormap = Arc::new(Colormap::fixed(0xFF12_3456));
        let mut builder = StorageBuilder::new();
        builder.add_colormap(&colormap, [block("grass_block")], &[]);
        builder.add_colormap(
            &colormap,
            [block("fern"), block("grass_block")],
            &[Identifier::vanilla("jungle")],
        );
        let storage = builder.build();

        assert_eq!(storage.len(), 2);
        assert!(storage.resolver(&block("grass_block")).is_some());
        assert!(storage.resolver(&block("fern")).is_some());
        assert!(storage.resolver(&block("stone")).is_none());
        assert_eq!(storage.default_color(&block("fern")), Some(0xFF12_3456));
    }

    #[test]
    fn test_last_writer_wins() {
        let first = Arc::new(Colormap::fixed(0xFF00_0001));
        let second = Arc::new(Colormap::fixed(0xFF00_0002));
        let plains = [Identifier::vanilla("plains")];

        let mut builder = StorageBuilder::new().warn_on_overlap(false);
        builder.add_colormap(&first, [block("vine")], &plains);
        builder.add_colormap(&second, [block("vine")], &plains);
        builder.add_colormap(&first, [block("vine")], &[]);
        builder.add_colormap(&second, [block("vine")], &[]);
        assert_eq!(builder.overlaps(), 2);

        let storage = builder.build();
        let got = storage.get(&block("vine"), &biome("plains")).expect("entry");
        assert!(Arc::ptr_eq(got, &second));
    }

    #[test]
    fn test_empty_storage() {
        let storage: ColormapStorage<BlockKey> = ColormapStorage::default();
        assert!(storage.is_empty());
        assert_eq!(storage.default_color(&block("vine")), None);
    }
}
