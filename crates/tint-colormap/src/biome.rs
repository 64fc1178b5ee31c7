//! Biomes as seen by the colormap core.
//!
//! The host owns its biome objects; the core only needs a stable identifier,
//! the raw registry id and the two climate axes. Biomes are shared as
//! `Arc<Biome>` so resolvers can compare them by identity.

use ahash::AHashMap;
use std::sync::Arc;

use tint_common::{BlockPos, Identifier};

use crate::columns::ColumnMapping;
use crate::noise::{CoherentNoise, PerlinNoise};

/// A biome with the attributes colormaps read.
#[derive(Debug, Clone, PartialEq)]
pub struct Biome {
    /// Stable identifier (`minecraft:plains`)
    pub key: Identifier,
    /// Raw numeric id in the active registry
    pub raw_id: u32,
    /// Temperature (vanilla range roughly -0.7 to 2.0)
    pub temperature: f32,
    /// Downfall / humidity (vanilla range 0.0 to 1.0)
    pub downfall: f32,
}

impl Biome {
    /// Creates a new biome.
    #[must_use]
    pub fn new(key: Identifier, raw_id: u32, temperature: f32, downfall: f32) -> Self {
        Self {
            key,
            raw_id,
            temperature,
            downfall,
        }
    }
}

/// The host's active set of biomes, replaced whenever a world is joined
/// or left.
#[derive(Debug, Clone, Default)]
pub struct BiomeRegistry {
    biomes: Vec<Arc<Biome>>,
    by_key: AHashMap<Identifier, usize>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from biomes; later duplicates of a key replace
    /// earlier ones.
    pub fn from_biomes(biomes: impl IntoIterator<Item = Arc<Biome>>) -> Self {
        let mut registry = Self::new();
        for biome in biomes {
            registry.insert(biome);
        }
        registry
    }

    /// Adds or replaces a biome.
    pub fn insert(&mut self, biome: Arc<Biome>) {
        if let Some(&index) = self.by_key.get(&biome.key) {
            self.biomes[index] = biome;
        } else {
            self.by_key.insert(biome.key.clone(), self.biomes.len());
            self.biomes.push(biome);
        }
    }

    /// Looks up a biome by identifier.
    #[must_use]
    pub fn get(&self, key: &Identifier) -> Option<&Arc<Biome>> {
        self.by_key.get(key).map(|&i| &self.biomes[i])
    }

    /// Raw registry id for an identifier.
    #[must_use]
    pub fn raw_id(&self, key: &Identifier) -> Option<u32> {
        self.get(key).map(|b| b.raw_id)
    }

    /// Iterates biomes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Biome>> {
        self.biomes.iter()
    }

    /// Number of biomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

/// Host-supplied lookup of the biome at a world position.
///
/// Used by spatial blending to fetch the biome at each neighbor sample.
pub trait BiomeSource: Send + Sync {
    /// Returns the biome at `pos`.
    fn biome_at(&self, pos: BlockPos) -> Arc<Biome>;
}

impl<F> BiomeSource for F
where
    F: Fn(BlockPos) -> Arc<Biome> + Send + Sync,
{
    fn biome_at(&self, pos: BlockPos) -> Arc<Biome> {
        self(pos)
    }
}

/// Everything a colormap needs to know about the current world: the active
/// registry, the column tables derived from it and the host's noise field.
///
/// Immutable; a registry change produces a new context.
#[derive(Clone)]
pub struct BiomeContext {
    registry: Arc<BiomeRegistry>,
    columns: Arc<ColumnMapping>,
    noise: Arc<dyn CoherentNoise>,
}

impl BiomeContext {
    /// Creates a context over `registry` with the built-in column table.
    #[must_use]
    pub fn new(registry: BiomeRegistry, noise: Arc<dyn CoherentNoise>) -> Self {
        Self::with_columns(registry, &ColumnMapping::default(), noise)
    }

    /// Creates a context over `registry` with a custom built-in table.
    #[must_use]
    pub fn with_columns(
        registry: BiomeRegistry,
        base: &ColumnMapping,
        noise: Arc<dyn CoherentNoise>,
    ) -> Self {
        let columns = base.for_registry(&registry);
        Self {
            registry: Arc::new(registry),
            columns: Arc::new(columns),
            noise,
        }
    }

    /// Returns a new context for a changed registry, keeping the noise field
    /// and the built-in table. The dynamic column table is rebuilt.
    #[must_use]
    pub fn with_registry(&self, registry: BiomeRegistry) -> Self {
        Self::with_columns(registry, &self.columns, Arc::clone(&self.noise))
    }

    /// Active biome registry.
    #[must_use]
    pub fn registry(&self) -> &BiomeRegistry {
        &self.registry
    }

    /// Column tables for grid colormaps.
    #[must_use]
    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    /// Host noise field.
    #[must_use]
    pub fn noise(&self) -> &dyn CoherentNoise {
        self.noise.as_ref()
    }
}

impl Default for BiomeContext {
    fn default() -> Self {
        Self::new(BiomeRegistry::new(), Arc::new(PerlinNoise::default()))
    }
}

impl std::fmt::Debug for BiomeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeContext")
            .field("biomes", &self.registry.len())
            .field("dynamic_columns", &self.columns.dynamic_len())
            .finish_non_exhaustive()
    }
}
