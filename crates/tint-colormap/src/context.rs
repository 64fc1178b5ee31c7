//! Process-wide registry of named colormaps and per-category storages.
//!
//! A [`ColorContext`] is created once at startup and shared by reference.
//! Each reload builds a complete [`ColormapSet`] off to the side and swaps
//! it in; readers holding the previous set finish against it undisturbed.
//!
//! The `resolve_*` methods on [`ColorContext`] take both read locks on
//! every call. Hot loops (chunk meshing) should take
//! [`ColorContext::snapshot`] and [`ColorContext::biome_context`] once per
//! batch and call the matching [`ColormapSet`] methods instead:
//!
//! ```ignore
//! let set = colors.snapshot();
//! let biomes = colors.biome_context();
//! for (pos, biome) in section_blocks {
//!     let tint = set.resolve_block(&mut memo, &biomes, &block, &biome, pos);
//! }
//! ```

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use tint_common::{
    BlockKey, BlockPos, BlockStateKey, ColormapError, ColormapResult, DimensionKey, FluidKey,
    SectionPos,
};

use crate::biome::{Biome, BiomeContext, BiomeRegistry, BiomeSource};
use crate::blend::blend;
use crate::cache::BlendedColorCache;
use crate::colormap::{BuildOptions, Colormap};
use crate::config::TintConfig;
use crate::definition::{ColormapDefinition, ColormapTarget, LoadFailure};
use crate::lightmap::{Lightmap, LightmapTexture};
use crate::linear::{LinearColormap, LinearSlot};
use crate::resolver::ResolverMemo;
use crate::storage::{ColormapStorage, StorageBuilder};

/// Named singleton colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColormapSlot {
    /// Water surface tint
    Water,
    /// Fog while under water
    UnderwaterFog,
    /// Overworld sky
    Sky,
    /// Overworld fog
    Fog,
    /// Grass blocks and plants
    Grass,
    /// Leaves and vines
    Foliage,
    /// Birch leaves
    BirchFoliage,
    /// Spruce leaves
    SpruceFoliage,
    /// Grass in swamps
    SwampGrass,
    /// Foliage in swamps
    SwampFoliage,
    /// Splash and drip particles
    WaterParticle,
    /// Nether portal particles
    PortalParticle,
    /// Lava spark particles
    LavaParticle,
    /// Mycelium spore particles
    MyceliumParticle,
}

impl ColormapSlot {
    /// All slots.
    pub const ALL: [Self; 14] = [
        Self::Water,
        Self::UnderwaterFog,
        Self::Sky,
        Self::Fog,
        Self::Grass,
        Self::Foliage,
        Self::BirchFoliage,
        Self::SpruceFoliage,
        Self::SwampGrass,
        Self::SwampFoliage,
        Self::WaterParticle,
        Self::PortalParticle,
        Self::LavaParticle,
        Self::MyceliumParticle,
    ];

    /// Position in [`ColormapSlot::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of one reload.
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Generation of the installed set
    pub generation: u64,
    /// Definitions installed
    pub loaded: usize,
    /// Definitions skipped, with reasons
    pub failures: Vec<LoadFailure>,
    /// Registrations replaced by a later definition
    pub overlaps: usize,
}

/// One complete generation of colormaps. Immutable once built.
#[derive(Debug, Default)]
pub struct ColormapSet {
    generation: u64,
    slots: AHashMap<ColormapSlot, Arc<Colormap>>,
    linear: AHashMap<LinearSlot, LinearColormap>,
    blocks: ColormapStorage<BlockKey>,
    block_states: ColormapStorage<BlockStateKey>,
    sky: ColormapStorage<DimensionKey>,
    fog: ColormapStorage<DimensionKey>,
    fluid_fog: ColormapStorage<FluidKey>,
    lightmaps: AHashMap<DimensionKey, Lightmap>,
}

impl ColormapSet {
    /// Generation number; 0 is the empty set installed at startup.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Colormap installed in a slot.
    #[must_use]
    pub fn slot(&self, slot: ColormapSlot) -> Option<&Arc<Colormap>> {
        self.slots.get(&slot)
    }

    /// Linear colormap installed in a slot.
    #[must_use]
    pub fn linear(&self, slot: LinearSlot) -> Option<&LinearColormap> {
        self.linear.get(&slot)
    }

    /// Block colormaps.
    #[must_use]
    pub fn blocks(&self) -> &ColormapStorage<BlockKey> {
        &self.blocks
    }

    /// Block-state colormaps.
    #[must_use]
    pub fn block_states(&self) -> &ColormapStorage<BlockStateKey> {
        &self.block_states
    }

    /// Sky colormaps by dimension.
    #[must_use]
    pub fn sky(&self) -> &ColormapStorage<DimensionKey> {
        &self.sky
    }

    /// Fog colormaps by dimension.
    #[must_use]
    pub fn fog(&self) -> &ColormapStorage<DimensionKey> {
        &self.fog
    }

    /// In-fluid fog colormaps.
    #[must_use]
    pub fn fluid_fog(&self) -> &ColormapStorage<FluidKey> {
        &self.fluid_fog
    }

    /// Lightmap for a dimension.
    #[must_use]
    pub fn lightmap(&self, dimension: &DimensionKey) -> Option<&Lightmap> {
        self.lightmaps.get(dimension)
    }

    /// Color of a slot for a biome and position.
    #[must_use]
    pub fn resolve_slot(
        &self,
        ctx: &BiomeContext,
        slot: ColormapSlot,
        biome: &Biome,
        pos: BlockPos,
    ) -> Option<u32> {
        self.slots.get(&slot).map(|c| c.resolve(ctx, biome, pos))
    }

    /// Block color; `None` keeps the host's own coloring.
    pub fn resolve_block(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        block: &BlockKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.blocks.resolver(block)?.resolve(memo, ctx, biome, pos)
    }

    /// Block-state color, falling back to the colormap of the owning block.
    pub fn resolve_block_state(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        state: &BlockStateKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        if let Some(resolver) = self.block_states.resolver(state) {
            return resolver.resolve(memo, ctx, biome, pos);
        }
        self.resolve_block(memo, ctx, &BlockKey(state.block.clone()), biome, pos)
    }

    /// Sky color in a dimension.
    pub fn resolve_sky(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        dimension: &DimensionKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.sky.resolver(dimension)?.resolve(memo, ctx, biome, pos)
    }

    /// Fog color in a dimension.
    pub fn resolve_fog(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        dimension: &DimensionKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.fog.resolver(dimension)?.resolve(memo, ctx, biome, pos)
    }

    /// Fog color while the camera is inside `fluid`.
    pub fn resolve_fluid_fog(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        fluid: &FluidKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.fluid_fog.resolver(fluid)?.resolve(memo, ctx, biome, pos)
    }
}

/// Accumulates one generation during a reload.
struct SetBuilder {
    slots: AHashMap<ColormapSlot, Arc<Colormap>>,
    linear: AHashMap<LinearSlot, LinearColormap>,
    blocks: StorageBuilder<BlockKey>,
    block_states: StorageBuilder<BlockStateKey>,
    sky: StorageBuilder<DimensionKey>,
    fog: StorageBuilder<DimensionKey>,
    fluid_fog: StorageBuilder<FluidKey>,
    lightmaps: AHashMap<DimensionKey, Lightmap>,
    singleton_overlaps: usize,
    warn_on_overlap: bool,
}

impl SetBuilder {
    fn new(warn_on_overlap: bool) -> Self {
        Self {
            slots: AHashMap::new(),
            linear: AHashMap::new(),
            blocks: StorageBuilder::new().warn_on_overlap(warn_on_overlap),
            block_states: StorageBuilder::new().warn_on_overlap(warn_on_overlap),
            sky: StorageBuilder::new().warn_on_overlap(warn_on_overlap),
            fog: StorageBuilder::new().warn_on_overlap(warn_on_overlap),
            fluid_fog: StorageBuilder::new().warn_on_overlap(warn_on_overlap),
            lightmaps: AHashMap::new(),
            singleton_overlaps: 0,
            warn_on_overlap,
        }
    }

    fn note_replaced(&mut self, replaced: bool, what: &dyn std::fmt::Display) {
        if replaced {
            self.singleton_overlaps += 1;
            if self.warn_on_overlap {
                warn!("Colormap for {what} replaced by a later definition");
            }
        }
    }

    fn add(
        &mut self,
        definition: &ColormapDefinition,
        ctx: &BiomeContext,
        options: &BuildOptions,
        sky_light_blending: bool,
    ) -> ColormapResult<()> {
        let image = || {
            definition
                .image
                .clone()
                .ok_or(ColormapError::MissingImage(definition.target.category()))
        };

        match &definition.target {
            ColormapTarget::Linear(slot) => {
                let replaced = self.linear.insert(*slot, LinearColormap::new(image()?));
                self.note_replaced(replaced.is_some(), &format_args!("{slot:?}"));
                return Ok(());
            },
            ColormapTarget::Lightmap(dimension) => {
                let lightmap = Lightmap::new(image()?, sky_light_blending)?;
                let replaced = self.lightmaps.insert(dimension.clone(), lightmap);
                self.note_replaced(replaced.is_some(), &format_args!("lightmap {dimension}"));
                return Ok(());
            },
            _ => {},
        }

        let colormap = Arc::new(Colormap::from_properties(
            &definition.properties,
            definition.image.clone(),
            ctx,
            options,
        )?);
        let biomes = definition.properties.parsed_biomes()?;

        match &definition.target {
            ColormapTarget::Slot(slot) => {
                let replaced = self.slots.insert(*slot, colormap);
                self.note_replaced(replaced.is_some(), &format_args!("{slot:?}"));
            },
            ColormapTarget::Blocks(keys) => {
                self.blocks.add_colormap(&colormap, keys.iter().cloned(), &biomes);
            },
            ColormapTarget::BlockStates(keys) => {
                self.block_states
                    .add_colormap(&colormap, keys.iter().cloned(), &biomes);
            },
            ColormapTarget::Sky(keys) => {
                self.sky.add_colormap(&colormap, keys.iter().cloned(), &biomes);
            },
            ColormapTarget::Fog(keys) => {
                self.fog.add_colormap(&colormap, keys.iter().cloned(), &biomes);
            },
            ColormapTarget::FluidFog(keys) => {
                self.fluid_fog
                    .add_colormap(&colormap, keys.iter().cloned(), &biomes);
            },
            ColormapTarget::Linear(_) | ColormapTarget::Lightmap(_) => {},
        }
        Ok(())
    }

    fn overlaps(&self) -> usize {
        self.singleton_overlaps
            + self.blocks.overlaps()
            + self.block_states.overlaps()
            + self.sky.overlaps()
            + self.fog.overlaps()
            + self.fluid_fog.overlaps()
    }

    fn build(self, generation: u64) -> ColormapSet {
        ColormapSet {
            generation,
            slots: self.slots,
            linear: self.linear,
            blocks: self.blocks.build(),
            block_states: self.block_states.build(),
            sky: self.sky.build(),
            fog: self.fog.build(),
            fluid_fog: self.fluid_fog.build(),
            lightmaps: self.lightmaps,
        }
    }
}

/// Shared entry point for every color query.
///
/// Per-call queries are convenient for one-off lookups. For batches, hold a
/// snapshot and biome context for the whole batch; see the module docs.
#[derive(Debug)]
pub struct ColorContext {
    config: TintConfig,
    current: RwLock<Arc<ColormapSet>>,
    biomes: RwLock<Arc<BiomeContext>>,
    caches: Vec<BlendedColorCache>,
}

impl Default for ColorContext {
    fn default() -> Self {
        Self::new(TintConfig::default(), BiomeContext::default())
    }
}

impl ColorContext {
    /// Creates a context with no colormaps installed.
    #[must_use]
    pub fn new(mut config: TintConfig, biomes: BiomeContext) -> Self {
        config.validate();
        let caches = ColormapSlot::ALL
            .iter()
            .map(|_| BlendedColorCache::new(config.cache_capacity))
            .collect();
        Self {
            config,
            current: RwLock::new(Arc::new(ColormapSet::default())),
            biomes: RwLock::new(Arc::new(biomes)),
            caches,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TintConfig {
        &self.config
    }

    /// Current colormap generation. Stays valid across later reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ColormapSet> {
        Arc::clone(&self.current.read())
    }

    /// Current biome context.
    #[must_use]
    pub fn biome_context(&self) -> Arc<BiomeContext> {
        Arc::clone(&self.biomes.read())
    }

    /// Replaces every colormap with ones built from `definitions`.
    ///
    /// A definition that fails to build is logged and skipped; the rest
    /// still install. The new set becomes visible all at once.
    pub fn rebuild(&self, definitions: &[ColormapDefinition]) -> ReloadReport {
        let ctx = self.biome_context();
        let options = self.config.build_options();
        let mut builder = SetBuilder::new(self.config.warn_on_overlap);
        let mut report = ReloadReport::default();

        for definition in definitions {
            match builder.add(definition, &ctx, &options, self.config.sky_light_blending) {
                Ok(()) => {
                    debug!(
                        "Loaded colormap {} ({})",
                        definition.name,
                        definition.target.category()
                    );
                    report.loaded += 1;
                },
                Err(error) => {
                    warn!("Skipping colormap {}: {error}", definition.name);
                    report.failures.push(LoadFailure {
                        name: definition.name.clone(),
                        error,
                    });
                },
            }
        }
        report.overlaps = builder.overlaps();

        {
            let mut current = self.current.write();
            report.generation = current.generation + 1;
            *current = Arc::new(builder.build(report.generation));
        }
        self.invalidate_caches();

        info!(
            "Colormaps reloaded: generation {}, {} loaded, {} failed, {} replaced",
            report.generation,
            report.loaded,
            report.failures.len(),
            report.overlaps
        );
        report
    }

    /// Installs a new biome registry and recomputes the dynamic column
    /// table. Call when joining or leaving a world.
    pub fn set_biome_registry(&self, registry: BiomeRegistry) {
        let next = self.biome_context().with_registry(registry);
        debug!("Biome registry replaced: {next:?}");
        *self.biomes.write() = Arc::new(next);
        self.invalidate_caches();
    }

    /// Drops cached blended colors for one chunk section.
    pub fn invalidate_section(&self, section: SectionPos) {
        for cache in &self.caches {
            cache.invalidate_section(section);
        }
    }

    fn invalidate_caches(&self) {
        for cache in &self.caches {
            cache.invalidate_all();
        }
    }

    /// Whether a pack supplied a colormap for `slot`.
    #[must_use]
    pub fn has_custom_colormap(&self, slot: ColormapSlot) -> bool {
        self.current.read().slots.contains_key(&slot)
    }

    /// Position-independent color of a slot.
    #[must_use]
    pub fn default_color(&self, slot: ColormapSlot) -> Option<u32> {
        self.current
            .read()
            .slot(slot)
            .map(|colormap| colormap.default_color())
    }

    /// Color of a slot for a biome and position.
    ///
    /// Takes a fresh snapshot per call. Per-block loops should use
    /// [`ColormapSet::resolve_slot`] on one [`Self::snapshot`].
    #[must_use]
    pub fn resolve_slot(&self, slot: ColormapSlot, biome: &Biome, pos: BlockPos) -> Option<u32> {
        let ctx = self.biome_context();
        self.snapshot().resolve_slot(&ctx, slot, biome, pos)
    }

    /// Slot color averaged over the configured blend neighborhood, cached
    /// per block until the next reload or section invalidation.
    #[must_use]
    pub fn blended_slot_color(
        &self,
        slot: ColormapSlot,
        source: &dyn BiomeSource,
        pos: BlockPos,
    ) -> Option<u32> {
        let cache = &self.caches[slot.index()];
        // Generation first: a reload between here and the snapshot must
        // reject the insert below.
        let generation = cache.generation();
        if let Some(color) = cache.get(pos) {
            return Some(color);
        }

        let set = self.snapshot();
        let colormap = set.slot(slot)?;
        let ctx = self.biome_context();
        let color = blend(
            self.config.blend_radius,
            self.config.blend_shape,
            pos,
            |sample| Some(colormap.resolve(&ctx, &source.biome_at(sample), sample)),
        )
        .unwrap_or_else(|| colormap.default_color());
        cache.insert(pos, color, generation);
        Some(color)
    }

    /// Linear colormap entry.
    #[must_use]
    pub fn linear_color(&self, slot: LinearSlot, index: usize) -> Option<u32> {
        self.current.read().linear(slot).map(|c| c.color_at(index))
    }

    /// Linear colormap entry at a fraction of the strip.
    #[must_use]
    pub fn linear_fraction(&self, slot: LinearSlot, fraction: f32) -> Option<u32> {
        self.current
            .read()
            .linear(slot)
            .map(|c| c.color_fraction(fraction))
    }

    /// Block color; `None` keeps the host's own coloring.
    ///
    /// Takes a fresh snapshot per call. Per-block loops should use
    /// [`ColormapSet::resolve_block`] on one [`Self::snapshot`].
    pub fn resolve_block(
        &self,
        memo: &mut ResolverMemo,
        block: &BlockKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.snapshot()
            .resolve_block(memo, &self.biome_context(), block, biome, pos)
    }

    /// Block-state color, falling back to the owning block.
    pub fn resolve_block_state(
        &self,
        memo: &mut ResolverMemo,
        state: &BlockStateKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.snapshot()
            .resolve_block_state(memo, &self.biome_context(), state, biome, pos)
    }

    /// Sky color in a dimension.
    pub fn resolve_sky(
        &self,
        memo: &mut ResolverMemo,
        dimension: &DimensionKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.snapshot()
            .resolve_sky(memo, &self.biome_context(), dimension, biome, pos)
    }

    /// Fog color in a dimension.
    pub fn resolve_fog(
        &self,
        memo: &mut ResolverMemo,
        dimension: &DimensionKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.snapshot()
            .resolve_fog(memo, &self.biome_context(), dimension, biome, pos)
    }

    /// Fog color inside a fluid.
    pub fn resolve_fluid_fog(
        &self,
        memo: &mut ResolverMemo,
        fluid: &FluidKey,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.snapshot()
            .resolve_fluid_fog(memo, &self.biome_context(), fluid, biome, pos)
    }

    /// Block light color for a dimension.
    #[must_use]
    pub fn block_light(
        &self,
        dimension: &DimensionKey,
        level: u8,
        flicker: f32,
        night_vision: f32,
    ) -> Option<u32> {
        self.current
            .read()
            .lightmap(dimension)
            .map(|l| l.block_light(level, flicker, night_vision))
    }

    /// Sky light color for a dimension.
    #[must_use]
    pub fn sky_light(
        &self,
        dimension: &DimensionKey,
        level: u8,
        ambience: f32,
        night_vision: f32,
    ) -> Option<u32> {
        self.current
            .read()
            .lightmap(dimension)
            .map(|l| l.sky_light(level, ambience, night_vision))
    }

    /// Composites the light texture for a dimension with the configured
    /// gamma and block light exponent.
    #[must_use]
    pub fn composite_lightmap(
        &self,
        dimension: &DimensionKey,
        ambience: f32,
        flicker: f32,
        night_vision: f32,
    ) -> Option<LightmapTexture> {
        let params = self.config.lightmap_params(ambience, flicker, night_vision);
        self.current
            .read()
            .lightmap(dimension)
            .map(|l| l.composite(&params))
    }
}
