//! Per-subject resolvers with a last-biome memo.
//!
//! Renderers walk blocks in contiguous runs, so consecutive queries almost
//! always share a biome. A [`ResolverMemo`] remembers the last biome (by
//! `Arc` identity) and the colormap it resolved to, skipping the table
//! lookup on a repeat. The memo is owned by the calling worker; resolvers
//! themselves hold no mutable state and are shared across threads.

use std::cell::RefCell;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tint_common::{BlockPos, WHITE};

use crate::biome::{Biome, BiomeContext, BiomeSource};
use crate::blend::{blend, BlendShape};
use crate::colormap::Colormap;
use crate::storage::ColormapTable;

/// Global counter for resolver ids. Zero is never handed out.
static RESOLVER_COUNTER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_MEMO: RefCell<ResolverMemo> = RefCell::new(ResolverMemo::new());
}

/// Last-biome memo for one worker.
///
/// A memo may be handed to different resolvers; it resets itself whenever
/// the resolver changes.
#[derive(Debug, Default, Clone)]
pub struct ResolverMemo {
    owner: u64,
    last_biome: Option<Arc<Biome>>,
    last_colormap: Option<Arc<Colormap>>,
    hits: u64,
    misses: u64,
}

impl ResolverMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries answered from the memo.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Queries that went to the tables.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    /// Forgets the remembered biome.
    pub fn clear(&mut self) {
        self.owner = 0;
        self.last_biome = None;
        self.last_colormap = None;
    }
}

/// Resolves colors for one subject against one generation of tables.
#[derive(Debug)]
pub struct Resolver<K> {
    id: u64,
    subject: K,
    table: Arc<ColormapTable<K>>,
}

impl<K: Hash + Eq> Resolver<K> {
    pub(crate) fn new(subject: K, table: Arc<ColormapTable<K>>) -> Self {
        Self {
            id: RESOLVER_COUNTER.fetch_add(1, Ordering::Relaxed),
            subject,
            table,
        }
    }

    /// Subject this resolver serves.
    #[must_use]
    pub fn subject(&self) -> &K {
        &self.subject
    }

    /// Colormap for `biome`, served from the memo when the biome repeats.
    pub fn colormap(&self, memo: &mut ResolverMemo, biome: &Arc<Biome>) -> Option<Arc<Colormap>> {
        if memo.owner == self.id {
            if let Some(last) = &memo.last_biome {
                if Arc::ptr_eq(last, biome) {
                    memo.hits += 1;
                    return memo.last_colormap.clone();
                }
            }
        }

        memo.misses += 1;
        let colormap = self.table.get(&self.subject, &biome.key).cloned();
        memo.owner = self.id;
        memo.last_biome = Some(Arc::clone(biome));
        memo.last_colormap = colormap.clone();
        colormap
    }

    /// Color for `biome` at `pos`, or `None` when no colormap covers this
    /// biome. Callers substitute their own default in that case.
    pub fn resolve(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        self.colormap(memo, biome)
            .map(|colormap| colormap.resolve(ctx, biome, pos))
    }

    /// Like [`Resolver::resolve`], with opaque white for uncovered biomes.
    pub fn resolve_or_white(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> u32 {
        self.resolve(memo, ctx, biome, pos).unwrap_or(WHITE)
    }

    /// Color averaged over the neighborhood of `pos`.
    ///
    /// Each sample fetches its biome from `source`; all samples share
    /// `pos.y`.
    pub fn resolve_blended(
        &self,
        memo: &mut ResolverMemo,
        ctx: &BiomeContext,
        source: &dyn BiomeSource,
        pos: BlockPos,
        radius: u32,
        shape: BlendShape,
    ) -> Option<u32> {
        blend(radius, shape, pos, |sample| {
            let biome = source.biome_at(sample);
            self.resolve(memo, ctx, &biome, sample)
        })
    }

    /// [`Resolver::resolve`] with a per-thread memo, for hosts whose
    /// callback signature leaves no room to pass one.
    pub fn resolve_thread_cached(
        &self,
        ctx: &BiomeContext,
        biome: &Arc<Biome>,
        pos: BlockPos,
    ) -> Option<u32> {
        THREAD_MEMO.with(|memo| self.resolve(&mut memo.borrow_mut(), ctx, biome, pos))
    }

    /// Default color when no position is known.
    #[must_use]
    pub fn default_color(&self) -> Option<u32> {
        self.table.any(&self.subject).map(|c| c.default_color())
    }
}
