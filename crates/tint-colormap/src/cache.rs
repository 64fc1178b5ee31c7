//! Host-side cache of blended colors per block.
//!
//! Blending is the expensive part of a color query, so renderers cache the
//! result per block. The cache must be emptied whenever the colormaps or the
//! biome registry change. Invalidation and insertion share one mutex, and
//! inserts carry the generation they started computing under: a worker that
//! began before an invalidation cannot write its stale color back afterwards.

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::debug;

use tint_common::{BlockPos, SectionPos};

/// Default number of cached blocks before the cache is flushed.
pub const DEFAULT_CACHE_CAPACITY: usize = 1 << 16;

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    colors: AHashMap<BlockPos, u32>,
}

/// Blended color cache shared by all render workers.
#[derive(Debug)]
pub struct BlendedColorCache {
    state: Mutex<CacheState>,
    capacity: usize,
}

impl Default for BlendedColorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl BlendedColorCache {
    /// Creates a cache holding at most `capacity` blocks.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: capacity.max(1),
        }
    }

    /// Current generation. Capture it before computing a color to insert.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Cached color for a block.
    #[must_use]
    pub fn get(&self, pos: BlockPos) -> Option<u32> {
        self.state.lock().colors.get(&pos).copied()
    }

    /// Stores a color computed under `generation`.
    ///
    /// Returns `false` (and stores nothing) if the cache was invalidated
    /// since that generation was read.
    pub fn insert(&self, pos: BlockPos, color: u32, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        if state.colors.len() >= self.capacity && !state.colors.contains_key(&pos) {
            state.colors.clear();
        }
        state.colors.insert(pos, color);
        true
    }

    /// Drops every entry and starts a new generation.
    pub fn invalidate_all(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        let dropped = state.colors.len();
        state.colors.clear();
        debug!("Invalidated color cache ({dropped} entries), generation {}", state.generation);
    }

    /// Drops the entries of one chunk section and starts a new generation.
    pub fn invalidate_section(&self, section: SectionPos) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.colors.retain(|pos, _| pos.section() != section);
    }

    /// Number of cached blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().colors.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_insert_then_get() {
        let cache = BlendedColorCache::default();
        let pos = BlockPos::new(1, 2, 3);
        assert_eq!(cache.get(pos), None);
        assert!(cache.insert(pos, 7, cache.generation()));
        assert_eq!(cache.get(pos), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_late_insert_rejected_after_invalidation() {
        let cache = BlendedColorCache::default();
        let pos = BlockPos::new(0, 64, 0);

        let started = cache.generation();
        cache.invalidate_all();
        assert!(!cache.insert(pos, 0xFF00_0000, started));
        assert_eq!(cache.get(pos), None);

        let fresh = cache.generation();
        assert!(cache.insert(pos, 0xFF11_1111, fresh));
        assert_eq!(cache.get(pos), Some(0xFF11_1111));
    }

    #[test]
    fn test_invalidate_section() {
        let cache = BlendedColorCache::default();
        let generation = cache.generation();
        cache.insert(BlockPos::new(1, 1, 1), 1, generation);
        cache.insert(BlockPos::new(17, 1, 1), 2, generation);

        cache.invalidate_section(SectionPos::new(0, 0, 0));
        assert_eq!(cache.get(BlockPos::new(1, 1, 1)), None);
        assert_eq!(cache.get(BlockPos::new(17, 1, 1)), Some(2));
    }

    #[test]
    fn test_capacity_flush() {
        let cache = BlendedColorCache::new(2);
        let generation = cache.generation();
        cache.insert(BlockPos::new(0, 0, 0), 1, generation);
        cache.insert(BlockPos::new(1, 0, 0), 2, generation);
        cache.insert(BlockPos::new(2, 0, 0), 3, generation);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(BlockPos::new(2, 0, 0)), Some(3));
    }

    #[test]
    fn test_concurrent_invalidation_never_resurrects() {
        let cache = Arc::new(BlendedColorCache::default());
        let pos = BlockPos::new(5, 5, 5);

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let generation = cache.generation();
                        cache.insert(pos, 0xFF00_00AA, generation);
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            cache.invalidate_all();
        }
        for writer in writers {
            writer.join().expect("writer panicked");
        }

        // Once writers are done, a final invalidation must stick.
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
