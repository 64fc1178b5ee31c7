//! # Tint Colormap
//!
//! Colormap resolution and caching for biome, sky, fog and light colors.
//!
//! This crate provides:
//! - Palette images decoded from PNG
//! - Colormaps in three addressing formats (fixed, vanilla climate
//!   triangle, grid of biome columns by height)
//! - Biome column mapping with a nearest-neighbor fallback for unknown
//!   biomes
//! - Per-category storages with memoizing resolvers
//! - Spatial biome blending and a generation-fenced color cache
//! - Lightmap compositing
//! - A shared [`ColorContext`] reloaded by atomic swap
//!
//! ## Reload
//!
//! The host collects [`ColormapDefinition`]s (directly or from a TOML
//! manifest) and calls [`ColorContext::rebuild`]. A new [`ColormapSet`] is
//! built in full, then replaces the old one in a single swap. Readers that
//! took a snapshot keep using it until they drop it.
//!
//! ## Hot Path
//!
//! Per-block queries go through a [`Resolver`] with a caller-owned
//! [`ResolverMemo`]. Consecutive queries in the same biome skip the table
//! lookup entirely. Queries never fail; uncovered subjects return `None`
//! and broken palettes return sentinel colors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod biome;
pub mod blend;
pub mod cache;
pub mod colormap;
pub mod columns;
pub mod config;
pub mod context;
pub mod definition;
pub mod lightmap;
pub mod linear;
pub mod manifest;
pub mod noise;
pub mod palette;
pub mod properties;
pub mod resolver;
pub mod storage;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::biome::*;
    pub use crate::blend::*;
    pub use crate::cache::*;
    pub use crate::colormap::*;
    pub use crate::columns::*;
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::definition::*;
    pub use crate::lightmap::*;
    pub use crate::linear::*;
    pub use crate::manifest::*;
    pub use crate::noise::*;
    pub use crate::palette::*;
    pub use crate::properties::*;
    pub use crate::resolver::*;
    pub use crate::storage::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tint_common::{BlockKey, BlockPos, Identifier};

    #[test]
    fn test_end_to_end_vanilla_grass() {
        let image = PaletteImage::from_fn(256, 256, |x, y| {
            tint_common::pack_rgb(x as u8, y as u8, 0)
        })
        .expect("valid");
        let grass = BlockKey(Identifier::vanilla("grass_block"));
        let ctx = ColorContext::default();
        let report = ctx.rebuild(&[ColormapDefinition::new(
            "grass",
            ColormapProperties::default(),
            Some(image),
            ColormapTarget::Blocks(vec![grass.clone()]),
        )]);
        assert!(report.failures.is_empty());

        // temperature 0.747 -> x = floor(0.253 * 255) = 64
        // rain = 1.0 * 0.747 -> y = 64
        let biome = Arc::new(Biome::new(Identifier::vanilla("forest"), 4, 0.747, 1.0));
        let mut memo = ResolverMemo::new();
        let color = ctx.resolve_block(&mut memo, &grass, &biome, BlockPos::new(5, 70, -3));
        assert_eq!(color, Some(tint_common::pack_rgb(64, 64, 0)));

        ctx.resolve_block(&mut memo, &grass, &biome, BlockPos::new(6, 70, -3));
        assert_eq!(memo.hits(), 1);
    }
}
