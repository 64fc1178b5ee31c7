//! One-dimensional colormaps indexed by a scalar.
//!
//! Redstone power, stem age and similar values pick a color from a strip of
//! pixels read in row-major order.

use serde::{Deserialize, Serialize};

use crate::palette::PaletteImage;

/// Named 1-D colormap slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSlot {
    /// Redstone wire by power level 0-15
    Redstone,
    /// Pumpkin stem by age 0-7
    PumpkinStem,
    /// Melon stem by age 0-7
    MelonStem,
    /// Dripping lava particle by age
    LavaDrop,
    /// Item durability bar by remaining fraction
    Durability,
}

impl LinearSlot {
    /// All slots.
    pub const ALL: [Self; 5] = [
        Self::Redstone,
        Self::PumpkinStem,
        Self::MelonStem,
        Self::LavaDrop,
        Self::Durability,
    ];
}

/// Palette read as a flat sequence of colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearColormap {
    image: PaletteImage,
}

impl LinearColormap {
    /// Wraps a palette.
    #[must_use]
    pub fn new(image: PaletteImage) -> Self {
        Self { image }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.image.len()
    }

    /// Always false; palettes are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Color at `index`, clamped to the last entry.
    #[must_use]
    pub fn color_at(&self, index: usize) -> u32 {
        let last = self.len().saturating_sub(1);
        self.image.linear(index.min(last)).unwrap_or(tint_common::WHITE)
    }

    /// Color at a fraction of the strip; `0.0` is the first entry and
    /// `1.0` the last.
    #[must_use]
    pub fn color_fraction(&self, fraction: f32) -> u32 {
        let last = self.len().saturating_sub(1);
        let index = (fraction.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.color_at(index)
    }
}
