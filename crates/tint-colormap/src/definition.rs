//! Colormap definitions handed to a reload.

use tint_common::{BlockKey, BlockStateKey, ColormapError, DimensionKey, FluidKey};

use crate::context::ColormapSlot;
use crate::linear::LinearSlot;
use crate::palette::PaletteImage;
use crate::properties::ColormapProperties;

/// Where a built colormap is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColormapTarget {
    /// A named singleton slot (water, sky, fog, ...)
    Slot(ColormapSlot),
    /// A 1-D palette (redstone, stems, ...)
    Linear(LinearSlot),
    /// Block colormaps for each listed block
    Blocks(Vec<BlockKey>),
    /// Block colormaps for exact block states
    BlockStates(Vec<BlockStateKey>),
    /// Per-dimension sky colors
    Sky(Vec<DimensionKey>),
    /// Per-dimension fog colors
    Fog(Vec<DimensionKey>),
    /// Fog while the camera is inside a fluid
    FluidFog(Vec<FluidKey>),
    /// Lightmap palette for one dimension
    Lightmap(DimensionKey),
}

impl ColormapTarget {
    /// Short category name for logs.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Slot(_) => "slot",
            Self::Linear(_) => "linear",
            Self::Blocks(_) => "blocks",
            Self::BlockStates(_) => "block_states",
            Self::Sky(_) => "sky",
            Self::Fog(_) => "fog",
            Self::FluidFog(_) => "fluid_fog",
            Self::Lightmap(_) => "lightmap",
        }
    }
}

/// One parsed colormap: properties, decoded palette, and target.
#[derive(Debug, Clone)]
pub struct ColormapDefinition {
    /// Name used in logs and failure reports
    pub name: String,
    /// Authored properties
    pub properties: ColormapProperties,
    /// Decoded palette, if the definition has one
    pub image: Option<PaletteImage>,
    /// Install target
    pub target: ColormapTarget,
}

impl ColormapDefinition {
    /// Creates a definition.
    pub fn new(
        name: impl Into<String>,
        properties: ColormapProperties,
        image: Option<PaletteImage>,
        target: ColormapTarget,
    ) -> Self {
        Self {
            name: name.into(),
            properties,
            image,
            target,
        }
    }
}

/// A definition skipped during load or reload.
#[derive(Debug)]
pub struct LoadFailure {
    /// Definition name
    pub name: String,
    /// Why it was skipped
    pub error: ColormapError,
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}
