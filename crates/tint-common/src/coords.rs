//! Coordinate types for block positions and chunk sections.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Width of a chunk section along each axis, in blocks.
pub const SECTION_SIZE: i32 = 16;

/// Block position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct BlockPos {
    /// X coordinate (east)
    pub x: i32,
    /// Y coordinate (up)
    pub y: i32,
    /// Z coordinate (south)
    pub z: i32,
}

impl BlockPos {
    /// Origin of the world.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Creates a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns this position shifted by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }

    /// Returns this position with a different height.
    #[must_use]
    pub const fn with_y(self, y: i32) -> Self {
        Self { x: self.x, y, z: self.z }
    }

    /// Converts to the chunk section containing this block.
    #[must_use]
    pub const fn section(self) -> SectionPos {
        SectionPos {
            x: self.x.div_euclid(SECTION_SIZE),
            y: self.y.div_euclid(SECTION_SIZE),
            z: self.z.div_euclid(SECTION_SIZE),
        }
    }

    /// Converts to the local index inside its section's horizontal plane.
    #[must_use]
    pub const fn column_index(self) -> usize {
        let lx = self.x.rem_euclid(SECTION_SIZE) as usize;
        let lz = self.z.rem_euclid(SECTION_SIZE) as usize;
        lz * SECTION_SIZE as usize + lx
    }
}

/// Chunk section coordinate (identifies a 16x16x16 cube of blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct SectionPos {
    /// X coordinate in section space
    pub x: i32,
    /// Y coordinate in section space
    pub y: i32,
    /// Z coordinate in section space
    pub z: i32,
}

impl SectionPos {
    /// Creates a new section coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Converts to block position (minimum corner of the section).
    #[must_use]
    pub const fn min_block(self) -> BlockPos {
        BlockPos {
            x: self.x * SECTION_SIZE,
            y: self.y * SECTION_SIZE,
            z: self.z * SECTION_SIZE,
        }
    }
}
