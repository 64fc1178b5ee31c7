//! # Tint Common
//!
//! Common types, utilities, and shared abstractions for Tint.
//!
//! This crate provides foundational types used across the colormap crates:
//! - Block positions and chunk section coordinates
//! - Namespaced identifiers and the subject keys colormaps are registered under
//! - Packed ARGB color helpers
//! - Version information for pack manifests
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod coords;
pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_pos_section() {
        let pos = BlockPos::new(-1, 70, 33);
        assert_eq!(pos.section(), SectionPos::new(-1, 4, 2));
    }

    #[test]
    fn test_identifier_default_namespace() {
        let id = Identifier::parse("plains").expect("valid identifier");
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.path(), "plains");
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = PackVersion::new(1, 0, 0);
        let v2 = PackVersion::new(1, 1, 0);
        let v3 = PackVersion::new(2, 0, 0);

        // v2 can read v1 manifests (newer reader, older data)
        assert!(v2.is_compatible_with(&v1));
        // Different major versions are incompatible
        assert!(!v1.is_compatible_with(&v3));
    }
}
