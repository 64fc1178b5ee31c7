//! TOML pack manifests.
//!
//! A manifest lists colormap definitions with their palette images,
//! relative to the manifest's own directory:
//!
//! ```toml
//! version = { major = 1, minor = 0, patch = 0 }
//!
//! [[colormap]]
//! name = "grass"
//! image = "grass.png"
//! target = { slot = "grass" }
//!
//! [colormap.properties]
//! format = "vanilla"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use tint_common::{
    BlockKey, BlockStateKey, ColormapError, ColormapResult, ConfigError, DimensionKey, FluidKey,
    PackVersion, TintError, TintResult,
};

use crate::context::ColormapSlot;
use crate::definition::{ColormapDefinition, ColormapTarget, LoadFailure};
use crate::linear::LinearSlot;
use crate::palette::PaletteImage;
use crate::properties::ColormapProperties;

/// Install target as written in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// Named slot
    Slot(ColormapSlot),
    /// Linear slot
    Linear(LinearSlot),
    /// Block identifiers
    Blocks(Vec<String>),
    /// Block states (`block[name=value,...]`)
    BlockStates(Vec<String>),
    /// Dimension identifiers
    Sky(Vec<String>),
    /// Dimension identifiers
    Fog(Vec<String>),
    /// Fluid identifiers
    FluidFog(Vec<String>),
    /// Dimension identifier
    Lightmap(String),
}

impl TargetSpec {
    /// Parses every identifier in the target.
    pub fn resolve(&self) -> ColormapResult<ColormapTarget> {
        fn parse_all<T>(
            raw: &[String],
            parse: impl Fn(&str) -> ColormapResult<T>,
        ) -> ColormapResult<Vec<T>> {
            raw.iter().map(|s| parse(s)).collect()
        }

        Ok(match self {
            Self::Slot(slot) => ColormapTarget::Slot(*slot),
            Self::Linear(slot) => ColormapTarget::Linear(*slot),
            Self::Blocks(raw) => ColormapTarget::Blocks(parse_all(raw, BlockKey::parse)?),
            Self::BlockStates(raw) => {
                ColormapTarget::BlockStates(parse_all(raw, BlockStateKey::parse)?)
            },
            Self::Sky(raw) => ColormapTarget::Sky(parse_all(raw, DimensionKey::parse)?),
            Self::Fog(raw) => ColormapTarget::Fog(parse_all(raw, DimensionKey::parse)?),
            Self::FluidFog(raw) => ColormapTarget::FluidFog(parse_all(raw, FluidKey::parse)?),
            Self::Lightmap(raw) => ColormapTarget::Lightmap(DimensionKey::parse(raw)?),
        })
    }
}

/// One `[[colormap]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Definition name
    pub name: String,
    /// Palette path relative to the manifest
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Install target
    pub target: TargetSpec,
    /// Colormap properties
    #[serde(default)]
    pub properties: ColormapProperties,
}

/// Parsed manifest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackManifest {
    /// Manifest format version
    #[serde(default)]
    pub version: PackVersion,
    /// Colormap entries in load order
    #[serde(default)]
    pub colormap: Vec<ManifestEntry>,
}

impl PackManifest {
    /// Parses manifest text. `origin` names the source in errors.
    pub fn parse(contents: &str, origin: &str) -> TintResult<Self> {
        let manifest: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        if !PackVersion::MANIFEST.is_compatible_with(&manifest.version) {
            return Err(TintError::VersionMismatch {
                expected: PackVersion::MANIFEST.to_string(),
                actual: manifest.version.to_string(),
            });
        }
        Ok(manifest)
    }

    /// Builds definitions, decoding images relative to `base_dir`.
    ///
    /// Entries that fail are reported, not fatal.
    pub fn into_definitions(self, base_dir: &Path) -> LoadedPack {
        let mut pack = LoadedPack::default();

        for entry in self.colormap {
            match entry.load(base_dir) {
                Ok(definition) => pack.definitions.push(definition),
                Err(error) => {
                    warn!("Skipping manifest entry {}: {error}", entry.name);
                    pack.failures.push(LoadFailure {
                        name: entry.name,
                        error,
                    });
                },
            }
        }
        pack
    }
}

impl ManifestEntry {
    fn load(&self, base_dir: &Path) -> ColormapResult<ColormapDefinition> {
        let target = self.target.resolve()?;
        let image = match &self.image {
            Some(relative) => Some(PaletteImage::load(base_dir.join(relative))?),
            None => None,
        };
        Ok(ColormapDefinition::new(
            self.name.clone(),
            self.properties.clone(),
            image,
            target,
        ))
    }
}

/// Definitions read from a manifest, plus entries that could not be read.
#[derive(Debug, Default)]
pub struct LoadedPack {
    /// Ready for [`crate::ColorContext::rebuild`]
    pub definitions: Vec<ColormapDefinition>,
    /// Entries skipped while reading
    pub failures: Vec<LoadFailure>,
}

/// Reads a manifest file and every palette it names.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> TintResult<LoadedPack> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ColormapError::NotFound(path.display().to_string()).into());
    }

    let contents = fs::read_to_string(path)?;
    let manifest = PackManifest::parse(&contents, &path.display().to_string())?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let pack = manifest.into_definitions(base_dir);

    info!(
        "Read manifest {}: {} definitions, {} failed",
        path.display(),
        pack.definitions.len(),
        pack.failures.len()
    );
    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::FormatKind;
    use tempfile::TempDir;
    use tint_common::{pack_rgb, Identifier};

    const MANIFEST: &str = r#"
        version = { major = 1, minor = 0, patch = 0 }

        [[colormap]]
        name = "water"
        target = { slot = "water" }
        [colormap.properties]
        format = "fixed"
        color = "3f76e4"

        [[colormap]]
        name = "leaves"
        image = "leaves.png"
        target = { blocks = ["oak_leaves", "minecraft:jungle_leaves"] }
        [colormap.properties]
        format = "vanilla"

        [[colormap]]
        name = "missing"
        image = "nope.png"
        target = { slot = "grass" }
    "#;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 30, 255]))
            .save(path)
            .expect("write png");
    }

    #[test]
    fn test_parse_targets() {
        let manifest = PackManifest::parse(MANIFEST, "inline").expect("parse");
        assert_eq!(manifest.colormap.len(), 3);
        assert_eq!(manifest.colormap[0].target, TargetSpec::Slot(ColormapSlot::Water));
        assert_eq!(manifest.colormap[0].properties.format, FormatKind::Fixed);

        let target = manifest.colormap[1].target.resolve().expect("valid");
        assert_eq!(
            target,
            ColormapTarget::Blocks(vec![
                BlockKey(Identifier::vanilla("oak_leaves")),
                BlockKey(Identifier::vanilla("jungle_leaves")),
            ])
        );
    }

    #[test]
    fn test_version_mismatch() {
        let result = PackManifest::parse("version = { major = 2, minor = 0, patch = 0 }", "inline");
        assert!(matches!(result, Err(TintError::VersionMismatch { .. })));
    }

    #[test]
    fn test_invalid_identifier_reported() {
        let target = TargetSpec::Blocks(vec!["Not Valid".to_string()]);
        assert!(target.resolve().is_err());
    }

    #[test]
    fn test_load_manifest_with_images() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_png(&dir.path().join("leaves.png"), 256, 256);
        let path = dir.path().join("pack.toml");
        fs::write(&path, MANIFEST).expect("write manifest");

        let pack = load_manifest(&path).expect("load");
        assert_eq!(pack.definitions.len(), 2);
        assert_eq!(pack.failures.len(), 1);
        assert_eq!(pack.failures[0].name, "missing");

        let leaves = &pack.definitions[1];
        let image = leaves.image.as_ref().expect("decoded image");
        assert_eq!(image.get(0, 0), Some(pack_rgb(10, 120, 30)));
    }

    #[test]
    fn test_load_missing_manifest() {
        assert!(matches!(
            load_manifest("/nonexistent/pack.toml"),
            Err(TintError::Colormap(ColormapError::NotFound(_)))
        ));
    }
}
