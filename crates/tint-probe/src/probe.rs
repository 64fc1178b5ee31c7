//! Report formatting.

use std::io::{self, Write};
use std::sync::Arc;

use tint_colormap::{
    builtin_columns, Biome, BiomeRegistry, ColorContext, ColormapSlot, LinearSlot, LoadFailure,
    ReloadReport,
};
use tint_common::{channels, BlockPos};

/// Biomes sampled in the report.
const SAMPLE_BIOMES: [&str; 6] = ["plains", "desert", "swamp", "jungle", "taiga", "snowy_plains"];

/// Registry of every built-in biome, with the default column as raw id.
pub fn builtin_registry() -> BiomeRegistry {
    BiomeRegistry::from_biomes(builtin_columns().into_iter().map(|entry| {
        Arc::new(Biome::new(
            entry.key,
            entry.column,
            entry.temperature,
            entry.downfall,
        ))
    }))
}

/// `#rrggbb` for a packed color.
pub fn hex(color: u32) -> String {
    let [r, g, b] = channels(color);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Writes the reload summary, slot defaults and per-biome slot colors.
pub fn write_report(
    out: &mut impl Write,
    context: &ColorContext,
    report: &ReloadReport,
    read_failures: &[LoadFailure],
) -> io::Result<()> {
    writeln!(
        out,
        "generation {}: {} loaded, {} failed, {} replaced",
        report.generation,
        report.loaded,
        report.failures.len() + read_failures.len(),
        report.overlaps
    )?;
    for failure in read_failures.iter().chain(&report.failures) {
        writeln!(out, "  failed {failure}")?;
    }

    let ctx = context.biome_context();
    let pos = BlockPos::new(0, 64, 0);
    for slot in ColormapSlot::ALL {
        let Some(default) = context.default_color(slot) else {
            continue;
        };
        writeln!(out, "{slot:?}: default {}", hex(default))?;

        for path in SAMPLE_BIOMES {
            let key = tint_common::Identifier::vanilla(path);
            if let Some(biome) = ctx.registry().get(&key) {
                if let Some(color) = context.resolve_slot(slot, biome, pos) {
                    writeln!(out, "  {path:<14} {}", hex(color))?;
                }
            }
        }
    }

    for slot in LinearSlot::ALL {
        if let Some(first) = context.linear_color(slot, 0) {
            let last = context.linear_fraction(slot, 1.0).unwrap_or(first);
            writeln!(out, "{slot:?}: {} .. {}", hex(first), hex(last))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tint_colormap::{
        BiomeContext, ColormapDefinition, ColormapProperties, ColormapTarget, FormatKind,
        TintConfig,
    };
    use tint_common::pack_rgb;

    #[test]
    fn test_hex() {
        assert_eq!(hex(pack_rgb(0x3f, 0x76, 0xe4)), "#3f76e4");
    }

    #[test]
    fn test_builtin_registry_has_samples() {
        let registry = builtin_registry();
        for path in SAMPLE_BIOMES {
            assert!(registry.get(&tint_common::Identifier::vanilla(path)).is_some(), "{path}");
        }
    }

    #[test]
    fn test_report_lists_fixed_slot() {
        let context = ColorContext::new(
            TintConfig::default(),
            BiomeContext::default().with_registry(builtin_registry()),
        );
        let properties = ColormapProperties {
            format: FormatKind::Fixed,
            color: Some("3f76e4".to_string()),
            ..ColormapProperties::default()
        };
        let report = context.rebuild(&[ColormapDefinition::new(
            "water",
            properties,
            None,
            ColormapTarget::Slot(ColormapSlot::Water),
        )]);

        let mut out = Vec::new();
        write_report(&mut out, &context, &report, &[]).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("generation 1: 1 loaded, 0 failed"));
        assert!(text.contains("Water: default #3f76e4"));
        assert!(text.contains("desert"));
    }
}
