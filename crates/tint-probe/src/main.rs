//! # Tint Probe
//!
//! Loads a colormap pack manifest, rebuilds a color context from it and
//! prints what each slot and built-in biome resolves to.
//!
//! Usage: `tint-probe <pack.toml> [tint.toml]`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod probe;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tint_colormap::{load_manifest, BiomeContext, ColorContext, TintConfig};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("tint=info".parse()?))
        .init();

    info!("Tint probe {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(manifest_path) = args.next() else {
        bail!("usage: tint-probe <pack.toml> [tint.toml]");
    };
    let config = args.next().map_or_else(TintConfig::default, TintConfig::load_from);

    let pack = load_manifest(&manifest_path)
        .with_context(|| format!("failed to read manifest {manifest_path}"))?;

    let biomes = BiomeContext::default().with_registry(probe::builtin_registry());
    let context = ColorContext::new(config, biomes);
    let report = context.rebuild(&pack.definitions);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    probe::write_report(&mut out, &context, &report, &pack.failures)?;
    Ok(())
}
