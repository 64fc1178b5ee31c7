//! Image-backed colormaps and their three addressing formats.
//!
//! A colormap turns a (biome, position) query into one palette lookup:
//!
//! - **Fixed**: one authored color, no image lookup at query time.
//! - **Vanilla**: the classic 256x256 temperature/downfall triangle.
//! - **Grid**: one column per biome (see [`crate::columns`]), one row per
//!   height, with a little horizontal noise and seeded vertical jitter so
//!   large areas do not look flat.
//!
//! Colormaps are immutable once built. Every query returns some color; the
//! only failure path is construction.

use ahash::AHashMap;
use tracing::debug;

use tint_common::{BlockPos, ColormapError, ColormapResult, Identifier, MAGENTA, WHITE};

use crate::biome::{Biome, BiomeContext};
use crate::columns::{ColumnBounds, ColumnLayout};
use crate::palette::PaletteImage;
use crate::properties::{ColormapProperties, FormatKind};

/// Side length a vanilla gradient image must have.
pub const VANILLA_SIZE: u32 = 256;

/// Scale applied to block coordinates before sampling grid noise.
pub const GRID_NOISE_SCALE: f64 = 0.0225;

/// Sea level used to pick the default grid row.
const DEFAULT_GRID_Y: i32 = 63;

/// Options applied when building colormaps from properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Reject vanilla images that are not exactly 256x256
    pub strict_vanilla_dimensions: bool,
    /// Layout used when a grid colormap does not name one
    pub default_layout: ColumnLayout,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_vanilla_dimensions: true,
            default_layout: ColumnLayout::Default,
        }
    }
}

/// Where a grid colormap takes its biome columns from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridColumns {
    /// Layout for biomes without an explicit entry
    pub layout: ColumnLayout,
    /// Authored assignments, checked first
    pub explicit: AHashMap<Identifier, ColumnBounds>,
}

impl GridColumns {
    /// Grid columns that rely entirely on a layout.
    #[must_use]
    pub fn from_layout(layout: ColumnLayout) -> Self {
        Self {
            layout,
            explicit: AHashMap::new(),
        }
    }

    /// Column bounds for a biome.
    ///
    /// # Panics
    ///
    /// Panics if the biome has no explicit entry and the context's column
    /// tables do not know it.
    #[must_use]
    pub fn bounds(&self, ctx: &BiomeContext, key: &Identifier) -> ColumnBounds {
        match self.explicit.get(key) {
            Some(bounds) => *bounds,
            None => ctx.columns().bounds(key, self.layout),
        }
    }

    fn try_bounds(&self, ctx: &BiomeContext, key: &Identifier) -> Option<ColumnBounds> {
        self.explicit
            .get(key)
            .copied()
            .or_else(|| ctx.columns().try_bounds(key, self.layout))
    }
}

/// Addressing format together with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ColormapFormat {
    /// Single color
    Fixed {
        /// Packed ARGB
        color: u32,
    },
    /// Temperature/downfall gradient
    Vanilla {
        /// Gradient image
        image: PaletteImage,
    },
    /// Biome columns and height rows
    Grid {
        /// Grid image
        image: PaletteImage,
        /// Column source
        columns: GridColumns,
    },
}

impl ColormapFormat {
    /// Format kind of this variant.
    #[must_use]
    pub const fn kind(&self) -> FormatKind {
        match self {
            Self::Fixed { .. } => FormatKind::Fixed,
            Self::Vanilla { .. } => FormatKind::Vanilla,
            Self::Grid { .. } => FormatKind::Grid,
        }
    }
}

/// An image-backed function from (biome, position) to color.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    format: ColormapFormat,
    y_offset: i32,
    y_variance: i32,
    default_color: u32,
}

impl Colormap {
    /// Fixed-color colormap.
    #[must_use]
    pub fn fixed(color: u32) -> Self {
        Self {
            format: ColormapFormat::Fixed { color },
            y_offset: 0,
            y_variance: 0,
            default_color: color,
        }
    }

    /// Vanilla gradient colormap.
    ///
    /// With `strict` set, the image must be exactly 256x256. Without it,
    /// smaller images are accepted and lookups past their edge return
    /// [`MAGENTA`].
    pub fn vanilla(image: PaletteImage, strict: bool) -> ColormapResult<Self> {
        if strict && (image.width() != VANILLA_SIZE || image.height() != VANILLA_SIZE) {
            return Err(ColormapError::WrongDimensions {
                format: FormatKind::Vanilla.name(),
                expected_width: VANILLA_SIZE,
                expected_height: VANILLA_SIZE,
                width: image.width(),
                height: image.height(),
            });
        }

        let center = VANILLA_SIZE / 2;
        let default_color = image.get(center, center).unwrap_or(WHITE);
        Ok(Self {
            format: ColormapFormat::Vanilla { image },
            y_offset: 0,
            y_variance: 0,
            default_color,
        })
    }

    /// Grid colormap.
    ///
    /// `ctx` is only used to find the plains column for the default color.
    #[must_use]
    pub fn grid(
        image: PaletteImage,
        columns: GridColumns,
        y_offset: i32,
        y_variance: i32,
        ctx: &BiomeContext,
    ) -> Self {
        let plains = Identifier::vanilla("plains");
        let column = columns
            .try_bounds(ctx, &plains)
            .map_or(0, |b| b.column % image.width());
        let row = clamp_row(i64::from(DEFAULT_GRID_Y) - i64::from(y_offset), image.height());
        let default_color = image.get(column, row).unwrap_or(WHITE);

        Self {
            format: ColormapFormat::Grid { image, columns },
            y_offset,
            y_variance: y_variance.max(0),
            default_color,
        }
    }

    /// Builds a colormap from parsed properties and an optional image.
    pub fn from_properties(
        props: &ColormapProperties,
        image: Option<PaletteImage>,
        ctx: &BiomeContext,
        options: &BuildOptions,
    ) -> ColormapResult<Self> {
        let colormap = match props.format {
            FormatKind::Fixed => {
                let color = match props.parsed_color()? {
                    Some(color) => color,
                    None => image.as_ref().and_then(|i| i.get(0, 0)).unwrap_or(WHITE),
                };
                Self::fixed(color)
            },
            FormatKind::Vanilla => {
                let image = image.ok_or(ColormapError::MissingImage(FormatKind::Vanilla.name()))?;
                Self::vanilla(image, options.strict_vanilla_dimensions)?
            },
            FormatKind::Grid => {
                let image = image.ok_or(ColormapError::MissingImage(FormatKind::Grid.name()))?;
                let columns = GridColumns {
                    layout: props.layout.unwrap_or(options.default_layout),
                    explicit: props.explicit_columns(ctx)?,
                };
                Self::grid(image, columns, props.y_offset, props.y_variance, ctx)
            },
        };

        debug!(
            "Built {} colormap (default color {:#010x})",
            colormap.kind().name(),
            colormap.default_color
        );
        Ok(colormap)
    }

    /// Format kind.
    #[must_use]
    pub const fn kind(&self) -> FormatKind {
        self.format.kind()
    }

    /// Format together with its data.
    #[must_use]
    pub const fn format(&self) -> &ColormapFormat {
        &self.format
    }

    /// Height subtracted before indexing grid rows.
    #[must_use]
    pub const fn y_offset(&self) -> i32 {
        self.y_offset
    }

    /// Vertical jitter amplitude.
    #[must_use]
    pub const fn y_variance(&self) -> i32 {
        self.y_variance
    }

    /// Color used when no position is available (inventory items, GUI).
    #[must_use]
    pub const fn default_color(&self) -> u32 {
        self.default_color
    }

    /// Two-axis lookup by climate alone.
    ///
    /// Grid colormaps have no climate axis and return their default color.
    #[must_use]
    pub fn resolve_climate(&self, temperature: f32, downfall: f32) -> u32 {
        match &self.format {
            ColormapFormat::Fixed { color } => *color,
            ColormapFormat::Vanilla { image } => vanilla_lookup(image, temperature, downfall),
            ColormapFormat::Grid { .. } => self.default_color,
        }
    }

    /// Full lookup for a biome at a position.
    #[must_use]
    pub fn resolve(&self, ctx: &BiomeContext, biome: &Biome, pos: BlockPos) -> u32 {
        match &self.format {
            ColormapFormat::Fixed { color } => *color,
            ColormapFormat::Vanilla { image } => {
                vanilla_lookup(image, biome.temperature, biome.downfall)
            },
            ColormapFormat::Grid { image, columns } => {
                let bounds = columns.bounds(ctx, &biome.key);
                let (column, row) = grid_cell(
                    bounds,
                    ctx.noise().sample(
                        f64::from(pos.x) * GRID_NOISE_SCALE,
                        f64::from(pos.z) * GRID_NOISE_SCALE,
                    ),
                    pos,
                    self.y_offset,
                    self.y_variance,
                    image.width(),
                    image.height(),
                );
                image.get(column, row).unwrap_or(MAGENTA)
            },
        }
    }
}

/// Vanilla gradient lookup. Downfall is scaled by temperature before the
/// row is chosen.
fn vanilla_lookup(image: &PaletteImage, temperature: f32, downfall: f32) -> u32 {
    let temp = f64::from(temperature.clamp(0.0, 1.0));
    let rain = f64::from(downfall.clamp(0.0, 1.0)) * temp;
    let x = ((1.0 - temp) * 255.0).floor() as u32;
    let y = ((1.0 - rain) * 255.0).floor() as u32;
    image.get(x, y).unwrap_or(MAGENTA)
}

/// Vertical jitter in `[-variance, variance]`, a pure function of `(x, z)`.
#[must_use]
pub fn grid_jitter(x: i32, z: i32, variance: i32) -> i32 {
    if variance <= 0 {
        return 0;
    }
    let seed = i64::from(x).wrapping_mul(31).wrapping_add(i64::from(z));
    fastrand::Rng::with_seed(seed as u64).i32(-variance..=variance)
}

/// Grid row before clamping to the image.
#[must_use]
pub fn grid_row_unclamped(pos: BlockPos, y_offset: i32, y_variance: i32) -> i64 {
    i64::from(pos.y) - i64::from(y_offset) + i64::from(grid_jitter(pos.x, pos.z, y_variance))
}

fn clamp_row(row: i64, height: u32) -> u32 {
    row.clamp(0, i64::from(height) - 1) as u32
}

/// Column and row of the grid cell for one query.
fn grid_cell(
    bounds: ColumnBounds,
    noise: f64,
    pos: BlockPos,
    y_offset: i32,
    y_variance: i32,
    width: u32,
    height: u32,
) -> (u32, u32) {
    // Fields are public, so a literal may still carry a zero count.
    let count = bounds.count.max(1);
    let fraction = ((noise + 1.0) / 2.0).clamp(0.0, 1.0);
    let offset = ((fraction * f64::from(count)).floor() as u32).min(count - 1);
    let column = (u64::from(bounds.column) + u64::from(offset)) % u64::from(width);
    let row = clamp_row(grid_row_unclamped(pos, y_offset, y_variance), height);
    (column as u32, row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeRegistry;
    use crate::noise::ConstantNoise;
    use proptest::prelude::*;
    use std::sync::Arc;
    use tint_common::pack_rgb;

    fn flat_context(noise: f64) -> BiomeContext {
        BiomeContext::new(BiomeRegistry::new(), Arc::new(ConstantNoise(noise)))
    }

    fn plains() -> Biome {
        Biome::new(Identifier::vanilla("plains"), 1, 0.8, 0.4)
    }

    /// Grid image where each pixel encodes its own coordinates.
    fn coordinate_grid(width: u32, height: u32) -> PaletteImage {
        PaletteImage::from_fn(width, height, |x, y| pack_rgb(x as u8, y as u8, 0)).expect("valid")
    }

    #[test]
    fn test_vanilla_end_to_end_pixel() {
        let target = pack_rgb(0x11, 0x22, 0x33);
        let image = PaletteImage::from_fn(256, 256, |x, y| {
            if (x, y) == (64, 64) {
                target
            } else {
                WHITE
            }
        })
        .expect("valid");
        let colormap = Colormap::vanilla(image, true).expect("256x256");

        // floor((1 - 0.747) * 255) = 64 on both axes once downfall 1.0 is
        // scaled by temperature.
        assert_eq!(colormap.resolve_climate(0.747, 1.0), target);
    }

    #[test]
    fn test_vanilla_strict_dimensions() {
        let image = PaletteImage::filled(128, 128, WHITE).expect("valid");
        let err = Colormap::vanilla(image, true).expect_err("undersized");
        assert!(matches!(err, ColormapError::WrongDimensions { width: 128, .. }));
    }

    #[test]
    fn test_vanilla_sentinel_outside_image() {
        let image = PaletteImage::filled(128, 128, WHITE).expect("valid");
        let colormap = Colormap::vanilla(image, false).expect("lenient");

        // temp 0 -> x = 255, past the 128-wide image.
        assert_eq!(colormap.resolve_climate(0.0, 0.0), MAGENTA);
        // temp 1, rain 1 -> (0, 0), inside.
        assert_eq!(colormap.resolve_climate(1.0, 1.0), WHITE);
    }

    #[test]
    fn test_vanilla_clamps_climate() {
        let colormap = Colormap::vanilla(coordinate_grid(256, 256), true).expect("valid");
        assert_eq!(
            colormap.resolve_climate(2.0, 0.0),
            colormap.resolve_climate(1.0, 0.0)
        );
        assert_eq!(
            colormap.resolve_climate(-0.5, 0.3),
            colormap.resolve_climate(0.0, 0.3)
        );
    }

    #[test]
    fn test_vanilla_default_is_center() {
        let colormap = Colormap::vanilla(coordinate_grid(256, 256), true).expect("valid");
        assert_eq!(colormap.default_color(), pack_rgb(128, 128, 0));
    }

    #[test]
    fn test_grid_example_column_and_row() {
        let ctx = flat_context(0.0);
        let mut columns = GridColumns::from_layout(ColumnLayout::Default);
        columns
            .explicit
            .insert(Identifier::vanilla("plains"), ColumnBounds::new(10, 3));
        let colormap = Colormap::grid(coordinate_grid(32, 32), columns, 60, 0, &ctx);

        let color = colormap.resolve(&ctx, &plains(), BlockPos::new(0, 60, 0));
        assert_eq!(color, pack_rgb(11, 0, 0));
    }

    #[test]
    fn test_grid_zero_count_literal_uses_single_column() {
        let ctx = flat_context(1.0);
        let mut columns = GridColumns::from_layout(ColumnLayout::Default);
        columns
            .explicit
            .insert(Identifier::vanilla("plains"), ColumnBounds { column: 3, count: 0 });
        let colormap = Colormap::grid(coordinate_grid(16, 8), columns, 0, 0, &ctx);

        let color = colormap.resolve(&ctx, &plains(), BlockPos::new(0, 2, 0));
        assert_eq!(color, pack_rgb(3, 2, 0));
    }

    #[test]
    fn test_grid_wraps_columns() {
        let ctx = flat_context(1.0);
        let mut columns = GridColumns::from_layout(ColumnLayout::Default);
        columns
            .explicit
            .insert(Identifier::vanilla("plains"), ColumnBounds::new(30, 4));
        let colormap = Colormap::grid(coordinate_grid(32, 8), columns, 0, 0, &ctx);

        // noise 1.0 -> offset 3 -> column 33 -> wraps to 1
        let color = colormap.resolve(&ctx, &plains(), BlockPos::new(5, 2, 5));
        assert_eq!(color, pack_rgb(1, 2, 0));
    }

    #[test]
    fn test_grid_clamps_rows() {
        let ctx = flat_context(-1.0);
        let colormap = Colormap::grid(
            coordinate_grid(256, 16),
            GridColumns::from_layout(ColumnLayout::Default),
            0,
            0,
            &ctx,
        );
        let high = colormap.resolve(&ctx, &plains(), BlockPos::new(0, 300, 0));
        let low = colormap.resolve(&ctx, &plains(), BlockPos::new(0, -64, 0));
        assert_eq!(high, pack_rgb(1, 15, 0));
        assert_eq!(low, pack_rgb(1, 0, 0));
    }

    #[test]
    fn test_grid_default_uses_plains_column() {
        let ctx = BiomeContext::default();
        let colormap = Colormap::grid(
            coordinate_grid(256, 256),
            GridColumns::from_layout(ColumnLayout::Default),
            60,
            0,
            &ctx,
        );
        assert_eq!(colormap.default_color(), pack_rgb(1, 3, 0));
    }

    #[test]
    fn test_fixed_from_properties() {
        let props = ColormapProperties {
            format: FormatKind::Fixed,
            color: Some("3F76E4".into()),
            ..Default::default()
        };
        let colormap =
            Colormap::from_properties(&props, None, &BiomeContext::default(), &BuildOptions::default())
                .expect("fixed");
        assert_eq!(colormap.default_color(), 0xFF3F_76E4);
        assert_eq!(colormap.resolve_climate(0.1, 0.9), 0xFF3F_76E4);

        let blank = ColormapProperties {
            format: FormatKind::Fixed,
            ..Default::default()
        };
        let colormap =
            Colormap::from_properties(&blank, None, &BiomeContext::default(), &BuildOptions::default())
                .expect("fixed");
        assert_eq!(colormap.default_color(), WHITE);
    }

    #[test]
    fn test_missing_image_is_error() {
        let props = ColormapProperties::default();
        let err =
            Colormap::from_properties(&props, None, &BiomeContext::default(), &BuildOptions::default())
                .expect_err("vanilla needs an image");
        assert!(matches!(err, ColormapError::MissingImage("vanilla")));
    }

    #[test]
    fn test_grid_deterministic_across_calls() {
        let ctx = BiomeContext::default();
        let colormap = Colormap::grid(
            coordinate_grid(256, 256),
            GridColumns::from_layout(ColumnLayout::Default),
            0,
            8,
            &ctx,
        );
        let biome = plains();
        for x in -20..20 {
            let pos = BlockPos::new(x * 7, 64, x * -13);
            let first = colormap.resolve(&ctx, &biome, pos);
            assert_eq!(first, colormap.resolve(&ctx, &biome, pos));
        }
    }

    proptest! {
        #[test]
        fn test_grid_jitter_bounded(x in any::<i32>(), z in any::<i32>(), variance in 0i32..64) {
            let jitter = grid_jitter(x, z, variance);
            prop_assert!((-variance..=variance).contains(&jitter));
            prop_assert_eq!(jitter, grid_jitter(x, z, variance));
        }

        #[test]
        fn test_grid_row_within_variance(y in -512i32..512, offset in -128i32..128, variance in 0i32..32) {
            let pos = BlockPos::new(17, y, -4);
            let base = i64::from(y) - i64::from(offset);
            let row = grid_row_unclamped(pos, offset, variance);
            prop_assert!(row >= base - i64::from(variance));
            prop_assert!(row <= base + i64::from(variance));
        }

        #[test]
        fn test_grid_column_always_in_image(column in any::<u32>(), count in 1u32..16, noise in -1.0f64..=1.0, width in 1u32..300) {
            let (col, row) = grid_cell(
                ColumnBounds::new(column, count),
                noise,
                BlockPos::new(0, 0, 0),
                0,
                0,
                width,
                4,
            );
            prop_assert!(col < width);
            prop_assert!(row < 4);
        }
    }
}
