//! Sky and block light compositing from a lightmap palette.
//!
//! Lightmap image layout:
//! - columns: flicker (block light) or ambience (sky light) position; the
//!   last column is reserved for lightning flashes
//! - rows 0-15: sky light by level
//! - rows 16-31: block light by level
//! - rows 32-63 (optional): the same two bands under night vision
//!
//! Every frame tick the host composites a 16x16 texture indexed by
//! (sky level, block level) that the terrain shader samples.

use bytemuck::cast_slice;

use tint_common::{channels, lerp, pack_rgb, ColormapError, ColormapResult, WHITE};

use crate::palette::PaletteImage;

/// Number of light levels per band.
pub const LIGHT_LEVELS: u32 = 16;

/// Row where the block light band starts.
pub const BLOCK_ROW_OFFSET: u32 = 16;

/// Row where the night vision bands start.
pub const NIGHT_VISION_ROW_OFFSET: u32 = 32;

/// Per-frame inputs to the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightmapParams {
    /// Sky brightness in `[0, 1]`; negative during a lightning flash
    pub ambience: f32,
    /// Block light flicker in `[0, 1)`
    pub flicker: f32,
    /// Night vision strength in `[0, 1]`
    pub night_vision: f32,
    /// Brightness/gamma option in `[0, 1]`
    pub gamma: f32,
    /// How fast block light fades under bright sky
    pub block_light_exponent: f32,
}

impl Default for LightmapParams {
    fn default() -> Self {
        Self {
            ambience: 1.0,
            flicker: 0.0,
            night_vision: 0.0,
            gamma: 0.5,
            block_light_exponent: 0.0,
        }
    }
}

/// Composited 16x16 light texture, indexed `[block * 16 + sky]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightmapTexture {
    texels: [u32; 256],
}

impl Default for LightmapTexture {
    fn default() -> Self {
        Self { texels: [WHITE; 256] }
    }
}

impl LightmapTexture {
    /// Texel for a (sky, block) level pair.
    #[must_use]
    pub fn get(&self, sky: u8, block: u8) -> u32 {
        let sky = usize::from(sky.min(15));
        let block = usize::from(block.min(15));
        self.texels[block * 16 + sky]
    }

    /// All texels.
    #[must_use]
    pub fn texels(&self) -> &[u32; 256] {
        &self.texels
    }

    /// Raw bytes for a GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.texels)
    }
}

/// Rescales a color so its brightest channel is 255.
///
/// Black has no brightest channel and becomes white.
#[must_use]
pub fn night_vision_transform(color: u32) -> u32 {
    let [r, g, b] = channels(color);
    let max = r.max(g).max(b);
    if max == 0 {
        return WHITE;
    }
    let scale = 255.0 / f32::from(max);
    let up = |c: u8| (f32::from(c) * scale).round().min(255.0) as u8;
    pack_rgb(up(r), up(g), up(b))
}

/// Brightness curve: blends each channel toward `1 - (1 - c)^4`.
#[must_use]
pub fn apply_gamma(color: u32, gamma: f32) -> u32 {
    let gamma = gamma.clamp(0.0, 1.0);
    let curve = |c: u8| {
        let v = f32::from(c) / 255.0;
        let inv = 1.0 - v;
        let bright = 1.0 - inv * inv * inv * inv;
        ((v + (bright - v) * gamma) * 255.0).round().clamp(0.0, 255.0) as u8
    };
    let [r, g, b] = channels(color);
    pack_rgb(curve(r), curve(g), curve(b))
}

/// Lightmap palette plus how sky columns are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lightmap {
    image: PaletteImage,
    sky_blending: bool,
}

impl Lightmap {
    /// Wraps a lightmap palette.
    ///
    /// The image needs at least two columns and both light bands.
    pub fn new(image: PaletteImage, sky_blending: bool) -> ColormapResult<Self> {
        if image.width() < 2 || image.height() < BLOCK_ROW_OFFSET + LIGHT_LEVELS {
            return Err(ColormapError::WrongDimensions {
                format: "lightmap",
                expected_width: 2,
                expected_height: BLOCK_ROW_OFFSET + LIGHT_LEVELS,
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self {
            image,
            sky_blending,
        })
    }

    /// Whether the image carries its own night vision bands.
    #[must_use]
    pub fn has_night_vision_rows(&self) -> bool {
        self.image.height() >= NIGHT_VISION_ROW_OFFSET * 2
    }

    fn texel(&self, x: u32, row: u32) -> u32 {
        self.image.get(x, row).unwrap_or(WHITE)
    }

    /// Sample with night vision mixed in.
    fn sample(&self, x: u32, row: u32, night_vision: f32) -> u32 {
        let normal = self.texel(x, row);
        if night_vision <= 0.0 {
            return normal;
        }
        let boosted = if self.has_night_vision_rows() {
            self.texel(x, row + NIGHT_VISION_ROW_OFFSET)
        } else {
            night_vision_transform(normal)
        };
        lerp(normal, boosted, night_vision)
    }

    /// Block light color at `level` for the current flicker.
    #[must_use]
    pub fn block_light(&self, level: u8, flicker: f32, night_vision: f32) -> u32 {
        let width = self.image.width();
        let column = (f64::from(flicker) * f64::from(width)).floor() as i64;
        let column = column.rem_euclid(i64::from(width)) as u32;
        let row = BLOCK_ROW_OFFSET + u32::from(level.min(15));
        self.sample(column, row, night_vision)
    }

    /// Sky light color at `level` for the current ambience.
    ///
    /// Negative ambience selects the lightning column.
    #[must_use]
    pub fn sky_light(&self, level: u8, ambience: f32, night_vision: f32) -> u32 {
        let width = self.image.width();
        let row = u32::from(level.min(15));
        if ambience < 0.0 {
            return self.sample(width - 1, row, night_vision);
        }

        let position = ambience.min(1.0) * (width - 2) as f32;
        if self.sky_blending {
            let low = position.floor();
            let weight = position - low;
            let low = low as u32;
            let a = self.sample(low, row, night_vision);
            let b = self.sample(low + 1, row, night_vision);
            lerp(a, b, weight)
        } else {
            self.sample(position.round() as u32, row, night_vision)
        }
    }

    /// Composites the full 16x16 texture for one frame.
    #[must_use]
    pub fn composite(&self, params: &LightmapParams) -> LightmapTexture {
        let mut texture = LightmapTexture::default();
        self.composite_into(params, &mut texture);
        texture
    }

    /// Composites into an existing texture.
    pub fn composite_into(&self, params: &LightmapParams, texture: &mut LightmapTexture) {
        let scale = -params.block_light_exponent * params.ambience.max(0.0);

        for sky_level in 0..LIGHT_LEVELS as u8 {
            let sky = channels(self.sky_light(sky_level, params.ambience, params.night_vision));
            let relative = (scale * f32::from(sky_level)).exp();

            for block_level in 0..LIGHT_LEVELS as u8 {
                let block = channels(self.block_light(
                    block_level,
                    params.flicker,
                    params.night_vision,
                ));
                let mix = |i: usize| {
                    let v = f32::from(sky[i]) + f32::from(block[i]) * relative;
                    v.round().min(255.0) as u8
                };
                let color = apply_gamma(pack_rgb(mix(0), mix(1), mix(2)), params.gamma);
                texture.texels[usize::from(block_level) * 16 + usize::from(sky_level)] = color;
            }
        }
    }
}
