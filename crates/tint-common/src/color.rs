//! Packed 32-bit ARGB color helpers.
//!
//! Colors travel through the resolver hot path as plain `u32` values laid out
//! `0xAARRGGBB`, the layout the host blends into its vertex colors.

use crate::error::ColormapError;

/// Opaque white, used when nothing better is defined.
pub const WHITE: u32 = 0xFFFF_FFFF;

/// Opaque magenta, returned when a gradient lookup falls outside its image.
pub const MAGENTA: u32 = 0xFFFF_00FF;

/// Opaque black.
pub const BLACK: u32 = 0xFF00_0000;

/// Packs opaque RGB channels.
#[must_use]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Packs ARGB channels.
#[must_use]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Splits a packed color into `[r, g, b]`.
#[must_use]
pub const fn channels(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

/// Returns the alpha channel.
#[must_use]
pub const fn alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Forces the alpha channel to 255.
#[must_use]
pub const fn opaque(color: u32) -> u32 {
    color | 0xFF00_0000
}

/// Linear interpolation between two colors, channel by channel.
///
/// `t` is clamped to `[0, 1]`. The result is opaque.
#[must_use]
pub fn lerp(from: u32, to: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let a = channels(from);
    let b = channels(to);
    let mix = |i: usize| {
        let v = f32::from(a[i]) + (f32::from(b[i]) - f32::from(a[i])) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    pack_rgb(mix(0), mix(1), mix(2))
}

/// Parses an authored hex color: `RRGGBB`, `#RRGGBB`, `0xRRGGBB` or
/// `AARRGGBB`. Six-digit colors are returned opaque.
pub fn parse_hex(raw: &str) -> Result<u32, ColormapError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColormapError::InvalidColor(raw.to_string()));
    }

    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| ColormapError::InvalidColor(raw.to_string()))?;

    match digits.len() {
        6 => Ok(opaque(value)),
        8 => Ok(value),
        _ => Err(ColormapError::InvalidColor(raw.to_string())),
    }
}

/// Running per-channel sum for averaging colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSum {
    r: u32,
    g: u32,
    b: u32,
    count: u32,
}

impl ChannelSum {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            count: 0,
        }
    }

    /// Adds one color sample.
    pub fn add(&mut self, color: u32) {
        let [r, g, b] = channels(color);
        self.r += u32::from(r);
        self.g += u32::from(g);
        self.b += u32::from(b);
        self.count += 1;
    }

    /// Number of samples added so far.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Arithmetic mean of the samples, or `None` if there were none.
    #[must_use]
    pub fn average(&self) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        let n = self.count;
        Some(pack_rgb(
            (self.r / n) as u8,
            (self.g / n) as u8,
            (self.b / n) as u8,
        ))
    }
}
