//! Palette images backing every colormap.
//!
//! A palette is an immutable grid of packed ARGB samples decoded once per
//! reload. Linear colormaps read the same buffer as a flat sequence.

use std::path::Path;
use tracing::debug;

use tint_common::{pack_argb, ColormapError, ColormapResult};

/// Immutable 2-D grid of packed `0xAARRGGBB` samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PaletteImage {
    /// Creates a palette from row-major pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> ColormapResult<Self> {
        let expected = width as usize * height as usize;
        if expected == 0 {
            return Err(ColormapError::EmptyImage);
        }
        if pixels.len() != expected {
            return Err(ColormapError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a palette by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> u32,
    ) -> ColormapResult<Self> {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    /// Creates a palette filled with one color.
    pub fn filled(width: u32, height: u32, color: u32) -> ColormapResult<Self> {
        Self::new(width, height, vec![color; width as usize * height as usize])
    }

    /// Converts a decoded RGBA image.
    pub fn from_rgba8(image: &image::RgbaImage) -> ColormapResult<Self> {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| pack_argb(p[3], p[0], p[1], p[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Decodes a palette from encoded image bytes (PNG).
    pub fn decode(bytes: &[u8]) -> ColormapResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ColormapError::Decode(e.to_string()))?;
        Self::from_rgba8(&img.to_rgba8())
    }

    /// Loads and decodes a palette image file.
    pub fn load<P: AsRef<Path>>(path: P) -> ColormapResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ColormapError::NotFound(path.display().to_string()));
        }

        let file_data =
            std::fs::read(path).map_err(|e| ColormapError::Decode(e.to_string()))?;
        let palette = Self::decode(&file_data)?;
        debug!(
            "Loaded {}x{} palette from {}",
            palette.width,
            palette.height,
            path.display()
        );
        Ok(palette)
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false; empty palettes are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns the sample at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Returns the sample at a flat index, reading the image as 1-D.
    #[must_use]
    pub fn linear(&self, index: usize) -> Option<u32> {
        self.pixels.get(index).copied()
    }

    /// Raw row-major samples.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}
