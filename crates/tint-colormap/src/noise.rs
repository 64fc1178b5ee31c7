//! Coherent noise used for horizontal jitter in grid colormaps.

use noise::{NoiseFn, Perlin};

/// Seed used for [`PerlinNoise::default`].
pub const DEFAULT_NOISE_SEED: u32 = 0x0C01_0AA2;

/// Smooth 2-D noise returning values in `[-1, 1]`.
pub trait CoherentNoise: Send + Sync {
    /// Samples the noise field at `(x, z)`.
    fn sample(&self, x: f64, z: f64) -> f64;
}

/// Perlin noise backed by the `noise` crate.
#[derive(Debug, Clone, Copy)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    /// Creates a noise field with the given seed.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}

impl CoherentNoise for PerlinNoise {
    fn sample(&self, x: f64, z: f64) -> f64 {
        self.perlin.get([x, z]).clamp(-1.0, 1.0)
    }
}

/// Noise field with the same value everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantNoise(pub f64);

impl CoherentNoise for ConstantNoise {
    fn sample(&self, _x: f64, _z: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perlin_range_and_determinism() {
        let noise = PerlinNoise::default();
        for i in 0..200 {
            let x = f64::from(i) * 0.37 - 20.0;
            let z = f64::from(i) * -0.91 + 3.0;
            let v = noise.sample(x, z);
            assert!((-1.0..=1.0).contains(&v));
            assert_eq!(v.to_bits(), noise.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_constant_noise() {
        assert_eq!(ConstantNoise(0.25).sample(1.0, 2.0), 0.25);
    }
}
