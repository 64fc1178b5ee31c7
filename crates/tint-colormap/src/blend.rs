//! Spatial blending: averaging colors over a neighborhood of blocks.

use serde::{Deserialize, Serialize};

use tint_common::{BlockPos, ChannelSum};

/// Largest blend radius accepted by the configuration.
pub const MAX_BLEND_RADIUS: u32 = 14;

/// Neighborhood shape sampled around a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendShape {
    /// All blocks within `radius` on both horizontal axes
    #[default]
    Square,
    /// Blocks within Manhattan distance `radius`
    Diamond,
}

impl BlendShape {
    /// Whether the horizontal offset lies inside this shape.
    #[must_use]
    pub const fn contains(self, dx: i32, dz: i32, radius: i32) -> bool {
        match self {
            Self::Square => dx.abs() <= radius && dz.abs() <= radius,
            Self::Diamond => dx.abs() + dz.abs() <= radius,
        }
    }

    /// Number of sample points for a radius.
    #[must_use]
    pub const fn sample_count(self, radius: u32) -> u32 {
        let r = radius;
        match self {
            Self::Square => (2 * r + 1) * (2 * r + 1),
            Self::Diamond => 2 * r * r + 2 * r + 1,
        }
    }
}

/// Averages `sample` over the neighborhood of `center`, channel by channel.
///
/// The neighborhood is horizontal only; every sample keeps `center.y`.
/// Samples returning `None` are left out of the mean. Returns `None` if no
/// sample produced a color.
pub fn blend(
    radius: u32,
    shape: BlendShape,
    center: BlockPos,
    mut sample: impl FnMut(BlockPos) -> Option<u32>,
) -> Option<u32> {
    if radius == 0 {
        return sample(center);
    }

    let r = radius.min(MAX_BLEND_RADIUS) as i32;
    let mut sum = ChannelSum::new();
    for dz in -r..=r {
        for dx in -r..=r {
            if !shape.contains(dx, dz, r) {
                continue;
            }
            if let Some(color) = sample(center.offset(dx, 0, dz)) {
                sum.add(color);
            }
        }
    }
    sum.average()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tint_common::pack_rgb;

    #[test]
    fn test_radius_zero_single_sample() {
        let mut calls = 0;
        let color = blend(0, BlendShape::Square, BlockPos::new(3, 4, 5), |pos| {
            calls += 1;
            assert_eq!(pos, BlockPos::new(3, 4, 5));
            Some(pack_rgb(1, 2, 3))
        });
        assert_eq!(color, Some(pack_rgb(1, 2, 3)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_sample_counts() {
        for shape in [BlendShape::Square, BlendShape::Diamond] {
            for radius in 1..4 {
                let mut calls = 0;
                let _ = blend(radius, shape, BlockPos::ORIGIN, |_| {
                    calls += 1;
                    None
                });
                assert_eq!(calls, shape.sample_count(radius));
            }
        }
    }

    #[test]
    fn test_average_and_constant_y() {
        // Left half red, right half blue.
        let color = blend(1, BlendShape::Square, BlockPos::new(0, 70, 0), |pos| {
            assert_eq!(pos.y, 70);
            if pos.x < 0 {
                Some(pack_rgb(90, 0, 0))
            } else {
                Some(pack_rgb(0, 0, 90))
            }
        });
        // 3 red, 6 blue samples
        assert_eq!(color, Some(pack_rgb(30, 0, 60)));
    }

    #[test]
    fn test_all_missing() {
        assert_eq!(blend(2, BlendShape::Diamond, BlockPos::ORIGIN, |_| None), None);
    }
}
