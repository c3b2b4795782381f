use core::f32::consts::PI;

use glam::{vec2, UVec2, Vec2};

/// Cheap per-pixel random number generator (a PCG hash).
///
/// Each pixel gets its own stream, derived from the per-pass seed and the
/// pixel's coordinates, so that kernels don't have to share any state.
#[derive(Clone, Copy, Debug)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    pub fn new(seed: u32, id: UVec2) -> Self {
        Self {
            state: seed
                ^ 48619u32.wrapping_mul(id.x)
                ^ 95461u32.wrapping_mul(id.y),
        }
    }

    /// Generates a uniform sample in range `<0.0, 1.0)`.
    pub fn sample(&mut self) -> f32 {
        (self.sample_int() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(747796405).wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }

    /// Generates a uniform sample on a circle.
    pub fn sample_circle(&mut self) -> Vec2 {
        let angle = self.sample() * PI * 2.0;

        vec2(angle.cos(), angle.sin())
    }

    /// Generates a uniform sample inside of a disk.
    pub fn sample_disk(&mut self) -> Vec2 {
        let radius = self.sample().sqrt();

        self.sample_circle() * radius
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn sample_range() {
        let mut noise = WhiteNoise::new(1234, uvec2(12, 34));
        let mut sum = 0.0;

        for _ in 0..100_000 {
            let sample = noise.sample();

            assert!(sample >= 0.0 && sample < 1.0, "sample={sample}");

            sum += sample as f64;
        }

        let mean = sum / 100_000.0;

        assert!((mean - 0.5).abs() < 0.01, "mean={mean}");
    }

    #[test]
    fn sample_disk() {
        let mut noise = WhiteNoise::new(0, UVec2::ZERO);

        for _ in 0..10_000 {
            assert!(noise.sample_disk().length() <= 1.0);
        }
    }

    #[test]
    fn streams_differ_per_pixel() {
        let mut a = WhiteNoise::new(7, uvec2(0, 0));
        let mut b = WhiteNoise::new(7, uvec2(1, 0));

        assert_ne!(a.sample_int(), b.sample_int());
    }
}
