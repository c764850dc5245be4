//! Seed-driven hash noise used for sample jitter and hemisphere directions.
//!
//! The generator is a pure function of its seed, so renders are reproducible regardless of how
//! pixels are scheduled. The hash constants are part of the output: changing them changes every
//! reference render.

use crate::transform::{align_with_direction, positive_part};
use glam::{Vec2, Vec3, Vec4};
use std::f32::consts::TAU;

const SEED_SCALE: f32 = 91.3458;
const HASH_SCALE: f32 = 47453.5453;

/// Fractional part, `3.5 -> 0.5`, `-0.25 -> 0.75`.
pub fn fract(value: f32) -> f32 {
    value - value.floor()
}

/// Hash of `seed` on `[0, 1]`.
pub fn random(seed: f32) -> f32 {
    fract((seed * SEED_SCALE).sin() * HASH_SCALE)
}

pub fn random_vec2(seed: Vec2) -> Vec2 {
    Vec2::new(random(seed.x), random(seed.y))
}

/// Cosine-weighted direction in the hemisphere around +Z.
pub fn cosine_direction_in_z_hemisphere(seed: Vec2) -> Vec3 {
    let uniform = random(seed.x);
    let r = uniform.sqrt();
    let angle = TAU * random(seed.y);
    Vec3::new(r * angle.cos(), r * angle.sin(), positive_part(1.0 - uniform).sqrt())
}

/// Cosine-weighted direction in the hemisphere around `axis`.
pub fn cosine_direction_in_hemisphere(axis: Vec3, seed: Vec2) -> Vec3 {
    align_with_direction(Vec3::Z, axis, cosine_direction_in_z_hemisphere(seed)).normalize()
}

/// The two seed pairs carried through the sample loop of a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedState {
    pub seed0: Vec2,
    pub seed1: Vec2,
}

impl SeedState {
    pub fn new(seed0: Vec2, seed1: Vec2) -> Self {
        Self { seed0, seed1 }
    }

    /// Splits an RGBA seed sample: `xy` drive the camera jitter, `zw` the bounce direction.
    pub fn from_sample(sample: Vec4) -> Self {
        Self { seed0: Vec2::new(sample.x, sample.y), seed1: Vec2::new(sample.z, sample.w) }
    }

    /// Re-hashes both pairs and crosses their components so successive samples decorrelate.
    pub fn advance(&mut self) {
        self.seed0 = random_vec2(self.seed1 + random_vec2(self.seed0));
        self.seed0 = Vec2::new(self.seed0.y, self.seed0.x);

        self.seed1 = random_vec2(self.seed0 + random_vec2(self.seed1));
        let carried = self.seed1.x;
        self.seed1.x = self.seed1.y;
        self.seed1.y = self.seed0.x;
        self.seed0.x = carried;
    }
}
