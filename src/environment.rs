use crate::buffer::ImageSource;
use crate::spherical::cartesian_to_spherical;
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// How an equirectangular map is read for a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Clamped bilinear lookup.
    #[default]
    Bilinear,
    /// Rounded texel lookup shifted down one texel on both axes. Reproduces renders made with
    /// the first irradiance bakes.
    LegacyNearest,
}

/// Direction to texel mapping for a lat-long environment, with an azimuthal rotation.
pub struct EnvironmentSampler<'a, I: ImageSource> {
    image: &'a I,
    pixel_per_radian: Vec2,
    theta_offset: f32,
}

impl<'a, I: ImageSource> EnvironmentSampler<'a, I> {
    pub fn new(image: &'a I, theta_offset: f32) -> Self {
        let pixel_per_radian = Vec2::new(image.width() as f32 / TAU, image.height() as f32 / PI);
        Self { image, pixel_per_radian, theta_offset }
    }

    /// Unclamped texel position; phi grows toward row 0.
    pub fn texel_position(&self, direction: Vec3) -> Vec2 {
        let angles = cartesian_to_spherical(direction, self.theta_offset);
        Vec2::new(
            self.pixel_per_radian.x * angles.x,
            self.image.height() as f32 - self.pixel_per_radian.y * angles.y,
        )
    }

    pub fn sample(&self, direction: Vec3) -> Vec4 {
        let max = Vec2::new(self.image.width() as f32, self.image.height() as f32) - Vec2::ONE;
        let position = self.texel_position(direction).clamp(Vec2::ZERO, max.max(Vec2::ZERO));
        self.image.bilinear(position.x, position.y)
    }

    pub fn sample_nearest_legacy(&self, direction: Vec3) -> Vec4 {
        let position = self.texel_position(direction);
        self.image.sample(position.x.round() as i32 - 1, position.y.round() as i32 - 1)
    }

    pub fn lookup(&self, direction: Vec3, mode: LookupMode) -> Vec4 {
        match mode {
            LookupMode::Bilinear => self.sample(direction),
            LookupMode::LegacyNearest => self.sample_nearest_legacy(direction),
        }
    }
}
