use crate::buffer::{HdrBuffer, ImageSource};
use crate::environment::{EnvironmentSampler, LookupMode};
use crate::spherical::{pixel_to_uv, spherical_to_cartesian, uv_to_angles};
use anyhow::{bail, Result};
use glam::{UVec2, Vec2, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::time::Instant;

pub const DEFAULT_SAMPLES: UVec2 = UVec2::new(100, 50);

/// Diffuse pre-convolution of an equirectangular environment.
///
/// Every output texel is mapped to a direction and the cosine-weighted hemisphere around it is
/// integrated with a fixed theta/phi grid, so the result is fully deterministic.
#[derive(Debug, Clone)]
pub struct IrradianceKernel {
    samples: UVec2,
    sample_step: Vec2,
    lookup: LookupMode,
}

impl Default for IrradianceKernel {
    fn default() -> Self {
        Self::from_samples(DEFAULT_SAMPLES, LookupMode::default())
    }
}

impl IrradianceKernel {
    pub fn new(samples: UVec2, lookup: LookupMode) -> Result<Self> {
        if samples.x == 0 || samples.y == 0 {
            bail!("Irradiance samples must be non-zero, got {}x{}", samples.x, samples.y);
        }
        Ok(Self::from_samples(samples, lookup))
    }

    fn from_samples(samples: UVec2, lookup: LookupMode) -> Self {
        let sample_step = Vec2::new(TAU / samples.x as f32, PI / (2.0 * samples.y as f32));
        Self { samples, sample_step, lookup }
    }

    pub fn samples(&self) -> UVec2 {
        self.samples
    }

    pub fn lookup(&self) -> LookupMode {
        self.lookup
    }

    /// Direction an output texel represents.
    pub fn output_direction(pixel: Vec2, format: Vec2) -> Vec3 {
        spherical_to_cartesian(uv_to_angles(pixel_to_uv(pixel, format)))
    }

    /// Irradiance arriving around `direction`.
    pub fn irradiance<I: ImageSource>(
        &self,
        environment: &EnvironmentSampler<'_, I>,
        direction: Vec3,
    ) -> Vec4 {
        let tangent_right = Vec3::Y.cross(direction).try_normalize().unwrap_or(Vec3::X);
        let tangent_up = direction.cross(tangent_right).normalize();

        let mut irradiance = Vec4::ZERO;
        for i in 0..self.samples.x {
            let theta = i as f32 * self.sample_step.x;
            for j in 0..self.samples.y {
                let phi = FRAC_PI_2 - j as f32 * self.sample_step.y;
                let tangent = spherical_to_cartesian(Vec2::new(theta, phi));
                let sample_direction =
                    tangent.x * tangent_right + tangent.z * tangent_up + tangent.y * direction;
                irradiance += environment.lookup(sample_direction, self.lookup) * phi.cos() * phi.sin();
            }
        }
        PI * irradiance / (self.samples.x * self.samples.y) as f32
    }

    /// Convolves `hdri` into an irradiance map of the same resolution.
    pub fn convolve<I: ImageSource + Sync>(&self, hdri: &I) -> HdrBuffer {
        let (width, height) = hdri.bounds();
        let started = Instant::now();
        log::info!(
            "Convolving {width}x{height} environment with {}x{} samples ({:?} lookup)",
            self.samples.x,
            self.samples.y,
            self.lookup
        );

        let environment = EnvironmentSampler::new(hdri, 0.0);
        let format = Vec2::new(width as f32, height as f32);
        let irradiance = HdrBuffer::par_from_fn(width, height, |x, y| {
            let direction = Self::output_direction(Vec2::new(x as f32, y as f32), format);
            self.irradiance(&environment, direction)
        });

        log::info!("Irradiance convolution finished in {} ms", started.elapsed().as_millis());
        irradiance
    }
}
