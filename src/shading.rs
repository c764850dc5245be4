use crate::buffer::{HdrBuffer, ImageSource};
use crate::camera::{CameraModel, CameraRays, Ray};
use crate::environment::EnvironmentSampler;
use crate::random::{cosine_direction_in_hemisphere, SeedState};
use crate::spherical::degrees_to_radians;
use crate::surface::{reflect, refract, schlick_fresnel, SurfaceSample};
use crate::transform::{blend, blend_vec3};
use anyhow::{bail, Result};
use glam::{Vec2, Vec3, Vec4};
use std::time::Instant;

/// Tunables of the shading kernel.
#[derive(Debug, Clone)]
pub struct ShadingParams {
    pub camera: CameraModel,
    /// Screen width and height the camera uv is computed against.
    pub format: Vec2,
    pub hdri_offset_degrees: f32,
    pub use_precomputed_irradiance: bool,
    pub samples: u32,
    pub incident_refractive_index: f32,
    pub refracted_refractive_index: f32,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            camera: CameraModel::default(),
            format: Vec2::new(3840.0, 2160.0),
            hdri_offset_degrees: 0.0,
            use_precomputed_irradiance: true,
            samples: 1,
            incident_refractive_index: 1.0,
            refracted_refractive_index: 1.33,
        }
    }
}

/// Per-pixel surface attributes, read with edge-clamped point access.
pub struct SurfaceLayers<'a, I: ImageSource> {
    pub normals: &'a I,
    pub seeds: &'a I,
    pub diffuse: &'a I,
    pub specular: &'a I,
    pub transmission: &'a I,
    pub material: &'a I,
}

impl<'a, I: ImageSource> SurfaceLayers<'a, I> {
    pub fn surface_at(&self, x: i32, y: i32) -> (SurfaceSample, SeedState) {
        let surface = SurfaceSample::from_layers(
            self.normals.sample(x, y),
            self.diffuse.sample(x, y),
            self.specular.sample(x, y),
            self.transmission.sample(x, y),
            self.material.sample(x, y),
        );
        (surface, SeedState::from_sample(self.seeds.sample(x, y)))
    }
}

/// Single-bounce image based shading of a diffuse/specular/transmission surface.
pub struct ShadingKernel<'a, I: ImageSource> {
    params: ShadingParams,
    rays: CameraRays,
    hdri: EnvironmentSampler<'a, I>,
    /// Present only when precomputed irradiance replaces the sampled diffuse bounce.
    irradiance: Option<EnvironmentSampler<'a, I>>,
}

impl<'a, I: ImageSource> ShadingKernel<'a, I> {
    pub fn new(params: ShadingParams, hdri: &'a I, irradiance: Option<&'a I>) -> Result<Self> {
        if params.samples == 0 {
            bail!("Shading needs at least one sample per pixel");
        }
        let irradiance = if params.use_precomputed_irradiance {
            match irradiance {
                Some(map) => Some(map),
                None => bail!("Precomputed irradiance is enabled but no irradiance map was provided"),
            }
        } else {
            None
        };

        let rays = CameraRays::new(&params.camera, params.format)?;
        log::debug!("Inverse camera projection: {:?}", rays.inverse_projection());

        let offset = degrees_to_radians(params.hdri_offset_degrees);
        Ok(Self {
            rays,
            hdri: EnvironmentSampler::new(hdri, offset),
            irradiance: irradiance.map(|map| EnvironmentSampler::new(map, offset)),
            params,
        })
    }

    pub fn primary_ray(&self, pixel: Vec2, seeds: &SeedState) -> Ray {
        self.rays.jittered_ray(pixel, seeds.seed0)
    }

    /// Environment radiance arriving from `direction`.
    pub fn environment_radiance(&self, direction: Vec3) -> Vec4 {
        self.hdri.sample(direction)
    }

    /// Averages `samples` single-bounce estimates for one pixel.
    pub fn shade(&self, pixel: Vec2, surface: &SurfaceSample, seeds: SeedState) -> Vec4 {
        let mut seeds = seeds;
        let mut radiance = Vec4::ZERO;
        for _ in 0..self.params.samples {
            let ray = self.primary_ray(pixel, &seeds);
            if surface.has_surface() {
                radiance += self.shade_surface(ray.direction, surface, seeds.seed1);
            } else {
                radiance += self.environment_radiance(ray.direction);
            }
            seeds.advance();
        }
        radiance / self.params.samples as f32
    }

    fn shade_surface(&self, incident: Vec3, surface: &SurfaceSample, bounce_seed: Vec2) -> Vec4 {
        let normal = surface.normal;
        let weights = surface.weights;
        let eta_i = self.params.incident_refractive_index;
        let eta_t = self.params.refracted_refractive_index;
        let diffuse_direction = cosine_direction_in_hemisphere(normal, bounce_seed);

        let mut radiance = Vec4::ZERO;
        if weights.diffuse > 0.0 {
            let incoming = match &self.irradiance {
                Some(irradiance) => irradiance.sample(normal),
                None => self.hdri.sample(diffuse_direction),
            };
            radiance += weights.diffuse * surface.diffuse_colour * incoming;
        }

        let mut fresnel_specular = weights.specular;
        if weights.transmission > 0.0 || weights.specular > 0.0 {
            let reflectivity = schlick_fresnel(incident, normal, eta_i, eta_t);
            fresnel_specular = blend(1.0, weights.specular, reflectivity);

            // Transmission was clamped to 1 - specular, so the renormalization only degenerates
            // when both weights are vanishingly close to their bounds.
            let remaining = 1.0 - weights.specular;
            if weights.transmission > 0.0 && remaining > f32::EPSILON {
                let refracted = refract(incident, normal, eta_i, eta_t);
                let direction = blend_vec3(diffuse_direction, refracted, surface.transmission_roughness)
                    .normalize_or_zero();
                radiance += weights.transmission * surface.transmission_colour * (1.0 - fresnel_specular)
                    * self.hdri.sample(direction)
                    / remaining;
            }
        }

        if fresnel_specular > 0.0 {
            let mirror = reflect(incident, normal);
            let direction =
                blend_vec3(diffuse_direction, mirror, surface.specular_roughness).normalize_or_zero();
            radiance += fresnel_specular * surface.specular_colour * self.hdri.sample(direction);
        }
        radiance
    }
}

impl<'a, I: ImageSource + Sync> ShadingKernel<'a, I> {
    /// Shades every pixel of the normals layer.
    pub fn render(&self, layers: &SurfaceLayers<'_, I>) -> HdrBuffer {
        let (width, height) = layers.normals.bounds();
        let started = Instant::now();
        log::info!(
            "Shading {width}x{height} pixels, {} sample(s) per pixel, precomputed irradiance {}",
            self.params.samples,
            self.irradiance.is_some()
        );
        let output = HdrBuffer::par_from_fn(width, height, |x, y| {
            let (surface, seeds) = layers.surface_at(x as i32, y as i32);
            self.shade(Vec2::new(x as f32, y as f32), &surface, seeds)
        });
        log::info!("Shading finished in {} ms", started.elapsed().as_millis());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LobeWeights;

    fn surface(normal: Vec3, specular: f32, transmission: f32) -> SurfaceSample {
        SurfaceSample::from_layers(
            normal.extend(0.0),
            Vec4::ONE,
            Vec4::new(1.0, 1.0, 1.0, specular),
            Vec4::new(1.0, 1.0, 1.0, transmission),
            Vec4::ZERO,
        )
    }

    fn small_params() -> ShadingParams {
        ShadingParams {
            format: Vec2::new(8.0, 8.0),
            use_precomputed_irradiance: false,
            ..ShadingParams::default()
        }
    }

    #[test]
    fn defaults_match_published_parameters() {
        let params = ShadingParams::default();
        assert_eq!(params.camera.focal_length, 50.0);
        assert_eq!(params.camera.horizontal_aperture, 24.576);
        assert_eq!(params.format, Vec2::new(3840.0, 2160.0));
        assert!(params.use_precomputed_irradiance);
        assert_eq!(params.samples, 1);
        assert_eq!(params.refracted_refractive_index, 1.33);
    }

    #[test]
    fn missing_irradiance_map_is_an_error() {
        let hdri = HdrBuffer::filled(8, 4, Vec4::ONE);
        let err = ShadingKernel::new(ShadingParams::default(), &hdri, None).err().expect("error");
        assert!(err.to_string().contains("irradiance"));
    }

    #[test]
    fn zero_samples_is_an_error() {
        let hdri = HdrBuffer::filled(8, 4, Vec4::ONE);
        let params = ShadingParams { samples: 0, ..small_params() };
        assert!(ShadingKernel::new(params, &hdri, None).is_err());
    }

    #[test]
    fn constant_environment_matches_lobe_formula() {
        let hdri = HdrBuffer::filled(16, 8, Vec4::ONE);
        let params = small_params();
        let (eta_i, eta_t) = (params.incident_refractive_index, params.refracted_refractive_index);
        let kernel = ShadingKernel::new(params, &hdri, None).expect("kernel");
        let seeds = SeedState::new(Vec2::new(0.3, 0.7), Vec2::new(0.1, 0.9));
        let pixel = Vec2::new(4.0, 4.0);
        let incident = kernel.primary_ray(pixel, &seeds).direction;

        for (specular, transmission) in [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.3, 0.4), (0.8, 0.8)] {
            let sample = surface(Vec3::Z, specular, transmission);
            let w = sample.weights;
            let fresnel = blend(1.0, w.specular, schlick_fresnel(incident, Vec3::Z, eta_i, eta_t));
            let fresnel = if w.specular > 0.0 || w.transmission > 0.0 { fresnel } else { w.specular };
            let mut expected = w.diffuse + fresnel;
            if w.transmission > 0.0 {
                expected += w.transmission * (1.0 - fresnel) / (1.0 - w.specular);
            }
            let value = kernel.shade(pixel, &sample, seeds);
            assert!(
                (value.x - expected).abs() < 1e-4,
                "got {value:?}, expected {expected} (s={specular} t={transmission})"
            );
        }
    }

    #[test]
    fn pure_diffuse_in_constant_light_returns_colour() {
        let hdri = HdrBuffer::filled(16, 8, Vec4::splat(0.5));
        let kernel = ShadingKernel::new(small_params(), &hdri, None).expect("kernel");
        let sample = surface(Vec3::Y, 0.0, 0.0);
        assert_eq!(sample.weights, LobeWeights { diffuse: 1.0, specular: 0.0, transmission: 0.0 });
        let value = kernel.shade(Vec2::ZERO, &sample, SeedState::new(Vec2::ONE, Vec2::ONE));
        assert!((value - Vec4::splat(0.5)).abs().max_element() < 1e-5);
    }

    #[test]
    fn precomputed_irradiance_is_read_at_the_normal() {
        let hdri = HdrBuffer::filled(16, 8, Vec4::ONE);
        let irradiance = HdrBuffer::filled(16, 8, Vec4::splat(0.25));
        let params = ShadingParams { use_precomputed_irradiance: true, ..small_params() };
        let kernel = ShadingKernel::new(params, &hdri, Some(&irradiance)).expect("kernel");
        let seeds = SeedState::new(Vec2::ONE, Vec2::ONE);
        let value = kernel.shade(Vec2::ZERO, &surface(Vec3::Y, 0.0, 0.0), seeds);
        assert!((value - Vec4::splat(0.25)).abs().max_element() < 1e-5);
    }

    #[test]
    fn full_specular_skips_transmission() {
        let hdri = HdrBuffer::filled(16, 8, Vec4::ONE);
        let kernel = ShadingKernel::new(small_params(), &hdri, None).expect("kernel");
        let sample = surface(Vec3::Z, 1.0, 1.0);
        assert_eq!(sample.weights.transmission, 0.0);
        let value = kernel.shade(Vec2::new(2.0, 2.0), &sample, SeedState::new(Vec2::ONE, Vec2::ONE));
        assert!(value.is_finite());
        assert!((value.x - 1.0).abs() < 1e-5);
    }
}
