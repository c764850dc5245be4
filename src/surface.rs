use crate::transform::saturate;
use glam::{Vec3, Vec4};

/// Mirror reflection of `incident` about `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    (incident - 2.0 * incident.dot(normal) * normal).normalize()
}

/// Snell refraction from a medium of index `eta_i` into `eta_t`.
///
/// Past the critical angle there is no transmitted ray and the mirror direction is returned.
pub fn refract(incident: Vec3, normal: Vec3, eta_i: f32, eta_t: f32) -> Vec3 {
    let ratio = eta_i / eta_t;
    let cos_incident = -incident.dot(normal);
    let sin_transmitted_squared = ratio * ratio * (1.0 - cos_incident * cos_incident);
    if sin_transmitted_squared > 1.0 {
        return reflect(incident, normal);
    }
    let cos_transmitted = (1.0 - sin_transmitted_squared).sqrt();
    (ratio * incident + (ratio * cos_incident - cos_transmitted) * normal).normalize()
}

/// Schlick's approximation of the Fresnel reflectance, clamped to 1.0 under total internal
/// reflection.
pub fn schlick_fresnel(incident: Vec3, normal: Vec3, eta_i: f32, eta_t: f32) -> f32 {
    let r0 = ((eta_i - eta_t) / (eta_i + eta_t)).powi(2);
    let mut cos_x = -normal.dot(incident);
    if eta_i > eta_t {
        let ratio = eta_i / eta_t;
        let sin_transmitted_squared = ratio * ratio * (1.0 - cos_x * cos_x);
        if sin_transmitted_squared > 1.0 {
            return 1.0;
        }
        cos_x = (1.0 - sin_transmitted_squared).sqrt();
    }
    r0 + (1.0 - r0) * (1.0 - cos_x).powi(5)
}

/// Diffuse, specular and transmission weights with `diffuse + specular + transmission <= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LobeWeights {
    pub diffuse: f32,
    pub specular: f32,
    pub transmission: f32,
}

impl LobeWeights {
    /// Specular wins when the raw specular and transmission weights overlap.
    pub fn reconcile(specular_raw: f32, transmission_raw: f32) -> Self {
        let specular = saturate(specular_raw);
        let transmission = if specular + transmission_raw > 1.0 {
            1.0 - specular
        } else {
            saturate(transmission_raw)
        };
        let diffuse = saturate(1.0 - transmission - specular);
        Self { diffuse, specular, transmission }
    }

    pub fn total(&self) -> f32 {
        self.diffuse + self.specular + self.transmission
    }
}

/// Shading inputs gathered for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub normal: Vec3,
    pub diffuse_colour: Vec4,
    pub specular_colour: Vec4,
    pub transmission_colour: Vec4,
    pub weights: LobeWeights,
    pub specular_roughness: f32,
    pub transmission_roughness: f32,
}

impl SurfaceSample {
    /// Lobe weights come from the alpha channels of the colour layers; the roughness values are
    /// `material.x` and `material.y`, squared. `material.zw` are unused.
    ///
    /// The normal is renormalized, so non-unit normal layers shade as their unit direction. A normal
    /// too short to normalize (including subnormal lengths) becomes zero and marks background.
    pub fn from_layers(
        normal: Vec4,
        diffuse: Vec4,
        specular: Vec4,
        transmission: Vec4,
        material: Vec4,
    ) -> Self {
        Self {
            normal: normal.truncate().normalize_or_zero(),
            diffuse_colour: diffuse,
            specular_colour: specular,
            transmission_colour: transmission,
            weights: LobeWeights::reconcile(specular.w, transmission.w),
            specular_roughness: material.x * material.x,
            transmission_roughness: material.y * material.y,
        }
    }

    /// A zero normal marks background pixels.
    pub fn has_surface(&self) -> bool {
        self.normal != Vec3::ZERO
    }
}
