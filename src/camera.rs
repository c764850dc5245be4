use crate::random::random_vec2;
use crate::spherical::{aspect_ratio, pixel_to_uv};
use crate::transform::{mat4_from_rows, matmul4, position_from_world_matrix};
use anyhow::{bail, Result};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Film-back camera described the way DCC tools export it.
#[derive(Debug, Clone)]
pub struct CameraModel {
    pub focal_length: f32,
    pub horizontal_aperture: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Camera to world transform; translation lives in `w_axis`.
    pub world_matrix: Mat4,
}

impl Default for CameraModel {
    fn default() -> Self {
        Self {
            focal_length: 50.0,
            horizontal_aperture: 24.576,
            near_plane: 0.1,
            far_plane: 10_000.0,
            world_matrix: Mat4::IDENTITY,
        }
    }
}

impl CameraModel {
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let far_minus_near = self.far_plane - self.near_plane;
        let x_scale = 2.0 * self.focal_length / self.horizontal_aperture;
        mat4_from_rows([
            [x_scale, 0.0, 0.0, 0.0],
            [0.0, x_scale / aspect, 0.0, 0.0],
            [
                0.0,
                0.0,
                -(self.far_plane + self.near_plane) / far_minus_near,
                -2.0 * (self.far_plane * self.near_plane) / far_minus_near,
            ],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Primary ray generator with the inverse projection resolved once up front.
#[derive(Debug, Clone)]
pub struct CameraRays {
    world_matrix: Mat4,
    inverse_projection: Mat4,
    format: Vec2,
}

impl CameraRays {
    pub fn new(model: &CameraModel, format: Vec2) -> Result<Self> {
        if format.x <= 0.0 || format.y <= 0.0 {
            bail!("Image format must be positive, got {}x{}", format.x, format.y);
        }
        if model.horizontal_aperture == 0.0 || model.far_plane == model.near_plane {
            bail!(
                "Camera projection is singular (aperture {}, near {}, far {})",
                model.horizontal_aperture,
                model.near_plane,
                model.far_plane
            );
        }
        let projection = model.projection_matrix(aspect_ratio(format.y, format.x));
        let determinant = projection.determinant();
        if !determinant.is_finite() || determinant == 0.0 {
            bail!("Camera projection is not invertible (determinant {determinant})");
        }
        Ok(Self { world_matrix: model.world_matrix, inverse_projection: projection.inverse(), format })
    }

    pub fn inverse_projection(&self) -> Mat4 {
        self.inverse_projection
    }

    /// Ray through a `[-1, 1]` screen uv.
    pub fn ray(&self, uv: Vec2) -> Ray {
        let origin = position_from_world_matrix(self.world_matrix);
        let view = matmul4(self.inverse_projection, Vec4::new(uv.x, uv.y, 0.0, 1.0));
        let world = matmul4(self.world_matrix, view.truncate().extend(0.0));
        Ray { origin, direction: world.truncate().normalize() }
    }

    /// Ray through `pixel` offset by a `[0, 1)` jitter hashed from `seed`.
    pub fn jittered_ray(&self, pixel: Vec2, seed: Vec2) -> Ray {
        self.ray(pixel_to_uv(pixel + random_vec2(seed), self.format))
    }
}
