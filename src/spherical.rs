use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Wraps `(theta, phi)` into `[0, 2π) x [0, π)`.
pub fn normalize_angles(angles: Vec2) -> Vec2 {
    Vec2::new(wrap_half_open(angles.x, TAU), wrap_half_open(angles.y, PI))
}

fn wrap_half_open(value: f32, period: f32) -> f32 {
    let mut wrapped = value % period;
    if wrapped < 0.0 {
        wrapped += period;
    }
    // A tiny negative remainder can round up to exactly `period` once shifted.
    if wrapped >= period {
        wrapped = 0.0;
    }
    wrapped
}

/// Converts a unit direction (y up) to spherical angles, rotating theta by `theta_offset`.
pub fn cartesian_to_spherical(direction: Vec3, theta_offset: f32) -> Vec2 {
    normalize_angles(Vec2::new(
        direction.z.atan2(direction.x) + theta_offset,
        direction.y.clamp(-1.0, 1.0).acos(),
    ))
}

pub fn spherical_to_cartesian(angles: Vec2) -> Vec3 {
    let sin_phi = angles.y.sin();
    Vec3::new(angles.x.cos() * sin_phi, angles.y.cos(), angles.x.sin() * sin_phi)
}

/// Maps a `[-1, 1]` uv position to angles. Only the upper half range of phi is produced for
/// `v >= 0`, so this is not the inverse of the equirectangular lookup.
pub fn uv_to_angles(uv: Vec2) -> Vec2 {
    Vec2::new((uv.x + 1.0) * PI, (1.0 - uv.y) * PI / 2.0)
}

pub fn pixel_to_uv(pixel: Vec2, format: Vec2) -> Vec2 {
    2.0 * pixel / format - Vec2::ONE
}

pub fn degrees_to_radians(angle: f32) -> f32 {
    angle * PI / 180.0
}

pub fn aspect_ratio(height: f32, width: f32) -> f32 {
    height / width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_angles_wraps_negative_and_large_values() {
        let wrapped = normalize_angles(Vec2::new(-0.5, -0.25));
        assert!((wrapped.x - (TAU - 0.5)).abs() < 1e-6);
        assert!((wrapped.y - (PI - 0.25)).abs() < 1e-6);

        let wrapped = normalize_angles(Vec2::new(5.0 * TAU + 1.0, 3.0 * PI + 0.5));
        assert!((wrapped.x - 1.0).abs() < 1e-4);
        assert!((wrapped.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn normalize_angles_never_returns_the_period() {
        let wrapped = normalize_angles(Vec2::new(-1e-9, -1e-9));
        assert!(wrapped.x < TAU && wrapped.x >= 0.0);
        assert!(wrapped.y < PI && wrapped.y >= 0.0);
    }

    #[test]
    fn up_axis_maps_to_zero_phi() {
        let angles = cartesian_to_spherical(Vec3::Y, 0.0);
        assert!(angles.y.abs() < 1e-6);
        let angles = cartesian_to_spherical(Vec3::new(0.0, -1.0, 0.0), 0.0);
        // acos(-1) == π folds back to 0 in the half-open range.
        assert!(angles.y.abs() < 1e-6 || (angles.y - PI).abs() < 1e-6);
    }

    #[test]
    fn theta_offset_rotates_azimuth() {
        let base = cartesian_to_spherical(Vec3::X, 0.0);
        let rotated = cartesian_to_spherical(Vec3::X, 0.75);
        assert!(base.x.abs() < 1e-6);
        assert!((rotated.x - 0.75).abs() < 1e-6);
    }

    #[test]
    fn pixel_to_uv_spans_unit_square() {
        let format = Vec2::new(200.0, 100.0);
        assert_eq!(pixel_to_uv(Vec2::ZERO, format), Vec2::new(-1.0, -1.0));
        assert_eq!(pixel_to_uv(format, format), Vec2::new(1.0, 1.0));
        assert_eq!(pixel_to_uv(format * 0.5, format), Vec2::ZERO);
    }

    #[test]
    fn uv_to_angles_covers_upper_hemisphere_for_positive_v() {
        let angles = uv_to_angles(Vec2::new(-1.0, 1.0));
        assert_eq!(angles, Vec2::ZERO);
        let angles = uv_to_angles(Vec2::new(0.0, 0.0));
        assert!((angles.x - PI).abs() < 1e-6);
        assert!((angles.y - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn degrees_convert_to_radians() {
        assert!((degrees_to_radians(180.0) - PI).abs() < 1e-6);
        assert!((aspect_ratio(2160.0, 3840.0) - 0.5625).abs() < 1e-6);
    }
}
