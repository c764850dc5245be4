use glam::{Mat3, Mat4, Vec3, Vec4};

/// Builds a matrix from row-major elements, the layout camera parameters are authored in.
pub fn mat3_from_rows(rows: [[f32; 3]; 3]) -> Mat3 {
    Mat3::from_cols_array_2d(&rows).transpose()
}

pub fn mat4_from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

/// `out[i] = sum_j m[i][j] * v[j]`.
pub fn matmul3(m: Mat3, v: Vec3) -> Vec3 {
    m * v
}

pub fn matmul4(m: Mat4, v: Vec4) -> Vec4 {
    m * v
}

/// Translation part of a row-major world matrix, `(m[0][3], m[1][3], m[2][3])`.
pub fn position_from_world_matrix(world: Mat4) -> Vec3 {
    world.w_axis.truncate()
}

/// Rotation of `angle` radians about the unit `axis`.
pub fn axis_angle_rotation(axis: Vec3, angle: f32) -> Mat3 {
    let cos_angle = angle.cos();
    let one_minus_cos = 1.0 - cos_angle;
    let sin_angle = angle.sin();

    let axis_squared = axis * axis;
    let xy = axis.x * axis.y * one_minus_cos;
    let xz = axis.x * axis.z * one_minus_cos;
    let yz = axis.y * axis.z * one_minus_cos;
    let axis_sin = axis * sin_angle;

    mat3_from_rows([
        [cos_angle + axis_squared.x * one_minus_cos, xy - axis_sin.z, xz + axis_sin.y],
        [xy + axis_sin.z, cos_angle + axis_squared.y * one_minus_cos, yz - axis_sin.x],
        [xz - axis_sin.y, yz + axis_sin.x, cos_angle + axis_squared.z * one_minus_cos],
    ])
}

/// Angle and rotation axis carrying `from` onto `to`.
///
/// When the vectors are parallel the cross product vanishes and the axis falls back to the first
/// world axis whose cross product with `to` is non-zero.
pub fn angle_and_axis_between(from: Vec3, to: Vec3) -> (f32, Vec3) {
    let perpendicular = from.cross(to);
    let axis = if perpendicular.length() > 0.0 {
        perpendicular.normalize()
    } else if to.z != 0.0 || to.y != 0.0 {
        Vec3::X.cross(to).normalize()
    } else if to.x != 0.0 || to.z != 0.0 {
        Vec3::Y.cross(to).normalize()
    } else if to.x != 0.0 || to.y != 0.0 {
        Vec3::Z.cross(to).normalize()
    } else {
        from
    };
    (from.dot(to).clamp(-1.0, 1.0).acos(), axis)
}

/// Rotates `vector`, defined relative to `unaligned_axis`, so that axis lands on `align_direction`.
pub fn align_with_direction(unaligned_axis: Vec3, align_direction: Vec3, vector: Vec3) -> Vec3 {
    let (angle, axis) = angle_and_axis_between(unaligned_axis, align_direction);
    if angle == 0.0 {
        return vector;
    }
    matmul3(axis_angle_rotation(axis, angle), vector)
}

/// Linear blend where `weight == 1` yields `a` and `weight == 0` yields `b`.
pub fn blend(a: f32, b: f32, weight: f32) -> f32 {
    b + weight * (a - b)
}

pub fn blend_vec3(a: Vec3, b: Vec3, weight: f32) -> Vec3 {
    b + weight * (a - b)
}

pub fn saturate(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

pub fn positive_part(value: f32) -> f32 {
    value.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_vec3_near(a: Vec3, b: Vec3, epsilon: f32) {
        assert!((a - b).length() <= epsilon, "vectors differed: left={a:?}, right={b:?}");
    }

    #[test]
    fn row_major_layout_matches_element_indices() {
        let rows = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = mat4_from_rows(rows);
        let out = matmul4(m, Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(out, Vec4::new(1.0, 5.0, 9.0, 0.0));
        assert_eq!(position_from_world_matrix(m), Vec3::new(4.0, 8.0, 12.0));
    }

    #[test]
    fn axis_angle_rotates_x_onto_y_about_z() {
        let rotated = matmul3(axis_angle_rotation(Vec3::Z, FRAC_PI_2), Vec3::X);
        assert_vec3_near(rotated, Vec3::Y, 1e-6);
    }

    #[test]
    fn align_moves_z_onto_target() {
        let target = Vec3::new(1.0, 2.0, -0.5).normalize();
        assert_vec3_near(align_with_direction(Vec3::Z, target, Vec3::Z), target, 1e-5);
    }

    #[test]
    fn align_to_same_axis_is_identity() {
        let v = Vec3::new(0.3, -0.2, 0.9);
        assert_eq!(align_with_direction(Vec3::Z, Vec3::Z, v), v);
    }

    #[test]
    fn antiparallel_alignment_uses_fallback_axis() {
        let (angle, axis) = angle_and_axis_between(Vec3::Z, Vec3::NEG_Z);
        assert!((angle - PI).abs() < 1e-6);
        assert_vec3_near(axis, Vec3::Y, 1e-6);
        let flipped = align_with_direction(Vec3::Z, Vec3::NEG_Z, Vec3::Z);
        assert_vec3_near(flipped, Vec3::NEG_Z, 1e-5);
    }

    #[test]
    fn zero_target_falls_back_to_source_axis() {
        let (_, axis) = angle_and_axis_between(Vec3::Z, Vec3::ZERO);
        assert_eq!(axis, Vec3::Z);
    }

    #[test]
    fn blend_weight_selects_first_value_at_one() {
        assert_eq!(blend(1.0, 0.25, 1.0), 1.0);
        assert_eq!(blend(1.0, 0.25, 0.0), 0.25);
        assert_eq!(blend_vec3(Vec3::X, Vec3::Y, 0.5), Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(saturate(1.5), 1.0);
        assert_eq!(positive_part(-2.0), 0.0);
    }
}
