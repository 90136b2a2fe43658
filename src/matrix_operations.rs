use cgmath::{Matrix4, Rad, Vector3};

pub fn identity_matrix() -> Matrix4<f64> {
    Matrix4::from_scale(1.0)
}

pub fn translate_matrix_3d(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

pub fn rotation_matrix_3d_x(angle: f64) -> Matrix4<f64> {
    Matrix4::from_angle_x(Rad(angle))
}

pub fn rotation_matrix_3d_y(angle: f64) -> Matrix4<f64> {
    Matrix4::from_angle_y(Rad(angle))
}

pub fn rotation_matrix_3d_z(angle: f64) -> Matrix4<f64> {
    Matrix4::from_angle_z(Rad(angle))
}

/// Euler triple applied z first, then y, then x (`Rx * Ry * Rz`).
pub fn euler_matrix_3d(angles: Vector3<f64>) -> Matrix4<f64> {
    rotation_matrix_3d_x(angles.x) * rotation_matrix_3d_y(angles.y) * rotation_matrix_3d_z(angles.z)
}

/// Exact inverse of [`euler_matrix_3d`].
pub fn inverse_euler_matrix_3d(angles: Vector3<f64>) -> Matrix4<f64> {
    rotation_matrix_3d_z(-angles.z) * rotation_matrix_3d_y(-angles.y) * rotation_matrix_3d_x(-angles.x)
}

/// Column-major, single precision, as uploaded to a uniform buffer.
pub fn flatten_4x4_matrix_for_wgpu(matrix: Matrix4<f64>) -> [f32; 16] {
    let columns = [matrix.x, matrix.y, matrix.z, matrix.w];
    let mut result = [0.0; 16];
    for (i, column) in columns.iter().enumerate() {
        result[i * 4] = column.x as f32;
        result[i * 4 + 1] = column.y as f32;
        result[i * 4 + 2] = column.z as f32;
        result[i * 4 + 3] = column.w as f32;
    }
    result
}

#[cfg(test)]
pub(crate) fn assert_matrix_close(a: Matrix4<f64>, b: Matrix4<f64>, tolerance: f64) {
    let a: &[[f64; 4]; 4] = a.as_ref();
    let b: &[[f64; 4]; 4] = b.as_ref();
    for col in 0..4 {
        for row in 0..4 {
            assert!(
                (a[col][row] - b[col][row]).abs() <= tolerance,
                "matrices differ at column {col} row {row}: {} vs {}",
                a[col][row],
                b[col][row]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Transform};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_about_y_takes_x_to_negative_z() {
        let p = rotation_matrix_3d_y(FRAC_PI_2).transform_point(Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((p.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn euler_inverse_cancels() {
        let angles = Vector3::new(-FRAC_PI_2, 0.4, std::f64::consts::PI);
        let product = euler_matrix_3d(angles) * inverse_euler_matrix_3d(angles);
        assert_matrix_close(product, identity_matrix(), 1e-12);
    }

    #[test]
    fn euler_applies_z_before_x() {
        // z quarter turn takes +x to +y, then x quarter turn takes +y to +z.
        let m = euler_matrix_3d(Vector3::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        let p = m.transform_point(Point3::new(1.0, 0.0, 0.0));
        assert!((p.z - 1.0).abs() < 1e-12, "got {p:?}");
    }

    #[test]
    fn flattening_is_column_major() {
        let flat = flatten_4x4_matrix_for_wgpu(translate_matrix_3d(1.0, 2.0, 3.0));
        assert_eq!(&flat[12..16], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(flat[0], 1.0);
        assert_eq!(flat[5], 1.0);
        assert_eq!(flat[10], 1.0);
    }
}
