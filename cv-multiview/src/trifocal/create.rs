use cv_core::nalgebra::{Matrix3, Matrix4, RowVector4};
use cv_core::{CameraMatrix, CameraToCamera, Pose, TrifocalTensor};

/// Computes the trifocal tensor of three cameras `[I|0]`, `P2` and `P3`.
///
/// ```text
/// T_i^{jk} = P2[j,i] * P3[k,3] - P2[j,3] * P3[k,i]
/// ```
///
/// ```
/// use cv_core::{CameraMatrix, Projective, WorldPoint};
/// use cv_core::nalgebra::{Matrix3x4, Point2, Point3};
/// use cv_multiview::trifocal;
/// let p2 = CameraMatrix(Matrix3x4::new(
///     1.0, 0.1, 0.0, 0.5,
///     0.0, 1.0, 0.2, 0.0,
///     0.1, 0.0, 1.0, 0.1,
/// ));
/// let p3 = CameraMatrix(Matrix3x4::new(
///     0.9, 0.0, 0.3, -0.4,
///     0.0, 1.1, 0.0, 0.3,
///     -0.2, 0.1, 1.0, 0.2,
/// ));
/// let tensor = trifocal::create_trifocal(&p2, &p3);
///
/// // Every world point satisfies the point-point-point constraint.
/// let point = WorldPoint::from_point(Point3::new(0.3, -0.2, 4.0));
/// let project = |camera: &CameraMatrix| {
///     Point2::from_homogeneous(camera.project(point)).unwrap()
/// };
/// let residual = trifocal::constraint_ppp(
///     &tensor,
///     project(&CameraMatrix::canonical()),
///     project(&p2),
///     project(&p3),
/// );
/// assert!(residual.norm() < 1e-9);
/// ```
pub fn create_trifocal(p2: &CameraMatrix, p3: &CameraMatrix) -> TrifocalTensor {
    let slice = |i: usize| {
        Matrix3::from_fn(|j, k| p2[(j, i)] * p3[(k, 3)] - p2[(j, 3)] * p3[(k, i)])
    };
    TrifocalTensor([slice(0), slice(1), slice(2)])
}

/// Computes the trifocal tensor of three arbitrary cameras.
///
/// Each element is a 4x4 determinant made of two rows of `P1`, one row of `P2`,
/// and one row of `P3`. All cameras are divided by the largest absolute element
/// among them before computing determinants and the result is scaled back afterwards.
///
/// When `P1 = [I|0]` this is the same tensor as [`create_trifocal`] up to scale.
pub fn create_trifocal_general(
    p1: &CameraMatrix,
    p2: &CameraMatrix,
    p3: &CameraMatrix,
) -> TrifocalTensor {
    let scale = p1.max_abs().max(p2.max_abs()).max(p3.max_abs());
    let normalize = |camera: &CameraMatrix| {
        if scale == 0.0 {
            camera.0
        } else {
            camera.0 / scale
        }
    };
    let (p1, p2, p3) = (normalize(p1), normalize(p2), normalize(p3));

    let mut tensor = TrifocalTensor::zeros();
    let mut sign = 1.0;
    for i in 0..3 {
        // The two rows of P1 other than row `i`, in order.
        let (a, b) = match i {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        tensor[i] = Matrix3::from_fn(|q, r| {
            let rows: [RowVector4<f64>; 4] = [
                p1.row(a).into_owned(),
                p1.row(b).into_owned(),
                p2.row(q).into_owned(),
                p3.row(r).into_owned(),
            ];
            sign * Matrix4::from_rows(&rows).determinant() * scale
        });
        sign = -sign;
    }
    tensor
}

/// Computes the trifocal tensor of three calibrated cameras from the motion of the
/// second and third camera relative to the first.
///
/// This is [`create_trifocal`] with `P2 = [R2|t2]` and `P3 = [R3|t3]`.
pub fn create_trifocal_calibrated(pose2: CameraToCamera, pose3: CameraToCamera) -> TrifocalTensor {
    let (r2, t2) = (pose2.rotation_matrix(), pose2.translation());
    let (r3, t3) = (pose3.rotation_matrix(), pose3.translation());
    let slice = |i: usize| Matrix3::from_fn(|j, k| r2[(j, i)] * t3[k] - t2[j] * r3[(k, i)]);
    TrifocalTensor([slice(0), slice(1), slice(2)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cv_core::nalgebra::{Matrix3x4, Rotation3, Vector3};
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn same_up_to_scale(a: TrifocalTensor, b: TrifocalTensor) -> f64 {
        let (a, b) = (a.normalize(), b.normalize());
        let difference = |a: TrifocalTensor, b: TrifocalTensor| {
            (0..3).map(|i| (a[i] - b[i]).norm_squared()).sum::<f64>().sqrt()
        };
        difference(a, b).min(difference(a, b.scale(-1.0)))
    }

    #[test]
    fn general_matches_canonical() {
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..20 {
            let p2 = CameraMatrix(Matrix3x4::from_fn(|_, _| rng.gen_range(-5.0..5.0)));
            let p3 = CameraMatrix(Matrix3x4::from_fn(|_, _| rng.gen_range(-5.0..5.0)));
            let canonical = create_trifocal(&p2, &p3);
            let general = create_trifocal_general(&CameraMatrix::canonical(), &p2, &p3);
            assert!(same_up_to_scale(canonical, general) < 1e-9);
        }
    }

    #[test]
    fn general_is_scale_invariant() {
        let mut rng = SmallRng::seed_from_u64(1);
        let p1 = CameraMatrix(Matrix3x4::from_fn(|_, _| rng.gen_range(-1.0..1.0)));
        let p2 = CameraMatrix(Matrix3x4::from_fn(|_, _| rng.gen_range(-1.0..1.0)));
        let p3 = CameraMatrix(Matrix3x4::from_fn(|_, _| rng.gen_range(-1.0..1.0)));
        let small = create_trifocal_general(&p1, &p2, &p3);
        let large = create_trifocal_general(
            &CameraMatrix(p1.0 * 1e6),
            &CameraMatrix(p2.0 * 1e6),
            &CameraMatrix(p3.0 * 1e6),
        );
        assert!(same_up_to_scale(small, large) < 1e-9);
    }

    #[test]
    fn calibrated_matches_camera_matrices() {
        let pose2 = CameraToCamera::from_parts(
            Vector3::new(0.5, -0.1, 0.2),
            Rotation3::from_euler_angles(0.1, 0.2, -0.1),
        );
        let pose3 = CameraToCamera::from_parts(
            Vector3::new(-0.4, 0.3, 0.1),
            Rotation3::from_euler_angles(-0.2, 0.1, 0.3),
        );
        let expected = create_trifocal(
            &CameraMatrix(pose2.matrix3x4()),
            &CameraMatrix(pose3.matrix3x4()),
        );
        let tensor = create_trifocal_calibrated(pose2, pose3);
        for i in 0..3 {
            assert_relative_eq!(tensor[i], expected[i], epsilon = 1e-12);
        }
    }
}
