//! Recovery of calibration and pose from camera matrices.

use crate::linalg::{rq, Svd3};
use crate::{Error, Result, SvdSettings};
use cv_core::nalgebra::{Matrix3, Matrix4};
use cv_core::{CameraMatrix, Pose, WorldToCamera};
use cv_pinhole::CameraIntrinsics;
use log::*;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A camera matrix `P ~ K * [R|T]` split into its calibration and pose.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MetricCamera {
    /// Upper triangular with a positive diagonal and `K[(2, 2)] = 1`.
    pub k: Matrix3<f64>,
    pub world_to_camera: WorldToCamera,
}

impl MetricCamera {
    /// The pinhole intrinsics of `K`.
    pub fn intrinsics(&self) -> Option<CameraIntrinsics> {
        CameraIntrinsics::from_matrix(&self.k)
    }

    /// Recombines `K * [R|T]`.
    pub fn camera_matrix(&self) -> CameraMatrix {
        CameraMatrix::from_parts(&self.k, self.world_to_camera)
    }
}

/// Decomposes a metric camera matrix `P = K * [R|T]`.
///
/// `K` is found with an RQ decomposition of the left 3x3 block. Of the sign ambiguities
/// the one with a positive diagonal in `K` and `det(R) = 1` is returned. `K` is normalized
/// so that `K[(2, 2)] = 1`, but `T` is not, so it carries the scale at which `P` was given.
///
/// ```
/// use cv_core::nalgebra::{Matrix3, Rotation3, Vector3};
/// use cv_core::{CameraMatrix, Pose, WorldToCamera};
/// use cv_multiview::metric::decompose_metric_camera;
/// let k = Matrix3::new(
///     500.0, 0.0, 320.0,
///     0.0, 500.0, 240.0,
///     0.0, 0.0, 1.0,
/// );
/// let pose = WorldToCamera::from_parts(
///     Vector3::new(0.1, -0.2, 1.5),
///     Rotation3::from_euler_angles(0.1, 0.2, 0.3),
/// );
/// let metric = decompose_metric_camera(&CameraMatrix::from_parts(&k, pose)).unwrap();
/// assert!((metric.k - k).norm() < 1e-9);
/// assert!((metric.world_to_camera.translation() - pose.translation()).norm() < 1e-9);
/// ```
pub fn decompose_metric_camera(p: &CameraMatrix) -> Result<MetricCamera> {
    if !p.iter().all(|v| v.is_finite()) {
        return Err(Error::NonFinite);
    }
    let (mut k, mut r) = rq(&p.rotation_block());
    let mut t = p.translation_column();

    // Negating column i of K and row i of R leaves K * R unchanged.
    for i in 0..3 {
        if k[(i, i)] < 0.0 {
            k.column_mut(i).neg_mut();
            r.row_mut(i).neg_mut();
        }
    }
    if r.determinant() < 0.0 {
        trace!("negating camera matrix to obtain a proper rotation");
        r.neg_mut();
        t.neg_mut();
    }

    let scale = k[(2, 2)];
    if scale == 0.0 {
        return Err(Error::NotInvertible("calibration matrix"));
    }
    k /= scale;
    let k_inv = k
        .try_inverse()
        .ok_or(Error::NotInvertible("calibration matrix"))?;

    Ok(MetricCamera {
        k,
        world_to_camera: WorldToCamera::from_rotation_matrix(r, k_inv * t),
    })
}

/// Upgrades a projective camera with the rectifying homography `H` and decomposes it.
///
/// This is [`decompose_metric_camera`] of `P * H`.
pub fn projective_to_metric(p: &CameraMatrix, h: &Matrix4<f64>) -> Result<MetricCamera> {
    decompose_metric_camera(&CameraMatrix(p.0 * h))
}

/// Upgrades a projective camera with the rectifying homography `H` when the calibration
/// is already known.
///
/// The rotation block of `K^-1 * P * H` is projected onto the closest rotation. The
/// translation is its last column, so it carries the scale of `P * H`.
pub fn projective_to_metric_known_k(
    p: &CameraMatrix,
    h: &Matrix4<f64>,
    k: &Matrix3<f64>,
) -> Result<WorldToCamera> {
    let k_inv = k
        .try_inverse()
        .ok_or(Error::NotInvertible("calibration matrix"))?;
    let pose = CameraMatrix(k_inv * p.0 * h);

    let svd = Svd3::new(&pose.rotation_block(), SvdSettings::default())?;
    let mut r = svd.u * svd.v_t;
    let mut t = pose.translation_column();
    if r.determinant() < 0.0 {
        r.neg_mut();
        t.neg_mut();
    }
    Ok(WorldToCamera::from_rotation_matrix(r, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cv_core::nalgebra::{Rotation3, Vector3};
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn random_camera(rng: &mut SmallRng) -> (Matrix3<f64>, WorldToCamera) {
        let k = Matrix3::new(
            rng.gen_range(300.0..800.0),
            rng.gen_range(-2.0..2.0),
            rng.gen_range(200.0..400.0),
            0.0,
            rng.gen_range(300.0..800.0),
            rng.gen_range(200.0..300.0),
            0.0,
            0.0,
            1.0,
        );
        let pose = WorldToCamera::from_parts(
            Vector3::from_fn(|_, _| rng.gen_range(-2.0..2.0)),
            Rotation3::new(Vector3::from_fn(|_, _| rng.gen_range(-3.0..3.0))),
        );
        (k, pose)
    }

    #[test]
    fn recovers_calibration_and_pose() {
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..50 {
            let (k, pose) = random_camera(&mut rng);
            let metric = decompose_metric_camera(&CameraMatrix::from_parts(&k, pose)).unwrap();
            assert_relative_eq!(metric.k, k, max_relative = 1e-9, epsilon = 1e-9);
            assert_relative_eq!(
                metric.world_to_camera.rotation_matrix(),
                pose.rotation_matrix(),
                epsilon = 1e-9
            );
            assert_relative_eq!(
                metric.world_to_camera.translation(),
                pose.translation(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn negative_scale_keeps_magnitude() {
        let mut rng = SmallRng::seed_from_u64(1);
        let (k, pose) = random_camera(&mut rng);
        let camera = CameraMatrix(CameraMatrix::from_parts(&k, pose).0 * -2.0);
        let metric = decompose_metric_camera(&camera).unwrap();
        assert_relative_eq!(metric.k, k, max_relative = 1e-9, epsilon = 1e-9);
        assert_relative_eq!(
            metric.world_to_camera.rotation_matrix(),
            pose.rotation_matrix(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            metric.world_to_camera.translation(),
            pose.translation() * 2.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            metric.intrinsics().unwrap().matrix(),
            k,
            max_relative = 1e-9,
            epsilon = 1e-9
        );
    }

    #[test]
    fn rejects_non_finite() {
        let mut camera = CameraMatrix::canonical();
        camera.0[(0, 3)] = f64::INFINITY;
        assert_eq!(decompose_metric_camera(&camera), Err(Error::NonFinite));
    }

    #[test]
    fn known_calibration() {
        let mut rng = SmallRng::seed_from_u64(2);
        let (k, pose) = random_camera(&mut rng);
        let h = Matrix4::new_scaling(1.0);
        let found = projective_to_metric_known_k(&CameraMatrix::from_parts(&k, pose), &h, &k).unwrap();
        assert_relative_eq!(found.rotation_matrix(), pose.rotation_matrix(), epsilon = 1e-9);
        assert_relative_eq!(found.translation(), pose.translation(), epsilon = 1e-9);
    }

    #[test]
    fn projective_upgrade() {
        let mut rng = SmallRng::seed_from_u64(3);
        let (k, pose) = random_camera(&mut rng);
        // Any invertible H with a metric camera P * H.
        let h = Matrix4::from_fn(|_, _| rng.gen_range(-1.0..1.0)) + Matrix4::identity() * 3.0;
        let h_inv = h.try_inverse().unwrap();
        let projective = CameraMatrix(CameraMatrix::from_parts(&k, pose).0 * h_inv);
        let metric = projective_to_metric(&projective, &h).unwrap();
        assert_relative_eq!(metric.k, k, max_relative = 1e-6, epsilon = 1e-6);
    }
}
