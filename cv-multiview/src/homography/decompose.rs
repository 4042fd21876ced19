use crate::linalg::Svd3;
use crate::{Error, Result, SvdSettings, EPSILON};
use cv_core::nalgebra::{Matrix3, Vector3};
use cv_core::{CameraToCamera, Pose};
use log::*;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Relative singular value gap below which a homography is treated as a pure rotation.
const ROTATION_GAP: f64 = 1e-12;

/// One candidate explanation of a calibrated homography.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HomographySolution {
    /// The motion from the first camera to the second. The translation is divided by
    /// the distance from the first camera to the plane.
    pub motion: CameraToCamera,
    /// The unit normal of the plane in the first camera's frame.
    pub normal: Vector3<f64>,
}

/// Decomposes a calibrated homography `H ~ R + T * N^T / d` into its four candidate
/// motions and plane normals.
///
/// The candidates come in two pairs `(R1, T1, N1)`, `(R1, -T1, -N1)`, `(R2, T2, N2)` and
/// `(R2, -T2, -N2)`. At most two of them place the plane in front of both cameras.
///
/// The homography may have any scale or sign. It is rescaled by its middle singular
/// value and negated if its determinant is negative, which is the correct sign whenever
/// both cameras are on the same side of the plane.
///
/// If the homography is a pure rotation the plane is unobservable. Every candidate then
/// has `R = H`, `T = 0` and an arbitrary normal. A homography of rank below two fails
/// with [`Error::Degenerate`].
///
/// ```
/// use cv_core::nalgebra::{Rotation3, Vector3};
/// use cv_core::Pose;
/// use cv_multiview::homography::{create_homography, decompose_homography};
/// let rotation = Rotation3::from_euler_angles(0.1, 0.2, -0.1);
/// let translation = Vector3::new(0.5, 0.1, -0.2);
/// let normal = Vector3::new(0.0, 0.2, 1.0).normalize();
/// let h = create_homography(rotation.matrix(), &translation, 2.0, &normal).unwrap();
/// let solutions = decompose_homography(&(h * -3.0)).unwrap();
/// assert!(solutions.iter().any(|s| {
///     (s.motion.translation() - translation / 2.0).norm() < 1e-9
///         && (s.normal - normal).norm() < 1e-9
/// }));
/// ```
pub fn decompose_homography(h: &Matrix3<f64>) -> Result<[HomographySolution; 4]> {
    decompose_homography_with(h, SvdSettings::default())
}

/// [`decompose_homography`] with explicit convergence settings.
pub fn decompose_homography_with(
    h: &Matrix3<f64>,
    settings: SvdSettings,
) -> Result<[HomographySolution; 4]> {
    let svd = Svd3::new(h, settings)?;
    let [s1, s2, s3] = [
        svd.singular_values[0],
        svd.singular_values[1],
        svd.singular_values[2],
    ];
    if !(s2 > EPSILON * s1) {
        debug!("homography has rank below two, singular values {} {} {}", s1, s2, s3);
        return Err(Error::Degenerate("homography is singular"));
    }
    let mut h = h / s2;
    if h.determinant() < 0.0 {
        h.neg_mut();
    }

    let (s1, s3) = ((s1 / s2).powi(2), (s3 / s2).powi(2));
    let v1 = svd.v_t.row(0).transpose();
    let v2 = svd.v_t.row(1).transpose();
    let v3 = svd.v_t.row(2).transpose();

    if s1 - s3 <= ROTATION_GAP {
        debug!("homography is a pure rotation, the plane normal is unobservable");
        let motion = CameraToCamera::from_rotation_matrix(h, Vector3::zeros());
        return Ok([v3, -v3, v1, -v1].map(|normal| HomographySolution { motion, normal }));
    }

    let denominator = (s1 - s3).sqrt();
    let a = (1.0 - s3).max(0.0).sqrt() / denominator;
    let b = (s1 - 1.0).max(0.0).sqrt() / denominator;
    trace!("homography squared singular values {} 1 {}", s1, s3);

    let solve = |u: Vector3<f64>| {
        let normal = v2.cross(&u);
        let hv2 = h * v2;
        let hu = h * u;
        let basis = Matrix3::from_columns(&[v2, u, normal]);
        let image = Matrix3::from_columns(&[hv2, hu, hv2.cross(&hu)]);
        let rotation = image * basis.transpose();
        let translation = (h - rotation) * normal;
        (rotation, translation, normal)
    };
    let (r1, t1, n1) = solve(v1 * a + v3 * b);
    let (r2, t2, n2) = solve(v1 * a - v3 * b);

    let solution = |rotation: Matrix3<f64>, translation: Vector3<f64>, normal: Vector3<f64>| {
        HomographySolution {
            motion: CameraToCamera::from_rotation_matrix(rotation, translation),
            normal,
        }
    };
    Ok([
        solution(r1, t1, n1),
        solution(r1, -t1, -n1),
        solution(r2, t2, n2),
        solution(r2, -t2, -n2),
    ])
}
