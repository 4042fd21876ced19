//! Two-view epipolar geometry.
//!
//! A fundamental matrix `F` relates pixel coordinates of two views with
//! `x2^T * F * x1 = 0`. An essential matrix is the same relation for normalized
//! image coordinates, and its motion decomposition lives on [`EssentialMatrix`].

use crate::linalg::{null_vectors, right_pseudo_inverse, Svd3};
use crate::{Error, Result, SvdSettings};
use cv_core::nalgebra::{Matrix3, Matrix3x4, Matrix4, Matrix5, Point2, Vector3, Vector5, SVD};
use cv_core::{CameraMatrix, CameraToCamera};
use cv_pinhole::{CameraIntrinsics, EssentialMatrix};
use log::*;

/// Largest sine of the angle between the epipoles of the second and third camera in
/// the first view for which the three camera centers are treated as collinear.
const COLLINEAR: f64 = 1e-10;

/// Evaluates the epipolar constraint `x2^T * F * x1`.
///
/// This is also the constraint of an essential matrix when the points are normalized
/// image coordinates.
pub fn constraint(fundamental: &Matrix3<f64>, p1: Point2<f64>, p2: Point2<f64>) -> f64 {
    p2.to_homogeneous().dot(&(fundamental * p1.to_homogeneous()))
}

/// Builds the essential matrix `[T]x * R` of the motion `X2 = R * X1 + T`.
pub fn create_essential(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> EssentialMatrix {
    EssentialMatrix(translation.cross_matrix() * rotation)
}

/// Converts an essential matrix into a fundamental matrix for two views sharing
/// the calibration `K`.
pub fn create_fundamental(essential: &Matrix3<f64>, k: &Matrix3<f64>) -> Result<Matrix3<f64>> {
    create_fundamental2(essential, k, k)
}

/// Converts an essential matrix into the fundamental matrix `K2^-T * E * K1^-1`.
pub fn create_fundamental2(
    essential: &Matrix3<f64>,
    k1: &Matrix3<f64>,
    k2: &Matrix3<f64>,
) -> Result<Matrix3<f64>> {
    let k1_inv = k1
        .try_inverse()
        .ok_or(Error::NotInvertible("first calibration matrix"))?;
    let k2_inv = k2
        .try_inverse()
        .ok_or(Error::NotInvertible("second calibration matrix"))?;
    Ok(k2_inv.transpose() * essential * k1_inv)
}

/// Builds the fundamental matrix of the motion `X2 = R * X1 + T` between two cameras
/// with the calibrations `K1` and `K2`.
pub fn create_fundamental_from_motion(
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
    k1: &Matrix3<f64>,
    k2: &Matrix3<f64>,
) -> Result<Matrix3<f64>> {
    create_fundamental2(&create_essential(rotation, translation), k1, k2)
}

/// Converts an essential matrix into a fundamental matrix for two views sharing
/// the given pinhole intrinsics.
///
/// This uses the closed form inverse of the intrinsics and fails if a focal length is zero.
pub fn create_fundamental_intrinsics(
    essential: &Matrix3<f64>,
    intrinsics: &CameraIntrinsics,
) -> Result<Matrix3<f64>> {
    let k_inv = intrinsics.inverse_matrix();
    if !k_inv.iter().all(|v| v.is_finite()) {
        return Err(Error::NotInvertible("camera intrinsics"));
    }
    Ok(k_inv.transpose() * essential * k_inv)
}

/// Extracts the epipoles `(e1, e2)` of a fundamental or essential matrix.
///
/// `F * e1 = 0` and `e2^T * F = 0`. Both have unit norm, and an epipole at infinity
/// has a zero third coordinate.
pub fn extract_epipoles(fundamental: &Matrix3<f64>) -> Result<(Vector3<f64>, Vector3<f64>)> {
    null_vectors(fundamental, SvdSettings::default())
}

/// Builds a second camera `[[e2]x * F + e2 * v^T | lambda * e2]` compatible with
/// `F` and the first camera `[I|0]`.
///
/// `v` and `lambda` select one member of the projective family of solutions.
/// `lambda` must be non-zero.
pub fn fundamental_to_projective(
    fundamental: &Matrix3<f64>,
    e2: &Vector3<f64>,
    v: &Vector3<f64>,
    lambda: f64,
) -> CameraMatrix {
    let left = e2.cross_matrix() * fundamental + e2 * v.transpose();
    let mut camera = Matrix3x4::zeros();
    camera.fixed_columns_mut::<3>(0).copy_from(&left);
    camera.set_column(3, &(e2 * lambda));
    CameraMatrix(camera)
}

/// [`fundamental_to_projective`] with `v = 0`, `lambda = 1` and the epipole
/// extracted from `F`.
pub fn fundamental_to_projective_canonical(fundamental: &Matrix3<f64>) -> Result<CameraMatrix> {
    let (_, e2) = extract_epipoles(fundamental)?;
    Ok(fundamental_to_projective(
        fundamental,
        &e2,
        &Vector3::zeros(),
        1.0,
    ))
}

/// Builds the cameras `(P2, P3)` of a projective reconstruction consistent with three
/// fundamental matrices and the first camera `[I|0]`.
///
/// The matrices follow the conventions of [`fundamental_compatible3`]. `P2` is
/// [`fundamental_to_projective_canonical`] of `F21`. `P3` is the member of the family
/// `[[e31]x * F31 + e31 * v^T | lambda * e31]` that makes `P3^T * F32 * P2` skew-symmetric,
/// which holds exactly when `F32` is the fundamental matrix of `P2` and `P3`.
///
/// The fundamental matrices do not determine `P3` when the three camera centers are
/// collinear, and that case fails with [`Error::Degenerate`].
pub fn fundamental_to_projective3(
    f21: &Matrix3<f64>,
    f31: &Matrix3<f64>,
    f32: &Matrix3<f64>,
) -> Result<(CameraMatrix, CameraMatrix)> {
    let (f21, f31, f32) = (f21.normalize(), f31.normalize(), f32.normalize());
    let (e12, _) = extract_epipoles(&f21)?;
    let (e13, e31) = extract_epipoles(&f31)?;
    if e12.cross(&e13).norm() <= COLLINEAR {
        debug!("camera centers are collinear, the third camera is not determined");
        return Err(Error::Degenerate("collinear camera centers"));
    }
    let p2 = fundamental_to_projective_canonical(&f21)?;

    // P3 = alpha * [[e31]x * F31 | 0] + v_i * [e31 * u_i^T | 0] + lambda * [0 | e31]
    let mut basis = [Matrix3x4::<f64>::zeros(); 5];
    basis[0]
        .fixed_columns_mut::<3>(0)
        .copy_from(&(e31.cross_matrix() * f31));
    for i in 0..3 {
        basis[i + 1].set_column(i, &e31);
    }
    basis[4].set_column(3, &e31);

    // Every entry of the symmetric part of P3^T * F32 * P2 is one linear equation.
    let symmetric = basis.map(|b| {
        let m = b.transpose() * f32 * p2.0;
        m + m.transpose()
    });
    let mut normal = Matrix5::zeros();
    for i in 0..4 {
        for j in i..4 {
            let row = Vector5::from_fn(|k, _| symmetric[k][(i, j)]);
            normal += row * row.transpose();
        }
    }

    let settings = SvdSettings::default();
    let svd = SVD::try_new(normal, false, true, settings.epsilon, settings.max_iterations)
        .ok_or(Error::SvdFailed)?;
    let v_t = svd.v_t.ok_or(Error::SvdFailed)?;
    trace!("three view camera singular values {:?}", svd.singular_values.as_slice());
    let coefficients = v_t.row(svd.singular_values.imin());
    let p3 = basis
        .iter()
        .zip(coefficients.iter())
        .fold(Matrix3x4::zeros(), |p3, (b, &c)| p3 + b * c);
    Ok((p2, CameraMatrix(p3)))
}

/// Computes the fundamental matrix `[e2]x * P2 * P1^+` of two arbitrary cameras,
/// where `e2 = P2 * C1` is the image of the first camera center in the second view.
pub fn projective_to_fundamental(p1: &CameraMatrix, p2: &CameraMatrix) -> Result<Matrix3<f64>> {
    let center = p1.center();
    if center.iter().all(|&v| v == 0.0) {
        return Err(Error::Degenerate("first camera matrix is rank deficient"));
    }
    let e2 = p2.0 * center;
    Ok(e2.cross_matrix() * p2.0 * right_pseudo_inverse(&p1.0)?)
}

/// Converts a fundamental matrix into an essential matrix given the shared calibration `K`.
///
/// `K^T * F * K` is projected onto the essential manifold by replacing its singular
/// values with `(1, 1, 0)`.
pub fn fundamental_to_essential(
    fundamental: &Matrix3<f64>,
    k: &Matrix3<f64>,
) -> Result<EssentialMatrix> {
    let svd = Svd3::new(&(k.transpose() * fundamental * k), SvdSettings::default())?;
    Ok(EssentialMatrix(
        svd.recompose_with(Vector3::new(1.0, 1.0, 0.0)),
    ))
}

/// Finds the 4x4 homography `H = [P^+ | C]` such that `P * H = [I|0]`.
///
/// Applying `H` to every camera of a projective reconstruction moves `P` to the canonical camera.
pub fn projective_to_identity_h(p: &CameraMatrix) -> Result<Matrix4<f64>> {
    let center = p.center();
    if center.iter().all(|&v| v == 0.0) {
        return Err(Error::Degenerate("camera matrix is rank deficient"));
    }
    let pinv = right_pseudo_inverse(&p.0)?;
    let mut h = Matrix4::zeros();
    h.fixed_columns_mut::<3>(0).copy_from(&pinv);
    h.set_column(3, &center);
    Ok(h)
}

/// Checks whether three fundamental matrices describe a single configuration of three views.
///
/// `F21`, `F31` and `F32` satisfy `x2^T F21 x1 = 0`, `x3^T F31 x1 = 0` and `x3^T F32 x2 = 0`.
/// The images of each camera center in the other two views must correspond under the
/// fundamental matrix of those views:
///
/// ```text
/// e23^T F21 e13 = 0
/// e32^T F31 e12 = 0
/// e31^T F32 e21 = 0
/// ```
///
/// where `eij` is the image of camera `j` in view `i`. The matrices are used as given,
/// so `tol` is relative to their scale. Returns whether the mean absolute residual is
/// at most `tol`.
pub fn fundamental_compatible3(
    f21: &Matrix3<f64>,
    f31: &Matrix3<f64>,
    f32: &Matrix3<f64>,
    tol: f64,
) -> Result<bool> {
    let (e12, e21) = extract_epipoles(f21)?;
    let (e13, e31) = extract_epipoles(f31)?;
    let (e23, e32) = extract_epipoles(f32)?;

    let residuals = [
        e23.dot(&(f21 * e13)),
        e32.dot(&(f31 * e12)),
        e31.dot(&(f32 * e21)),
    ];
    let score = residuals.iter().map(|r| r.abs()).sum::<f64>() / 3.0;
    trace!("fundamental compatibility residuals {:?}, score {}", residuals, score);
    Ok(score <= tol)
}

/// Decomposes an essential matrix into its four candidate motions.
///
/// See [`EssentialMatrix::possible_poses`]. The physically valid candidate is not
/// selected here.
pub fn decompose_essential(essential: &EssentialMatrix) -> Result<[CameraToCamera; 4]> {
    decompose_essential_with(essential, SvdSettings::default())
}

/// [`decompose_essential`] with explicit convergence settings.
pub fn decompose_essential_with(
    essential: &EssentialMatrix,
    settings: SvdSettings,
) -> Result<[CameraToCamera; 4]> {
    if !essential.iter().all(|v| v.is_finite()) {
        return Err(Error::NonFinite);
    }
    essential
        .possible_poses(settings.epsilon, settings.max_iterations)
        .ok_or(Error::SvdFailed)
}
