//! Small fixed-size decompositions shared by the multi-view operations.

use crate::{Error, Result, SvdSettings};
use cv_core::nalgebra::{Matrix3, Matrix3x4, Matrix4x3, Vector3, SVD};
use log::*;

/// A 3x3 singular value decomposition `M = U * diag(s) * V^T` with the singular values
/// sorted in descending order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Svd3 {
    pub u: Matrix3<f64>,
    pub singular_values: Vector3<f64>,
    pub v_t: Matrix3<f64>,
}

impl Svd3 {
    pub fn new(matrix: &Matrix3<f64>, settings: SvdSettings) -> Result<Self> {
        if !matrix.iter().all(|v| v.is_finite()) {
            return Err(Error::NonFinite);
        }
        let svd = SVD::try_new(
            *matrix,
            true,
            true,
            settings.epsilon,
            settings.max_iterations,
        )
        .ok_or(Error::SvdFailed)?;
        trace!("singular values: {:?}", svd.singular_values.as_slice());
        match (svd.u, svd.v_t) {
            (Some(u), Some(v_t)) => Ok(Self {
                u,
                singular_values: svd.singular_values,
                v_t,
            }),
            _ => Err(Error::SvdFailed),
        }
    }

    /// The unit vector `x` minimizing `|M * x|`.
    pub fn right_null(&self) -> Vector3<f64> {
        self.v_t.row(2).transpose()
    }

    /// The unit vector `x` minimizing `|x^T * M|`.
    pub fn left_null(&self) -> Vector3<f64> {
        self.u.column(2).into_owned()
    }

    /// Rebuilds `U * diag(singular_values) * V^T` with replacement singular values.
    pub fn recompose_with(&self, singular_values: Vector3<f64>) -> Matrix3<f64> {
        self.u * Matrix3::from_diagonal(&singular_values) * self.v_t
    }
}

/// Returns the right and left null vectors of a 3x3 matrix, in that order.
pub fn null_vectors(
    matrix: &Matrix3<f64>,
    settings: SvdSettings,
) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let svd = Svd3::new(matrix, settings)?;
    Ok((svd.right_null(), svd.left_null()))
}

/// The permutation which reverses the order of rows (or columns) it multiplies.
#[rustfmt::skip]
pub fn reversal() -> Matrix3<f64> {
    Matrix3::new(
        0.0, 0.0, 1.0,
        0.0, 1.0, 0.0,
        1.0, 0.0, 0.0,
    )
}

/// Decomposes `A = K * R` with `K` upper triangular and `R` orthogonal.
///
/// The diagonal of `K` is not sign corrected and `det(R)` may be `-1`.
/// It is computed from the QR decomposition of `(J * A)^T` where `J` is [`reversal`]:
/// if `(J * A)^T = Q * U` then `K = J * U^T * J` and `R = J * Q^T`.
pub fn rq(a: &Matrix3<f64>) -> (Matrix3<f64>, Matrix3<f64>) {
    let j = reversal();
    let qr = (j * a).transpose().qr();
    let (q, r) = (qr.q(), qr.r());
    (j * r.transpose() * j, j * q.transpose())
}

/// Finds the upper triangular `K` with a positive diagonal such that `w = K * K^T`.
///
/// Returns `None` if `w` is not positive definite.
pub fn upper_cholesky(w: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    // J * w * J = L * L^T implies w = (J * L * J) * (J * L * J)^T.
    let j = reversal();
    let lower = (j * w * j).cholesky()?.l();
    Some(j * lower * j)
}

/// The right inverse `P^T * (P * P^T)^-1` of a full row rank 3x4 matrix.
pub fn right_pseudo_inverse(p: &Matrix3x4<f64>) -> Result<Matrix4x3<f64>> {
    let gram = (p * p.transpose())
        .try_inverse()
        .ok_or(Error::NotInvertible("camera matrix Gram matrix"))?;
    Ok(p.transpose() * gram)
}
