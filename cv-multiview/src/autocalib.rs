//! The absolute dual quadric and the rectifying homography it determines.
//!
//! Auto-calibration methods estimate the absolute dual quadric `Q` of a projective
//! reconstruction. At the metric solution `Q = H * diag(1, 1, 1, 0) * H^T`, where `H`
//! upgrades the projective cameras to metric ones and has the form
//!
//! ```text
//! H = [  K     0 ]
//!     [ -p^T K 1 ]
//! ```
//!
//! with `K` the calibration of the first camera and `(p, 1)` the plane at infinity.

use crate::linalg::upper_cholesky;
use cv_core::nalgebra::{Matrix3, Matrix4, Vector3};
use log::*;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The parameters `K` and `p` of an absolute dual quadric
/// `Q = [w, -w p; -p^T w, p^T w p]` with `w = K * K^T`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DualQuadraticDecomposition {
    /// Upper triangular with a positive diagonal.
    pub k: Matrix3<f64>,
    pub p: Vector3<f64>,
}

impl DualQuadraticDecomposition {
    /// Decomposes a quadric.
    ///
    /// Only the upper left 3x3 block (symmetrized) and the upper right column are used.
    /// Returns `None` if the upper left block is singular or not positive definite.
    pub fn decompose(q: &Matrix4<f64>) -> Option<Self> {
        let block = q.fixed_slice::<3, 3>(0, 0);
        let w = (block + block.transpose()) * 0.5;
        let column = q.fixed_slice::<3, 1>(0, 3).into_owned();

        let w_inv = match w.try_inverse() {
            Some(w_inv) => w_inv,
            None => {
                debug!("dual quadric has a singular upper left block");
                return None;
            }
        };
        let k = match upper_cholesky(&w) {
            Some(k) => k,
            None => {
                debug!("dual quadric upper left block is not positive definite");
                return None;
            }
        };
        Some(Self {
            k,
            p: -(w_inv * column),
        })
    }

    /// The image of the absolute dual conic, `w = K * K^T`.
    pub fn w(&self) -> Matrix3<f64> {
        self.k * self.k.transpose()
    }

    /// The quadric `[w, -w p; -p^T w, p^T w p]`.
    pub fn recompose(&self) -> Matrix4<f64> {
        let w = self.w();
        let wp = w * self.p;
        let mut q = Matrix4::zeros();
        q.fixed_slice_mut::<3, 3>(0, 0).copy_from(&w);
        q.fixed_slice_mut::<3, 1>(0, 3).copy_from(&-wp);
        q.fixed_slice_mut::<1, 3>(3, 0).copy_from(&-wp.transpose());
        q[(3, 3)] = self.p.dot(&wp);
        q
    }

    /// The rectifying homography `H = [K 0; -p^T K 1]`.
    pub fn rectifying_homography(&self) -> Matrix4<f64> {
        create_projective_to_metric(&self.k, &-(self.k.transpose() * self.p), 1.0)
    }
}

/// Forces an approximate absolute dual quadric to have the structure of an exact one.
///
/// The quadric is negated if its third diagonal element, which belongs to the
/// positive definite block `w`, is negative. It is then decomposed and
/// recomposed. `zero_center` sets the principal point of `K` to zero and `zero_skew`
/// sets its skew to zero before recomposing. Returns `None` if the decomposition fails.
pub fn enforce_absolute_quadratic_constraints(
    q: &Matrix4<f64>,
    zero_center: bool,
    zero_skew: bool,
) -> Option<Matrix4<f64>> {
    let q = if q[(2, 2)] < 0.0 { -q } else { *q };
    let mut decomposition = DualQuadraticDecomposition::decompose(&q)?;
    if zero_center {
        decomposition.k[(0, 2)] = 0.0;
        decomposition.k[(1, 2)] = 0.0;
    }
    if zero_skew {
        decomposition.k[(0, 1)] = 0.0;
    }
    Some(decomposition.recompose())
}

/// Computes the rectifying homography `H` with `Q = H * diag(1, 1, 1, 0) * H^T`.
pub fn absolute_quadratic_to_h(q: &Matrix4<f64>) -> Option<Matrix4<f64>> {
    DualQuadraticDecomposition::decompose(q).map(|d| d.rectifying_homography())
}

/// Decomposes `Q = [w, -w p; -p^T w, p^T w p]` into `(w, p)`.
pub fn decompose_abs_dual_quadratic(q: &Matrix4<f64>) -> Option<(Matrix3<f64>, Vector3<f64>)> {
    DualQuadraticDecomposition::decompose(q).map(|d| (d.w(), d.p))
}

/// Builds the rectifying homography `H = [K 0; v^T lambda]` from the calibration of
/// the first view and the plane at infinity.
pub fn create_projective_to_metric(k: &Matrix3<f64>, v: &Vector3<f64>, lambda: f64) -> Matrix4<f64> {
    let mut h = Matrix4::zeros();
    h.fixed_slice_mut::<3, 3>(0, 0).copy_from(k);
    h.fixed_slice_mut::<1, 3>(3, 0).copy_from(&v.transpose());
    h[(3, 3)] = lambda;
    h
}
