//! Algebraic incidence relations of the trifocal tensor.
//!
//! Every function returns an exact zero (scalar, vector or matrix) when the features
//! are the images of a single 3d point or line, and something non-zero otherwise.
//! The magnitude is an algebraic error, not a geometric one.

use cv_core::nalgebra::{Matrix3, Point2, Vector3};
use cv_core::{ImageLine, TrifocalTensor};

/// Line-line-line: `(l2^T T1 l3, l2^T T2 l3, l2^T T3 l3) x l1`.
pub fn constraint_lll(
    tensor: &TrifocalTensor,
    l1: &ImageLine,
    l2: &ImageLine,
    l3: &ImageLine,
) -> Vector3<f64> {
    let transferred = Vector3::from_fn(|i, _| l2.dot(&(tensor[i] * l3.0)));
    transferred.cross(&l1.0)
}

/// Point-line-line: `l2^T (x T1 + y T2 + T3) l3`.
pub fn constraint_pll(
    tensor: &TrifocalTensor,
    p1: Point2<f64>,
    l2: &ImageLine,
    l3: &ImageLine,
) -> f64 {
    l2.dot(&(tensor.contract_point(p1) * l3.0))
}

/// Point-line-point: `((x T1 + y T2 + T3)^T l2) x p3`.
pub fn constraint_plp(
    tensor: &TrifocalTensor,
    p1: Point2<f64>,
    l2: &ImageLine,
    p3: Point2<f64>,
) -> Vector3<f64> {
    (tensor.contract_point(p1).transpose() * l2.0).cross(&p3.to_homogeneous())
}

/// Point-point-line: `[p2]x (x T1 + y T2 + T3) l3`.
pub fn constraint_ppl(
    tensor: &TrifocalTensor,
    p1: Point2<f64>,
    p2: Point2<f64>,
    l3: &ImageLine,
) -> Vector3<f64> {
    p2.to_homogeneous().cross_matrix() * tensor.contract_point(p1) * l3.0
}

/// Point-point-point: `[p2]x (x T1 + y T2 + T3) [p3]x`.
pub fn constraint_ppp(
    tensor: &TrifocalTensor,
    p1: Point2<f64>,
    p2: Point2<f64>,
    p3: Point2<f64>,
) -> Matrix3<f64> {
    p2.to_homogeneous().cross_matrix()
        * tensor.contract_point(p1)
        * p3.to_homogeneous().cross_matrix()
}
