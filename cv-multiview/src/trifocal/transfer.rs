use crate::trifocal::TrifocalGeometry;
use crate::Result;
use cv_core::nalgebra::{Matrix3, Point2, Vector3};
use cv_core::{ImageLine, TrifocalTensor};
use log::*;

/// The homography from view 1 to view 3 induced by the plane back-projected from the
/// line `l2` in view 2.
///
/// Column `i` is `T_i^T * l2`.
pub fn induced_homography_13(tensor: &TrifocalTensor, l2: &ImageLine) -> Matrix3<f64> {
    let ImageLine(l2) = *l2;
    Matrix3::from_columns(&[
        tensor[0].tr_mul(&l2),
        tensor[1].tr_mul(&l2),
        tensor[2].tr_mul(&l2),
    ])
}

/// The homography from view 1 to view 2 induced by the plane back-projected from the
/// line `l3` in view 3.
///
/// Column `i` is `T_i * l3`.
pub fn induced_homography_12(tensor: &TrifocalTensor, l3: &ImageLine) -> Matrix3<f64> {
    let ImageLine(l3) = *l3;
    Matrix3::from_columns(&[tensor[0] * l3, tensor[1] * l3, tensor[2] * l3])
}

/// Transfers `x1` into view 3 through the plane of the line `l2` in view 2.
///
/// The result is homogeneous. The line must not be the epipolar line of `x1`,
/// otherwise the result is the zero vector.
pub fn transfer_1_to_3_line(
    tensor: &TrifocalTensor,
    x1: Point2<f64>,
    l2: &ImageLine,
) -> Vector3<f64> {
    tensor.contract_point(x1).tr_mul(&l2.0)
}

/// Transfers `x1` into view 2 through the plane of the line `l3` in view 3.
///
/// The result is homogeneous.
pub fn transfer_1_to_2_line(
    tensor: &TrifocalTensor,
    x1: Point2<f64>,
    l3: &ImageLine,
) -> Vector3<f64> {
    tensor.contract_point(x1) * l3.0
}

/// Transfers the correspondence `x1 <-> x2` into view 3.
///
/// The pair is first moved onto its epipolar constraint with a first order (Sampson)
/// correction. The line through the corrected `x2` perpendicular to the epipolar line
/// of `x1` is then used with [`transfer_1_to_3_line`], which is the best conditioned
/// choice of line. The result is homogeneous.
pub fn transfer_1_to_3(
    tensor: &TrifocalTensor,
    x1: Point2<f64>,
    x2: Point2<f64>,
) -> Result<Vector3<f64>> {
    let (f21, _) = TrifocalGeometry::new(tensor)?.fundamental();
    let (x1, x2) = sampson_correct(&f21, x1, x2);
    let l2 = perpendicular_line(&(f21 * x1.to_homogeneous()), x2);
    trace!("transfer 1 to 3 through line {:?}", l2.as_slice());
    Ok(transfer_1_to_3_line(tensor, x1, &l2))
}

/// Transfers the correspondence `x1 <-> x3` into view 2.
///
/// This mirrors [`transfer_1_to_3`] with the fundamental matrix `F31`.
pub fn transfer_1_to_2(
    tensor: &TrifocalTensor,
    x1: Point2<f64>,
    x3: Point2<f64>,
) -> Result<Vector3<f64>> {
    let (_, f31) = TrifocalGeometry::new(tensor)?.fundamental();
    let (x1, x3) = sampson_correct(&f31, x1, x3);
    let l3 = perpendicular_line(&(f31 * x1.to_homogeneous()), x3);
    trace!("transfer 1 to 2 through line {:?}", l3.as_slice());
    Ok(transfer_1_to_2_line(tensor, x1, &l3))
}

/// Moves `a` and `b` the smallest first order distance so that `b^T F a = 0`.
fn sampson_correct(
    fundamental: &Matrix3<f64>,
    a: Point2<f64>,
    b: Point2<f64>,
) -> (Point2<f64>, Point2<f64>) {
    let (ah, bh) = (a.to_homogeneous(), b.to_homogeneous());
    let fa = fundamental * ah;
    let ftb = fundamental.tr_mul(&bh);
    let error = bh.dot(&fa);
    let gradient_norm = ftb.x * ftb.x + ftb.y * ftb.y + fa.x * fa.x + fa.y * fa.y;
    if gradient_norm == 0.0 {
        return (a, b);
    }
    let step = -error / gradient_norm;
    (
        Point2::new(a.x + step * ftb.x, a.y + step * ftb.y),
        Point2::new(b.x + step * fa.x, b.y + step * fa.y),
    )
}

/// The line through `point` perpendicular to `line`.
fn perpendicular_line(line: &Vector3<f64>, point: Point2<f64>) -> ImageLine {
    ImageLine::new(line.y, -line.x, -point.x * line.y + point.y * line.x)
}
