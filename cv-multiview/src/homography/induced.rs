//! Homographies induced by a plane seen in two views, given the fundamental matrix and
//! the minimal correspondences which determine the plane.
//!
//! The homographies of every plane are `H = A - e2 * v^T` where `A = [e2]x * F` and
//! `e2` is the epipole in the second view. Each function fits the free parameters
//! to its correspondences. See Hartley and Zisserman, chapter 13.

use crate::linalg::Svd3;
use crate::SvdSettings;
use cv_core::nalgebra::{Matrix3, Point2, Vector3};
use cv_core::{FeatureMatch, ImageLine};
use log::*;

/// Relative magnitude below which a denominator is treated as zero.
const DEGENERATE: f64 = 1e-12;

/// The left null vector of `F`, which is the epipole in the second view.
fn second_epipole(fundamental: &Matrix3<f64>) -> Option<Vector3<f64>> {
    match Svd3::new(fundamental, SvdSettings::default()) {
        Ok(svd) => Some(svd.left_null()),
        Err(e) => {
            debug!("unable to extract epipole from fundamental matrix: {}", e);
            None
        }
    }
}

fn negligible(value: f64, scale: f64) -> bool {
    value.abs() <= DEGENERATE * scale
}

/// The homography induced by the plane through three points.
///
/// Returns `None` if the points are collinear in the first view or one of them is
/// at the epipole of the second view.
pub fn homography_stereo_3pts(
    fundamental: &Matrix3<f64>,
    a: &FeatureMatch<Point2<f64>>,
    b: &FeatureMatch<Point2<f64>>,
    c: &FeatureMatch<Point2<f64>>,
) -> Option<Matrix3<f64>> {
    let e2 = second_epipole(fundamental)?;
    let big_a = e2.cross_matrix() * fundamental;

    let mut m = Matrix3::zeros();
    let mut rhs = Vector3::zeros();
    for (i, FeatureMatch(x1, x2)) in [a, b, c].into_iter().enumerate() {
        let (x1, x2) = (x1.to_homogeneous(), x2.to_homogeneous());
        let x2_e2 = x2.cross(&e2);
        let norm_squared = x2_e2.norm_squared();
        if negligible(norm_squared, x2.norm_squared()) {
            debug!("point {} coincides with the epipole", i);
            return None;
        }
        rhs[i] = x2.cross(&(big_a * x1)).dot(&x2_e2) / norm_squared;
        m.set_row(i, &x1.transpose());
    }

    let scale = m.row(0).norm() * m.row(1).norm() * m.row(2).norm();
    if negligible(m.determinant(), scale) {
        debug!("points are collinear in the first view");
        return None;
    }
    let m_inv = m.try_inverse()?;
    Some(big_a - e2 * (m_inv * rhs).transpose())
}

/// The homography induced by the plane through a line and a point.
///
/// Returns `None` if the point lies on the line in the first view or at the epipole
/// in the second view.
pub fn homography_stereo_line_pt(
    fundamental: &Matrix3<f64>,
    line: &FeatureMatch<ImageLine>,
    point: &FeatureMatch<Point2<f64>>,
) -> Option<Matrix3<f64>> {
    let e2 = second_epipole(fundamental)?;
    let FeatureMatch(l1, l2) = line;
    let FeatureMatch(x1, x2) = point;
    let (x1, x2) = (x1.to_homogeneous(), x2.to_homogeneous());

    // H(mu) = [l2]x F + mu * e2 * l1^T maps the line for every mu.
    let base = l2.cross_matrix() * fundamental;
    let x2_e2 = x2.cross(&e2);
    let along = l1.dot(&x1);
    let norm_squared = x2_e2.norm_squared();
    if negligible(along, l1.norm() * x1.norm()) {
        debug!("point lies on the line in the first view");
        return None;
    }
    if negligible(norm_squared, x2.norm_squared()) {
        debug!("point coincides with the epipole");
        return None;
    }
    let mu = -x2.cross(&(base * x1)).dot(&x2_e2) / (along * norm_squared);
    trace!("line and point homography mu = {}", mu);
    Some(base + e2 * l1.transpose() * mu)
}

/// The homography induced by the plane containing two coplanar lines.
///
/// Returns `None` if the lines coincide in the first view or the second line passes
/// through the epipole in the second view.
pub fn homography_stereo_2lines(
    fundamental: &Matrix3<f64>,
    line_a: &FeatureMatch<ImageLine>,
    line_b: &FeatureMatch<ImageLine>,
) -> Option<Matrix3<f64>> {
    let e2 = second_epipole(fundamental)?;
    let FeatureMatch(l1a, l2a) = line_a;
    let FeatureMatch(l1b, l2b) = line_b;

    // Two points on line b in the first view. Use the one furthest from line a.
    let (a, b, c) = (l1b.x, l1b.y, l1b.z);
    let candidates = [
        Vector3::new(b, -a, 0.0),
        Vector3::new(a * c, b * c, -(a * a + b * b)),
    ];
    let relative = |y: &Vector3<f64>| {
        let norm = y.norm();
        if norm == 0.0 {
            0.0
        } else {
            l1a.dot(y).abs() / norm
        }
    };
    let y = if relative(&candidates[0]) >= relative(&candidates[1]) {
        candidates[0]
    } else {
        candidates[1]
    };

    let base = l2a.cross_matrix() * fundamental;
    let along = l1a.dot(&y);
    let through_epipole = l2b.dot(&e2);
    if negligible(along, l1a.norm() * y.norm()) {
        debug!("lines coincide in the first view");
        return None;
    }
    if negligible(through_epipole, l2b.norm() * e2.norm()) {
        debug!("second line passes through the epipole");
        return None;
    }
    let mu = -l2b.dot(&(base * y)) / (through_epipole * along);
    trace!("two line homography mu = {}", mu);
    Some(base + e2 * l1a.transpose() * mu)
}
