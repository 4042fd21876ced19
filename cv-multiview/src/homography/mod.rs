//! Plane induced homographies between two views.
//!
//! A homography `H` maps the image of a point on a plane in the first view to its
//! image in the second view, `x2 ~ H * x1`. For calibrated cameras with the motion
//! `X2 = R * X1 + T` and the plane `N^T * X1 = d` it is `H = R + T * N^T / d`.

mod decompose;
mod induced;

pub use decompose::*;
pub use induced::*;

use crate::{Error, Result, EPSILON};
use cv_core::nalgebra::{Matrix3, Point2, Vector3};
use cv_core::FeatureMatch;
use log::*;

/// Builds the calibrated homography `R + T * N^T / d`.
///
/// `d` is the distance from the first camera to the plane and must be positive.
pub fn create_homography(
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
    d: f64,
    normal: &Vector3<f64>,
) -> Result<Matrix3<f64>> {
    // Also rejects NaN.
    if !(d > 0.0) {
        return Err(Error::NonPositiveDistance(d));
    }
    Ok(rotation + translation * normal.transpose() / d)
}

/// Builds the pixel homography `K * (R + T * N^T / d) * K^-1` for two views sharing
/// the calibration `K`.
pub fn create_homography_pixel(
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
    d: f64,
    normal: &Vector3<f64>,
    k: &Matrix3<f64>,
) -> Result<Matrix3<f64>> {
    let k_inv = k
        .try_inverse()
        .ok_or(Error::NotInvertible("calibration matrix"))?;
    Ok(k * create_homography(rotation, translation, d, normal)? * k_inv)
}

/// Maps `p1` through `H` into the second view.
///
/// Returns `None` when the point maps onto the line at infinity.
///
/// ```
/// use cv_core::nalgebra::{Matrix3, Point2};
/// use cv_multiview::homography::apply_homography;
/// let h = Matrix3::new_translation(&cv_core::nalgebra::Vector2::new(1.0, -2.0));
/// assert_eq!(apply_homography(&h, Point2::new(0.5, 0.5)), Some(Point2::new(1.5, -1.5)));
/// ```
pub fn apply_homography(h: &Matrix3<f64>, p1: Point2<f64>) -> Option<Point2<f64>> {
    let mapped = h * p1.to_homogeneous();
    if mapped.z.abs() <= EPSILON {
        None
    } else {
        Some(Point2::new(mapped.x / mapped.z, mapped.y / mapped.z))
    }
}

/// Computes the symmetric transfer error of every correspondence,
/// `|H * x1 - x2|^2 + |H^-1 * x2 - x1|^2`.
///
/// `errors` is cleared first. A correspondence which either homography maps to infinity
/// is skipped, so `errors` may end up shorter than `observations`. When `h_inv` is
/// `None` the inverse is computed here.
pub fn errors_homography_symm(
    observations: &[FeatureMatch<Point2<f64>>],
    h: &Matrix3<f64>,
    h_inv: Option<&Matrix3<f64>>,
    errors: &mut Vec<f64>,
) -> Result<()> {
    errors.clear();
    let h_inv = match h_inv {
        Some(&h_inv) => h_inv,
        None => h
            .try_inverse()
            .ok_or(Error::NotInvertible("homography"))?,
    };

    let mut skipped = 0;
    for &FeatureMatch(x1, x2) in observations {
        let forward = apply_homography(h, x1);
        let backward = apply_homography(&h_inv, x2);
        match (forward, backward) {
            (Some(forward), Some(backward)) => {
                errors.push((forward - x2).norm_squared() + (backward - x1).norm_squared())
            }
            _ => skipped += 1,
        }
    }
    if skipped != 0 {
        trace!("skipped {} correspondences mapped to infinity", skipped);
    }
    Ok(())
}
