use crate::linalg::{null_vectors, Svd3};
use crate::{Result, SvdSettings};
use cv_core::nalgebra::{Matrix3, Matrix3x4, Vector3};
use cv_core::{CameraMatrix, TrifocalTensor};
use log::*;

/// The epipoles of a trifocal tensor together with the tensor, from which the
/// fundamental matrices and camera matrices of the second and third views follow.
///
/// `e2` is the image of the first camera center in the second view and
/// `e3` is its image in the third view. Both have unit norm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrifocalGeometry {
    pub tensor: TrifocalTensor,
    pub e2: Vector3<f64>,
    pub e3: Vector3<f64>,
}

impl TrifocalGeometry {
    /// Extracts the epipoles with the default [`SvdSettings`].
    pub fn new(tensor: &TrifocalTensor) -> Result<Self> {
        Self::with_settings(tensor, SvdSettings::default())
    }

    /// Extracts the epipoles.
    ///
    /// Each slice `T_i` has a left null vector `u_i` and a right null vector `v_i`.
    /// `e2` is the common perpendicular of the `u_i` and `e3` is the common
    /// perpendicular of the `v_i`.
    pub fn with_settings(tensor: &TrifocalTensor, settings: SvdSettings) -> Result<Self> {
        let mut lefts = Matrix3::zeros();
        let mut rights = Matrix3::zeros();
        for i in 0..3 {
            let (right, left) = null_vectors(&tensor[i], settings)?;
            lefts.set_column(i, &left);
            rights.set_column(i, &right);
        }
        let e2 = Svd3::new(&lefts, settings)?.left_null();
        let e3 = Svd3::new(&rights, settings)?.left_null();
        trace!("trifocal epipoles e2 = {:?}, e3 = {:?}", e2.as_slice(), e3.as_slice());
        Ok(Self {
            tensor: *tensor,
            e2,
            e3,
        })
    }

    /// The fundamental matrices `F21` and `F31`, which satisfy
    /// `x2^T F21 x1 = 0` and `x3^T F31 x1 = 0`.
    pub fn fundamental(&self) -> (Matrix3<f64>, Matrix3<f64>) {
        let e2x = self.e2.cross_matrix();
        let e3x = self.e3.cross_matrix();
        let mut f21 = Matrix3::zeros();
        let mut f31 = Matrix3::zeros();
        for (i, slice) in self.tensor.slices().enumerate() {
            f21.set_column(i, &(e2x * slice * self.e3));
            f31.set_column(i, &(e3x * slice.transpose() * self.e2));
        }
        (f21, f31)
    }

    /// Camera matrices `P2` and `P3` consistent with the tensor and `P1 = [I|0]`.
    ///
    /// These are equal to the true cameras up to a common projective transformation.
    pub fn cameras(&self) -> (CameraMatrix, CameraMatrix) {
        let projector = self.e3 * self.e3.transpose() - Matrix3::identity();
        let mut p2 = Matrix3x4::zeros();
        let mut p3 = Matrix3x4::zeros();
        for (i, slice) in self.tensor.slices().enumerate() {
            p2.set_column(i, &(slice * self.e3));
            p3.set_column(i, &(projector * slice.transpose() * self.e2));
        }
        p2.set_column(3, &self.e2);
        p3.set_column(3, &self.e3);
        (CameraMatrix(p2), CameraMatrix(p3))
    }
}

/// Extracts the epipoles `(e2, e3)` of a trifocal tensor.
///
/// See [`TrifocalGeometry`].
pub fn extract_epipoles(tensor: &TrifocalTensor) -> Result<(Vector3<f64>, Vector3<f64>)> {
    TrifocalGeometry::new(tensor).map(|geometry| (geometry.e2, geometry.e3))
}

/// Extracts the fundamental matrices `(F21, F31)` from a trifocal tensor.
///
/// See [`TrifocalGeometry::fundamental`].
pub fn extract_fundamental(tensor: &TrifocalTensor) -> Result<(Matrix3<f64>, Matrix3<f64>)> {
    TrifocalGeometry::new(tensor).map(|geometry| geometry.fundamental())
}

/// Extracts camera matrices `(P2, P3)` from a trifocal tensor.
///
/// See [`TrifocalGeometry::cameras`].
pub fn extract_camera_matrices(tensor: &TrifocalTensor) -> Result<(CameraMatrix, CameraMatrix)> {
    TrifocalGeometry::new(tensor).map(|geometry| geometry.cameras())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trifocal::create_trifocal;
    use approx::assert_relative_eq;
    use cv_core::nalgebra::Point3;
    use cv_core::{Projective, WorldPoint};

    #[rustfmt::skip]
    fn cameras() -> (CameraMatrix, CameraMatrix) {
        (
            CameraMatrix(Matrix3x4::new(
                0.98, -0.1,  0.15, 0.6,
                0.1,   0.99, 0.05, -0.2,
                -0.15, 0.03, 0.98, 0.1,
            )),
            CameraMatrix(Matrix3x4::new(
                0.95,  0.2,  -0.2, -0.5,
                -0.2,  0.97, 0.1,  0.4,
                0.2,   -0.1, 0.96, 0.3,
            )),
        )
    }

    #[test]
    fn epipoles_are_images_of_first_center() {
        let (p2, p3) = cameras();
        let (e2, e3) = extract_epipoles(&create_trifocal(&p2, &p3)).unwrap();
        // The first camera center is the origin, so its images are the last columns.
        let expected2 = p2.translation_column().normalize();
        let expected3 = p3.translation_column().normalize();
        assert!(e2.cross(&expected2).norm() < 1e-9);
        assert!(e3.cross(&expected3).norm() < 1e-9);
        assert_relative_eq!(e2.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn fundamental_satisfies_epipolar_constraint() {
        let (p2, p3) = cameras();
        let (f21, f31) = extract_fundamental(&create_trifocal(&p2, &p3)).unwrap();
        for point in [
            Point3::new(0.1, 0.2, 3.0),
            Point3::new(-1.0, 0.5, 5.0),
            Point3::new(0.7, -0.6, 2.5),
        ] {
            let world = WorldPoint::from_point(point);
            let x1 = point.coords / point.z;
            let x2 = p2.project(world);
            let x3 = p3.project(world);
            assert!((x2.transpose() * f21 * x1)[0].abs() < 1e-9);
            assert!((x3.transpose() * f31 * x1)[0].abs() < 1e-9);
        }
        assert!(f21.determinant().abs() < 1e-12);
    }

    #[test]
    fn cameras_reproduce_tensor() {
        let (p2, p3) = cameras();
        let tensor = create_trifocal(&p2, &p3);
        let (q2, q3) = extract_camera_matrices(&tensor).unwrap();
        let recreated = create_trifocal(&q2, &q3).normalize();
        let tensor = tensor.normalize();
        let sign = if (recreated[0] - tensor[0]).norm() < (recreated[0] + tensor[0]).norm() {
            1.0
        } else {
            -1.0
        };
        for i in 0..3 {
            assert_relative_eq!(recreated[i] * sign, tensor[i], epsilon = 1e-9);
        }
    }
}
