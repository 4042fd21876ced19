use crate::{Pose, Projective, WorldPoint, WorldToCamera};
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Matrix3, Matrix3x4, Vector3, Vector4};
use num_traits::Float;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A 3x4 projective camera matrix `P` which maps a homogeneous [`WorldPoint`] `X`
/// to the homogeneous image point `x = P * X`.
///
/// The matrix is only defined up to scale. A metric camera has the form `K * [R|t]`,
/// but a camera recovered from a projective reconstruction may be any full rank 3x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraMatrix(pub Matrix3x4<f64>);

impl CameraMatrix {
    /// The canonical camera `[I|0]`.
    pub fn canonical() -> Self {
        Self(Matrix3x4::identity())
    }

    /// Builds the metric camera `K * [R|t]`.
    pub fn from_parts(calibration: &Matrix3<f64>, pose: WorldToCamera) -> Self {
        Self(calibration * pose.matrix3x4())
    }

    /// The left 3x3 block `M` of `P = [M|p4]`.
    pub fn rotation_block(&self) -> Matrix3<f64> {
        self.0.fixed_columns::<3>(0).into_owned()
    }

    /// The last column `p4` of `P = [M|p4]`.
    pub fn translation_column(&self) -> Vector3<f64> {
        self.0.column(3).into_owned()
    }

    /// Projects a point into homogeneous image coordinates.
    pub fn project(&self, point: WorldPoint) -> Vector3<f64> {
        self.0 * point.homogeneous()
    }

    /// The camera center `C`, which satisfies `P * C = 0`.
    ///
    /// Each component is a signed 3x3 minor of `P`, so the result is exact for any
    /// full rank camera and zero for a rank deficient one. A camera at infinity
    /// (an affine camera) has a center with a zero last component.
    pub fn center(&self) -> Vector4<f64> {
        let minor = |a: usize, b: usize, c: usize| {
            Matrix3::from_columns(&[self.0.column(a), self.0.column(b), self.0.column(c)])
                .determinant()
        };
        Vector4::new(
            minor(1, 2, 3),
            -minor(0, 2, 3),
            minor(0, 1, 3),
            -minor(0, 1, 2),
        )
    }

    /// The largest absolute value of any element.
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    #[test]
    fn center_is_null_vector() {
        let pose = WorldToCamera::from_parts(
            Vector3::new(0.4, -1.0, 2.0),
            Rotation3::from_euler_angles(0.3, 0.2, -0.1),
        );
        #[rustfmt::skip]
        let k = Matrix3::new(
            500.0, 1.0,   320.0,
            0.0,   490.0, 240.0,
            0.0,   0.0,   1.0,
        );
        let camera = CameraMatrix::from_parts(&k, pose);
        let center = camera.center();
        assert_relative_eq!(
            camera.0 * center.normalize(),
            Vector3::zeros(),
            epsilon = 1e-9
        );

        // The center is the optical center of the camera in world coordinates.
        let expected = pose.inverse().isometry().translation.vector;
        assert_relative_eq!(center.xyz() / center.w, expected, epsilon = 1e-9);
    }

    #[test]
    fn canonical_center_is_origin() {
        let center = CameraMatrix::canonical().center();
        assert_relative_eq!(center, Vector4::new(0.0, 0.0, 0.0, -1.0));
    }
}
