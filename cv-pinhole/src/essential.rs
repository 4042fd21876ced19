use crate::NormalizedKeyPoint;
use cv_core::{
    nalgebra::{Matrix3, Rotation3, Vector3, SVD},
    sample_consensus::Model,
    CameraToCamera, FeatureMatch, Pose,
};
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use num_traits::Float;

/// This stores an essential matrix, which is satisfied by the following constraint:
///
/// transpose(x') * E * x = 0
///
/// Where `x'` and `x` are homogeneous normalized image coordinates. You can get a
/// homogeneous normalized image coordinate by appending `1.0` to a `NormalizedKeyPoint`.
///
/// For a relative pose `(R, t)` which maps points from camera `A` into camera `B`,
/// the essential matrix is `E = [t]x * R`. Its singular values are `(|t|, |t|, 0)`.
/// `E * x` is the epipolar line in image `B` on which `x'` must lie, and the epipoles
/// are the null vectors of `E`.
///
/// A fundamental matrix, which relates pixel coordinates instead, is
/// `F = K2^-T * E * K1^-1`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
pub struct EssentialMatrix(pub Matrix3<f64>);

impl EssentialMatrix {
    /// Can be used to enforce the constraints of an essential matrix to fix it.
    ///
    /// This finds the closest essential matrix in frobenius form. This just means
    /// that the two singular values are averaged and the null singular value is
    /// forced to zero.
    pub fn recondition(self, epsilon: f64, max_iterations: usize) -> Option<Self> {
        let mut svd = self.try_svd(true, true, epsilon, max_iterations)?;
        // The singular values are sorted in descending order.
        svd.singular_values[2] = 0.0;
        let new_singular = (svd.singular_values[0] + svd.singular_values[1]) / 2.0;
        svd.singular_values[0] = new_singular;
        svd.singular_values[1] = new_singular;
        svd.recompose().ok().map(Self)
    }

    /// Returns the two possible rotations for the essential matrix along with the
    /// translation. The translation is the left null vector of `E` scaled by the mean
    /// of the two non-zero singular values, so decomposing `[t]x * R` gives back a
    /// translation of the same length as `t`. Its sign is unknown and both `t`
    /// and `-t` must be considered.
    ///
    /// `epsilon` is the threshold by which the singular value decomposition is considered
    /// complete. Making this smaller may improve the precision. It is recommended to
    /// set this to no higher than `1e-6`.
    ///
    /// `max_iterations` is the maximum number of iterations that singular value decomposition
    /// will run on this matrix. Use this in soft realtime systems to cap the execution time.
    /// A `max_iterations` of `0` may execute indefinitely and is not recommended.
    ///
    /// ```
    /// use cv_core::CameraToCamera;
    /// use cv_core::nalgebra::{IsometryMatrix3, Rotation3, Vector3};
    /// use cv_pinhole::EssentialMatrix;
    /// let pose = CameraToCamera(IsometryMatrix3::from_parts(
    ///     Vector3::new(-0.8, 0.4, 0.5).into(),
    ///     Rotation3::from_euler_angles(0.2, 0.3, 0.4),
    /// ));
    /// let (rot_a, rot_b, t) = EssentialMatrix::from(pose).possible_rotations_translation(1e-12, 1000).unwrap();
    /// // At least one rotation is correct.
    /// let a_res = (rot_a.matrix() - pose.0.rotation.matrix()).norm();
    /// let b_res = (rot_b.matrix() - pose.0.rotation.matrix()).norm();
    /// assert!(a_res < 1e-6 || b_res < 1e-6);
    /// // The translation has the right length and points in the same (or reverse) direction.
    /// assert!((t.norm() - pose.0.translation.vector.norm()).abs() < 1e-9);
    /// assert!(t.cross(&pose.0.translation.vector).norm() < 1e-9);
    /// ```
    pub fn possible_rotations_translation(
        &self,
        epsilon: f64,
        max_iterations: usize,
    ) -> Option<(Rotation3<f64>, Rotation3<f64>, Vector3<f64>)> {
        let Self(essential) = *self;

        // `W` from https://en.wikipedia.org/wiki/Essential_matrix#Finding_one_solution.
        #[rustfmt::skip]
        let w = Matrix3::new(
            0.0, -1.0, 0.0,
            1.0,  0.0, 0.0,
            0.0,  0.0, 1.0,
        );

        let svd = SVD::try_new(essential, true, true, epsilon, max_iterations)?;
        let scale = (svd.singular_values[0] + svd.singular_values[1]) / 2.0;
        let (mut u, mut v_t) = (svd.u?, svd.v_t?);
        // Force the determinants to be positive so the products below are rotations.
        // The last column of U and last row of V* are free since d = (a a 0).
        if u.determinant() < 0.0 {
            u.column_mut(2).neg_mut();
        }
        if v_t.determinant() < 0.0 {
            v_t.row_mut(2).neg_mut();
        }
        Some((
            Rotation3::from_matrix_unchecked(u * w * v_t),
            Rotation3::from_matrix_unchecked(u * w.transpose() * v_t),
            u.column(2) * scale,
        ))
    }

    /// See [`EssentialMatrix::possible_rotations_translation`].
    ///
    /// This returns only the two rotations that are possible.
    pub fn possible_rotations(
        &self,
        epsilon: f64,
        max_iterations: usize,
    ) -> Option<[Rotation3<f64>; 2]> {
        self.possible_rotations_translation(epsilon, max_iterations)
            .map(|(rot_a, rot_b, _)| [rot_a, rot_b])
    }

    /// See [`EssentialMatrix::possible_rotations_translation`].
    ///
    /// This returns all four combinations of the two rotations with the two translation
    /// signs, in the order `(R_a, t)`, `(R_b, t)`, `(R_a, -t)`, `(R_b, -t)`. Picking the
    /// physically valid one (for instance with a positive depth test) is left to the caller.
    ///
    /// ```
    /// use cv_core::CameraToCamera;
    /// use cv_core::nalgebra::{IsometryMatrix3, Rotation3, Vector3};
    /// use cv_pinhole::EssentialMatrix;
    /// let pose = CameraToCamera(IsometryMatrix3::from_parts(
    ///     Vector3::new(-0.8, 0.4, 0.5).into(),
    ///     Rotation3::from_euler_angles(0.2, 0.3, 0.4),
    /// ));
    /// let poses = EssentialMatrix::from(pose).possible_poses(1e-12, 1000).unwrap();
    /// let one_correct = poses.iter().any(|candidate| {
    ///     let rotation_residual = (candidate.0.rotation.matrix() - pose.0.rotation.matrix()).norm();
    ///     let translation_residual =
    ///         (candidate.0.translation.vector - pose.0.translation.vector).norm();
    ///     rotation_residual < 1e-6 && translation_residual < 1e-6
    /// });
    /// assert!(one_correct);
    /// ```
    pub fn possible_poses(
        &self,
        epsilon: f64,
        max_iterations: usize,
    ) -> Option<[CameraToCamera; 4]> {
        self.possible_rotations_translation(epsilon, max_iterations)
            .map(|(rot_a, rot_b, t)| {
                [
                    CameraToCamera::from_parts(t, rot_a),
                    CameraToCamera::from_parts(t, rot_b),
                    CameraToCamera::from_parts(-t, rot_a),
                    CameraToCamera::from_parts(-t, rot_b),
                ]
            })
    }
}

/// Generates an essential matrix corresponding to this relative camera pose.
///
/// If a point `a` is transformed using [`Pose::transform`] into
/// a point `b`, then the essential matrix returned by this method will
/// give a residual of approximately `0.0` when you call
/// `essential.residual(&FeatureMatch(a, b))` with their normalized keypoints.
impl From<CameraToCamera> for EssentialMatrix {
    fn from(pose: CameraToCamera) -> Self {
        Self(pose.translation().cross_matrix() * pose.rotation_matrix())
    }
}

impl Model<FeatureMatch<NormalizedKeyPoint>> for EssentialMatrix {
    fn residual(&self, data: &FeatureMatch<NormalizedKeyPoint>) -> f64 {
        let Self(mat) = *self;
        let &FeatureMatch(a, b) = data;
        Float::abs(b.homogeneous().dot(&(mat * a.homogeneous())))
    }
}
