//! This crate seamlessly plugs into `cv-core` and provides the pinhole camera model.
//! It converts pixel coordinates into normalized image coordinates and back, converts
//! between [`CameraIntrinsics`] and the 3x3 calibration matrix `K`, and provides the
//! [`EssentialMatrix`], which relates normalized image coordinates in two views.

#![no_std]

mod essential;

pub use essential::*;

use cv_core::nalgebra::{Matrix3, Point2, Point3, Vector2, Vector3};
use cv_core::{CameraModel, CameraPoint, ImagePoint, KeyPoint, Projective};
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A point in normalized image coordinates. This keypoint has been normalized
/// based on the camera intrinsic matrix, so it lies on the virtual image plane
/// at `z = 1` where the unit of distance is the focal length.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct NormalizedKeyPoint(pub Point2<f64>);

impl NormalizedKeyPoint {
    /// Tries to convert the [`CameraPoint`] into a [`NormalizedKeyPoint`], but it may fail
    /// in extreme conditions, in which case `None` is returned.
    pub fn from_camera_point(point: CameraPoint) -> Option<Self> {
        Point2::from_homogeneous(point.homogeneous().xyz()).map(Self)
    }

    /// Conceptually appends a `1.0` component to the normalized keypoint to create
    /// a [`CameraPoint`] on the virtual image plane and then multiplies
    /// the point by `depth`.
    pub fn with_depth(self, depth: f64) -> CameraPoint {
        (self.coords * depth).push(depth).to_homogeneous().into()
    }

    /// Get the virtual image point as a [`Point3`].
    ///
    /// The virtual image point is the point that is formed on the virtual
    /// image plane at a depth 1.0 in front of the camera.
    pub fn virtual_image_point(self) -> Point3<f64> {
        self.coords.push(1.0).into()
    }

    /// The homogeneous coordinate `(x, y, 1)`.
    pub fn homogeneous(self) -> Vector3<f64> {
        self.0.to_homogeneous()
    }
}

impl ImagePoint for NormalizedKeyPoint {
    fn image_point(&self) -> Point2<f64> {
        self.0
    }
}

/// This contains intrinsic camera parameters as per
/// [this Wikipedia page](https://en.wikipedia.org/wiki/Camera_resectioning#Intrinsic_parameters).
///
/// The calibration matrix is
///
/// ```text
/// K = [fx  skew cx]
///     [0   fy   cy]
///     [0   0    1 ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraIntrinsics {
    pub focals: Vector2<f64>,
    pub principal_point: Point2<f64>,
    pub skew: f64,
}

impl CameraIntrinsics {
    /// Creates camera intrinsics that would create an identity intrinsic matrix.
    /// This would imply that the pixel positions have an origin at `0,0`,
    /// the pixel distance unit is the focal length, pixels are square,
    /// and there is no skew.
    pub fn identity() -> Self {
        Self {
            focals: Vector2::new(1.0, 1.0),
            skew: 0.0,
            principal_point: Point2::new(0.0, 0.0),
        }
    }

    #[must_use]
    pub fn focals(self, focals: Vector2<f64>) -> Self {
        Self { focals, ..self }
    }

    #[must_use]
    pub fn focal(self, focal: f64) -> Self {
        Self {
            focals: Vector2::new(focal, focal),
            ..self
        }
    }

    #[must_use]
    pub fn principal_point(self, principal_point: Point2<f64>) -> Self {
        Self {
            principal_point,
            ..self
        }
    }

    #[must_use]
    pub fn skew(self, skew: f64) -> Self {
        Self { skew, ..self }
    }

    /// Reads the intrinsics out of an upper triangular calibration matrix.
    ///
    /// The matrix is first scaled so that its bottom-right element is `1`.
    /// Returns `None` if that element is zero or not finite.
    ///
    /// ```
    /// use cv_pinhole::CameraIntrinsics;
    /// use cv_core::nalgebra::{Point2, Vector2};
    /// let intrinsics = CameraIntrinsics::identity()
    ///     .focals(Vector2::new(800.0, 780.0))
    ///     .principal_point(Point2::new(320.0, 240.0))
    ///     .skew(0.5);
    /// let recovered = CameraIntrinsics::from_matrix(&(intrinsics.matrix() * 3.0)).unwrap();
    /// assert_eq!(recovered, intrinsics);
    /// ```
    pub fn from_matrix(k: &Matrix3<f64>) -> Option<Self> {
        let scale = k[(2, 2)];
        if scale == 0.0 || !scale.is_finite() {
            return None;
        }
        let k = k / scale;
        Some(Self {
            focals: Vector2::new(k[(0, 0)], k[(1, 1)]),
            principal_point: Point2::new(k[(0, 2)], k[(1, 2)]),
            skew: k[(0, 1)],
        })
    }

    #[rustfmt::skip]
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.focals.x,  self.skew,      self.principal_point.x,
            0.0,            self.focals.y,  self.principal_point.y,
            0.0,            0.0,            1.0,
        )
    }

    /// The closed form inverse of [`CameraIntrinsics::matrix`].
    ///
    /// This is only finite when both focal lengths are non-zero.
    #[rustfmt::skip]
    pub fn inverse_matrix(&self) -> Matrix3<f64> {
        let (fx, fy) = (self.focals.x, self.focals.y);
        let (cx, cy) = (self.principal_point.x, self.principal_point.y);
        let s = self.skew;
        Matrix3::new(
            1.0 / fx,   -s / (fx * fy), (s * cy - cx * fy) / (fx * fy),
            0.0,        1.0 / fy,       -cy / fy,
            0.0,        0.0,            1.0,
        )
    }
}

impl CameraModel for CameraIntrinsics {
    type Projection = NormalizedKeyPoint;

    /// Takes in a point from an image in pixel coordinates and
    /// converts it to a [`NormalizedKeyPoint`].
    ///
    /// ```
    /// use cv_core::{KeyPoint, CameraModel};
    /// use cv_pinhole::{NormalizedKeyPoint, CameraIntrinsics};
    /// use cv_core::nalgebra::{Vector2, Vector3, Point2};
    /// let intrinsics = CameraIntrinsics {
    ///     focals: Vector2::new(800.0, 900.0),
    ///     principal_point: Point2::new(500.0, 600.0),
    ///     skew: 1.7,
    /// };
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let nkp = intrinsics.calibrate(kp);
    /// let calibration_matrix = intrinsics.matrix();
    /// let distance = (kp.to_homogeneous() - calibration_matrix * nkp.to_homogeneous()).norm();
    /// assert!(distance < 0.1);
    /// ```
    fn calibrate<P>(&self, point: P) -> NormalizedKeyPoint
    where
        P: ImagePoint,
    {
        let centered = point.image_point() - self.principal_point;
        let y = centered.y / self.focals.y;
        let x = (centered.x - self.skew * y) / self.focals.x;
        NormalizedKeyPoint(Point2::new(x, y))
    }

    /// Converts a [`NormalizedKeyPoint`] back into pixel coordinates.
    ///
    /// ```
    /// use cv_core::{KeyPoint, CameraModel};
    /// use cv_pinhole::{NormalizedKeyPoint, CameraIntrinsics};
    /// use cv_core::nalgebra::{Vector2, Vector3, Point2};
    /// let intrinsics = CameraIntrinsics {
    ///     focals: Vector2::new(800.0, 900.0),
    ///     principal_point: Point2::new(500.0, 600.0),
    ///     skew: 1.7,
    /// };
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let nkp = intrinsics.calibrate(kp);
    /// let ukp = intrinsics.uncalibrate(nkp);
    /// assert!((kp.0 - ukp.0).norm() < 1e-6);
    /// ```
    fn uncalibrate(&self, projection: NormalizedKeyPoint) -> KeyPoint {
        let y = projection.y * self.focals.y;
        let x = projection.x * self.focals.x + self.skew * projection.y;
        let centered = Point2::new(x, y);
        KeyPoint(centered + self.principal_point.coords)
    }
}
