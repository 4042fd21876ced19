use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Point2, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A line on an image in homogeneous form `(a, b, c)` such that every point `(x, y)`
/// on the line satisfies `a * x + b * y + c = 0`.
///
/// Like every homogeneous quantity, the line is only defined up to scale.
///
/// ```
/// use cv_core::ImageLine;
/// use cv_core::nalgebra::Point2;
/// let line = ImageLine::through(Point2::new(1.0, 1.0), Point2::new(3.0, 2.0));
/// assert!(line.residual(Point2::new(5.0, 3.0)).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ImageLine(pub Vector3<f64>);

impl ImageLine {
    /// Creates the line from its three homogeneous coefficients.
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self(Vector3::new(a, b, c))
    }

    /// The line which passes through both points.
    pub fn through(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self(a.to_homogeneous().cross(&b.to_homogeneous()))
    }

    /// The algebraic distance `l^T * x` of a point from the line.
    ///
    /// This is only a geometric distance if the line is [normalized](Self::normalize).
    pub fn residual(&self, point: Point2<f64>) -> f64 {
        self.0.dot(&point.to_homogeneous())
    }

    /// Scales the line so that `(a, b)` is a unit normal. Lines at infinity
    /// (where `a` and `b` are both zero) are returned unchanged.
    #[must_use]
    pub fn normalize(self) -> Self {
        let norm = self.0.xy().norm();
        if norm == 0.0 {
            self
        } else {
            Self(self.0 / norm)
        }
    }

    /// The homogeneous point where two lines intersect.
    pub fn intersection(&self, other: &Self) -> Vector3<f64> {
        self.0.cross(&other.0)
    }
}
