use core::ops::{Index, IndexMut};
use derive_more::{AsMut, AsRef, From, Into};
use nalgebra::{Matrix3, Point2};
use num_traits::Float;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The trifocal tensor relating three views, stored as its three 3x3 slices `T1`, `T2`, `T3`.
///
/// Slice `i` holds the entries `T_i^{jk}`. The tensor assumes the first camera is `[I|0]`
/// and, like the fundamental matrix, is only defined up to scale.
///
/// ```
/// use cv_core::TrifocalTensor;
/// use cv_core::nalgebra::{Matrix3, Point2};
/// let tensor = TrifocalTensor([Matrix3::identity(), Matrix3::identity() * 2.0, Matrix3::zeros()]);
/// // x * T1 + y * T2 + T3
/// let sum = tensor.contract_point(Point2::new(3.0, 1.0));
/// assert_eq!(sum, Matrix3::identity() * 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TrifocalTensor(pub [Matrix3<f64>; 3]);

impl TrifocalTensor {
    /// A tensor with every element set to zero.
    pub fn zeros() -> Self {
        Self([Matrix3::zeros(); 3])
    }

    /// The weighted sum of slices `x * T1 + y * T2 + T3` for a point in the first view.
    ///
    /// This is the contraction `x^i T_i` with the homogeneous point `(x, y, 1)`.
    pub fn contract_point(&self, point: Point2<f64>) -> Matrix3<f64> {
        self.0[0] * point.x + self.0[1] * point.y + self.0[2]
    }

    /// The Frobenius norm over all 27 elements.
    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|slice| slice.norm_squared())
            .sum::<f64>()
            .sqrt()
    }

    /// Scales every element by `scale`.
    #[must_use]
    pub fn scale(self, scale: f64) -> Self {
        let Self([t1, t2, t3]) = self;
        Self([t1 * scale, t2 * scale, t3 * scale])
    }

    /// Scales the tensor so that its Frobenius norm is `1`.
    ///
    /// The zero tensor is returned unchanged.
    #[must_use]
    pub fn normalize(self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            self
        } else {
            self.scale(norm.recip())
        }
    }

    /// Iterates over the three slices in order.
    pub fn slices(&self) -> impl Iterator<Item = &Matrix3<f64>> {
        self.0.iter()
    }
}

impl Index<usize> for TrifocalTensor {
    type Output = Matrix3<f64>;

    fn index(&self, index: usize) -> &Matrix3<f64> {
        &self.0[index]
    }
}

impl IndexMut<usize> for TrifocalTensor {
    fn index_mut(&mut self, index: usize) -> &mut Matrix3<f64> {
        &mut self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_unit_norm() {
        let tensor = TrifocalTensor([
            Matrix3::repeat(1.0),
            Matrix3::repeat(-2.0),
            Matrix3::identity(),
        ]);
        assert_relative_eq!(tensor.normalize().norm(), 1.0, epsilon = 1e-12);
        assert_eq!(TrifocalTensor::zeros().normalize(), TrifocalTensor::zeros());
    }
}
