use thiserror::Error;

/// Failures of the multi-view operations on numerically impossible input.
///
/// Geometrically degenerate but otherwise valid input, such as collinear points given to
/// a plane fit, is not an error. Those operations return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// Singular value decomposition did not converge.
    #[error("singular value decomposition failed to converge")]
    SvdFailed,
    /// A matrix which must be inverted is singular.
    #[error("the {0} is not invertible")]
    NotInvertible(&'static str),
    /// The input contains NaN or infinite values.
    #[error("input contains non-finite values")]
    NonFinite,
    /// The distance from the camera to a plane must be positive.
    #[error("plane distance must be positive, got {0}")]
    NonPositiveDistance(f64),
    /// The input is rank deficient in a way the operation cannot work around.
    #[error("degenerate input: {0}")]
    Degenerate(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
