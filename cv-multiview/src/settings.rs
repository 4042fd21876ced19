#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Convergence settings for the singular value decompositions performed by this crate.
///
/// ```
/// use cv_multiview::SvdSettings;
/// let settings = SvdSettings::default().epsilon(1e-14).max_iterations(200);
/// assert_eq!(settings.max_iterations, 200);
/// ```
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SvdSettings {
    /// The threshold by which the decomposition is considered converged.
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_epsilon"))]
    pub epsilon: f64,
    /// The maximum number of iterations before giving up. `0` never gives up.
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
}

impl SvdSettings {
    #[must_use]
    pub fn epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    #[must_use]
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

impl Default for SvdSettings {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_epsilon() -> f64 {
    f64::EPSILON
}

fn default_max_iterations() -> usize {
    1000
}
