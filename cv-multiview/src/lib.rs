//! # cv-multiview
//!
//! Projective geometry relating two and three views of a scene.
//!
//! Most functions take and return the plain matrices and newtypes from [`cv_core`] and
//! [`cv_pinhole`]. Builders and extractors cover the two-view geometry (essential and
//! fundamental matrices, plane-induced homographies, canonical camera pairs) and the
//! three-view geometry (the trifocal tensor). Decompositions recover metric structure
//! from projective cameras, either directly or through the absolute dual quadric.
//!
//! The conventions throughout are:
//!
//! * Image points are [`Point2`](cv_core::nalgebra::Point2) and are made homogeneous by
//!   appending `1.0`.
//! * Lines are homogeneous `(a, b, c)` with `a*x + b*y + c = 0`.
//! * A fundamental matrix `F21` satisfies `x2^T * F21 * x1 = 0`.
//! * The first camera of a trifocal tensor is `[I|0]`.
//!
//! Functions which can fail on numerically impossible input return [`Result`].
//! Functions whose input may be geometrically degenerate but is otherwise valid
//! return `Option`, and the reason for a `None` is logged at `debug` level.
//!
//! ```
//! use cv_core::nalgebra::{Rotation3, Vector3};
//! use cv_core::{CameraToCamera, Pose};
//! use cv_multiview::epipolar;
//! let pose = CameraToCamera::from_parts(
//!     Vector3::new(0.2, -0.1, 1.0),
//!     Rotation3::from_euler_angles(0.05, -0.1, 0.02),
//! );
//! let essential = epipolar::create_essential(&pose.rotation_matrix(), &pose.translation());
//! let candidates = epipolar::decompose_essential(&essential).unwrap();
//! assert!(candidates
//!     .iter()
//!     .any(|c| (c.translation() - pose.translation()).norm() < 1e-6));
//! ```

pub mod autocalib;
pub mod epipolar;
mod error;
pub mod homography;
pub mod linalg;
pub mod metric;
mod settings;
pub mod trifocal;

pub use error::{Error, Result};
pub use settings::SvdSettings;

/// Homogeneous coordinates whose last element has a magnitude at or below this value
/// are treated as lying at infinity.
pub const EPSILON: f64 = f64::EPSILON;
