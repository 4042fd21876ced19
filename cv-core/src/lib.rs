//! # Rust CV Core
//!
//! This library provides common abstractions and types for computer vision (CV) in Rust.
//! All the crates in the rust-cv ecosystem that have or depend on CV types depend on this crate.
//! This includes things like camera model traits, camera matrices, poses, keypoints, lines,
//! and the trifocal tensor. The crate is designed to be very small so that it adds negligable
//! build time. It pulls in some dependencies that will probably be brought in by writing
//! computer vision code normally.
//!
//! The crate is designed to work with `#![no_std]`, even without an allocator. `libm` is used
//! (indirectly through [`num-traits`]) for all math algorithms that aren't present in `std`.
//! Helpers which must allocate are gated behind the `alloc` feature.
//!
//! ## Projective geometry
//!
//! Most of the types in this crate are thin wrappers around `nalgebra` matrices which
//! describe how a 3d point in the world ends up on the image of one or more cameras.
//! A [`CameraMatrix`] projects a homogeneous [`WorldPoint`] into a homogeneous image
//! point. Two views are related by a fundamental matrix, and three views are related
//! by a [`TrifocalTensor`]. Points and [`ImageLine`]s on the images are related through
//! these objects:
//!
//! - `X` the point in the world
//! - `x`, `x'`, `x''` the projection of `X` on the images of cameras `A`, `B`, and `C`
//! - `O` the optical center of a camera
//! - `@` the image plane
//!
//! ```text
//!                   X
//!                  /|\
//!                 / | \
//!                /  |  \
//!        @@@x@@@@  @x'@  @@@@x''@@@
//!          /        |          \
//!         O         O           O
//!         A         B           C
//! ```
//!
//! Everything here is up to scale: multiplying any homogeneous quantity by a non-zero factor
//! describes the same geometric object.

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

mod camera;
mod camera_matrix;
mod keypoint;
mod line;
mod matches;
mod point;
mod pose;
mod tensor;

pub use camera::*;
pub use camera_matrix::*;
pub use keypoint::*;
pub use line::*;
pub use matches::*;
pub use nalgebra;
pub use point::*;
pub use pose::*;
pub use sample_consensus;
pub use tensor::*;
