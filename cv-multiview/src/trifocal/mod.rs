//! The trifocal tensor of three views: construction, incidence constraints,
//! extraction of two-view geometry, and transfer of points and lines.

mod constraint;
mod create;
mod extract;
mod transfer;

pub use constraint::*;
pub use create::*;
pub use extract::*;
pub use transfer::*;
