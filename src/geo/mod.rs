//! Planar-equivalent geometry over lat/lng positions.
//!
//! Every metric distance in the crate goes through [`measure_distance`],
//! a local north/east decomposition scaled by the equatorial radius.
//! The approximation is only valid for short distances, which holds for
//! edges of a rail-line shape and for fix-to-line projection.
//!
//! Positions follow the [`geo`] convention: `x` is longitude, `y` is
//! latitude.

pub const EARTH_EQUATORIAL_RADIUS: f64 = 6_378_137.0;

#[doc(hidden)]
pub mod coord;
#[doc(hidden)]
pub mod intersect;
#[doc(hidden)]
pub mod project;
#[cfg(test)]
mod test;

#[doc(inline)]
pub use coord::LatLng;
#[doc(inline)]
pub use intersect::segment_intersection;
#[doc(inline)]
pub use project::{measure_distance, project, Projection};
