//! Pure geometry over GPS coordinates: bounding boxes, segment intersection, and point-in-polygon
//! tests. Everything here works directly in degrees, treating longitude as x and latitude as y,
//! with no projection correction. Nothing in this crate does I/O.

#[macro_use]
extern crate anyhow;

mod bounds;
mod gps;
mod line;
mod ring;

pub use crate::bounds::GPSBounds;
pub use crate::gps::{HashableLonLat, LonLat, METERS_PER_DEGREE};
pub use crate::line::{Line, ON_SEGMENT_TOLERANCE, PARALLEL_EPSILON};
pub use crate::ring::Ring;

/// Rounds to 6 decimal places, roughly 11cm at the equator.
pub fn trim_f64(x: f64) -> f64 {
    (x * 1_000_000.0).round() / 1_000_000.0
}
