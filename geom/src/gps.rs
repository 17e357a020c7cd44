use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trim_f64;

/// A very rough conversion from planar degree-distance to meters. Good enough for classifying
/// roads by length; don't use it for anything precise.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// longitude is x, latitude is y
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    longitude: f64,
    latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    /// Parses a GeoJSON-style `[lon, lat]` position. Extra dimensions like elevation are ignored.
    pub fn from_position(pos: &[f64]) -> Option<LonLat> {
        if pos.len() < 2 {
            return None;
        }
        Some(LonLat::new(pos[0], pos[1]))
    }

    pub fn x(self) -> f64 {
        self.longitude
    }

    pub fn y(self) -> f64 {
        self.latitude
    }

    pub fn longitude(self) -> f64 {
        self.longitude
    }

    pub fn latitude(self) -> f64 {
        self.latitude
    }

    pub fn is_finite(self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    pub fn to_position(self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }

    /// Euclidean distance, in degrees. Only meaningful over short distances.
    pub fn degree_dist(self, other: LonLat) -> f64 {
        ((self.longitude - other.longitude).powi(2) + (self.latitude - other.latitude).powi(2))
            .sqrt()
    }

    /// Planar approximation of the distance in meters.
    pub fn approx_dist_meters(self, other: LonLat) -> f64 {
        self.degree_dist(other) * METERS_PER_DEGREE
    }

    pub fn approx_eq(self, other: LonLat, tolerance: f64) -> bool {
        self.degree_dist(other) <= tolerance
    }

    /// The key used to treat nearly identical points as the same place.
    pub fn to_hashable(self) -> HashableLonLat {
        HashableLonLat::new(self.longitude, self.latitude)
    }

    /// Sum of the planar degree-distance between consecutive points.
    pub fn chain_length(pts: &[LonLat]) -> f64 {
        pts.windows(2).map(|pair| pair[0].degree_dist(pair[1])).sum()
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

/// A GPS point rounded to 6 decimal places, stored as integer micro-degrees so it can be hashed
/// and ordered.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HashableLonLat {
    x_micro: i64,
    y_micro: i64,
}

impl HashableLonLat {
    pub fn new(lon: f64, lat: f64) -> HashableLonLat {
        // Non-finite values saturate; they'll never come out of the intersection math anyway.
        HashableLonLat {
            x_micro: (lon * 1_000_000.0).round() as i64,
            y_micro: (lat * 1_000_000.0).round() as i64,
        }
    }

    pub fn to_lonlat(self) -> LonLat {
        LonLat::new(
            trim_f64(self.x_micro as f64 / 1_000_000.0),
            trim_f64(self.y_micro as f64 / 1_000_000.0),
        )
    }
}

impl fmt::Display for HashableLonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pt = self.to_lonlat();
        write!(f, "{:.6},{:.6}", pt.x(), pt.y())
    }
}
