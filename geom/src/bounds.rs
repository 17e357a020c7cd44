use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LonLat;

/// An axis-aligned box in GPS space. Serialized as north/south/east/west.
///
/// Boxes crossing the antimeridian aren't supported; `west > east` inputs just produce a box
/// spanning the wrong way around the globe.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GPSBounds {
    #[serde(rename = "west")]
    pub min_lon: f64,
    #[serde(rename = "south")]
    pub min_lat: f64,
    #[serde(rename = "east")]
    pub max_lon: f64,
    #[serde(rename = "north")]
    pub max_lat: f64,
}

impl GPSBounds {
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn from(pts: &[LonLat]) -> GPSBounds {
        let mut b = GPSBounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    /// Non-finite points are ignored.
    pub fn update(&mut self, pt: LonLat) {
        if !pt.is_finite() {
            return;
        }
        self.min_lon = self.min_lon.min(pt.longitude());
        self.max_lon = self.max_lon.max(pt.longitude());
        self.min_lat = self.min_lat.min(pt.latitude());
        self.max_lat = self.max_lat.max(pt.latitude());
    }

    /// True if `update` has never seen a finite point.
    pub fn is_empty(&self) -> bool {
        !(self.min_lon.is_finite()
            && self.max_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lat.is_finite())
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude() >= self.min_lon
            && pt.longitude() <= self.max_lon
            && pt.latitude() >= self.min_lat
            && pt.latitude() <= self.max_lat
    }

    pub fn north(&self) -> f64 {
        self.max_lat
    }

    pub fn south(&self) -> f64 {
        self.min_lat
    }

    pub fn east(&self) -> f64 {
        self.max_lon
    }

    pub fn west(&self) -> f64 {
        self.min_lon
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// In square degrees.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn get_corners(&self) -> Vec<LonLat> {
        vec![
            LonLat::new(self.min_lon, self.min_lat),
            LonLat::new(self.max_lon, self.min_lat),
            LonLat::new(self.max_lon, self.max_lat),
            LonLat::new(self.min_lon, self.max_lat),
        ]
    }
}

impl Default for GPSBounds {
    fn default() -> Self {
        GPSBounds::new()
    }
}

impl fmt::Display for GPSBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GPSBounds(north {}, south {}, east {}, west {})",
            self.north(),
            self.south(),
            self.east(),
            self.west()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tracks_extremes() {
        let b = GPSBounds::from(&[
            LonLat::new(-0.5, 2.0),
            LonLat::new(1.0, -3.0),
            LonLat::new(f64::NAN, 100.0),
            LonLat::new(0.0, 0.0),
        ]);
        assert!(!b.is_empty());
        assert_eq!(b.north(), 2.0);
        assert_eq!(b.south(), -3.0);
        assert_eq!(b.east(), 1.0);
        assert_eq!(b.west(), -0.5);
        assert_eq!(b.area(), 7.5);
        assert!(b.contains(LonLat::new(0.0, 0.0)));
        assert!(!b.contains(LonLat::new(1.1, 0.0)));
    }

    #[test]
    fn empty_until_finite_point() {
        let mut b = GPSBounds::new();
        assert!(b.is_empty());
        b.update(LonLat::new(f64::INFINITY, 0.0));
        assert!(b.is_empty());
        b.update(LonLat::new(3.0, 4.0));
        assert!(!b.is_empty());
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn serializes_as_compass_directions() {
        let b = GPSBounds::from(&[LonLat::new(1.0, 2.0), LonLat::new(3.0, 4.0)]);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["north"], 4.0);
        assert_eq!(json["south"], 2.0);
        assert_eq!(json["east"], 3.0);
        assert_eq!(json["west"], 1.0);
    }
}
