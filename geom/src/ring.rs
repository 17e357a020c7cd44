use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{GPSBounds, LonLat};

/// A closed polygon boundary. The first point may or may not be repeated at the end; the edge from
/// the last point back to the first is always implied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pts: Vec<LonLat>,
}

impl Ring {
    pub fn new(pts: Vec<LonLat>) -> Result<Ring> {
        if pts.len() < 3 {
            bail!("Ring has {} points; needs at least 3", pts.len());
        }
        if let Some(pt) = pts.iter().find(|pt| !pt.is_finite()) {
            bail!("Ring has a non-finite point {}", pt);
        }
        Ok(Ring { pts })
    }

    pub fn points(&self) -> &Vec<LonLat> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<LonLat> {
        self.pts
    }

    pub fn get_bounds(&self) -> GPSBounds {
        GPSBounds::from(&self.pts)
    }

    /// Even-odd ray casting. Points exactly on an edge may land either way; that ambiguity is
    /// inherent to the test and isn't special-cased.
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        let (x, y) = (pt.x(), pt.y());
        let mut inside = false;
        let mut j = self.pts.len() - 1;
        for i in 0..self.pts.len() {
            let (xi, yi) = (self.pts[i].x(), self.pts[i].y());
            let (xj, yj) = (self.pts[j].x(), self.pts[j].y());
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  LonLat::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}
