use crate::LonLat;

/// Determinants smaller than this mean the two segments are parallel or collinear.
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// How close (in degrees) a point has to be to count as lying on a segment or matching an existing
/// vertex.
pub const ON_SEGMENT_TOLERANCE: f64 = 1e-5;

/// Segment, technically
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line(LonLat, LonLat);

impl Line {
    pub fn new(pt1: LonLat, pt2: LonLat) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> LonLat {
        self.0
    }

    pub fn pt2(&self) -> LonLat {
        self.1
    }

    /// In degrees
    pub fn length(&self) -> f64 {
        self.0.degree_dist(self.1)
    }

    /// Finds where two finite segments cross, by solving for the parametric positions `t` along
    /// `self` and `u` along `other`. Touching at an endpoint counts.
    ///
    /// Parallel and collinear segments never intersect here, even when they overlap.
    pub fn intersection(&self, other: &Line) -> Option<LonLat> {
        let (x1, y1) = (self.pt1().x(), self.pt1().y());
        let (x2, y2) = (self.pt2().x(), self.pt2().y());
        let (x3, y3) = (other.pt1().x(), other.pt1().y());
        let (x4, y4) = (other.pt2().x(), other.pt2().y());

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(LonLat::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
        } else {
            None
        }
    }

    /// True if `pt` lies within `tolerance` degrees of this segment. The cross product measures
    /// the distance from the infinite line, then the projection checks the point is between the
    /// endpoints. Both are scaled by the segment's length, so the tolerance means the same thing
    /// for short and long segments.
    pub fn contains_pt(&self, pt: LonLat, tolerance: f64) -> bool {
        let dx = self.pt2().x() - self.pt1().x();
        let dy = self.pt2().y() - self.pt1().y();
        let px = pt.x() - self.pt1().x();
        let py = pt.y() - self.pt1().y();

        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return self.pt1().approx_eq(pt, tolerance);
        }

        let cross = py * dx - px * dy;
        if cross.abs() > tolerance * len {
            return false;
        }

        let dot = px * dx + py * dy;
        dot >= -tolerance * len && dot <= len * len + tolerance * len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
        Line::new(LonLat::new(x1, y1), LonLat::new(x2, y2))
    }

    #[test]
    fn crossing_at_right_angle() {
        let pt = line(0.0, 0.0, 2.0, 2.0)
            .intersection(&line(0.0, 2.0, 2.0, 0.0))
            .unwrap();
        assert_eq!(pt, LonLat::new(1.0, 1.0));
    }

    #[test]
    fn parallel_and_collinear() {
        assert_eq!(
            line(0.0, 0.0, 1.0, 0.0).intersection(&line(0.0, 1.0, 1.0, 1.0)),
            None
        );
        // Overlapping collinear segments are a known blind spot
        assert_eq!(
            line(0.0, 0.0, 2.0, 0.0).intersection(&line(1.0, 0.0, 3.0, 0.0)),
            None
        );
    }

    #[test]
    fn endpoint_touches_count() {
        for (l1, l2, expected) in [
            (
                line(0.0, 0.0, 1.0, 0.0),
                line(1.0, 0.0, 1.0, 1.0),
                Some(LonLat::new(1.0, 0.0)),
            ),
            (
                line(0.0, 0.0, 2.0, 0.0),
                line(1.0, 0.0, 1.0, 1.0),
                Some(LonLat::new(1.0, 0.0)),
            ),
            (line(0.0, 0.0, 1.0, 0.0), line(1.5, -1.0, 1.5, 1.0), None),
        ] {
            assert_eq!(l1.intersection(&l2), expected);
            assert_eq!(l2.intersection(&l1).is_some(), expected.is_some());
        }
    }

    #[test]
    fn contains_pt() {
        let l = line(0.0, 0.0, 0.001, 0.001);
        assert!(l.contains_pt(LonLat::new(0.0005, 0.0005), ON_SEGMENT_TOLERANCE));
        assert!(l.contains_pt(LonLat::new(0.0, 0.0), ON_SEGMENT_TOLERANCE));
        assert!(l.contains_pt(LonLat::new(0.001, 0.001), ON_SEGMENT_TOLERANCE));
        assert!(!l.contains_pt(LonLat::new(0.01, 0.01), ON_SEGMENT_TOLERANCE));
        assert!(!line(0.0, 0.0, 1.0, 0.0).contains_pt(LonLat::new(0.5, 0.1), ON_SEGMENT_TOLERANCE));
    }

    #[test]
    fn contains_pt_on_short_segments() {
        // About 11m long, like a typical OSM segment
        let l = line(0.0, 0.0, 0.0001, 0.0);
        for (pt, expected) in [
            (LonLat::new(0.00005, 0.0), true),
            (LonLat::new(0.00005, 0.000005), true),
            (LonLat::new(0.000105, 0.0), true),
            (LonLat::new(-0.000005, 0.0), true),
            (LonLat::new(0.00005, 0.05), false),
            (LonLat::new(0.05, 0.0), false),
            (LonLat::new(-0.05, 0.0), false),
            (LonLat::new(0.00005, 0.00002), false),
        ] {
            assert_eq!(l.contains_pt(pt, ON_SEGMENT_TOLERANCE), expected, "{}", pt);
        }

        let degenerate = line(1.0, 1.0, 1.0, 1.0);
        assert!(degenerate.contains_pt(LonLat::new(1.0, 1.000001), ON_SEGMENT_TOLERANCE));
        assert!(!degenerate.contains_pt(LonLat::new(1.0, 1.1), ON_SEGMENT_TOLERANCE));
    }
}
