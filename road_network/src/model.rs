use std::fmt;

use serde::{Deserialize, Serialize};

use geom::{GPSBounds, HashableLonLat, Line, LonLat};

/// Either the OSM way ID, or a positional index when the source doesn't have IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadId(pub i64);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RoadId({})", self.0)
    }
}

/// The kind of linear feature. When a way has several of these tags, the first one in
/// `RoadCategory::PRECEDENCE` wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadCategory {
    Highway,
    Aeroway,
    Railway,
    Waterway,
}

impl RoadCategory {
    pub const PRECEDENCE: [RoadCategory; 4] = [
        RoadCategory::Highway,
        RoadCategory::Aeroway,
        RoadCategory::Railway,
        RoadCategory::Waterway,
    ];

    /// The OSM tag key for this category
    pub fn tag_key(self) -> &'static str {
        match self {
            RoadCategory::Highway => "highway",
            RoadCategory::Aeroway => "aeroway",
            RoadCategory::Railway => "railway",
            RoadCategory::Waterway => "waterway",
        }
    }

    pub fn parse(value: &str) -> Option<RoadCategory> {
        RoadCategory::PRECEDENCE
            .into_iter()
            .find(|c| c.tag_key() == value)
    }
}

/// A category plus the tag value, like `highway=residential` or `railway=tram`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadClass {
    pub category: RoadCategory,
    pub value: String,
}

impl RoadClass {
    pub fn new<I: Into<String>>(category: RoadCategory, value: I) -> RoadClass {
        RoadClass {
            category,
            value: value.into(),
        }
    }

    pub fn highway<I: Into<String>>(value: I) -> RoadClass {
        RoadClass::new(RoadCategory::Highway, value)
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.category.tag_key(), self.value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: RoadId,
    pub class: RoadClass,
    pub name: Option<String>,
    /// At least 2 points. Splitting at intersections inserts more.
    pub pts: Vec<LonLat>,
}

impl RoadSegment {
    pub fn new(id: RoadId, class: RoadClass, pts: Vec<LonLat>) -> RoadSegment {
        RoadSegment {
            id,
            class,
            name: None,
            pts,
        }
    }

    /// Each pair of consecutive vertices
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts.windows(2).map(|pair| Line::new(pair[0], pair[1]))
    }

    pub fn first_pt(&self) -> Option<LonLat> {
        self.pts.first().copied()
    }

    pub fn last_pt(&self) -> Option<LonLat> {
        self.pts.last().copied()
    }
}

/// A place where two or more roads cross or touch. Nearby hits are merged by rounding to 6
/// decimal places.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionPoint {
    pub pt: LonLat,
    /// In the order they were found. Never has duplicates.
    pub connected_roads: Vec<RoadId>,
}

impl IntersectionPoint {
    pub fn new(pt: LonLat, r1: RoadId, r2: RoadId) -> IntersectionPoint {
        let mut i = IntersectionPoint {
            pt,
            connected_roads: Vec::new(),
        };
        i.add_road(r1);
        i.add_road(r2);
        i
    }

    pub fn key(&self) -> HashableLonLat {
        self.pt.to_hashable()
    }

    /// Returns true if the road wasn't already connected.
    pub fn add_road(&mut self, r: RoadId) -> bool {
        if self.connected_roads.contains(&r) {
            return false;
        }
        self.connected_roads.push(r);
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnalysisWarning {
    /// The region's bounding box covers more square degrees than the threshold, so the upstream
    /// query will probably be slow or fail.
    LargeArea { area: f64, threshold: f64 },
    /// Some upstream elements couldn't be turned into roads.
    SkippedElements { count: usize },
    /// The requested edge detector isn't implemented; Sobel ran instead.
    EdgeDetectorFallback { requested: String },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisWarning::LargeArea { area, threshold } => write!(
                f,
                "The region covers {:.4} square degrees (more than {}); fetching roads may be slow or fail",
                area, threshold
            ),
            AnalysisWarning::SkippedElements { count } => {
                write!(f, "Skipped {} malformed elements", count)
            }
            AnalysisWarning::EdgeDetectorFallback { requested } => {
                write!(f, "{} edge detection isn't implemented; used Sobel", requested)
            }
        }
    }
}

/// The flat output of an analysis: every road, then every intersection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub roads: Vec<RoadSegment>,
    pub intersections: Vec<IntersectionPoint>,
    /// The bounding box of the region analyzed, if known
    pub bounds: Option<GPSBounds>,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisResult {
    pub fn new(roads: Vec<RoadSegment>) -> AnalysisResult {
        AnalysisResult {
            roads,
            ..Default::default()
        }
    }

    pub fn get_road(&self, id: RoadId) -> Option<&RoadSegment> {
        self.roads.iter().find(|r| r.id == id)
    }

    pub fn get_intersection(&self, key: HashableLonLat) -> Option<&IntersectionPoint> {
        self.intersections.iter().find(|i| i.key() == key)
    }

    pub fn num_features(&self) -> usize {
        self.roads.len() + self.intersections.len()
    }
}
