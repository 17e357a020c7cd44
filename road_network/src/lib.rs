//! Turns a region of interest into a flat set of road features and the points where they meet.
//!
//! There are two ways to get roads:
//!
//! 1. The vector path queries an Overpass server for OSM ways inside the region's bounding box
//!    (see `Analyzer`).
//! 2. The raster path extracts roads from an image covering the bounding box, through a small
//!    grayscale/blur/edge/skeleton pipeline (see `raster::analyze_image`).
//!
//! Either way, the roads can be split at their intersections and clipped to the region. The
//! output is an `AnalysisResult`, which converts to GeoJSON. There's no explicit graph; roads are
//! connected through shared vertices and the `connected_roads` list of each intersection.

#[macro_use]
extern crate log;

mod analyzer;
mod clip;
mod edit;
mod error;
mod export;
mod intersections;
mod model;
mod osm;
mod overpass;
pub mod raster;
mod region;

pub use crate::analyzer::{
    finish_analysis, AnalysisOptions, Analyzer, IntersectionMode, LARGE_AREA_THRESHOLD,
};
pub use crate::clip::clip_to_region;
pub use crate::edit::{EditSession, FeatureId};
pub use crate::error::{AnalysisError, EndpointFailure, ErrorCategory};
pub use crate::intersections::{find_intersections, splice_vertex};
pub use crate::model::{
    AnalysisResult, AnalysisWarning, IntersectionPoint, RoadCategory, RoadClass, RoadId,
    RoadSegment,
};
pub use crate::osm::{classify_tags, parse_response, ways_to_roads, OverpassResponse};
pub use crate::overpass::{
    build_query, fetch_with_failover, OverpassClient, RoadSource, DEFAULT_ENDPOINTS,
};
pub use crate::region::{Boundary, Region};
