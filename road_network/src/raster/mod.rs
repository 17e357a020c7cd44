//! Extracts roads from an image covering a region's bounding box. This is a deliberately small
//! pipeline (grayscale, blur, Sobel edges, threshold, a crude skeleton, connected components),
//! good enough to sketch a street grid from a clean image. It isn't real road extraction.

mod components;
mod extract;
mod filters;
mod mask;
mod synthetic;

use std::collections::HashMap;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use abstutil::Timer;
use geom::{GPSBounds, HashableLonLat, Line};

use crate::{
    clip_to_region, find_intersections, AnalysisError, AnalysisResult, AnalysisWarning,
    IntersectionPoint, Region, RoadSegment,
};

pub use self::components::{connected_components, MIN_COMPONENT_PIXELS};
pub use self::extract::{classify_length, components_to_roads, pixel_to_lonlat};
pub use self::filters::{blur, grayscale, sobel};
pub use self::mask::Mask;
pub use self::synthetic::synthesize_image;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeDetection {
    Sobel,
    /// Not implemented; falls back to Sobel
    Canny,
    /// Not implemented; falls back to Sobel
    Laplacian,
}

/// How to find intersections between extracted roads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionScan {
    /// Every sub-segment of every road pair, splitting roads at each hit, exactly like the
    /// vector path
    Full,
    /// Only the straight line between each road's endpoints, with no splitting. Much cheaper,
    /// but misses crossings of curvy roads.
    EndpointsOnly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAnalysisOptions {
    /// From 0.1 to 1.0. Higher finds more road pixels.
    pub sensitivity: f64,
    /// Components with fewer pixels than this are dropped.
    pub min_road_width: usize,
    /// Only checked for consistency; nothing is dropped for being too big.
    pub max_road_width: usize,
    /// Blur before edge detection
    pub noise_reduction: bool,
    pub edge_detection: EdgeDetection,
    pub intersection_scan: IntersectionScan,
}

impl Default for ImageAnalysisOptions {
    fn default() -> Self {
        ImageAnalysisOptions {
            sensitivity: 0.5,
            min_road_width: 10,
            max_road_width: 100,
            noise_reduction: true,
            edge_detection: EdgeDetection::Sobel,
            intersection_scan: IntersectionScan::Full,
        }
    }
}

impl ImageAnalysisOptions {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(0.1..=1.0).contains(&self.sensitivity) {
            return Err(AnalysisError::input(format!(
                "sensitivity must be between 0.1 and 1.0, not {}",
                self.sensitivity
            )));
        }
        if self.max_road_width < self.min_road_width {
            return Err(AnalysisError::input(format!(
                "max_road_width {} is less than min_road_width {}",
                self.max_road_width, self.min_road_width
            )));
        }
        Ok(())
    }

    /// Edge intensities strictly above this are foreground.
    pub fn threshold(&self) -> f64 {
        255.0 * (1.0 - self.sensitivity)
    }
}

/// Runs the pixel pipeline and returns the roads found, positioned within `bounds`. Doesn't look
/// for intersections.
pub fn extract_roads(
    img: &RgbaImage,
    bounds: &GPSBounds,
    opts: &ImageAnalysisOptions,
    timer: &mut Timer,
) -> Vec<RoadSegment> {
    let (width, height) = img.dimensions();

    timer.start("grayscale");
    let mut pipeline = grayscale(img);
    timer.stop("grayscale");

    if opts.noise_reduction {
        timer.start("blur");
        pipeline = blur(&pipeline);
        timer.stop("blur");
    }

    timer.start("edge detection");
    let edges = sobel(&pipeline);
    timer.stop("edge detection");

    timer.start("skeletonize");
    let mask = Mask::binarize(&edges, opts.threshold());
    let skeleton = mask.skeletonize();
    timer.stop("skeletonize");
    debug!(
        "{} edge pixels, {} after thinning",
        mask.count(),
        skeleton.count()
    );

    timer.start("connected components");
    let components = connected_components(&skeleton);
    timer.stop("connected components");

    let roads = components_to_roads(components, width, height, bounds, opts.min_road_width);
    info!("Extracted {} roads from a {}x{} image", roads.len(), width, height);
    roads
}

/// The raster alternative to `Analyzer::analyze`. The image is assumed to exactly cover the
/// region's bounding box.
pub fn analyze_image(
    img: &RgbaImage,
    region: &Region,
    opts: &ImageAnalysisOptions,
    clip: bool,
    timer: &mut Timer,
) -> Result<AnalysisResult, AnalysisError> {
    opts.validate()?;
    let (width, height) = img.dimensions();
    if width < 3 || height < 3 {
        return Err(AnalysisError::Image(format!(
            "a {}x{} image is too small; it must be at least 3x3",
            width, height
        )));
    }
    if region.is_empty() {
        return Err(AnalysisError::input(
            "The region has no features; draw or upload a boundary first",
        ));
    }
    let bounds = region.bounding_box()?;

    let mut warnings = Vec::new();
    if opts.edge_detection != EdgeDetection::Sobel {
        let warning = AnalysisWarning::EdgeDetectorFallback {
            requested: format!("{:?}", opts.edge_detection),
        };
        warn!("{}", warning);
        warnings.push(warning);
    }

    let roads = extract_roads(img, &bounds, opts, timer);
    let mut result = match opts.intersection_scan {
        IntersectionScan::Full => {
            let (roads, intersections) = find_intersections(roads, timer);
            AnalysisResult {
                roads,
                intersections,
                ..Default::default()
            }
        }
        IntersectionScan::EndpointsOnly => {
            let intersections = endpoint_intersections(&roads);
            AnalysisResult {
                roads,
                intersections,
                ..Default::default()
            }
        }
    };
    result.bounds = Some(bounds);
    result.warnings = warnings;

    if clip {
        clip_to_region(&mut result, region);
    }
    Ok(result)
}

/// Compares only the line from each road's first to last point, for every pair of roads. Roads
/// aren't modified.
pub fn endpoint_intersections(roads: &[RoadSegment]) -> Vec<IntersectionPoint> {
    let mut intersections: Vec<IntersectionPoint> = Vec::new();
    let mut index: HashMap<HashableLonLat, usize> = HashMap::new();
    let chords: Vec<Option<Line>> = roads
        .iter()
        .map(|r| Some(Line::new(r.first_pt()?, r.last_pt()?)))
        .collect();

    for idx1 in 0..roads.len() {
        for idx2 in (idx1 + 1)..roads.len() {
            let (l1, l2) = match (&chords[idx1], &chords[idx2]) {
                (Some(l1), Some(l2)) => (l1, l2),
                _ => continue,
            };
            if let Some(pt) = l1.intersection(l2) {
                let (r1, r2) = (roads[idx1].id, roads[idx2].id);
                if let Some(existing) = index.get(&pt.to_hashable()) {
                    let i = &mut intersections[*existing];
                    i.add_road(r1);
                    i.add_road(r2);
                } else {
                    index.insert(pt.to_hashable(), intersections.len());
                    intersections.push(IntersectionPoint::new(pt, r1, r2));
                }
            }
        }
    }
    intersections
}
