use serde::{Deserialize, Serialize};

use abstutil::Timer;

use crate::{
    build_query, clip_to_region, find_intersections, ways_to_roads, AnalysisError,
    AnalysisResult, AnalysisWarning, Region, RoadSegment, RoadSource,
};

/// Regions with a bounding box bigger than this many square degrees will probably make the
/// upstream query slow or fail.
pub const LARGE_AREA_THRESHOLD: f64 = 0.01;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionMode {
    /// Split roads where they cross and emit intersection points.
    #[default]
    Compute,
    /// Return roads exactly as the source had them.
    RawOnly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub intersections: IntersectionMode,
    /// Drop features that don't touch the region's polygons.
    pub clip_to_boundary: bool,
    pub large_area_threshold: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            intersections: IntersectionMode::Compute,
            clip_to_boundary: true,
            large_area_threshold: LARGE_AREA_THRESHOLD,
        }
    }
}

/// Fetches roads for a region from some `RoadSource` and post-processes them.
pub struct Analyzer<S: RoadSource> {
    source: S,
    opts: AnalysisOptions,
}

impl<S: RoadSource> Analyzer<S> {
    pub fn new(source: S, opts: AnalysisOptions) -> Analyzer<S> {
        Analyzer { source, opts }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.opts
    }

    /// Problems with the region or with fetching abort everything. Once roads have arrived,
    /// malformed ways are just skipped.
    pub async fn analyze(
        &self,
        region: &Region,
        timer: &mut Timer,
    ) -> Result<AnalysisResult, AnalysisError> {
        if region.is_empty() {
            return Err(AnalysisError::input(
                "The region has no features; draw or upload a boundary first",
            ));
        }
        let bounds = region.bounding_box()?;
        info!("Analyzing {}", bounds);

        let mut warnings = Vec::new();
        if bounds.area() > self.opts.large_area_threshold {
            let warning = AnalysisWarning::LargeArea {
                area: bounds.area(),
                threshold: self.opts.large_area_threshold,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let query = build_query(&bounds);
        debug!("Overpass query:\n{}", query);
        timer.start("fetch roads");
        let resp = self.source.fetch_ways(&query).await;
        timer.stop("fetch roads");
        let resp = resp?;

        let (roads, skipped) = ways_to_roads(&resp, timer);
        if skipped > 0 {
            warnings.push(AnalysisWarning::SkippedElements { count: skipped });
        }

        let mut result = finish_analysis(roads, region, &self.opts, timer);
        result.bounds = Some(bounds);
        result.warnings.splice(0..0, warnings);
        Ok(result)
    }
}

/// The pure tail shared by every road source: optionally split roads at intersections, then
/// optionally clip to the region.
pub fn finish_analysis(
    roads: Vec<RoadSegment>,
    region: &Region,
    opts: &AnalysisOptions,
    timer: &mut Timer,
) -> AnalysisResult {
    let mut result = match opts.intersections {
        IntersectionMode::Compute => {
            let (roads, intersections) = find_intersections(roads, timer);
            AnalysisResult {
                roads,
                intersections,
                ..Default::default()
            }
        }
        IntersectionMode::RawOnly => {
            info!("Skipping intersection detection; using raw road data only");
            AnalysisResult::new(roads)
        }
    };

    if opts.clip_to_boundary {
        clip_to_region(&mut result, region);
    }
    result
}
