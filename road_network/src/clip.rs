use crate::{AnalysisResult, Region};

/// Keeps roads with at least one vertex inside any of the region's polygons, and intersections
/// inside any polygon. Roads are kept or dropped whole; nothing is cut at the boundary. If the
/// region has no polygons, nothing changes.
///
/// Returns the number of features removed.
pub fn clip_to_region(result: &mut AnalysisResult, region: &Region) -> usize {
    if !region.has_polygon() {
        return 0;
    }

    let before = result.num_features();
    result
        .roads
        .retain(|r| r.pts.iter().any(|pt| region.contains_pt(*pt)));
    result.intersections.retain(|i| region.contains_pt(i.pt));
    let removed = before - result.num_features();
    if removed > 0 {
        info!("Clipping to the region removed {} features", removed);
    }
    removed
}
