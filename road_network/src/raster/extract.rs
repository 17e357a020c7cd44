use geom::{GPSBounds, LonLat, METERS_PER_DEGREE};

use crate::{RoadClass, RoadId, RoadSegment};

/// Linear interpolation across the bounds; pixel rows go from north to south.
pub fn pixel_to_lonlat(x: u32, y: u32, width: u32, height: u32, bounds: &GPSBounds) -> LonLat {
    LonLat::new(
        bounds.west() + (x as f64 / width as f64) * (bounds.east() - bounds.west()),
        bounds.north() - (y as f64 / height as f64) * (bounds.north() - bounds.south()),
    )
}

/// Guesses a highway type from the approximate length in meters.
pub fn classify_length(meters: f64) -> &'static str {
    if meters > 1000.0 {
        "primary"
    } else if meters > 500.0 {
        "secondary"
    } else if meters > 200.0 {
        "tertiary"
    } else {
        "residential"
    }
}

/// Each component with at least `min_pixels` pixels becomes a road, with one vertex per pixel in
/// fill order. Roads are numbered from 0 in the order they're kept.
pub fn components_to_roads(
    components: Vec<Vec<(u32, u32)>>,
    width: u32,
    height: u32,
    bounds: &GPSBounds,
    min_pixels: usize,
) -> Vec<RoadSegment> {
    let mut roads = Vec::new();
    for component in components {
        if component.len() < min_pixels {
            continue;
        }
        let pts: Vec<LonLat> = component
            .into_iter()
            .map(|(x, y)| pixel_to_lonlat(x, y, width, height, bounds))
            .collect();
        let meters = LonLat::chain_length(&pts) * METERS_PER_DEGREE;
        let id = RoadId(roads.len() as i64);
        roads.push(RoadSegment::new(
            id,
            RoadClass::highway(classify_length(meters)),
            pts,
        ));
    }
    roads
}
