use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::Deserialize;

use abstutil::Timer;
use geom::LonLat;

use crate::{RoadCategory, RoadClass, RoadId, RoadSegment};

/// The JSON an Overpass server returns for `[out:json]` queries. Elements are kept loosely typed,
/// so one malformed way doesn't sink the whole response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Way {
    #[serde(rename = "type")]
    osm_type: String,
    id: Option<i64>,
    #[serde(default)]
    tags: BTreeMap<String, serde_json::Value>,
    geometry: Option<Vec<Node>>,
}

#[derive(Deserialize)]
struct Node {
    lon: f64,
    lat: f64,
}

/// Fails if the bytes aren't a JSON object at all. Anything wrong with individual elements is
/// handled later, in `ways_to_roads`.
pub fn parse_response(bytes: &[u8]) -> Result<OverpassResponse> {
    let resp: OverpassResponse = serde_json::from_slice(bytes)?;
    Ok(resp)
}

/// The first tag present in `RoadCategory::PRECEDENCE` order determines the class.
pub fn classify_tags(tags: &BTreeMap<String, String>) -> Option<RoadClass> {
    RoadCategory::PRECEDENCE.into_iter().find_map(|category| {
        tags.get(category.tag_key())
            .map(|value| RoadClass::new(category, value.clone()))
    })
}

/// Turns ways with geometry into roads. Non-way elements are ignored. Ways with fewer than 2
/// finite points, no recognized category, or an unexpected shape are skipped and counted.
///
/// Returns the roads and the number of skipped ways.
pub fn ways_to_roads(resp: &OverpassResponse, timer: &mut Timer) -> (Vec<RoadSegment>, usize) {
    let mut roads = Vec::new();
    let mut skipped = 0;

    timer.start_iter("normalize ways", resp.elements.len());
    for (idx, element) in resp.elements.iter().enumerate() {
        timer.next();
        if element.get("type").and_then(|t| t.as_str()) != Some("way") {
            continue;
        }
        match way_to_road(idx, element) {
            Ok(Some(road)) => roads.push(road),
            Ok(None) => {}
            Err(err) => {
                skipped += 1;
                warn!("Skipping element {}: {}", idx, err);
            }
        }
    }

    info!(
        "Got {} roads from {} elements",
        roads.len(),
        resp.elements.len()
    );
    (roads, skipped)
}

// Ok(None) means the way has no geometry, which isn't a problem worth reporting.
fn way_to_road(idx: usize, element: &serde_json::Value) -> Result<Option<RoadSegment>> {
    let way: Way = serde_json::from_value(element.clone())?;
    if way.osm_type != "way" {
        return Ok(None);
    }
    let geometry = match way.geometry {
        Some(geometry) => geometry,
        None => return Ok(None),
    };

    let pts: Vec<LonLat> = geometry
        .into_iter()
        .map(|node| LonLat::new(node.lon, node.lat))
        .collect();
    if let Some(pt) = pts.iter().find(|pt| !pt.is_finite()) {
        bail!("way has a non-finite point {}", pt);
    }
    if pts.len() < 2 {
        bail!("way only has {} points", pts.len());
    }

    // Only string tags matter
    let tags: BTreeMap<String, String> = way
        .tags
        .into_iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k, v.to_string())))
        .collect();
    let class = match classify_tags(&tags) {
        Some(class) => class,
        None => bail!("way doesn't have a highway, aeroway, railway, or waterway tag"),
    };

    let id = way.id.unwrap_or(idx as i64);
    let mut road = RoadSegment::new(RoadId(id), class, pts);
    road.name = tags.get("name").cloned();
    Ok(Some(road))
}
