use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::json;

use geom::LonLat;

use crate::{
    AnalysisError, AnalysisResult, IntersectionPoint, RoadCategory, RoadClass, RoadId,
    RoadSegment,
};

impl AnalysisResult {
    /// Roads become LineStrings, then intersections become Points with `isIntersection` and
    /// `connectedRoads` properties.
    pub fn to_geojson(&self) -> GeoJson {
        let mut features = Vec::new();

        for road in &self.roads {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(
                    road.pts.iter().map(|pt| pt.to_position()).collect(),
                ))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("id", road.id.0);
            feature.set_property("category", road.class.category.tag_key());
            feature.set_property("class", road.class.value.clone());
            feature.set_property(road.class.category.tag_key(), road.class.value.clone());
            if let Some(ref name) = road.name {
                feature.set_property("name", name.clone());
            }
            features.push(feature);
        }

        for (idx, i) in self.intersections.iter().enumerate() {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(i.pt.to_position()))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("id", format!("intersection-{}", idx));
            feature.set_property("isIntersection", true);
            feature.set_property(
                "connectedRoads",
                json!(i.connected_roads.iter().map(|r| r.0).collect::<Vec<_>>()),
            );
            features.push(feature);
        }

        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(&self.to_geojson())
            .map_err(|err| AnalysisError::Export(err.to_string()))
    }

    /// Reads output previously written by `to_geojson`, or any FeatureCollection of LineStrings.
    /// Roads missing an `id` get their position in the file. Points that aren't marked as
    /// intersections, and other geometry, are skipped.
    pub fn from_geojson_str(raw: &str) -> Result<AnalysisResult, AnalysisError> {
        let geojson = raw
            .parse::<GeoJson>()
            .map_err(|err| AnalysisError::input(format!("Not valid GeoJSON: {}", err)))?;
        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(AnalysisError::input(
                    "Expected a FeatureCollection of roads, not a bare geometry",
                ));
            }
        };

        let mut result = AnalysisResult::default();
        let mut skipped = 0;
        for (idx, feature) in features.into_iter().enumerate() {
            let value = match feature.geometry {
                Some(ref geometry) => geometry.value.clone(),
                None => {
                    skipped += 1;
                    continue;
                }
            };
            match value {
                Value::LineString(positions) => {
                    let pts: Option<Vec<LonLat>> = positions
                        .iter()
                        .map(|pos| LonLat::from_position(pos))
                        .collect();
                    let pts = match pts {
                        Some(pts) if pts.len() >= 2 => pts,
                        _ => {
                            skipped += 1;
                            continue;
                        }
                    };
                    let id = feature
                        .property("id")
                        .and_then(|x| x.as_i64())
                        .unwrap_or(idx as i64);
                    let category = feature
                        .property("category")
                        .and_then(|x| x.as_str())
                        .and_then(RoadCategory::parse)
                        .unwrap_or(RoadCategory::Highway);
                    let value = feature
                        .property("class")
                        .and_then(|x| x.as_str())
                        .unwrap_or("unclassified");
                    let mut road = RoadSegment::new(RoadId(id), RoadClass::new(category, value), pts);
                    road.name = feature
                        .property("name")
                        .and_then(|x| x.as_str())
                        .map(|x| x.to_string());
                    result.roads.push(road);
                }
                Value::Point(pos)
                    if feature.property("isIntersection").and_then(|x| x.as_bool())
                        == Some(true) =>
                {
                    let pt = match LonLat::from_position(&pos) {
                        Some(pt) => pt,
                        None => {
                            skipped += 1;
                            continue;
                        }
                    };
                    let connected_roads = feature
                        .property("connectedRoads")
                        .and_then(|x| x.as_array())
                        .map(|list| list.iter().filter_map(|x| x.as_i64()).map(RoadId).collect())
                        .unwrap_or_default();
                    result.intersections.push(IntersectionPoint {
                        pt,
                        connected_roads,
                    });
                }
                _ => {
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            warn!("Skipped {} features that aren't roads or intersections", skipped);
        }
        Ok(result)
    }
}
