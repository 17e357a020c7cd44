use geojson::{GeoJson, Value};

use geom::{GPSBounds, LonLat, Ring};

use crate::AnalysisError;

/// One piece of a region of interest.
#[derive(Clone, Debug, PartialEq)]
pub enum Boundary {
    /// Only the outer ring; holes are ignored.
    Polygon(Ring),
    Point(LonLat),
    /// Kept, but doesn't contribute to the bounding box or clipping.
    LineString(Vec<LonLat>),
}

/// The area of interest, as supplied by the caller. Read-only during analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    boundaries: Vec<Boundary>,
}

impl Region {
    pub fn new(boundaries: Vec<Boundary>) -> Region {
        Region { boundaries }
    }

    /// A single polygon region
    pub fn from_ring(ring: Ring) -> Region {
        Region::new(vec![Boundary::Polygon(ring)])
    }

    pub fn boundaries(&self) -> &Vec<Boundary> {
        &self.boundaries
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Ring> {
        self.boundaries.iter().filter_map(|b| match b {
            Boundary::Polygon(ring) => Some(ring),
            _ => None,
        })
    }

    pub fn has_polygon(&self) -> bool {
        self.polygons().next().is_some()
    }

    /// True if any polygon contains the point.
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        self.polygons().any(|ring| ring.contains_pt(pt))
    }

    /// Covers every polygon vertex and point. Fails if the region is empty or has no finite
    /// coordinates.
    pub fn bounding_box(&self) -> Result<GPSBounds, AnalysisError> {
        if self.boundaries.is_empty() {
            return Err(AnalysisError::input("The region has no features"));
        }

        let mut bounds = GPSBounds::new();
        for b in &self.boundaries {
            match b {
                Boundary::Polygon(ring) => {
                    for pt in ring.points() {
                        bounds.update(*pt);
                    }
                }
                Boundary::Point(pt) => {
                    bounds.update(*pt);
                }
                Boundary::LineString(_) => {}
            }
        }

        if bounds.is_empty() {
            return Err(AnalysisError::input(
                "No valid coordinates found in the region's polygons or points",
            ));
        }
        Ok(bounds)
    }

    /// Accepts a FeatureCollection, a single Feature, or a bare Geometry. Features without
    /// geometry are skipped. Each member of a MultiPolygon becomes its own polygon.
    pub fn from_geojson_str(raw: &str) -> Result<Region, AnalysisError> {
        let geojson = raw
            .parse::<GeoJson>()
            .map_err(|err| AnalysisError::input(format!("Region isn't valid GeoJSON: {}", err)))?;
        Region::from_geojson(geojson)
    }

    pub fn from_geojson(geojson: GeoJson) -> Result<Region, AnalysisError> {
        let geometries = match geojson {
            GeoJson::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .filter_map(|f| f.geometry)
                .collect(),
            GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
            GeoJson::Geometry(geometry) => vec![geometry],
        };

        let mut boundaries = Vec::new();
        for geometry in geometries {
            match geometry.value {
                Value::Polygon(rings) => {
                    boundaries.push(Boundary::Polygon(parse_outer_ring(&rings)?));
                }
                Value::MultiPolygon(polygons) => {
                    for rings in polygons {
                        boundaries.push(Boundary::Polygon(parse_outer_ring(&rings)?));
                    }
                }
                Value::Point(pos) => {
                    let pt = LonLat::from_position(&pos).ok_or_else(|| {
                        AnalysisError::input(format!("Point has a bad position {:?}", pos))
                    })?;
                    boundaries.push(Boundary::Point(pt));
                }
                Value::LineString(positions) => {
                    boundaries.push(Boundary::LineString(parse_positions(&positions)?));
                }
                Value::MultiPoint(_) | Value::MultiLineString(_) | Value::GeometryCollection(_) => {
                    return Err(AnalysisError::input(
                        "Region features must be Polygon, MultiPolygon, Point, or LineString",
                    ));
                }
            }
        }
        Ok(Region::new(boundaries))
    }
}

fn parse_positions(positions: &[Vec<f64>]) -> Result<Vec<LonLat>, AnalysisError> {
    positions
        .iter()
        .map(|pos| {
            LonLat::from_position(pos)
                .ok_or_else(|| AnalysisError::input(format!("Bad position {:?}", pos)))
        })
        .collect()
}

fn parse_outer_ring(rings: &[Vec<Vec<f64>>]) -> Result<Ring, AnalysisError> {
    let outer = rings
        .first()
        .ok_or_else(|| AnalysisError::input("Polygon has no rings"))?;
    let pts = parse_positions(outer)?;
    Ring::new(pts).map_err(|err| AnalysisError::input(format!("Bad polygon: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_geojson() -> &'static str {
        r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-0.001, -0.001], [0.001, -0.001], [0.001, 0.001], [-0.001, 0.001], [-0.001, -0.001]]]
                }
            }]
        }"#
    }

    #[test]
    fn bounding_box_of_square() {
        let region = Region::from_geojson_str(square_geojson()).unwrap();
        assert!(region.has_polygon());
        let b = region.bounding_box().unwrap();
        assert_eq!(b.north(), 0.001);
        assert_eq!(b.south(), -0.001);
        assert_eq!(b.east(), 0.001);
        assert_eq!(b.west(), -0.001);
        assert!(region.contains_pt(LonLat::new(0.0, 0.0)));
        assert!(!region.contains_pt(LonLat::new(0.002, 0.0)));
    }

    #[test]
    fn points_and_polygons_both_count() {
        let region = Region::new(vec![
            Boundary::Polygon(
                Ring::new(vec![
                    LonLat::new(0.0, 0.0),
                    LonLat::new(1.0, 0.0),
                    LonLat::new(1.0, 1.0),
                ])
                .unwrap(),
            ),
            Boundary::Point(LonLat::new(5.0, -2.0)),
            // Ignored
            Boundary::LineString(vec![LonLat::new(100.0, 100.0), LonLat::new(101.0, 101.0)]),
        ]);
        let b = region.bounding_box().unwrap();
        assert!(b.north() >= b.south());
        assert!(b.east() >= b.west());
        assert_eq!((b.north(), b.south(), b.east(), b.west()), (1.0, -2.0, 5.0, 0.0));
    }

    #[test]
    fn empty_or_invalid_regions_fail() {
        for region in [
            Region::default(),
            Region::new(vec![Boundary::Point(LonLat::new(f64::NAN, 1.0))]),
            Region::new(vec![Boundary::LineString(vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(1.0, 1.0),
            ])]),
        ] {
            assert!(matches!(
                region.bounding_box(),
                Err(AnalysisError::Input(_))
            ));
        }
    }

    #[test]
    fn malformed_geojson() {
        for raw in [
            "not json",
            r#"{"type": "MultiPoint", "coordinates": [[0, 0], [1, 1]]}"#,
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 1]]]}"#,
        ] {
            assert!(
                matches!(Region::from_geojson_str(raw), Err(AnalysisError::Input(_))),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn multipolygon_and_null_geometry() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                        [[[10, 10], [11, 10], [11, 11], [10, 10]]]
                    ]
                }}
            ]
        }"#;
        let region = Region::from_geojson_str(raw).unwrap();
        assert_eq!(region.polygons().count(), 2);
        assert_eq!(region.bounding_box().unwrap().north(), 11.0);
    }
}
