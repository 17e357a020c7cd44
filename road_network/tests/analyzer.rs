use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use abstutil::Timer;
use geom::{LonLat, Ring};
use road_network::{
    fetch_with_failover, parse_response, AnalysisError, AnalysisOptions, AnalysisResult,
    AnalysisWarning, Analyzer, IntersectionMode, OverpassResponse, Region, RoadId, RoadSource,
};

/// Always returns the same canned Overpass response, and remembers the queries it got.
struct CannedSource {
    response: String,
    queries: Rc<RefCell<Vec<String>>>,
}

impl CannedSource {
    fn new(response: &str) -> CannedSource {
        CannedSource {
            response: response.to_string(),
            queries: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl RoadSource for CannedSource {
    async fn fetch_ways(&self, query: &str) -> Result<OverpassResponse, AnalysisError> {
        self.queries.borrow_mut().push(query.to_string());
        parse_response(self.response.as_bytes()).map_err(|err| AnalysisError::Parse(err.to_string()))
    }
}

/// Fails on every endpoint except the last.
struct FlakySource {
    endpoints: Vec<String>,
    response: String,
}

impl RoadSource for FlakySource {
    async fn fetch_ways(&self, _: &str) -> Result<OverpassResponse, AnalysisError> {
        let last = self.endpoints.last().cloned();
        fetch_with_failover(&self.endpoints, Duration::ZERO, |url| {
            let response = self.response.clone();
            let last = last.clone();
            async move {
                if Some(url) == last {
                    parse_response(response.as_bytes())
                } else {
                    anyhow::bail!("error sending request: connection refused")
                }
            }
        })
        .await
    }
}

fn square(half: f64) -> Region {
    Region::from_ring(
        Ring::new(vec![
            LonLat::new(-half, -half),
            LonLat::new(half, -half),
            LonLat::new(half, half),
            LonLat::new(-half, half),
        ])
        .unwrap(),
    )
}

const CROSSING_WAYS: &str = r#"{
    "elements": [
        {"type": "way", "id": 1, "tags": {"highway": "primary", "name": "East-West"},
         "geometry": [{"lat": 0.0, "lon": -0.002}, {"lat": 0.0, "lon": 0.002}]},
        {"type": "way", "id": 2, "tags": {"highway": "residential"},
         "geometry": [{"lat": -0.002, "lon": 0.0}, {"lat": 0.002, "lon": 0.0}]}
    ]
}"#;

async fn analyze(
    source: CannedSource,
    region: &Region,
    opts: AnalysisOptions,
) -> Result<AnalysisResult, AnalysisError> {
    Analyzer::new(source, opts)
        .analyze(region, &mut Timer::throwaway())
        .await
}

#[tokio::test]
async fn two_crossing_roads() {
    let source = CannedSource::new(CROSSING_WAYS);
    let analyzer = Analyzer::new(source, AnalysisOptions::default());
    let result = analyzer
        .analyze(&square(0.001), &mut Timer::throwaway())
        .await
        .unwrap();

    assert_eq!(result.roads.len(), 2);
    assert_eq!(result.intersections.len(), 1);
    assert_eq!(result.num_features(), 3);
    let i = &result.intersections[0];
    assert_eq!(i.pt, LonLat::new(0.0, 0.0));
    assert_eq!(i.connected_roads, vec![RoadId(1), RoadId(2)]);

    // Both roads were split at the crossing, which is why clipping kept them
    for road in &result.roads {
        assert_eq!(road.pts.len(), 3);
        assert_eq!(road.pts[1], LonLat::new(0.0, 0.0));
    }
    assert_eq!(result.roads[0].name.as_deref(), Some("East-West"));
    assert!(result.warnings.is_empty());

    let bounds = result.bounds.unwrap();
    assert_eq!(bounds.west(), -0.001);
    assert_eq!(bounds.north(), 0.001);
}

#[tokio::test]
async fn query_covers_the_bounding_box() {
    let source = CannedSource::new(r#"{"elements": []}"#);
    let queries = source.queries.clone();
    let result = analyze(source, &square(0.001), AnalysisOptions::default())
        .await
        .unwrap();
    assert_eq!(result.num_features(), 0);

    let queries = queries.borrow();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].contains("way[\"highway\"](-0.001,-0.001,0.001,0.001);"));
}

#[tokio::test]
async fn raw_only_mode() {
    let opts = AnalysisOptions {
        intersections: IntersectionMode::RawOnly,
        ..Default::default()
    };

    // With clipping, raw roads whose vertices are all outside the square disappear, even though
    // they pass through it.
    let result = analyze(CannedSource::new(CROSSING_WAYS), &square(0.001), opts.clone())
        .await
        .unwrap();
    assert!(result.roads.is_empty());
    assert!(result.intersections.is_empty());

    let result = analyze(
        CannedSource::new(CROSSING_WAYS),
        &square(0.001),
        AnalysisOptions {
            clip_to_boundary: false,
            ..opts
        },
    )
    .await
    .unwrap();
    assert_eq!(result.roads.len(), 2);
    assert!(result.intersections.is_empty());
    assert_eq!(result.roads[0].pts.len(), 2);
}

#[tokio::test]
async fn empty_region() {
    let source = CannedSource::new(CROSSING_WAYS);
    let analyzer = Analyzer::new(source, AnalysisOptions::default());
    let err = analyzer
        .analyze(&Region::default(), &mut Timer::throwaway())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Input(_)));
}

#[tokio::test]
async fn large_area_is_only_a_warning() {
    let result = analyze(
        CannedSource::new(CROSSING_WAYS),
        &square(0.1),
        AnalysisOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(result.roads.len(), 2);
    assert_eq!(result.intersections.len(), 1);
    match &result.warnings[..] {
        [AnalysisWarning::LargeArea { area, threshold }] => {
            assert!(*area > *threshold);
        }
        x => panic!("unexpected warnings {:?}", x),
    }
}

#[tokio::test]
async fn skipped_ways_are_reported() {
    let raw = r#"{
        "elements": [
            {"type": "way", "id": 1, "tags": {"highway": "primary"},
             "geometry": [{"lat": 0.0, "lon": -0.0005}, {"lat": 0.0, "lon": 0.0005}]},
            {"type": "way", "id": 2, "tags": {"highway": "primary"},
             "geometry": [{"lat": 0.0, "lon": 0.0}]}
        ]
    }"#;
    let result = analyze(
        CannedSource::new(raw),
        &square(0.001),
        AnalysisOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(result.roads.len(), 1);
    assert_eq!(
        result.warnings,
        vec![AnalysisWarning::SkippedElements { count: 1 }]
    );
}

#[tokio::test]
async fn falls_back_to_a_working_endpoint() {
    let source = FlakySource {
        endpoints: vec![
            "https://one".to_string(),
            "https://two".to_string(),
            "https://three".to_string(),
        ],
        response: CROSSING_WAYS.to_string(),
    };
    let result = Analyzer::new(source, AnalysisOptions::default())
        .analyze(&square(0.001), &mut Timer::throwaway())
        .await
        .unwrap();
    assert_eq!(result.intersections.len(), 1);
}

#[tokio::test]
async fn every_endpoint_fails() {
    let source = FlakySource {
        endpoints: vec!["https://one".to_string(), "https://two".to_string()],
        // The last endpoint returns garbage
        response: "<html>Rate limited</html>".to_string(),
    };
    let err = Analyzer::new(source, AnalysisOptions::default())
        .analyze(&square(0.001), &mut Timer::throwaway())
        .await
        .unwrap_err();
    match err {
        AnalysisError::UpstreamFetch { ref attempts } => {
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[1].endpoint, "https://two");
        }
        ref x => panic!("unexpected error {}", x),
    }
    assert!(!err.suggestion().is_empty());
}

#[tokio::test]
async fn output_survives_a_geojson_round_trip() {
    let result = analyze(
        CannedSource::new(CROSSING_WAYS),
        &square(0.001),
        AnalysisOptions::default(),
    )
    .await
    .unwrap();
    let raw = result.to_geojson_string().unwrap();
    let back = AnalysisResult::from_geojson_str(&raw).unwrap();
    assert_eq!(back.roads, result.roads);
    assert_eq!(back.intersections, result.intersections);

    // Finding intersections again doesn't change anything
    let (roads, intersections) =
        road_network::find_intersections(back.roads, &mut Timer::throwaway());
    assert_eq!(roads, result.roads);
    assert_eq!(intersections, result.intersections);
}
