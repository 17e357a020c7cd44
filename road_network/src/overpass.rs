use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use geom::GPSBounds;

use crate::{parse_response, AnalysisError, EndpointFailure, OverpassResponse};

/// Tried in order.
pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

/// Asks for highways, runways and taxiways, rail lines, and named waterway types inside the
/// bounding box, with full geometry per way. See
/// https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL
pub fn build_query(bounds: &GPSBounds) -> String {
    let bbox = format!(
        "{},{},{},{}",
        bounds.south(),
        bounds.west(),
        bounds.north(),
        bounds.east()
    );
    format!(
        "[out:json][timeout:60][maxsize:1073741824];\n(\n  way[\"highway\"]({bbox});\n  way[\"aeroway\"~\"^(runway|taxiway)$\"]({bbox});\n  way[\"railway\"~\"^(rail|light_rail|subway|tram)$\"]({bbox});\n  way[\"waterway\"~\"^(river|stream|canal)$\"]({bbox});\n);\nout geom;\n",
        bbox = bbox
    )
}

/// Somewhere to get raw OSM ways from.
#[allow(async_fn_in_trait)]
pub trait RoadSource {
    async fn fetch_ways(&self, query: &str) -> Result<OverpassResponse, AnalysisError>;
}

/// Talks to real Overpass servers, falling back through a list of endpoints.
#[derive(Clone, Debug)]
pub struct OverpassClient {
    pub endpoints: Vec<String>,
    /// Bounds each attempt, separately from the server-side timeout in the query itself.
    pub timeout: Duration,
    /// How long to wait after a failure before trying the next endpoint
    pub backoff: Duration,
}

impl Default for OverpassClient {
    fn default() -> Self {
        OverpassClient {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|x| x.to_string()).collect(),
            timeout: Duration::from_secs(30),
            backoff: Duration::from_secs(2),
        }
    }
}

impl RoadSource for OverpassClient {
    async fn fetch_ways(&self, query: &str) -> Result<OverpassResponse, AnalysisError> {
        fetch_with_failover(&self.endpoints, self.backoff, |url| async move {
            let bytes = abstio::post_text(&url, query.to_string(), self.timeout).await?;
            parse_response(&bytes)
        })
        .await
    }
}

/// Runs `attempt` against each endpoint in order until one succeeds, sleeping for `backoff`
/// between failures. Only fails once every endpoint has, keeping every failure.
pub async fn fetch_with_failover<T, F, Fut>(
    endpoints: &[String],
    backoff: Duration,
    mut attempt: F,
) -> Result<T, AnalysisError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if endpoints.is_empty() {
        return Err(AnalysisError::input("No road data endpoints configured"));
    }

    let mut failures = Vec::new();
    for (idx, url) in endpoints.iter().enumerate() {
        info!("Fetching roads from {}", url);
        match attempt(url.clone()).await {
            Ok(result) => {
                if !failures.is_empty() {
                    info!("{} worked after {} failures", url, failures.len());
                }
                return Ok(result);
            }
            Err(err) => {
                let message = format!("{:#}", err);
                warn!("{} failed: {}", url, message);
                failures.push(EndpointFailure {
                    endpoint: url.clone(),
                    message,
                });
                if idx != endpoints.len() - 1 && !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
    Err(AnalysisError::UpstreamFetch { attempts: failures })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use geom::LonLat;

    use super::*;

    fn endpoints(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://endpoint{}", i)).collect()
    }

    #[test]
    fn query_uses_south_west_north_east() {
        let bounds = GPSBounds::from(&[LonLat::new(-0.001, -0.002), LonLat::new(0.003, 0.004)]);
        let query = build_query(&bounds);
        assert!(query.starts_with("[out:json][timeout:60][maxsize:1073741824];\n"));
        assert!(query.contains("way[\"highway\"](-0.002,-0.001,0.004,0.003);"));
        assert!(query.contains("way[\"aeroway\"~\"^(runway|taxiway)$\"](-0.002,-0.001,0.004,0.003);"));
        assert!(query.contains("way[\"railway\"~\"^(rail|light_rail|subway|tram)$\"]"));
        assert!(query.contains("way[\"waterway\"~\"^(river|stream|canal)$\"]"));
        assert!(query.ends_with("out geom;\n"));
    }

    #[tokio::test]
    async fn falls_back_in_order() {
        let tried = RefCell::new(Vec::new());
        let result = fetch_with_failover(&endpoints(3), Duration::ZERO, |url| {
            tried.borrow_mut().push(url.clone());
            async move {
                if url.ends_with('2') {
                    Ok(42)
                } else {
                    Err(anyhow::anyhow!("HTTP status 429 Too Many Requests"))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(tried.into_inner(), endpoints(3));
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let tried = RefCell::new(0);
        let result = fetch_with_failover(&endpoints(3), Duration::ZERO, |_| {
            *tried.borrow_mut() += 1;
            async { Ok("ok") }
        })
        .await
        .unwrap();
        assert_eq!(result, "ok");
        assert_eq!(tried.into_inner(), 1);
    }

    #[tokio::test]
    async fn all_fail() {
        let err = fetch_with_failover::<(), _, _>(&endpoints(2), Duration::ZERO, |url| async move {
            Err(anyhow::anyhow!("operation timed out talking to {}", url))
        })
        .await
        .unwrap_err();
        match &err {
            AnalysisError::UpstreamFetch { attempts } => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].endpoint, "https://endpoint0");
            }
            _ => panic!("wrong error {}", err),
        }
        assert_eq!(
            err.last_failure().unwrap().message,
            "operation timed out talking to https://endpoint1"
        );
        assert_eq!(err.category(), crate::ErrorCategory::Timeout);
    }

    #[tokio::test]
    async fn no_endpoints() {
        let err = fetch_with_failover::<(), _, _>(&[], Duration::ZERO, |_| async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Input(_)));
    }
}
