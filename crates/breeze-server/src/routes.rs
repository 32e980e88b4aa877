//! API routes: weather data, cache introspection, and health check.

use std::convert::Infallible;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use warp::http::StatusCode;
use warp::Filter;

use breeze_weather::cache::CACHE_KEY;
use breeze_weather::{Aggregator, CacheStatus, CityWeatherRecord};

const SERVICE_NAME: &str = "Breezeboard Weather Analytics API";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

// ── Response bodies ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WeatherEnvelope {
    #[serde(rename = "cacheStatus")]
    cache_status: CacheStatus,
    data: Vec<CityWeatherRecord>,
    timestamp: DateTime<Utc>,
    count: usize,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct CacheDebugBody {
    #[serde(rename = "cacheStatus")]
    cache_status: CacheCounters,
    #[serde(rename = "weatherCache")]
    weather_cache: WeatherCacheInfo,
}

#[derive(Debug, Serialize)]
struct CacheCounters {
    keys: Vec<&'static str>,
    hits: u64,
    misses: u64,
    keysize: usize,
}

#[derive(Debug, Serialize)]
struct WeatherCacheInfo {
    #[serde(rename = "hasData")]
    has_data: bool,
    #[serde(rename = "itemCount")]
    item_count: usize,
    #[serde(rename = "ttlRemainingSecs")]
    ttl_remaining_secs: Option<u64>,
    #[serde(rename = "sampleCity")]
    sample_city: Option<SampleCity>,
}

#[derive(Debug, Serialize)]
struct SampleCity {
    name: String,
    score: u8,
    #[serde(rename = "trendLength")]
    trend_length: usize,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

// ── Filters ───────────────────────────────────────────────────────────

/// All API routes combined.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    weather_route(state.clone())
        .or(cache_debug_route(state))
        .or(health_route())
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn weather_route(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "weather"))
        .and(with_state(state))
        .and_then(handle_weather)
}

fn cache_debug_route(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "cache-debug"))
        .and(with_state(state))
        .and_then(handle_cache_debug)
}

fn health_route() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "health"))
        .and_then(handle_health)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn handle_weather(state: AppState) -> Result<impl warp::Reply, Infallible> {
    match state.aggregator.get_or_refresh().await {
        Ok((result, cache_status)) => {
            let count = result.count();
            let body = WeatherEnvelope {
                cache_status,
                data: result.records,
                timestamp: Utc::now(),
                count,
                message: format!("Processed {} cities", count),
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&body),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            error!("Fetch error: {}", e);
            let body = ErrorBody {
                error: "Failed to fetch weather data".to_string(),
                message: e.user_message(),
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&body),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_cache_debug(state: AppState) -> Result<impl warp::Reply, Infallible> {
    let cache = state.aggregator.cache();
    let stats = cache.stats();
    let cached = cache.peek();

    let body = CacheDebugBody {
        cache_status: CacheCounters {
            keys: if stats.present { vec![CACHE_KEY] } else { vec![] },
            hits: stats.hits,
            misses: stats.misses,
            keysize: usize::from(stats.present),
        },
        weather_cache: WeatherCacheInfo {
            has_data: cached.is_some(),
            item_count: cached.as_ref().map(|r| r.count()).unwrap_or(0),
            ttl_remaining_secs: cache.remaining_ttl().map(|d| d.as_secs()),
            sample_city: cached.as_ref().and_then(|r| r.records.first()).map(|r| {
                SampleCity {
                    name: r.name.clone(),
                    score: r.comfort_score,
                    trend_length: r.temperature_trend.len(),
                }
            }),
        },
    };

    Ok(warp::reply::json(&body))
}

async fn handle_health() -> Result<impl warp::Reply, Infallible> {
    let body = HealthBody {
        status: "OK",
        service: SERVICE_NAME,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "/api/weather - Main weather data with comfort scores",
            "/api/cache-debug - Cache status information",
            "/api/health - Service health check",
        ],
    };
    Ok(warp::reply::json(&body))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use breeze_weather::{ResultCache, WeatherClient};

    fn write_cities(codes: &[String]) -> tempfile::NamedTempFile {
        let list: Vec<serde_json::Value> = codes
            .iter()
            .map(|c| serde_json::json!({"CityCode": c}))
            .collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            serde_json::to_string(&serde_json::json!({"List": list}))
                .unwrap()
                .as_bytes(),
        )
        .unwrap();
        file
    }

    async fn mock_city(server: &MockServer, code: &str) {
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("id", code))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": format!("Mock {}", code),
                "weather": [{"description": "clear sky"}],
                "main": {"temp": 22.0, "feels_like": 22.0, "humidity": 45, "pressure": 1012},
                "visibility": 10000,
                "wind": {"speed": 2.0, "deg": 90},
                "clouds": {"all": 5}
            })))
            .mount(server)
            .await;
    }

    fn state(server_uri: &str, cities_path: PathBuf) -> AppState {
        let aggregator = Aggregator::new(
            WeatherClient::new(server_uri, "test_key").unwrap(),
            Arc::new(ResultCache::new()),
            cities_path,
            10,
            Duration::from_secs(10),
        );
        AppState {
            aggregator: Arc::new(aggregator),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let upstream = MockServer::start().await;
        let cities = write_cities(&[]);
        let filter = routes(state(&upstream.uri(), cities.path().to_path_buf()));

        let response = warp::test::request()
            .method("GET")
            .path("/api/health")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_weather_endpoint_miss_then_hit() {
        let upstream = MockServer::start().await;
        let codes: Vec<String> = (0..10).map(|i| format!("80{:03}", i)).collect();
        for code in &codes {
            mock_city(&upstream, code).await;
        }
        let cities = write_cities(&codes);
        let filter = routes(state(&upstream.uri(), cities.path().to_path_buf()));

        let first = warp::test::request()
            .method("GET")
            .path("/api/weather")
            .reply(&filter)
            .await;
        assert_eq!(first.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(first.body()).unwrap();
        assert_eq!(body["cacheStatus"], "MISS");
        assert_eq!(body["count"], 10);
        assert_eq!(body["message"], "Processed 10 cities");
        assert_eq!(body["data"].as_array().unwrap().len(), 10);

        let second = warp::test::request()
            .method("GET")
            .path("/api/weather")
            .reply(&filter)
            .await;
        let body: serde_json::Value = serde_json::from_slice(second.body()).unwrap();
        assert_eq!(body["cacheStatus"], "HIT");
    }

    #[tokio::test]
    async fn test_weather_endpoint_insufficient_cities_is_500() {
        let upstream = MockServer::start().await;
        let codes: Vec<String> = (0..5).map(|i| format!("81{:03}", i)).collect();
        let cities = write_cities(&codes);
        let filter = routes(state(&upstream.uri(), cities.path().to_path_buf()));

        let response = warp::test::request()
            .method("GET")
            .path("/api/weather")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), 500);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "Failed to fetch weather data");
        assert!(body["message"].as_str().unwrap().contains('5'));
    }

    #[tokio::test]
    async fn test_cache_debug_reflects_cached_data() {
        let upstream = MockServer::start().await;
        let codes: Vec<String> = (0..10).map(|i| format!("82{:03}", i)).collect();
        for code in &codes {
            mock_city(&upstream, code).await;
        }
        let cities = write_cities(&codes);
        let filter = routes(state(&upstream.uri(), cities.path().to_path_buf()));

        // Empty cache first.
        let before = warp::test::request()
            .method("GET")
            .path("/api/cache-debug")
            .reply(&filter)
            .await;
        let body: serde_json::Value = serde_json::from_slice(before.body()).unwrap();
        assert_eq!(body["weatherCache"]["hasData"], false);
        assert!(body["cacheStatus"]["keys"].as_array().unwrap().is_empty());

        warp::test::request()
            .method("GET")
            .path("/api/weather")
            .reply(&filter)
            .await;

        let after = warp::test::request()
            .method("GET")
            .path("/api/cache-debug")
            .reply(&filter)
            .await;
        let body: serde_json::Value = serde_json::from_slice(after.body()).unwrap();
        assert_eq!(body["weatherCache"]["hasData"], true);
        assert_eq!(body["weatherCache"]["itemCount"], 10);
        assert_eq!(body["cacheStatus"]["keys"][0], "weather_results");
        assert_eq!(body["weatherCache"]["sampleCity"]["trendLength"], 7);
        assert!(body["weatherCache"]["ttlRemainingSecs"].as_u64().unwrap() <= 300);
    }
}
