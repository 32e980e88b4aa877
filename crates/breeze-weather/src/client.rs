//! OpenWeatherMap current-conditions client.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "breezeboard/0.1 (weather comfort dashboard)";

/// HTTP client for the upstream weather source, scoped to single-city
/// current-conditions lookups.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

// ── Upstream response types ───────────────────────────────────────────

/// Per-city payload from `/data/2.5/weather`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub name: Option<String>,
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
    pub main: MainReadings,
    pub visibility: Option<u32>,
    pub wind: Option<WindReadings>,
    pub clouds: Option<CloudReadings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionSummary {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindReadings {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudReadings {
    pub all: Option<u8>,
}

// ── Implementation ────────────────────────────────────────────────────

impl WeatherClient {
    /// Build a client with connection pooling and a request timeout.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch current conditions for a single city id.
    pub async fn current_weather(&self, city_id: &str) -> Result<CurrentConditions, FetchError> {
        let url = format!(
            "{}/data/2.5/weather?id={}&units=metric&appid={}",
            self.base_url, city_id, self.api_key
        );

        debug!("Fetching current weather for city {}", city_id);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(FetchError::InvalidApiKey);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                city_id: city_id.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| FetchError::Malformed {
            city_id: city_id.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> serde_json::Value {
        serde_json::json!({
            "name": "Colombo",
            "weather": [{"description": "scattered clouds"}],
            "main": {"temp": 29.42, "feels_like": 33.08, "humidity": 70, "pressure": 1011},
            "visibility": 10000,
            "wind": {"speed": 4.12, "deg": 240},
            "clouds": {"all": 40}
        })
    }

    #[tokio::test]
    async fn test_current_weather_parses_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("id", "1248991"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .mount(&mock_server)
            .await;

        let client = WeatherClient::new(&mock_server.uri(), "test_key").unwrap();
        let conditions = client.current_weather("1248991").await.unwrap();

        assert_eq!(conditions.name.as_deref(), Some("Colombo"));
        assert_eq!(conditions.main.humidity, 70);
        assert_eq!(conditions.visibility, Some(10000));
        assert_eq!(conditions.wind.unwrap().deg, Some(240.0));
    }

    #[tokio::test]
    async fn test_missing_optional_fields_deserialize() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": {"temp": 12.0, "feels_like": 10.5, "humidity": 55, "pressure": 1020}
            })))
            .mount(&mock_server)
            .await;

        let client = WeatherClient::new(&mock_server.uri(), "test_key").unwrap();
        let conditions = client.current_weather("123").await.unwrap();

        assert!(conditions.name.is_none());
        assert!(conditions.weather.is_empty());
        assert!(conditions.visibility.is_none());
        assert!(conditions.wind.is_none());
    }

    #[tokio::test]
    async fn test_invalid_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = WeatherClient::new(&mock_server.uri(), "bad_key").unwrap();
        let result = client.current_weather("123").await;

        assert!(matches!(result, Err(FetchError::InvalidApiKey)));
    }

    #[tokio::test]
    async fn test_not_found_maps_to_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = WeatherClient::new(&mock_server.uri(), "test_key").unwrap();
        let result = client.current_weather("999").await;

        match result {
            Err(FetchError::Status { city_id, status }) => {
                assert_eq!(city_id, "999");
                assert_eq!(status, 404);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = WeatherClient::new(&mock_server.uri(), "test_key").unwrap();
        let result = client.current_weather("123").await;

        assert!(matches!(result, Err(FetchError::Malformed { .. })));
    }
}
