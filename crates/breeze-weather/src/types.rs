use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an aggregated result was served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// One city's current conditions with derived fields.
///
/// Serialized field names follow the dashboard wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeatherRecord {
    /// External city identifier from the static city list
    pub id: String,

    /// Display name; "City <id>" when the source omits it
    pub name: String,

    /// Free-text condition summary
    pub description: String,

    /// Current temperature in °C, rounded to 1 decimal
    #[serde(rename = "temp")]
    pub temperature: f64,

    /// Apparent temperature in °C, rounded to 1 decimal
    pub feels_like: f64,

    /// Relative humidity percent
    pub humidity: u8,

    /// Pressure as supplied by the source (hPa)
    pub pressure: u32,

    /// Visibility in meters; 10000 when the source omits it
    pub visibility: u32,

    #[serde(rename = "windSpeed")]
    pub wind_speed: f64,

    #[serde(rename = "windDeg")]
    pub wind_direction: f64,

    #[serde(rename = "clouds")]
    pub cloud_cover: u8,

    /// Derived comfort score in [0, 100]
    #[serde(rename = "score")]
    pub comfort_score: u8,

    /// Derived 7-day synthetic temperature sequence
    #[serde(rename = "trend")]
    pub temperature_trend: Vec<f64>,
}

/// The cached payload: records ranked by comfort score, descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub records: Vec<CityWeatherRecord>,
    pub generated_at: DateTime<Utc>,
}

impl AggregatedResult {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Cumulative cache counters since process start.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub present: bool,
}
