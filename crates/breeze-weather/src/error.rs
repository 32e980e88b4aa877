//! Weather aggregation error types.

use thiserror::Error;

/// Aggregate-level errors that fail the whole refresh.
///
/// These propagate to the request boundary; per-city failures are
/// absorbed at the fetch layer and never reach here.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Minimum {required} cities required, only {available} available")]
    InsufficientData { available: usize, required: usize },

    #[error("City list error: {0}")]
    CityList(String),

    #[error("Weather API key not configured")]
    MissingApiKey,

    #[error("Failed to initialize weather client: {0}")]
    Init(String),
}

impl WeatherError {
    /// User-friendly message for API responses.
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientData { available, required } => format!(
                "Failed to fetch minimum {} cities. Success: {}",
                required, available
            ),
            Self::CityList(msg) => format!("City list unavailable: {}", msg),
            Self::MissingApiKey => "Weather API key is not configured".to_string(),
            Self::Init(msg) => format!("Weather client unavailable: {}", msg),
        }
    }
}

/// Per-city fetch errors. Logged and absorbed; the affected city is
/// excluded from the result set.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("City {city_id}: upstream returned {status}")]
    Status { city_id: String, status: u16 },

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("City {city_id}: malformed payload: {reason}")]
    Malformed { city_id: String, reason: String },

    #[error("City {city_id}: fetch timed out")]
    TimedOut { city_id: String },
}
