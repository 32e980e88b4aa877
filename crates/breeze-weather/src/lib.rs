//! Weather aggregation for Breezeboard.
//!
//! Fetches current conditions for a fixed set of cities from
//! OpenWeatherMap, derives a comfort score and a synthetic temperature
//! trend per city, and caches the ranked result set.

pub mod cache;
pub mod cities;
pub mod client;
pub mod error;
pub mod orchestrator;
pub mod score;
pub mod trend;
pub mod types;

pub use cache::{Clock, ResultCache, SystemClock, CACHE_TTL};
pub use cities::load_city_list;
pub use client::WeatherClient;
pub use error::{FetchError, WeatherError};
pub use orchestrator::Aggregator;
pub use score::comfort_score;
pub use trend::temperature_trend;
pub use types::{AggregatedResult, CacheStats, CacheStatus, CityWeatherRecord};
