//! Aggregation orchestrator: fan-out fetch, scoring, and cache
//! population.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::cities::{load_city_list, CityEntry};
use crate::client::{CurrentConditions, WeatherClient};
use crate::error::{FetchError, WeatherError};
use crate::score::comfort_score;
use crate::trend::{round_one_decimal, temperature_trend};
use crate::types::{AggregatedResult, CacheStatus, CityWeatherRecord};

/// Visibility assumed when the upstream payload omits the field, in
/// meters. Also the point where the visibility sub-score saturates.
const DEFAULT_VISIBILITY_M: u32 = 10_000;

/// Fans out per-city fetches, derives scores and trends, and keeps the
/// ranked result set in the cache.
pub struct Aggregator {
    client: WeatherClient,
    cache: Arc<ResultCache>,
    cities_path: PathBuf,
    min_cities: usize,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        client: WeatherClient,
        cache: Arc<ResultCache>,
        cities_path: PathBuf,
        min_cities: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            cities_path,
            min_cities,
            fetch_timeout,
        }
    }

    /// Build an aggregator from validated configuration.
    ///
    /// Fails when no API key is configured or the HTTP client cannot
    /// be constructed.
    pub fn from_settings(
        settings: &breeze_core::WeatherSettings,
        cache: Arc<ResultCache>,
    ) -> Result<Self, WeatherError> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(WeatherError::MissingApiKey)?;

        let client = WeatherClient::new(&settings.base_url, api_key)
            .map_err(|e| WeatherError::Init(e.to_string()))?;

        Ok(Self::new(
            client,
            cache,
            PathBuf::from(&settings.cities_path),
            settings.min_cities,
            Duration::from_secs(settings.fetch_timeout_secs),
        ))
    }

    /// The cache this aggregator populates.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Serve from cache, refreshing on a miss.
    ///
    /// Concurrent misses may each trigger a refresh; the last write
    /// wins and both callers get a consistent result.
    pub async fn get_or_refresh(&self) -> Result<(AggregatedResult, CacheStatus), WeatherError> {
        if let Some(cached) = self.cache.get() {
            info!("Serving {} cities from cache", cached.count());
            return Ok((cached, CacheStatus::Hit));
        }

        info!("Cache miss - fetching fresh weather data");
        let fresh = self.refresh().await?;
        Ok((fresh, CacheStatus::Miss))
    }

    /// Fetch all cities, assemble the ranked result set, and cache it.
    ///
    /// Per-city failures are logged and excluded; the refresh only
    /// fails when fewer than the minimum number of cities survive.
    /// Failed refreshes are never cached.
    pub async fn refresh(&self) -> Result<AggregatedResult, WeatherError> {
        let cities = load_city_list(&self.cities_path)?;

        if cities.len() < self.min_cities {
            return Err(WeatherError::InsufficientData {
                available: cities.len(),
                required: self.min_cities,
            });
        }

        info!("Fetching weather for {} cities", cities.len());

        // One task per city; failures are absorbed here so one bad
        // city never aborts the batch.
        let mut handles = Vec::with_capacity(cities.len());
        for city in cities {
            let client = self.client.clone();
            let fetch_timeout = self.fetch_timeout;
            let code = city.code.clone();
            let handle = tokio::spawn(async move {
                fetch_with_timeout(&client, &city, fetch_timeout)
                    .await
                    .map(|conditions| (city, conditions))
            });
            handles.push((code, handle));
        }

        // Join point: wait for every fetch to settle, in input order,
        // so ties later keep city-list order through the stable sort.
        let mut fetched = Vec::with_capacity(handles.len());
        for (code, handle) in handles {
            match handle.await {
                Ok(Some(pair)) => fetched.push(pair),
                Ok(None) => {}
                Err(e) => warn!("Fetch task for city {} failed to complete: {}", code, e),
            }
        }

        if fetched.len() < self.min_cities {
            return Err(WeatherError::InsufficientData {
                available: fetched.len(),
                required: self.min_cities,
            });
        }

        let mut records: Vec<CityWeatherRecord> = fetched
            .into_iter()
            .map(|(city, conditions)| build_record(&city, conditions))
            .collect();

        // Stable sort keeps fetch order for equal scores.
        records.sort_by(|a, b| b.comfort_score.cmp(&a.comfort_score));

        let result = AggregatedResult {
            records,
            generated_at: Utc::now(),
        };

        self.cache.set(result.clone());
        info!("Cached {} cities with trend data", result.count());

        Ok(result)
    }
}

async fn fetch_with_timeout(
    client: &WeatherClient,
    city: &CityEntry,
    fetch_timeout: Duration,
) -> Option<CurrentConditions> {
    let label = city.name.as_deref().unwrap_or(&city.code);
    let fetch = client.current_weather(&city.code);

    let outcome = if fetch_timeout.is_zero() {
        Ok(fetch.await)
    } else {
        tokio::time::timeout(fetch_timeout, fetch).await
    };

    let error = match outcome {
        Ok(Ok(conditions)) => return Some(conditions),
        Ok(Err(e)) => e,
        Err(_) => FetchError::TimedOut {
            city_id: city.code.clone(),
        },
    };

    warn!("Failed to fetch city {}: {}", label, error);
    None
}

fn build_record(city: &CityEntry, conditions: CurrentConditions) -> CityWeatherRecord {
    let name = conditions
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("City {}", city.code));

    let description = conditions
        .weather
        .first()
        .and_then(|w| w.description.clone())
        .unwrap_or_else(|| "Clear sky".to_string());

    let visibility = conditions.visibility.unwrap_or(DEFAULT_VISIBILITY_M);
    let wind = conditions.wind.unwrap_or_default();
    let cloud_cover = conditions.clouds.and_then(|c| c.all).unwrap_or(0);

    let temp = conditions.main.temp;
    let humidity = conditions.main.humidity;

    let score = comfort_score(temp, f64::from(humidity), f64::from(visibility));
    let trend = temperature_trend(temp, &name);

    CityWeatherRecord {
        id: city.code.clone(),
        name,
        description,
        temperature: round_one_decimal(temp),
        feels_like: round_one_decimal(conditions.main.feels_like),
        humidity,
        pressure: conditions.main.pressure,
        visibility,
        wind_speed: wind.speed.unwrap_or(0.0),
        wind_direction: wind.deg.unwrap_or(0.0),
        cloud_cover,
        comfort_score: score,
        temperature_trend: trend,
    }
}
