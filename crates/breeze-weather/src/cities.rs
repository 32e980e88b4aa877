//! Static city list loader.
//!
//! The list ships as a JSON file of the shape
//! `{"List": [{"CityCode": "1248991", "CityName": "Colombo"}]}` and is
//! re-read on every refresh cycle.

use serde::Deserialize;
use std::path::Path;

use crate::error::WeatherError;

/// One entry from the static city list.
#[derive(Debug, Clone, Deserialize)]
pub struct CityEntry {
    #[serde(rename = "CityCode")]
    pub code: String,

    #[serde(rename = "CityName")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CityListFile {
    #[serde(rename = "List")]
    list: Vec<CityEntry>,
}

/// Load the city list, failing on a missing, unreadable, or empty file.
pub fn load_city_list(path: &Path) -> Result<Vec<CityEntry>, WeatherError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        WeatherError::CityList(format!("failed to read {}: {}", path.display(), e))
    })?;

    let file: CityListFile = serde_json::from_str(&contents).map_err(|e| {
        WeatherError::CityList(format!("failed to parse {}: {}", path.display(), e))
    })?;

    if file.list.is_empty() {
        return Err(WeatherError::CityList(format!(
            "{} contains no cities",
            path.display()
        )));
    }

    Ok(file.list)
}
