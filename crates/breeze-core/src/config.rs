use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream weather source settings
    #[serde(default)]
    pub weather: WeatherSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on (overridable via BREEZE_PORT)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    /// OpenWeatherMap API key (can be set via OPENWEATHER_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the weather API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path to the static city list file
    #[serde(default = "default_cities_path")]
    pub cities_path: String,

    /// Per-city fetch timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Minimum number of successfully fetched cities required
    #[serde(default = "default_min_cities")]
    pub min_cities: usize,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_cities_path() -> String {
    "cities.json".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_min_cities() -> usize {
    10
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENWEATHER_API_KEY").ok(),
            base_url: default_base_url(),
            cities_path: default_cities_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            min_cities: default_min_cities(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            weather: WeatherSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the given path, creating a default file if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config.with_env_overrides());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", path.display(), e)))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config.with_env_overrides())
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Apply environment variable overrides
    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
            if !key.trim().is_empty() {
                self.weather.api_key = Some(key);
            }
        }
        if let Some(port) = std::env::var("BREEZE_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        self
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.cities_path.trim().is_empty() {
            result.add_error("weather.cities_path", "City list path cannot be empty");
        } else {
            let cities = PathBuf::from(&self.weather.cities_path);
            if !cities.exists() {
                result.add_warning(
                    "weather.cities_path",
                    format!("City list file does not exist: {}", cities.display()),
                );
            }
        }

        match self.weather.api_key.as_deref() {
            None => result.add_warning(
                "weather.api_key",
                "No API key configured - set OPENWEATHER_API_KEY or weather.api_key",
            ),
            Some(key) if key.trim().is_empty() => {
                result.add_error("weather.api_key", "API key is empty")
            }
            Some(_) => {}
        }

        if self.weather.fetch_timeout_secs == 0 {
            result.add_warning(
                "weather.fetch_timeout_secs",
                "Fetch timeout of 0 disables the per-city timeout guard",
            );
        }

        if self.weather.min_cities == 0 {
            result.add_warning(
                "weather.min_cities",
                "Minimum city threshold of 0 accepts empty result sets",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Default path of the configuration file
    pub fn default_path() -> PathBuf {
        PathBuf::from("breezeboard.toml")
    }
}
