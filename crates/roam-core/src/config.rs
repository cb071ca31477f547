use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable consulted when `weather.api_key` is empty.
pub const WEATHER_API_KEY_ENV: &str = "ROAM_WEATHER_API_KEY";
/// Environment variable consulted when `places.api_key` is empty.
pub const PLACES_API_KEY_ENV: &str = "ROAM_PLACES_API_KEY";

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

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

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
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather lookup settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Nearby-place lookup settings
    #[serde(default)]
    pub places: PlacesConfig,

    /// Discovery view settings (debounce, fallback position, map span)
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Landmark catalogue source
    #[serde(default)]
    pub catalogue: CatalogueConfig,

    /// Favorites persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fixed position to publish at startup, if any
    #[serde(default)]
    pub location: LocationConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Geoapify API key
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_places_base_url")]
    pub base_url: String,

    /// Search radius around a landmark, in meters
    #[serde(default = "default_radius_meters")]
    pub radius_meters: f64,

    /// Maximum places returned per lookup
    #[serde(default = "default_places_limit")]
    pub limit: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_places_base_url() -> String {
    "https://api.geoapify.com".to_string()
}

fn default_radius_meters() -> f64 {
    1500.0
}

fn default_places_limit() -> u32 {
    10
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_places_base_url(),
            radius_meters: default_radius_meters(),
            limit: default_places_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Quiet window applied to search text and viewport changes
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Map center used when no device position is known
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,

    /// Initial map span in degrees
    #[serde(default = "default_span")]
    pub span_latitude: f64,
    #[serde(default = "default_span")]
    pub span_longitude: f64,

    /// Number of similar landmarks shown on a detail screen
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
}

fn default_debounce_ms() -> u64 {
    500
}

// San Francisco
fn default_fallback_latitude() -> f64 {
    37.7749
}

fn default_fallback_longitude() -> f64 {
    -122.4194
}

fn default_span() -> f64 {
    0.1
}

fn default_similar_limit() -> usize {
    5
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            span_latitude: default_span(),
            span_longitude: default_span(),
            similar_limit: default_similar_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueConfig {
    /// JSON landmark file; the bundled catalogue is used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding favorites; defaults to `<config_dir>/favorites.db`
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// Both coordinates, if configured.
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// Presentation preferences; the CLI picks its heading colors from these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub color_scheme: ColorScheme,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roam");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            places: PlacesConfig::default(),
            discovery: DiscoveryConfig::default(),
            catalogue: CatalogueConfig::default(),
            storage: StorageConfig::default(),
            location: LocationConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Fill empty API keys from the environment.
    fn apply_env(&mut self) {
        if self.weather.api_key.is_empty() {
            if let Ok(key) = std::env::var(WEATHER_API_KEY_ENV) {
                tracing::debug!("Using weather API key from {}", WEATHER_API_KEY_ENV);
                self.weather.api_key = key;
            }
        }
        if self.places.api_key.is_empty() {
            if let Ok(key) = std::env::var(PLACES_API_KEY_ENV) {
                tracing::debug!("Using places API key from {}", PLACES_API_KEY_ENV);
                self.places.api_key = key;
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.places.base_url, "places.base_url", &mut result);

        if self.weather.api_key.is_empty() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - weather will be unavailable",
            );
        }
        if self.places.api_key.is_empty() {
            result.add_warning(
                "places.api_key",
                "Places API key not configured - nearby places will be unavailable",
            );
        }

        if !(self.places.radius_meters.is_finite() && self.places.radius_meters > 0.0) {
            result.add_error("places.radius_meters", "Radius must be greater than 0");
        }
        if self.places.limit == 0 {
            result.add_error("places.limit", "Limit must be greater than 0");
        }

        if self.discovery.debounce_ms == 0 {
            result.add_warning(
                "discovery.debounce_ms",
                "Debounce disabled (0 ms) - every keystroke triggers work",
            );
        }

        if !(-90.0..=90.0).contains(&self.discovery.fallback_latitude) {
            result.add_error(
                "discovery.fallback_latitude",
                "Latitude must be within -90..=90",
            );
        }
        if !(-180.0..=180.0).contains(&self.discovery.fallback_longitude) {
            result.add_error(
                "discovery.fallback_longitude",
                "Longitude must be within -180..=180",
            );
        }

        for (field, span) in [
            ("discovery.span_latitude", self.discovery.span_latitude),
            ("discovery.span_longitude", self.discovery.span_longitude),
        ] {
            if !(span.is_finite() && span > 0.0) {
                result.add_error(field, "Span must be greater than 0");
            }
        }

        if let Some(path) = &self.catalogue.path {
            if !path.exists() {
                result.add_warning(
                    "catalogue.path",
                    format!(
                        "Path does not exist: {} (catalogue will be empty)",
                        path.display()
                    ),
                );
            }
        }

        if self.location.latitude.is_some() != self.location.longitude.is_some() {
            result.add_warning(
                "location",
                "Both latitude and longitude are needed for a fixed position",
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

    /// Path of the favorites database.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("favorites.db"))
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("roam");

        Ok(config_dir.join("config.toml"))
    }
}
