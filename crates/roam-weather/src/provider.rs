//! Current-conditions lookup against the OpenWeatherMap `data/2.5/weather` endpoint.

use crate::types::{Coordinate, Weather, WeatherError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Condition label used when the provider returns no descriptors.
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Single-shot weather lookup.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn current(&self, at: Coordinate) -> Result<Weather, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, at: Coordinate) -> String {
        format!(
            "{}/data/2.5/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url,
            at.latitude,
            at.longitude,
            urlencoding::encode(&self.api_key),
        )
    }
}

#[async_trait]
impl WeatherLookup for WeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn current(&self, at: Coordinate) -> Result<Weather, WeatherError> {
        let response = self.client.get(self.url(at)).send().await?;
        let status = response.status();

        if status.as_u16() == 401 {
            return Err(WeatherError::InvalidApiKey);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: OwmResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .map(|c| c.main)
            .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

        let weather = Weather {
            temperature: parsed.main.temp,
            condition,
            fetched_at: Utc::now(),
        };
        tracing::debug!(
            "Weather at {}, {}: {:.1}°C {}",
            at.latitude,
            at.longitude,
            weather.temperature,
            weather.condition
        );
        Ok(weather)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_contains_query_parameters() {
        let provider =
            WeatherProvider::new("k&y", "https://example.test/", Duration::from_secs(1)).unwrap();
        let url = provider.url(Coordinate::new(37.82, -122.48));
        assert_eq!(
            url,
            "https://example.test/data/2.5/weather?lat=37.82&lon=-122.48&appid=k%26y&units=metric"
        );
    }

    #[test]
    fn test_response_without_conditions_parses() {
        let parsed: OwmResponse = serde_json::from_str(r#"{"main":{"temp":12.5}}"#).unwrap();
        assert_eq!(parsed.main.temp, 12.5);
        assert!(parsed.weather.is_empty());
    }
}
