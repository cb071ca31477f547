//! Geoapify Places v2 API client.

use std::time::Duration;

use async_trait::async_trait;
use roam_weather::Coordinate;
use tracing::instrument;

use crate::error::PlacesError;
use crate::types::{FeatureCollection, Place, PlaceCategory};

pub const DEFAULT_BASE_URL: &str = "https://api.geoapify.com";
pub const DEFAULT_LIMIT: u32 = 10;

/// Single-shot nearby-place search.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
        category: &PlaceCategory,
    ) -> Result<Vec<Place>, PlacesError>;
}

pub struct PlacesClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limit: u32,
}

impl PlacesClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, PlacesError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            limit: DEFAULT_LIMIT,
        })
    }

    /// Cap on results per request.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn url(&self, center: Coordinate, radius_meters: f64, category: &PlaceCategory) -> String {
        format!(
            "{}/v2/places?categories={}&filter=circle:{},{},{}&bias=proximity:{},{}&limit={}&apiKey={}",
            self.base_url,
            urlencoding::encode(category.tag()),
            center.longitude,
            center.latitude,
            radius_meters,
            center.longitude,
            center.latitude,
            self.limit,
            urlencoding::encode(&self.api_key),
        )
    }

    /// Helper to handle API responses and errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<FeatureCollection, PlacesError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| PlacesError::Parse(e.to_string()))
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(PlacesError::InvalidApiKey)
        } else if status.as_u16() == 429 {
            Err(PlacesError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(PlacesError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl PlaceLookup for PlacesClient {
    #[instrument(skip(self), level = "info")]
    async fn nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
        category: &PlaceCategory,
    ) -> Result<Vec<Place>, PlacesError> {
        let url = self.url(center, radius_meters, category);
        let response = self.client.get(&url).send().await?;
        let collection = self.handle_response(response).await?;

        let places: Vec<Place> = collection
            .features
            .into_iter()
            .filter_map(|f| f.into_place())
            .collect();

        tracing::debug!("Found {} {} places", places.len(), category.tag());
        Ok(places)
    }
}
