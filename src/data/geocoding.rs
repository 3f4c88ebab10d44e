//! Open-Meteo geocoding API client
//!
//! This module provides the `CityLookup` seam used by the search session and a
//! concrete provider that resolves a city name through the Open-Meteo
//! geocoding API.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{City, SearchResult};
use crate::config::Config;

/// Base URL for the Open-Meteo geocoding API
pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Default number of matches requested per query
pub const DEFAULT_RESULT_COUNT: u8 = 10;

/// Errors that can occur when resolving a city name
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// API answered with a non-success status
    #[error("Geocoding API returned status {status}: {reason}")]
    Status { status: u16, reason: String },
}

/// Resolves a city name to matching city records
///
/// Implemented by the HTTP provider and by test doubles.
pub trait CityLookup {
    /// Error reported when the lookup cannot be completed
    type Error: std::error::Error;

    /// Returns the cities matching `query`, best match first
    fn search_by_name(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchResult, Self::Error>>;
}

/// Client for resolving city names through the Open-Meteo geocoding API
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    count: u8,
    language: String,
}

impl Default for GeocodingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodingClient {
    /// Create a new GeocodingClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_METEO_GEOCODING_URL.to_string(),
            count: DEFAULT_RESULT_COUNT,
            language: "en".to_string(),
        }
    }

    /// Create a GeocodingClient from application configuration
    ///
    /// # Returns
    /// * `Ok(GeocodingClient)` - Client using the configured endpoint, count, language and timeout
    /// * `Err(GeocodingError)` - If the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .user_agent(concat!("citysearch/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.geocoding_url.clone(),
            count: config.result_count,
            language: config.language.clone(),
        })
    }

    /// Create a new GeocodingClient with a custom base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a new GeocodingClient requesting `count` matches per query
    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    /// Create a new GeocodingClient with a custom result language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Fetch the cities matching `name`
    ///
    /// # Returns
    /// * `Ok(SearchResult)` - Matching cities, empty if the API knows none
    /// * `Err(GeocodingError)` - If the request, the status, or parsing fails
    pub async fn fetch_cities(&self, name: &str) -> Result<SearchResult, GeocodingError> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let count = self.count.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GeocodingError::Status {
                status: status.as_u16(),
                reason: error_reason(&text),
            });
        }

        parse_response(&text)
    }
}

impl CityLookup for GeocodingClient {
    type Error = GeocodingError;

    async fn search_by_name(&self, query: &str) -> Result<SearchResult, GeocodingError> {
        self.fetch_cities(query).await
    }
}

/// Parse an Open-Meteo geocoding response body into cities
///
/// A body without a `results` array means no matches.
pub fn parse_response(body: &str) -> Result<SearchResult, GeocodingError> {
    let response: GeocodingResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(City::from)
        .collect())
}

/// Extracts the `reason` from an API error body, falling back to the raw body
fn error_reason(body: &str) -> String {
    serde_json::from_str::<GeocodingErrorBody>(body)
        .ok()
        .and_then(|err| err.reason)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Open-Meteo geocoding response structure
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingRecord>>,
}

/// A single match from the geocoding API
#[derive(Debug, Deserialize)]
struct GeocodingRecord {
    id: u64,
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
    timezone: Option<String>,
    population: Option<u64>,
}

/// Error body returned by the geocoding API
#[derive(Debug, Deserialize)]
struct GeocodingErrorBody {
    reason: Option<String>,
}

impl From<GeocodingRecord> for City {
    fn from(record: GeocodingRecord) -> Self {
        City {
            id: record.id,
            name: record.name,
            latitude: record.latitude,
            longitude: record.longitude,
            country: record.country,
            country_code: record.country_code,
            admin1: record.admin1,
            timezone: record.timezone,
            population: record.population,
        }
    }
}
