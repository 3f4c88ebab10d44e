//! Core data models for city search
//!
//! This module contains the city record returned by a lookup provider and the
//! recent-search entry kept in the ledger.

pub mod geocoding;

pub use geocoding::{CityLookup, GeocodingClient, GeocodingError};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unique identifier of a city as assigned by the lookup provider
pub type CityId = u64;

/// Ordered list of cities produced by a lookup for one query
pub type SearchResult = Vec<City>;

/// A city returned by a lookup provider
///
/// Only `id` is meaningful to the cache and the ledger; every other field is
/// carried through untouched for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier of the city
    pub id: CityId,
    /// Human-readable name of the city
    pub name: String,
    /// Latitude coordinate
    #[serde(default)]
    pub latitude: f64,
    /// Longitude coordinate
    #[serde(default)]
    pub longitude: f64,
    /// Country name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// First-level administrative area (state, region), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    /// IANA timezone name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Population, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl City {
    /// Creates a city with only an identifier and a name
    pub fn new(id: CityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            latitude: 0.0,
            longitude: 0.0,
            country: None,
            country_code: None,
            admin1: None,
            timezone: None,
            population: None,
        }
    }

    /// Name qualified with region and country, e.g. "Paris, Île-de-France, France"
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(admin1) = self.admin1.as_deref() {
            if admin1 != self.name {
                parts.push(admin1);
            }
        }
        if let Some(country) = self.country.as_deref() {
            parts.push(country);
        }
        parts.join(", ")
    }
}

/// One historical search: the query and the cities it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    /// The query as the user entered it
    pub query: String,
    /// Cities attributed to this search
    pub cities: SearchResult,
}

impl RecentSearch {
    pub fn new(query: impl Into<String>, cities: SearchResult) -> Self {
        Self {
            query: query.into(),
            cities,
        }
    }

    /// Returns true if any city in this search has an id in `ids`
    pub fn shares_city_with(&self, ids: &HashSet<CityId>) -> bool {
        self.cities.iter().any(|city| ids.contains(&city.id))
    }
}

/// Collects the identifiers of a list of cities
pub fn city_ids(cities: &[City]) -> HashSet<CityId> {
    cities.iter().map(|city| city.id).collect()
}
