//! Application configuration
//!
//! Defaults suit the Open-Meteo geocoding API and an XDG data directory;
//! environment variables override them and CLI flags override both.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use thiserror::Error;

use crate::data::geocoding::{DEFAULT_RESULT_COUNT, OPEN_METEO_GEOCODING_URL};
use crate::ledger::DEFAULT_CAPACITY;

/// Environment variable overriding the store directory
pub const ENV_STORE_DIR: &str = "CITYSEARCH_STORE_DIR";
/// Environment variable overriding the geocoding endpoint
pub const ENV_GEOCODING_URL: &str = "CITYSEARCH_GEOCODING_URL";
/// Environment variable overriding the number of matches per query
pub const ENV_RESULT_COUNT: &str = "CITYSEARCH_RESULT_COUNT";
/// Environment variable overriding the result language
pub const ENV_LANGUAGE: &str = "CITYSEARCH_LANGUAGE";

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Runtime configuration for a search session
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted cache entries and recent searches
    pub store_dir: PathBuf,
    /// Geocoding API endpoint
    pub geocoding_url: String,
    /// Matches requested per query
    pub result_count: u8,
    /// Language of returned city names
    pub language: String,
    /// Maximum number of recent searches kept
    pub recent_capacity: usize,
    /// Timeout for a single provider request
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            geocoding_url: OPEN_METEO_GEOCODING_URL.to_string(),
            result_count: DEFAULT_RESULT_COUNT,
            language: "en".to_string(),
            recent_capacity: DEFAULT_CAPACITY,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Builds a configuration from defaults overridden by process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from defaults overridden by `lookup`
    ///
    /// Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();

        if let Some(dir) = get(ENV_STORE_DIR) {
            config.store_dir = PathBuf::from(dir);
        }
        if let Some(url) = get(ENV_GEOCODING_URL) {
            config.geocoding_url = url;
        }
        if let Some(count) = get(ENV_RESULT_COUNT) {
            config.result_count = parse_count(ENV_RESULT_COUNT, &count)?;
        }
        if let Some(language) = get(ENV_LANGUAGE) {
            config.language = language;
        }

        Ok(config)
    }
}

/// Parses a result count, which the geocoding API accepts between 1 and 100
pub fn parse_count(name: &'static str, value: &str) -> Result<u8, ConfigError> {
    match value.trim().parse::<u8>() {
        Ok(count) if (1..=100).contains(&count) => Ok(count),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

/// XDG data directory (`~/.local/share/citysearch` on Linux), or `./.citysearch`
fn default_store_dir() -> PathBuf {
    ProjectDirs::from("", "", "citysearch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".citysearch"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.geocoding_url, OPEN_METEO_GEOCODING_URL);
        assert_eq!(config.result_count, 10);
        assert_eq!(config.language, "en");
        assert_eq!(config.recent_capacity, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_default_store_dir_mentions_project() {
        let config = Config::default();
        assert!(
            config.store_dir.to_string_lossy().contains("citysearch"),
            "Store path should contain project name"
        );
    }

    #[test]
    fn test_from_lookup_without_overrides_is_default() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.result_count, Config::default().result_count);
        assert_eq!(config.store_dir, Config::default().store_dir);
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_STORE_DIR, "/tmp/citysearch-test"),
            (ENV_GEOCODING_URL, "http://localhost:8080/v1/search"),
            (ENV_RESULT_COUNT, "25"),
            (ENV_LANGUAGE, "pt"),
        ]))
        .unwrap();

        assert_eq!(config.store_dir, PathBuf::from("/tmp/citysearch-test"));
        assert_eq!(config.geocoding_url, "http://localhost:8080/v1/search");
        assert_eq!(config.result_count, 25);
        assert_eq!(config.language, "pt");
    }

    #[test]
    fn test_from_lookup_ignores_empty_values() {
        let config = Config::from_lookup(lookup_from(&[(ENV_LANGUAGE, "  ")])).unwrap();
        assert_eq!(config.language, "en");
    }

    #[test]
    fn test_from_lookup_rejects_invalid_count() {
        let result = Config::from_lookup(lookup_from(&[(ENV_RESULT_COUNT, "many")]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains(ENV_RESULT_COUNT));
        assert!(err.to_string().contains("many"));
    }

    #[test]
    fn test_parse_count_bounds() {
        assert_eq!(parse_count(ENV_RESULT_COUNT, "1").unwrap(), 1);
        assert_eq!(parse_count(ENV_RESULT_COUNT, "100").unwrap(), 100);
        assert!(parse_count(ENV_RESULT_COUNT, "0").is_err());
        assert!(parse_count(ENV_RESULT_COUNT, "101").is_err());
    }
}
