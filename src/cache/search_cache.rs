//! Search result cache over a key-value store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{City, SearchResult};
use crate::error::SearchError;
use crate::store::{KeyValueStore, StoreError};

/// Prefix of every cache key, keeping queries apart from reserved keys
pub const CACHE_KEY_PREFIX: &str = "query:";

/// Returns the store key for `query`
///
/// The query is used exactly as given; "Paris" and "paris " are distinct.
pub fn cache_key(query: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, query)
}

/// A cached search result as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The query this result answers
    pub query: String,
    /// The cities returned for the query
    pub cities: SearchResult,
    /// When the result was cached
    pub cached_at: DateTime<Utc>,
}

/// Read-through cache mapping a query to its non-empty search result
#[derive(Debug, Clone)]
pub struct SearchCache<S> {
    store: S,
}

impl<S: KeyValueStore> SearchCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Looks up the cached result for `query`
    ///
    /// # Returns
    /// * `Ok(Some(cities))` - A non-empty result is cached for the query
    /// * `Ok(None)` - Nothing usable is cached (missing, empty, or undecodable)
    /// * `Err(SearchError::CacheUnavailable)` - The store could not be read
    pub async fn lookup(&self, query: &str) -> Result<Option<SearchResult>, SearchError> {
        Ok(self.lookup_entry(query).await?.map(|entry| entry.cities))
    }

    /// Like `lookup`, but returns the whole entry including its timestamp
    pub async fn lookup_entry(&self, query: &str) -> Result<Option<CacheEntry>, SearchError> {
        let key = cache_key(query);
        let Some(content) = self
            .store
            .get(&key)
            .await
            .map_err(SearchError::CacheUnavailable)?
        else {
            debug!(query, "cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) if !entry.cities.is_empty() => {
                debug!(query, cities = entry.cities.len(), "cache hit");
                Ok(Some(entry))
            }
            Ok(_) => {
                debug!(query, "cached result is empty, treating as miss");
                Ok(None)
            }
            Err(err) => {
                warn!(query, error = %err, "ignoring undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Caches `cities` under `query`
    ///
    /// An empty result is never cached and leaves any existing entry alone.
    ///
    /// # Returns
    /// * `Ok(true)` - The result was written
    /// * `Ok(false)` - The result was empty and nothing was written
    /// * `Err(SearchError::PersistFailed)` - The store rejected the write
    pub async fn store(&self, query: &str, cities: &[City]) -> Result<bool, SearchError> {
        if cities.is_empty() {
            return Ok(false);
        }

        let key = cache_key(query);
        let entry = CacheEntry {
            query: query.to_string(),
            cities: cities.to_vec(),
            cached_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry).map_err(|err| SearchError::PersistFailed {
            key: key.clone(),
            source: StoreError::Encode(err),
        })?;

        self.store
            .set(&key, &json)
            .await
            .map_err(|source| SearchError::PersistFailed { key, source })?;

        debug!(query, cities = cities.len(), "cached search result");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn paris() -> Vec<City> {
        vec![City::new(2988507, "Paris"), City::new(4717560, "Paris")]
    }

    #[test]
    fn test_cache_key_uses_query_verbatim() {
        assert_eq!(cache_key("Paris"), "query:Paris");
        assert_eq!(cache_key(" paris "), "query: paris ");
    }

    #[tokio::test]
    async fn test_lookup_returns_none_for_unknown_query() {
        let cache = SearchCache::new(MemoryStore::new());

        assert!(cache.lookup("Paris").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_then_lookup_returns_cities_verbatim() {
        let cache = SearchCache::new(MemoryStore::new());

        let written = cache.store("Paris", &paris()).await.unwrap();

        assert!(written);
        assert_eq!(cache.lookup("Paris").await.unwrap(), Some(paris()));
    }

    #[tokio::test]
    async fn test_store_empty_result_is_noop() {
        let store = MemoryStore::new();
        let cache = SearchCache::new(store.clone());

        let written = cache.store("Atlantis", &[]).await.unwrap();

        assert!(!written);
        assert!(store.is_empty());
        assert!(cache.lookup("Atlantis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_empty_result_keeps_previous_entry() {
        let cache = SearchCache::new(MemoryStore::new());
        cache.store("Paris", &paris()).await.unwrap();

        cache.store("Paris", &[]).await.unwrap();

        assert_eq!(cache.lookup("Paris").await.unwrap(), Some(paris()));
    }

    #[tokio::test]
    async fn test_store_non_empty_result_overwrites() {
        let cache = SearchCache::new(MemoryStore::new());
        cache.store("Paris", &paris()).await.unwrap();

        let replacement = vec![City::new(1, "Paris")];
        cache.store("Paris", &replacement).await.unwrap();

        assert_eq!(cache.lookup("Paris").await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_lookup_entry_records_timestamp() {
        let cache = SearchCache::new(MemoryStore::new());

        let before = Utc::now();
        cache.store("Paris", &paris()).await.unwrap();
        let after = Utc::now();

        let entry = cache.lookup_entry("Paris").await.unwrap().expect("Should be cached");
        assert_eq!(entry.query, "Paris");
        assert!(entry.cached_at >= before);
        assert!(entry.cached_at <= after);
    }

    #[tokio::test]
    async fn test_lookup_treats_stored_empty_result_as_miss() {
        let store = MemoryStore::new();
        store.insert(
            cache_key("Paris"),
            r#"{"query":"Paris","cities":[],"cached_at":"2024-07-15T14:00:00Z"}"#,
        );
        let cache = SearchCache::new(store);

        assert!(cache.lookup("Paris").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_treats_undecodable_entry_as_miss() {
        let store = MemoryStore::new();
        store.insert(cache_key("Paris"), "not json");
        let cache = SearchCache::new(store);

        assert!(cache.lookup("Paris").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_reports_cache_unavailable() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);
        let cache = SearchCache::new(store);

        let result = cache.lookup("Paris").await;

        assert!(matches!(result, Err(SearchError::CacheUnavailable(_))));
    }

    #[tokio::test]
    async fn test_store_reports_persist_failed() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let cache = SearchCache::new(store);

        let result = cache.store("Paris", &paris()).await;

        match result {
            Err(SearchError::PersistFailed { key, .. }) => assert_eq!(key, "query:Paris"),
            other => panic!("Expected PersistFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_survives_across_file_store_instances() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        SearchCache::new(FileStore::new(temp_dir.path()))
            .store("Paris", &paris())
            .await
            .unwrap();

        let reopened = SearchCache::new(FileStore::new(temp_dir.path()));

        assert_eq!(reopened.lookup("Paris").await.unwrap(), Some(paris()));
    }
}
