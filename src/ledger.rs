//! Recent searches ledger
//!
//! Keeps the most recent searches, newest first, capped at a fixed capacity.
//! A city appears in at most one entry: recording a search evicts every older
//! entry that shares a city with it. The whole ledger is written back to the
//! store after each mutation; a failed write is logged and the in-memory
//! ledger stays authoritative for the session.

use tracing::{debug, warn};

use crate::data::{city_ids, City, CityId, RecentSearch, SearchResult};
use crate::error::SearchError;
use crate::store::{KeyValueStore, StoreError};

/// Number of recent searches kept by default
pub const DEFAULT_CAPACITY: usize = 5;

/// Store key holding the serialized ledger
pub const RECENT_SEARCHES_KEY: &str = "recent_searches";

/// Ordered, capped and deduplicated list of recent searches
#[derive(Debug, Clone)]
pub struct RecentSearchLedger<S> {
    entries: Vec<RecentSearch>,
    capacity: usize,
    store: S,
}

impl<S: KeyValueStore> RecentSearchLedger<S> {
    /// Creates an empty ledger with the default capacity
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    /// Creates an empty ledger holding at most `capacity` entries (at least one)
    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            store,
        }
    }

    /// Reads the persisted ledger from `store`
    ///
    /// Absent data yields an empty ledger.
    ///
    /// # Returns
    /// * `Ok(ledger)` - The persisted ledger, or an empty one on first run
    /// * `Err(SearchError::CacheUnavailable)` - The store could not be read
    /// * `Err(SearchError::MalformedPersistedData)` - The stored value is not a ledger
    pub async fn try_load(store: S, capacity: usize) -> Result<Self, SearchError> {
        let content = store
            .get(RECENT_SEARCHES_KEY)
            .await
            .map_err(SearchError::CacheUnavailable)?;

        let mut ledger = Self::with_capacity(store, capacity);
        if let Some(content) = content {
            ledger.replay(parse_persisted(&content)?);
        }
        Ok(ledger)
    }

    /// Reads the persisted ledger from `store`, falling back to an empty ledger
    ///
    /// First run, an unreadable store and corrupted data all look the same to
    /// the caller; the failure is only logged.
    pub async fn load(store: S, capacity: usize) -> Self
    where
        S: Clone,
    {
        match Self::try_load(store.clone(), capacity).await {
            Ok(ledger) => {
                debug!(entries = ledger.len(), "loaded recent searches");
                ledger
            }
            Err(err) => {
                warn!(error = %err, "starting with empty recent searches");
                Self::with_capacity(store, capacity)
            }
        }
    }

    /// Builds a ledger from an already-read persisted form
    ///
    /// `None` and malformed text both yield an empty ledger.
    pub fn from_persisted(store: S, capacity: usize, persisted: Option<&str>) -> Self {
        let mut ledger = Self::with_capacity(store, capacity);
        match persisted.map(parse_persisted) {
            Some(Ok(entries)) => ledger.replay(entries),
            Some(Err(err)) => warn!(error = %err, "ignoring malformed recent searches"),
            None => {}
        }
        ledger
    }

    /// Records a search and flushes the ledger
    ///
    /// Every existing entry sharing a city with `cities` is dropped, the new
    /// entry goes to the front, and the oldest entries beyond capacity fall off.
    pub async fn record(&mut self, query: impl Into<String>, cities: SearchResult) {
        let search = RecentSearch::new(query, cities);
        debug!(query = %search.query, cities = search.cities.len(), "recording search");
        self.insert(search);

        if let Err(err) = self.flush().await {
            warn!(error = %err, "recent searches not persisted");
        }
    }

    /// Records the selection of `city` under the most recent search's query
    ///
    /// # Returns
    /// * `true` - The selection was recorded
    /// * `false` - There is no non-empty query to attribute it to
    pub async fn record_selection(&mut self, city: &City) -> bool {
        let query = match self.latest() {
            Some(search) if !search.query.is_empty() => search.query.clone(),
            _ => {
                debug!(city = city.id, "no recent query to attribute selection to");
                return false;
            }
        };

        self.record(query, vec![city.clone()]).await;
        true
    }

    /// Writes the whole ledger to the store
    pub async fn flush(&self) -> Result<(), SearchError> {
        let json = serde_json::to_string(&self.entries).map_err(|err| SearchError::PersistFailed {
            key: RECENT_SEARCHES_KEY.to_string(),
            source: StoreError::Encode(err),
        })?;

        self.store
            .set(RECENT_SEARCHES_KEY, &json)
            .await
            .map_err(|source| SearchError::PersistFailed {
                key: RECENT_SEARCHES_KEY.to_string(),
                source,
            })
    }

    /// Snapshot of the ledger, most recent first
    pub fn all(&self) -> &[RecentSearch] {
        &self.entries
    }

    /// The most recent search, if any
    pub fn latest(&self) -> Option<&RecentSearch> {
        self.entries.first()
    }

    /// Finds a city by id among the most recent search's results
    pub fn find_latest_city(&self, id: CityId) -> Option<&City> {
        self.latest()?.cities.iter().find(|city| city.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Applies dedup-by-eviction, prepends and truncates, without flushing
    fn insert(&mut self, search: RecentSearch) {
        let ids = city_ids(&search.cities);
        self.entries.retain(|existing| !existing.shares_city_with(&ids));
        self.entries.insert(0, search);
        self.entries.truncate(self.capacity);
    }

    /// Re-inserts persisted entries oldest first so the invariants hold
    fn replay(&mut self, entries: Vec<RecentSearch>) {
        for search in entries.into_iter().rev() {
            self.insert(search);
        }
    }
}

/// Parses the persisted JSON array of recent searches
pub fn parse_persisted(content: &str) -> Result<Vec<RecentSearch>, SearchError> {
    serde_json::from_str(content).map_err(|source| SearchError::MalformedPersistedData {
        key: RECENT_SEARCHES_KEY.to_string(),
        source,
    })
}
