//! Search session orchestration
//!
//! A `SearchSession` owns the result cache, the recent searches ledger and the
//! city-lookup provider for one user session. It is driven from a single task:
//! every mutating call takes `&mut self`, so a search's cache and ledger
//! updates are complete before the call returns.

use tracing::{debug, info, warn};

use crate::cache::SearchCache;
use crate::config::Config;
use crate::data::{City, CityId, CityLookup, RecentSearch, SearchResult};
use crate::error::SearchError;
use crate::ledger::RecentSearchLedger;
use crate::store::KeyValueStore;

/// Session-scoped search context
#[derive(Debug)]
pub struct SearchSession<S, P> {
    cache: SearchCache<S>,
    ledger: RecentSearchLedger<S>,
    provider: P,
}

impl<S, P> SearchSession<S, P>
where
    S: KeyValueStore + Clone,
    P: CityLookup,
{
    /// Opens a session, loading the persisted recent searches
    ///
    /// An unreadable or corrupted ledger starts the session empty.
    pub async fn open(store: S, provider: P, config: &Config) -> Self {
        let ledger = RecentSearchLedger::load(store.clone(), config.recent_capacity).await;
        Self::with_ledger(SearchCache::new(store), ledger, provider)
    }

    /// Assembles a session from already-built parts
    pub fn with_ledger(cache: SearchCache<S>, ledger: RecentSearchLedger<S>, provider: P) -> Self {
        Self {
            cache,
            ledger,
            provider,
        }
    }

    /// Resolves `query` to cities, serving from cache when possible
    ///
    /// The query is used exactly as given. On a cache miss the provider is
    /// asked; a non-empty answer is cached and recorded in the ledger, an
    /// empty one is returned untouched.
    ///
    /// # Returns
    /// * `Ok(SearchResult)` - The cities for the query, possibly empty
    /// * `Err(SearchError::LookupFailed)` - The provider failed; nothing was mutated
    pub async fn search(&mut self, query: &str) -> Result<SearchResult, SearchError> {
        match self.cache.lookup(query).await {
            Ok(Some(cities)) => return Ok(cities),
            Ok(None) => {}
            Err(err) => warn!(query, error = %err, "cache lookup failed, asking provider"),
        }

        let cities = self
            .provider
            .search_by_name(query)
            .await
            .map_err(|err| SearchError::LookupFailed(err.to_string()))?;

        if cities.is_empty() {
            debug!(query, "provider returned no cities");
            return Ok(cities);
        }

        info!(query, cities = cities.len(), "resolved query");
        if let Err(err) = self.cache.store(query, &cities).await {
            warn!(query, error = %err, "search result not cached");
        }
        self.ledger.record(query, cities.clone()).await;

        Ok(cities)
    }

    /// Records that the user picked `city` from the latest results
    ///
    /// Returns false, leaving the ledger untouched, when there is no prior
    /// search to attribute the selection to.
    pub async fn select(&mut self, city: &City) -> bool {
        self.ledger.record_selection(city).await
    }

    /// Records the selection of the city with `id` from the latest search
    ///
    /// Returns the selected city, or `None` if the latest search has no such
    /// city or the selection could not be recorded.
    pub async fn select_by_id(&mut self, id: CityId) -> Option<City> {
        let city = self.ledger.find_latest_city(id)?.clone();
        if !self.ledger.record_selection(&city).await {
            return None;
        }
        Some(city)
    }

    /// Recent searches, most recent first
    pub fn recent(&self) -> &[RecentSearch] {
        self.ledger.all()
    }

    pub fn ledger(&self) -> &RecentSearchLedger<S> {
        &self.ledger
    }
}
