//! Error conditions of the search core
//!
//! Only `LookupFailed` ever reaches the caller of a search; the session absorbs
//! the others with a fallback and logs them.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The persisted store could not be read
    #[error("Search cache unavailable: {0}")]
    CacheUnavailable(#[source] StoreError),

    /// The city-lookup provider failed
    #[error("City lookup failed: {0}")]
    LookupFailed(String),

    /// A cache entry or the recent searches could not be written
    #[error("Failed to persist {key}: {source}")]
    PersistFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The persisted recent searches could not be parsed
    #[error("Malformed persisted data under {key}: {source}")]
    MalformedPersistedData {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
