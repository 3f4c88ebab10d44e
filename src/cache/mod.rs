//! Read-through cache of search results
//!
//! Each successful, non-empty lookup is persisted under a key derived from its
//! query and served verbatim on later searches for the same query. Entries are
//! written once per query and never expire.

mod search_cache;

pub use search_cache::{cache_key, CacheEntry, SearchCache, CACHE_KEY_PREFIX};
