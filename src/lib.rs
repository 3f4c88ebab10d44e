//! citysearch library
//!
//! City search with a read-through result cache and a capped, deduplicated
//! list of recent searches, both persisted through a key-value store.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod ledger;
pub mod search;
pub mod store;

pub use cache::SearchCache;
pub use config::Config;
pub use data::{City, CityLookup, GeocodingClient, RecentSearch, SearchResult};
pub use error::SearchError;
pub use ledger::RecentSearchLedger;
pub use search::SearchSession;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
