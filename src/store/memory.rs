//! In-memory key-value store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{KeyValueStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// Key-value store held in process memory
///
/// Clones share the same entries, so a store handed to a session can still be
/// inspected afterwards. Reads and writes can be switched to fail to simulate
/// an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every subsequent `get` fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Makes every subsequent `set` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Reads a value directly, bypassing the failure switches
    pub fn peek(&self, key: &str) -> Option<String> {
        self.state().entries.get(key).cloned()
    }

    /// Writes a value directly, bypassing the failure switches
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state().entries.insert(key.into(), value.into());
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let state = self.state();
        if state.fail_reads {
            return Err(StoreError::Unavailable(format!("read of '{}' refused", key)));
        }
        Ok(state.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(StoreError::Unavailable(format!("write of '{}' refused", key)));
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_none_for_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("key", "[1,2]").await.unwrap();
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("key", "value").await.unwrap();

        assert_eq!(handle.peek("key").as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn test_failing_reads() {
        let store = MemoryStore::new();
        store.insert("key", "value");
        store.set_fail_reads(true);

        let result = store.get("key").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.set_fail_reads(false);
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn test_failing_writes_leave_entries_untouched() {
        let store = MemoryStore::new();
        store.insert("key", "old");
        store.set_fail_writes(true);

        let result = store.set("key", "new").await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.peek("key").as_deref(), Some("old"));
    }
}
