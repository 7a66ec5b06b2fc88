//! In-memory state store.
//!
//! Stores all data in a `BTreeMap` behind a `RwLock`. Nothing survives the
//! process — which is exactly right for session-scoped gate state, and
//! convenient for unit tests that need a real store without touching disk.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{StateError, StateStore};

/// An in-memory state store backed by a `BTreeMap`.
///
/// Thread-safe and async-compatible. Cloning shares the underlying map, so
/// a clone handed to the gate and one kept by the caller observe the same
/// state.
///
/// # Examples
///
/// ```
/// # use docvault_storage::{MemoryBackend, StateStore};
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryBackend::new();
/// store.put("gate/attempts", "2").await.unwrap();
/// let val = store.get("gate/attempts").await.unwrap();
/// assert_eq!(val.as_deref(), Some("2"));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StateError> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StateError> {
        let data = self.data.read().await;
        Ok(data.contains_key(key))
    }
}
