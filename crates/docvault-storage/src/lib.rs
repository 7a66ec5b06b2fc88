//! State store abstraction for DocVault.
//!
//! This crate defines the [`StateStore`] trait — a string key-value interface
//! that knows nothing about the access gate or documents. The gate in
//! `docvault-core` persists its attempt counter, lockout instant, and session
//! marker through this layer, which keeps the gate testable against an
//! in-memory store.
//!
//! Two implementations are provided:
//!
//! - [`RedbBackend`] — durable, backed by redb (feature `redb-backend`)
//! - [`MemoryBackend`] — in-memory, for tests and session-scoped state
//!
//! Values are strings rather than bytes: everything the gate persists is a
//! stringified integer or a hex digest.

mod error;
mod memory;
#[cfg(feature = "redb-backend")]
mod redb_backend;

pub use error::StateError;
pub use memory::MemoryBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;

/// A pluggable string key-value state store.
///
/// Keys are UTF-8 strings using `/` as a separator (e.g. `gate/attempts`).
/// Values are opaque strings — the gate owns their format.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StateError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &str) -> Result<(), StateError>;

    /// Delete a key. This is idempotent — deleting a non-existent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StateError>;

    /// Check whether a key exists.
    ///
    /// The default implementation calls [`get`](StateStore::get) and checks
    /// for `Some`. Backends may override this with a more efficient check.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StateError> {
        Ok(self.get(key).await?.is_some())
    }
}
