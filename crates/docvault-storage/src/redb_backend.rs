//! Durable redb state store.
//!
//! Keeps gate state (attempt counter, lockout instant) across process
//! restarts, the way the original browser storage survived page reloads.
//! Pure Rust, no FFI. Feature-gated behind `redb-backend`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, TableDefinition};

use crate::{StateError, StateStore};

/// The single table used for all gate state.
const STATE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("state");

/// A state store backed by redb (pure Rust, B-tree based).
///
/// Thread-safe via `Arc<Database>`. Blocking redb calls are offloaded to the
/// Tokio blocking thread pool.
///
/// # Examples
///
/// ```no_run
/// # use docvault_storage::RedbBackend;
/// let store = RedbBackend::open("/var/lib/docvault/state.redb").unwrap();
/// ```
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Open or create a redb database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Open`] if redb fails to open or create the
    /// database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(|e| StateError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Ensure the state table exists by opening a write transaction.
        let txn = db.begin_write().map_err(|e| StateError::Transaction {
            reason: e.to_string(),
        })?;
        {
            // Opening the table in a write txn creates it if missing.
            let _table = txn
                .open_table(STATE_TABLE)
                .map_err(|e| StateError::MissingTable {
                    name: format!("state: {e}"),
                })?;
        }
        txn.commit().map_err(|e| StateError::Transaction {
            reason: e.to_string(),
        })?;

        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Return the filesystem path of this database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl StateStore for RedbBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(|e| StateError::Transaction {
                reason: e.to_string(),
            })?;
            let table = txn
                .open_table(STATE_TABLE)
                .map_err(|e| StateError::MissingTable {
                    name: format!("state: {e}"),
                })?;
            let result = table
                .get(key.as_str())
                .map_err(|e| StateError::Read {
                    key: key.clone(),
                    reason: e.to_string(),
                })?
                .map(|v| v.value().to_owned());
            Ok(result)
        })
        .await
        .map_err(|e| StateError::Read {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        let value = value.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(|e| StateError::Transaction {
                reason: e.to_string(),
            })?;
            {
                let mut table =
                    txn.open_table(STATE_TABLE)
                        .map_err(|e| StateError::MissingTable {
                            name: format!("state: {e}"),
                        })?;
                table
                    .insert(key.as_str(), value.as_str())
                    .map_err(|e| StateError::Write {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
            }
            txn.commit().map_err(|e| StateError::Transaction {
                reason: e.to_string(),
            })?;
            Ok(())
        })
        .await
        .map_err(|e| StateError::Write {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn delete(&self, key: &str) -> Result<(), StateError> {
        let db = Arc::clone(&self.db);
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_write().map_err(|e| StateError::Transaction {
                reason: e.to_string(),
            })?;
            {
                let mut table =
                    txn.open_table(STATE_TABLE)
                        .map_err(|e| StateError::MissingTable {
                            name: format!("state: {e}"),
                        })?;
                // remove() is idempotent — returns Ok(None) if key doesn't exist.
                table
                    .remove(key.as_str())
                    .map_err(|e| StateError::Delete {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
            }
            txn.commit().map_err(|e| StateError::Transaction {
                reason: e.to_string(),
            })?;
            Ok(())
        })
        .await
        .map_err(|e| StateError::Delete {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }
}
