//! Shared application state for the DocVault server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the access gate, the loaded manifest,
//! and the docs directory to serve document bytes from.

use std::path::PathBuf;
use std::sync::Arc;

use docvault_core::gate::AccessGate;
use docvault_core::manifest::Manifest;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// The access gate.
    pub gate: Arc<AccessGate>,
    /// Document records, loaded at startup.
    pub manifest: Manifest,
    /// Directory the manifest's filenames resolve against.
    pub docs_dir: PathBuf,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
