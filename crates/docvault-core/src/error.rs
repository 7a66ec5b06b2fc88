//! Error types for `docvault-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. Gate errors never include the candidate credential or the
//! expected digest.

use docvault_storage::StateError;

/// Errors from access gate operations.
///
/// Verification outcomes (denied, locked) are **not** errors — they are
/// variants of [`crate::gate::VerifyResult`]. The gate only fails when the
/// underlying state store does.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The underlying state store returned an error.
    #[error("gate storage error: {0}")]
    Storage(#[from] StateError),
}

/// Errors from manifest loading and directory scanning.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the manifest or a document directory entry.
    #[error("failed to read '{path}': {reason}")]
    Read { path: String, reason: String },

    /// The manifest JSON is malformed.
    #[error("invalid manifest: {reason}")]
    Parse { reason: String },

    /// Directory scan failed.
    #[error("failed to scan '{path}': {reason}")]
    Scan { path: String, reason: String },

    /// No document with the given id exists in the manifest.
    #[error("document not found: {id}")]
    NotFound { id: String },
}
