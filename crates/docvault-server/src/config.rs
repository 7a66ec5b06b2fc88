//! Server configuration for DocVault.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `DOCVAULT_*` environment variables.
//! The expected credential digest has no default on purpose — the original
//! portal shipped its hash inside the built assets, and a baked-in default
//! here would repeat that mistake.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

use docvault_core::gate::GateConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Durable state backend for gate counters.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Directory the document files live in.
    pub docs_dir: PathBuf,
    /// Path to the manifest JSON.
    pub manifest_path: PathBuf,
    /// Access gate settings.
    pub gate: GateConfig,
}

/// Supported durable state backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (attempt counters reset on restart).
    Memory,
    /// redb persistent storage.
    Redb { path: String },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `DOCVAULT_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `DOCVAULT_STORAGE` — `memory` or `redb` (default: `memory`)
    /// - `DOCVAULT_STORAGE_PATH` — path for the redb backend (default: `./data`)
    /// - `DOCVAULT_LOG_LEVEL` — log filter (default: `info`)
    /// - `DOCVAULT_DOCS_DIR` — document directory (default: `./docs`)
    /// - `DOCVAULT_MANIFEST_PATH` — manifest file (default: `<docs-dir>/manifest.json`)
    /// - `DOCVAULT_EXPECTED_DIGEST` — 64-hex target digest (**required**)
    /// - `DOCVAULT_MAX_ATTEMPTS` — failures before lockout (default: `3`)
    /// - `DOCVAULT_LOCKOUT_MS` — lockout length in milliseconds (default: `30000`)
    ///
    /// # Errors
    ///
    /// Fails when `DOCVAULT_EXPECTED_DIGEST` is missing or is not 64
    /// lowercase hex characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Priority: DOCVAULT_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Ok(addr) = std::env::var("DOCVAULT_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8300)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8300);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8300))
        };

        let storage_path =
            std::env::var("DOCVAULT_STORAGE_PATH").unwrap_or_else(|_| "./data".to_owned());

        let storage_backend = match std::env::var("DOCVAULT_STORAGE")
            .unwrap_or_else(|_| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "redb" => StorageBackendType::Redb { path: storage_path },
            _ => StorageBackendType::Memory,
        };

        let log_level = std::env::var("DOCVAULT_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let docs_dir =
            PathBuf::from(std::env::var("DOCVAULT_DOCS_DIR").unwrap_or_else(|_| "./docs".to_owned()));

        let manifest_path = std::env::var("DOCVAULT_MANIFEST_PATH")
            .map_or_else(|_| docs_dir.join("manifest.json"), PathBuf::from);

        let expected_digest_hex = std::env::var("DOCVAULT_EXPECTED_DIGEST")
            .context("DOCVAULT_EXPECTED_DIGEST is required (generate one with `docvault digest`)")?;
        validate_digest(&expected_digest_hex)?;

        let max_attempts = std::env::var("DOCVAULT_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        if max_attempts == 0 {
            bail!("DOCVAULT_MAX_ATTEMPTS must be at least 1");
        }

        let lockout_duration_ms = std::env::var("DOCVAULT_LOCKOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);

        Ok(Self {
            bind_addr,
            storage_backend,
            log_level,
            docs_dir,
            manifest_path,
            gate: GateConfig {
                expected_digest_hex,
                max_attempts,
                lockout_duration_ms,
            },
        })
    }
}

/// Check that a configured digest is 64 lowercase hex characters.
fn validate_digest(digest: &str) -> anyhow::Result<()> {
    if digest.len() != 64
        || !digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    {
        bail!("DOCVAULT_EXPECTED_DIGEST must be 64 lowercase hex characters");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_digest_accepted() {
        let digest = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(validate_digest(digest).is_ok());
    }

    #[test]
    fn short_digest_rejected() {
        assert!(validate_digest("abc123").is_err());
    }

    #[test]
    fn uppercase_digest_rejected() {
        let digest = "5E884898DA28047151D0E56F8DC6292773603D0D6AABBDD62A11EF721D1542D8";
        assert!(validate_digest(digest).is_err());
    }

    #[test]
    fn non_hex_digest_rejected() {
        let digest = "zz884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(validate_digest(digest).is_err());
    }
}
