//! Document manifest for DocVault.
//!
//! The manifest is a JSON array of document records, consulted only after
//! the gate grants access. This module owns the record shape, manifest
//! loading/lookup, and the directory scan that generates a manifest from a
//! docs folder (`docvault scan`).

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ManifestError;

/// File extensions admitted by the directory scan, lowercase.
const SCANNED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

/// A single viewable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable identifier, unique within one manifest.
    pub id: String,
    /// File name relative to the docs directory.
    pub filename: String,
    /// Human-readable title.
    pub title: String,
    /// Document type tag (`PDF`, `TXT`, `MD`, …) — drives content handling.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Short description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Document date (`YYYY-MM-DD`), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Human-readable size, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// A loaded document manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    records: Vec<DocumentRecord>,
}

impl Manifest {
    /// Build a manifest from records.
    #[must_use]
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self { records }
    }

    /// Parse a manifest from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if the JSON is malformed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let records = serde_json::from_slice(bytes).map_err(|e| ManifestError::Parse {
            reason: e.to_string(),
        })?;
        Ok(Self { records })
    }

    /// Load a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read, or
    /// [`ManifestError::Parse`] if its contents are not a record array.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let manifest = Self::from_slice(&bytes)?;
        debug!(path = %path.display(), records = manifest.records.len(), "manifest loaded");
        Ok(manifest)
    }

    /// All records, in manifest order.
    #[must_use]
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotFound`] if no record has the given id.
    pub fn get(&self, id: &str) -> Result<&DocumentRecord, ManifestError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ManifestError::NotFound { id: id.to_owned() })
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the manifest has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Scan one level of a documents directory into manifest records.
///
/// Admits `.pdf`, `.txt`, and `.md` files (case-insensitive extension).
/// The id and title derive from the file stem; `size` and `date` come from
/// file metadata. Output is sorted by filename so regeneration is
/// deterministic.
///
/// # Errors
///
/// Returns [`ManifestError::Scan`] if the directory cannot be read.
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<DocumentRecord>, ManifestError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| ManifestError::Scan {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ManifestError::Scan {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(extension) = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
        else {
            continue;
        };
        if !SCANNED_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let metadata = entry.metadata().map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let date = metadata
            .modified()
            .ok()
            .map(|mtime| DateTime::<Utc>::from(mtime).format("%Y-%m-%d").to_string());

        records.push(DocumentRecord {
            id: stem.to_lowercase().replace([' ', '_'], "-"),
            filename: filename.to_owned(),
            title: stem.replace(['-', '_'], " "),
            doc_type: extension.to_uppercase(),
            summary: None,
            date,
            size: Some(human_size(metadata.len())),
        });
    }

    records.sort_by(|a, b| a.filename.cmp(&b.filename));
    debug!(path = %dir.display(), records = records.len(), "directory scanned");
    Ok(records)
}

/// Render a byte count the way the portal displays it (`312 B`, `4.2 KB`).
fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}
