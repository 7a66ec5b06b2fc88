//! Document library routes: `/v1/library/*`
//!
//! Manifest listing, single-record lookup, and raw document bytes. All of
//! these sit behind the session middleware — they are consulted only after
//! the gate grants access. Fetch failures here are display-only errors; the
//! gate is unaffected.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;

use docvault_core::manifest::DocumentRecord;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/library` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_documents))
        .route("/{id}", get(get_document))
        .route("/{id}/content", get(get_content))
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List all manifest records.
async fn list_documents(State(state): State<Arc<AppState>>) -> Json<Vec<DocumentRecord>> {
    Json(state.manifest.records().to_vec())
}

/// Fetch a single manifest record.
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, AppError> {
    let record = state.manifest.get(&id)?;
    Ok(Json(record.clone()))
}

/// Fetch document bytes with a content type chosen by the record type.
///
/// Page-layout documents go out inline as `application/pdf`, text documents
/// as UTF-8 plain text, and anything else as a download.
async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(HeaderMap, Vec<u8>), AppError> {
    let record = state.manifest.get(&id)?.clone();

    // Manifest filenames are operator-owned, but never let one walk out of
    // the docs directory.
    if record.filename.contains("..") || record.filename.contains('/') {
        return Err(AppError::BadRequest(format!(
            "invalid manifest filename for document '{id}'"
        )));
    }

    let path = state.docs_dir.join(&record.filename);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        warn!(id = %id, path = %path.display(), error = %e, "document read failed");
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("document file missing: {id}"))
        } else {
            AppError::Internal(format!("failed to read document: {id}"))
        }
    })?;

    let mut headers = HeaderMap::new();
    match record.doc_type.as_str() {
        "PDF" => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/pdf"),
            );
        }
        "TXT" | "MD" => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }
        _ => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            if let Ok(disposition) = HeaderValue::from_str(&format!(
                "attachment; filename=\"{}\"",
                record.filename
            )) {
                headers.insert(header::CONTENT_DISPOSITION, disposition);
            }
        }
    }

    Ok((headers, bytes))
}
