//! Integration tests for the DocVault HTTP API.
//!
//! Drive the assembled router with `tower::ServiceExt::oneshot` — no socket,
//! no running server. Each test builds a fresh state with in-memory stores,
//! so gate state never leaks between tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use docvault_core::gate::{AccessGate, GateConfig};
use docvault_core::manifest::Manifest;
use docvault_server::routes::api_router;
use docvault_server::state::AppState;
use docvault_storage::MemoryBackend;

// SHA-256("password")
const PASSWORD_DIGEST: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

struct TestApp {
    app: Router,
    // Held so the docs directory outlives the test.
    _docs: tempfile::TempDir,
}

fn test_app(max_attempts: u32) -> TestApp {
    let docs = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(docs.path().join("notes.txt")).unwrap();
    file.write_all(b"meeting notes").unwrap();

    let manifest = Manifest::from_slice(
        br#"[
            {"id": "notes", "filename": "notes.txt", "title": "Notes", "type": "TXT"},
            {"id": "ghost", "filename": "missing.pdf", "title": "Ghost", "type": "PDF"}
        ]"#,
    )
    .unwrap();

    let gate = AccessGate::new(
        GateConfig {
            expected_digest_hex: PASSWORD_DIGEST.to_owned(),
            max_attempts,
            lockout_duration_ms: 30_000,
        },
        Arc::new(MemoryBackend::new()),
        Arc::new(MemoryBackend::new()),
    );

    let state = Arc::new(AppState {
        gate: Arc::new(gate),
        manifest,
        docs_dir: docs.path().to_path_buf(),
    });

    TestApp {
        app: api_router(state),
        _docs: docs,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn verify_request(credential: &str) -> Request<Body> {
    Request::post("/v1/gate/verify")
        .header("content-type", "application/json")
        .body(Body::from(format!("{{\"credential\":{}}}", Value::from(credential))))
        .unwrap()
}

fn library_request(path: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(session) = session {
        builder = builder.header("X-Gate-Session", session);
    }
    builder.body(Body::empty()).unwrap()
}

async fn grant(app: &Router) -> String {
    let (status, body) = send(app, verify_request("password")).await;
    assert_eq!(status, StatusCode::OK);
    body["session"].as_str().unwrap().to_owned()
}

// ── sys ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let t = test_app(3);
    let (status, body) = send(&t.app, library_request("/v1/sys/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["documents"], 2);
}

// ── gate ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn correct_credential_grants_with_session() {
    let t = test_app(3);
    let (status, body) = send(&t.app, verify_request("password")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "granted");
    assert_eq!(body["session"], PASSWORD_DIGEST);
}

#[tokio::test]
async fn wrong_credential_is_denied() {
    let t = test_app(3);
    let (status, body) = send(&t.app, verify_request("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["outcome"], "denied");
    assert_eq!(body["attempts_so_far"], 1);
    assert_eq!(body["just_locked_out"], false);
}

#[tokio::test]
async fn threshold_crossing_reports_lockout() {
    let t = test_app(2);
    send(&t.app, verify_request("wrong1")).await;
    let (status, body) = send(&t.app, verify_request("wrong2")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["just_locked_out"], true);

    // Even the correct credential is rejected while the window is active.
    let (status, body) = send(&t.app, verify_request("password")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["outcome"], "locked");
    assert!(body["remaining_seconds"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn status_reflects_gate_state() {
    let t = test_app(3);

    let (_, body) = send(&t.app, library_request("/v1/gate/status", None)).await;
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["attempts"], 0);
    assert_eq!(body["locked"], false);

    send(&t.app, verify_request("wrong")).await;
    let (_, body) = send(&t.app, library_request("/v1/gate/status", None)).await;
    assert_eq!(body["attempts"], 1);

    grant(&t.app).await;
    let (_, body) = send(&t.app, library_request("/v1/gate/status", None)).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["attempts"], 0);
}

#[tokio::test]
async fn sign_out_revokes_library_access() {
    let t = test_app(3);
    let session = grant(&t.app).await;

    let (status, _) = send(&t.app, library_request("/v1/library", Some(&session))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        Request::post("/v1/gate/sign-out").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&t.app, library_request("/v1/library", Some(&session))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── library gating ───────────────────────────────────────────────────

#[tokio::test]
async fn library_requires_session_header() {
    let t = test_app(3);
    let (status, body) = send(&t.app, library_request("/v1/library", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn library_rejects_wrong_session_value() {
    let t = test_app(3);
    grant(&t.app).await;
    let (status, _) = send(
        &t.app,
        library_request("/v1/library", Some("valid_session")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn library_rejects_replayed_digest_before_grant() {
    // Knowing the digest is not enough — the gate must hold a live marker.
    let t = test_app(3);
    let (status, _) = send(
        &t.app,
        library_request("/v1/library", Some(PASSWORD_DIGEST)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn library_lists_documents_after_grant() {
    let t = test_app(3);
    let session = grant(&t.app).await;
    let (status, body) = send(&t.app, library_request("/v1/library", Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["id"], "notes");
    assert_eq!(body[0]["type"], "TXT");
}

#[tokio::test]
async fn single_record_lookup() {
    let t = test_app(3);
    let session = grant(&t.app).await;
    let (status, body) = send(
        &t.app,
        library_request("/v1/library/notes", Some(&session)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Notes");

    let (status, _) = send(
        &t.app,
        library_request("/v1/library/unknown", Some(&session)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn text_content_served_as_plain_text() {
    let t = test_app(3);
    let session = grant(&t.app).await;

    let response = t
        .app
        .clone()
        .oneshot(library_request("/v1/library/notes/content", Some(&session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"meeting notes");
}

#[tokio::test]
async fn missing_file_is_display_only_error() {
    let t = test_app(3);
    let session = grant(&t.app).await;

    let (status, body) = send(
        &t.app,
        library_request("/v1/library/ghost/content", Some(&session)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // The failed fetch must not disturb the gate.
    let (_, body) = send(&t.app, library_request("/v1/gate/status", None)).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["attempts"], 0);
}
