//! Session middleware for the DocVault server.
//!
//! Extracts the `X-Gate-Session` header and validates it against the gate:
//! the header value must constant-time-equal the expected digest **and** the
//! gate's session marker must still be live. Library routes are unreachable
//! without both.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Header carrying the session marker issued on a granted verification.
pub const SESSION_HEADER: &str = "X-Gate-Session";

/// Middleware that validates the `X-Gate-Session` header.
///
/// Skips validation for the health endpoint and the gate routes — those must
/// stay reachable while locked out or signed out.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    // Public endpoints.
    if path == "/v1/sys/health" || path.starts_with("/v1/gate/") {
        return next.run(req).await;
    }

    let header = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let Some(presented) = header else {
        return unauthorized("missing X-Gate-Session header");
    };

    let marker_matches: bool = presented
        .as_bytes()
        .ct_eq(state.gate.expected_digest().as_bytes())
        .into();
    if !marker_matches {
        return unauthorized("invalid session");
    }

    match state.gate.restore_session().await {
        Ok(true) => next.run(req).await,
        Ok(false) => unauthorized("session expired or signed out"),
        Err(err) => {
            tracing::error!(error = %err, "session restore failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(
                    serde_json::json!({"error": "internal_error", "message": "session check failed"}),
                ),
            )
                .into_response()
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({"error": "unauthorized", "message": message})),
    )
        .into_response()
}
