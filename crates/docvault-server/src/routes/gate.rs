//! Access gate routes: `/v1/gate/*`
//!
//! Verification, status polling, and sign-out. These are public — a caller
//! who is locked out or signed out still needs them. Denied responses carry
//! the attempt count but never say which part of the credential was wrong.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use docvault_core::gate::VerifyResult;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/gate` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/verify", post(verify))
        .route("/status", get(status))
        .route("/sign-out", post(sign_out))
}

// ── Request / Response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub credential: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyResponse {
    /// Replay `session` in the `X-Gate-Session` header on library requests.
    Granted { session: String },
    Denied {
        attempts_so_far: u32,
        just_locked_out: bool,
    },
    Locked { remaining_seconds: i64 },
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    pub attempts: u32,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Verify a candidate credential.
async fn verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyRequest>,
) -> Result<(StatusCode, Json<VerifyResponse>), AppError> {
    let result = state.gate.verify(&body.credential, Utc::now()).await?;

    let (status, response) = match result {
        VerifyResult::Granted => (
            StatusCode::OK,
            VerifyResponse::Granted {
                session: state.gate.expected_digest().to_owned(),
            },
        ),
        VerifyResult::Denied {
            attempts_so_far,
            just_locked_out,
        } => (
            StatusCode::UNAUTHORIZED,
            VerifyResponse::Denied {
                attempts_so_far,
                just_locked_out,
            },
        ),
        VerifyResult::Locked { remaining_seconds } => (
            StatusCode::TOO_MANY_REQUESTS,
            VerifyResponse::Locked { remaining_seconds },
        ),
    };

    Ok((status, Json(response)))
}

/// Report gate state: session, attempt count, and any active lockout.
async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let now = Utc::now();
    let authenticated = state.gate.restore_session().await?;
    let lockout = state.gate.restore_lockout_state(now).await?;

    let remaining_seconds = lockout.remaining_seconds(now);

    Ok(Json(StatusResponse {
        authenticated,
        attempts: lockout.attempts,
        locked: remaining_seconds.is_some(),
        remaining_seconds,
    }))
}

/// Drop the session marker. Counters and any lockout are untouched.
async fn sign_out(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.gate.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
